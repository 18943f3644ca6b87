//! HTTP data types shared between the request layer and transports.
//!
//! # Design
//! Requests and responses are plain owned data, so the request layer stays
//! independent of any particular HTTP library and tests can script exchanges
//! without a socket. `ResponseBody` records the JSON-or-text decision once,
//! at parse time; downstream code pattern-matches instead of re-sniffing
//! content types.

use serde_json::Value;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An outbound HTTP request described as plain data.
///
/// Built by `ApiClient::request` and handed to a `Transport` for execution.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_lookup(&self.headers, name)
    }
}

/// A raw HTTP response described as plain data.
///
/// Produced by a `Transport`, consumed by `ApiClient` which decides how to
/// interpret the body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_lookup(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn header_lookup<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// A response body after the one-time JSON-or-text decision.
///
/// `Json` when the response declared `application/json` and the status was
/// not 204; `Text` otherwise (empty string for no-content responses).
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }

    /// The `message` (or `error`) field of a JSON body, if present. The
    /// backend reports human-readable failures under either key.
    pub(crate) fn server_message(&self) -> Option<&str> {
        let value = self.as_json()?;
        value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(response.header("authorization"), None);
    }

    #[test]
    fn server_message_prefers_message_over_error() {
        let body = ResponseBody::Json(serde_json::json!({
            "message": "Transaction not found",
            "error": "ignored",
        }));
        assert_eq!(body.server_message(), Some("Transaction not found"));

        let body = ResponseBody::Json(serde_json::json!({"error": "Invalid credentials"}));
        assert_eq!(body.server_message(), Some("Invalid credentials"));

        assert_eq!(ResponseBody::Text("oops".to_string()).server_message(), None);
    }

    #[test]
    fn status_success_range() {
        for (status, ok) in [(199, false), (200, true), (204, true), (299, true), (300, false)] {
            let response = HttpResponse {
                status,
                headers: Vec::new(),
                body: String::new(),
            };
            assert_eq!(response.is_success(), ok, "status {status}");
        }
    }
}
