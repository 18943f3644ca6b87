//! Error types for the ledger API client.
//!
//! # Design
//! The three failure channels callers care about stay distinct: `Http` for a
//! server that answered with a non-2xx status, `Network` for a server that
//! could not be reached at all, and `Parse` for a body that did not match its
//! declared shape. `Serialization` covers the request-side encoding path.
//! The failure kind is carried as data, so callers match on the variant.

use std::fmt;

use crate::http::ResponseBody;

/// Errors returned by `ApiClient` and the resource endpoint maps.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status. `message` is the body's
    /// `message`/`error` field when present, a generic fallback otherwise.
    Http {
        status: u16,
        body: ResponseBody,
        message: String,
    },

    /// The request never reached the server (offline, refused, DNS).
    Network(String),

    /// The response declared JSON but did not decode, or a typed decode of
    /// a JSON body failed.
    Parse(String),

    /// The request payload could not be encoded as JSON.
    Serialization(String),
}

impl ApiError {
    /// Status code for HTTP failures, `None` for the other kinds.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 responses, the trigger for token invalidation.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http { status, message, .. } => {
                write!(f, "HTTP {status}: {message}")
            }
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Parse(msg) => write!(f, "invalid response: {msg}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_on_http_failures() {
        let err = ApiError::Http {
            status: 404,
            body: ResponseBody::Text(String::new()),
            message: "request failed".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_unauthorized());

        assert_eq!(ApiError::Network("refused".to_string()).status(), None);
        assert_eq!(ApiError::Parse("bad json".to_string()).status(), None);
    }

    #[test]
    fn unauthorized_detection() {
        let err = ApiError::Http {
            status: 401,
            body: ResponseBody::Json(serde_json::json!({"error": "token expired"})),
            message: "token expired".to_string(),
        };
        assert!(err.is_unauthorized());
    }

    #[test]
    fn display_carries_the_kind() {
        let err = ApiError::Http {
            status: 500,
            body: ResponseBody::Text("boom".to_string()),
            message: "request failed".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: request failed");
        assert_eq!(
            ApiError::Network("connection refused".to_string()).to_string(),
            "network error: connection refused"
        );
    }
}
