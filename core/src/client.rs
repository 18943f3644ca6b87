//! The request layer: single choke point for outbound API calls.
//!
//! # Design
//! `ApiClient` owns the base URL and reaches its collaborators through trait
//! objects: a `Transport` performs the I/O and a `TokenStore` holds the
//! bearer token. Every call is a fresh round trip — no caching, retrying,
//! or de-duplication lives here, and overlapping calls may complete out of
//! issue order.
//!
//! Header policy: every request sends `Content-Type: application/json`;
//! authenticated requests additionally send `Authorization: Bearer <token>`
//! when the store holds one. A missing token is not an error — the request
//! goes out anonymous and the server rejects it if it cares. Any 401 clears
//! the stored token before the failure is returned.

use std::sync::Arc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::accounts::AccountsApi;
use crate::bills::BillsApi;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
use crate::token::TokenStore;
use crate::transactions::TransactionsApi;
use crate::transport::{Transport, UreqTransport};

/// Environment variable naming the backend base URL.
pub const BASE_URL_ENV: &str = "LEDGER_API_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const GENERIC_FAILURE: &str = "request failed";

/// Per-call options for `ApiClient::request`.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<String>,
    pub authenticate: bool,
}

impl RequestOptions {
    /// Defaults to an authenticated request with no body.
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            body: None,
            authenticate: true,
        }
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticate = false;
        self
    }
}

/// Successful response: status, decoded body, response headers.
#[derive(Debug, Clone)]
pub struct ApiResult {
    pub status: u16,
    pub body: ResponseBody,
    pub headers: Vec<(String, String)>,
}

impl ApiResult {
    /// Decode the JSON arm of the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match &self.body {
            ResponseBody::Json(value) => {
                serde_json::from_value(value.clone()).map_err(|e| ApiError::Parse(e.to_string()))
            }
            ResponseBody::Text(_) => Err(ApiError::Parse("expected a JSON body".to_string())),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.body.as_text()
    }
}

/// Typed client for the ledger backend.
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// `base_url` is the server root; the `/api` prefix is appended here so
    /// endpoint paths stay relative (`/transactions/`, `/bills/{id}/`, ...).
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: format!("{}/api", base_url.trim_end_matches('/')),
            transport,
            store,
        }
    }

    /// Client over the default blocking transport, base URL from
    /// `LEDGER_API_URL` (localhost when unset).
    pub fn from_env(store: Arc<dyn TokenStore>) -> Self {
        let base = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base, Arc::new(UreqTransport::new()), store)
    }

    /// The injected token store, e.g. for persisting a fresh login.
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn accounts(&self) -> AccountsApi<'_> {
        AccountsApi::new(self)
    }

    pub fn transactions(&self) -> TransactionsApi<'_> {
        TransactionsApi::new(self)
    }

    pub fn bills(&self) -> BillsApi<'_> {
        BillsApi::new(self)
    }

    /// Issue a request and normalize the outcome.
    ///
    /// Failure taxonomy: transport errors become `ApiError::Network`, a JSON
    /// body that does not decode becomes `ApiError::Parse`, and any non-2xx
    /// status becomes `ApiError::Http` — after clearing the token store when
    /// the status is 401, regardless of which endpoint was called.
    pub fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResult, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if options.authenticate {
            if let Some(token) = self.store.get() {
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            }
        }
        let request = HttpRequest {
            method: options.method,
            url,
            headers,
            body: options.body,
        };
        debug!("{} {}", request.method.as_str(), request.url);

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!("{} {}: {err}", request.method.as_str(), request.url);
                return Err(ApiError::Network(err.0));
            }
        };

        // Decode once, before the status check: error bodies are JSON too.
        let body = decode_body(&response)?;

        if !response.is_success() {
            if response.status == 401 {
                warn!("401 from {path}: clearing stored token");
                self.store.clear();
            }
            let message = body
                .server_message()
                .unwrap_or(GENERIC_FAILURE)
                .to_string();
            return Err(ApiError::Http {
                status: response.status,
                body,
                message,
            });
        }

        Ok(ApiResult {
            status: response.status,
            body,
            headers: response.headers,
        })
    }

    /// Authenticated GET.
    pub fn get(&self, path: &str) -> Result<ApiResult, ApiError> {
        self.request(path, RequestOptions::new(HttpMethod::Get))
    }

    /// POST with a JSON body; `authenticate` is explicit because login is
    /// the one anonymous caller.
    pub fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        authenticate: bool,
    ) -> Result<ApiResult, ApiError> {
        let mut options = RequestOptions::new(HttpMethod::Post).body(encode(body)?);
        if !authenticate {
            options = options.anonymous();
        }
        self.request(path, options)
    }

    /// Authenticated PUT with a JSON body.
    pub fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResult, ApiError> {
        self.request(path, RequestOptions::new(HttpMethod::Put).body(encode(body)?))
    }

    /// Authenticated DELETE, with an optional JSON body (the delete-user
    /// endpoint takes one).
    pub fn delete<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<ApiResult, ApiError> {
        let mut options = RequestOptions::new(HttpMethod::Delete);
        if let Some(body) = body {
            options = options.body(encode(body)?);
        }
        self.request(path, options)
    }
}

fn encode<T: Serialize + ?Sized>(body: &T) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// JSON iff the content type says so and there is content to parse.
fn decode_body(response: &HttpResponse) -> Result<ResponseBody, ApiError> {
    let declares_json = response
        .header("content-type")
        .is_some_and(|ct| ct.contains("application/json"));
    if declares_json && response.status != 204 {
        serde_json::from_str(&response.body)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::Parse(e.to_string()))
    } else {
        Ok(ResponseBody::Text(response.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::token::MemoryTokenStore;
    use crate::transport::TransportError;

    /// Scripted transport: pops canned outcomes, records every request.
    #[derive(Default)]
    struct FakeTransport {
        requests: Mutex<Vec<HttpRequest>>,
        outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    }

    impl FakeTransport {
        fn scripted(
            outcomes: impl IntoIterator<Item = Result<HttpResponse, TransportError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                outcomes: Mutex::new(outcomes.into_iter().collect()),
            })
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted request")
        }
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: vec![(
                "content-type".to_string(),
                "application/json; charset=utf-8".to_string(),
            )],
            body: body.to_string(),
        }
    }

    fn no_content_response() -> HttpResponse {
        HttpResponse {
            status: 204,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: String::new(),
        }
    }

    fn client(
        transport: &Arc<FakeTransport>,
        store: Arc<MemoryTokenStore>,
    ) -> ApiClient {
        ApiClient::new(
            "http://backend.test",
            transport.clone() as Arc<dyn Transport>,
            store,
        )
    }

    #[test]
    fn bearer_header_sent_when_token_present() {
        let transport = FakeTransport::scripted([Ok(json_response(200, "[]"))]);
        let store = Arc::new(MemoryTokenStore::with_token("tok-1"));
        let api = client(&transport, store);

        api.get("/transactions/").unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].url, "http://backend.test/api/transactions/");
        assert_eq!(sent[0].header("authorization"), Some("Bearer tok-1"));
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
    }

    #[test]
    fn bearer_header_omitted_when_store_empty() {
        let transport = FakeTransport::scripted([Ok(json_response(200, "[]"))]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        api.get("/transactions/").unwrap();

        assert_eq!(transport.sent()[0].header("authorization"), None);
    }

    #[test]
    fn anonymous_post_never_sends_bearer_header() {
        let transport = FakeTransport::scripted([Ok(json_response(200, "{}"))]);
        let store = Arc::new(MemoryTokenStore::with_token("stale"));
        let api = client(&transport, store);

        api.post("/accounts/login/", &serde_json::json!({"email": "a"}), false)
            .unwrap();

        assert_eq!(transport.sent()[0].header("authorization"), None);
    }

    #[test]
    fn unauthorized_clears_token_store_on_any_endpoint() {
        let transport = FakeTransport::scripted([
            Ok(json_response(401, r#"{"error": "token expired"}"#)),
            Ok(json_response(200, "[]")),
        ]);
        let store = Arc::new(MemoryTokenStore::with_token("expired"));
        let api = client(&transport, store.clone());

        let err = api.get("/bills/").unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(store.get(), None, "401 empties the store");

        // The follow-up request goes out without an Authorization header.
        api.get("/bills/").unwrap();
        assert_eq!(transport.sent()[1].header("authorization"), None);
    }

    #[test]
    fn other_http_failures_keep_the_token() {
        let transport = FakeTransport::scripted([Ok(json_response(
            404,
            r#"{"error": "Transaction not found"}"#,
        ))]);
        let store = Arc::new(MemoryTokenStore::with_token("tok"));
        let api = client(&transport, store.clone());

        let err = api.get("/transactions/details/99/").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Transaction not found");
        assert_eq!(store.get(), Some("tok".to_string()));
    }

    #[test]
    fn http_failure_without_message_uses_generic_text() {
        let transport = FakeTransport::scripted([Ok(HttpResponse {
            status: 500,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: "<h1>oops</h1>".to_string(),
        })]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        match api.get("/transactions/").unwrap_err() {
            ApiError::Http {
                status,
                body,
                message,
            } => {
                assert_eq!(status, 500);
                assert_eq!(body, ResponseBody::Text("<h1>oops</h1>".to_string()));
                assert_eq!(message, "request failed");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn no_content_is_text_never_parsed() {
        let transport = FakeTransport::scripted([Ok(no_content_response())]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        let result = api.delete::<()>("/bills/5/", None).unwrap();
        assert_eq!(result.status, 204);
        assert_eq!(result.body, ResponseBody::Text(String::new()));
    }

    #[test]
    fn json_body_decodes_structurally() {
        let transport = FakeTransport::scripted([Ok(json_response(
            200,
            r#"{"total_income": "900.00", "total_expense": "-150.00", "balance": "750.00", "transaction_count": 4}"#,
        ))]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        let result = api.get("/transactions/summary/").unwrap();
        let summary: crate::types::TransactionSummary = result.json().unwrap();
        assert_eq!(summary.balance, "750.00");
        assert_eq!(summary.transaction_count, 4);
    }

    #[test]
    fn declared_json_that_does_not_parse_is_a_parse_error() {
        let transport = FakeTransport::scripted([Ok(json_response(200, "<html>not json</html>"))]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        let err = api.get("/transactions/").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn non_json_content_type_is_text_even_on_200() {
        let transport = FakeTransport::scripted([Ok(HttpResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "application/pdf".to_string())],
            body: "%PDF-ish".to_string(),
        })]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        let result = api.get("/bills/1/pdf/").unwrap();
        assert_eq!(result.text(), Some("%PDF-ish"));
    }

    #[test]
    fn transport_failure_is_a_network_error() {
        let transport =
            FakeTransport::scripted([Err(TransportError("connection refused".to_string()))]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        let err = api.get("/transactions/").unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn post_body_roundtrips_as_json() {
        let transport = FakeTransport::scripted([Ok(json_response(201, r#"{"message": "ok"}"#))]);
        let api = client(&transport, Arc::new(MemoryTokenStore::new()));

        let payload = crate::types::NewTransaction {
            received_from: "Acme Ltd".to_string(),
            amount: "1200.50".to_string(),
            note: None,
            date: "2025-05-01".to_string(),
        };
        api.post("/transactions/create/", &payload, true).unwrap();

        let sent = transport.sent();
        let wire: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "received_from": "Acme Ltd",
                "amount": "1200.50",
                "date": "2025-05-01",
            })
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let transport = FakeTransport::scripted([Ok(json_response(200, "[]"))]);
        let api = ApiClient::new(
            "http://backend.test/",
            transport.clone() as Arc<dyn Transport>,
            Arc::new(MemoryTokenStore::new()),
        );

        api.get("/bills/").unwrap();
        assert_eq!(transport.sent()[0].url, "http://backend.test/api/bills/");
    }
}
