//! Transaction endpoints.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{
    ApiMessage, NewTransaction, SummaryRange, Transaction, TransactionPatch, TransactionSummary,
};

/// `/transactions/` endpoint map.
pub struct TransactionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TransactionsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Transaction>, ApiError> {
        self.client.get("/transactions/")?.json()
    }

    /// The backend acknowledges with a message rather than echoing the
    /// created row; fetch `list` or `detail` for the stored form.
    pub fn create(&self, transaction: &NewTransaction) -> Result<ApiMessage, ApiError> {
        self.client
            .post("/transactions/create/", transaction, true)?
            .json()
    }

    pub fn detail(&self, id: u64) -> Result<Transaction, ApiError> {
        self.client
            .get(&format!("/transactions/details/{id}/"))?
            .json()
    }

    pub fn update(&self, id: u64, patch: &TransactionPatch) -> Result<ApiMessage, ApiError> {
        self.client
            .put(&format!("/transactions/update/{id}/"), patch)?
            .json()
    }

    /// Succeeds with 204 and an empty body.
    pub fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .delete::<()>(&format!("/transactions/delete/{id}/"), None)
            .map(|_| ())
    }

    /// Aggregate income/expense/balance, optionally restricted to a date
    /// range (`?start_date=...&end_date=...`).
    pub fn summary(&self, range: Option<&SummaryRange>) -> Result<TransactionSummary, ApiError> {
        let path = match range {
            Some(range) => format!(
                "/transactions/summary/?start_date={}&end_date={}",
                range.start_date, range.end_date
            ),
            None => "/transactions/summary/".to_string(),
        };
        self.client.get(&path)?.json()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::token::MemoryTokenStore;
    use crate::transport::{Transport, TransportError};

    /// Replies 200 `{}`-ish to everything, recording the request line.
    #[derive(Default)]
    struct EchoTransport {
        requests: Mutex<Vec<HttpRequest>>,
        body: Mutex<String>,
    }

    impl EchoTransport {
        fn with_body(body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                body: Mutex::new(body.to_string()),
            })
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    impl Transport for EchoTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status: 200,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: self.body.lock().unwrap().clone(),
            })
        }
    }

    fn api(transport: &Arc<EchoTransport>) -> ApiClient {
        ApiClient::new(
            "http://backend.test",
            transport.clone() as Arc<dyn Transport>,
            Arc::new(MemoryTokenStore::with_token("tok")),
        )
    }

    #[test]
    fn detail_templates_the_id_into_the_path() {
        let transport = EchoTransport::with_body(
            r#"{"id": 12, "received_from": "Acme", "amount": "5.00", "date": "2025-01-02"}"#,
        );
        let client = api(&transport);
        let tx = client.transactions().detail(12).unwrap();
        assert_eq!(tx.id, 12);
        assert_eq!(
            transport.last().url,
            "http://backend.test/api/transactions/details/12/"
        );
    }

    #[test]
    fn summary_range_becomes_query_parameters() {
        let transport = EchoTransport::with_body(
            r#"{"total_income": "0.00", "total_expense": "0.00", "balance": "0.00", "transaction_count": 0}"#,
        );
        let client = api(&transport);
        let range = SummaryRange {
            start_date: "2025-01-01".to_string(),
            end_date: "2025-01-31".to_string(),
        };
        client.transactions().summary(Some(&range)).unwrap();
        assert_eq!(
            transport.last().url,
            "http://backend.test/api/transactions/summary/?start_date=2025-01-01&end_date=2025-01-31"
        );

        client.transactions().summary(None).unwrap();
        assert_eq!(
            transport.last().url,
            "http://backend.test/api/transactions/summary/"
        );
    }
}
