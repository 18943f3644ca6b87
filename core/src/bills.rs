//! Billing endpoints.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{Bill, NewBill};

/// `/bills/` endpoint map.
pub struct BillsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> BillsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<Bill>, ApiError> {
        self.client.get("/bills/")?.json()
    }

    /// Returns the stored bill with server-computed totals.
    pub fn create(&self, bill: &NewBill) -> Result<Bill, ApiError> {
        self.client.post("/bills/", bill, true)?.json()
    }

    pub fn detail(&self, id: u64) -> Result<Bill, ApiError> {
        self.client.get(&format!("/bills/{id}/"))?.json()
    }

    pub fn update(&self, id: u64, bill: &NewBill) -> Result<Bill, ApiError> {
        self.client.put(&format!("/bills/{id}/update/"), bill)?.json()
    }

    /// Succeeds with 204 and an empty body.
    pub fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .delete::<()>(&format!("/bills/{id}/"), None)
            .map(|_| ())
    }

    /// The rendered document; served as `application/pdf`, so the body
    /// arrives as raw text rather than JSON.
    pub fn pdf(&self, id: u64) -> Result<String, ApiError> {
        let result = self.client.get(&format!("/bills/{id}/pdf/"))?;
        match result.text() {
            Some(text) => Ok(text.to_string()),
            None => Err(ApiError::Parse(
                "expected a document body, got JSON".to_string(),
            )),
        }
    }
}
