//! Wire DTOs for the accounts, transactions, and billing resources.
//!
//! # Design
//! These types mirror the backend's serializers but are defined
//! independently; the integration tests against the mock server catch schema
//! drift. Monetary fields travel as decimal strings (the backend serializes
//! decimals that way to avoid float drift) and dates as ISO-8601 strings.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Login payload for `POST /accounts/login/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful login response: the session token plus a profile summary.
/// The caller decides whether to persist the token in a `TokenStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSession {
    pub token: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

/// Registration payload for `POST /accounts/register/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub password: String,
    /// Omitted means the server default ("cashier").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A user as returned by the profile and user-administration endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Partial profile update; omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Payload for `POST /accounts/change-password/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Body of `DELETE /accounts/delete-user/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUser {
    pub email: String,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// The user block embedded in transaction reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// A transaction as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(default)]
    pub user: Option<TransactionUser>,
    pub received_from: String,
    /// Decimal string; negative for outgoing amounts.
    pub amount: String,
    #[serde(default)]
    pub note: Option<String>,
    /// ISO date (YYYY-MM-DD).
    pub date: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payload for `POST /transactions/create/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub received_from: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date: String,
}

/// Partial update for `PUT /transactions/update/{id}/`; omitted fields stay
/// unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Aggregates returned by `GET /transactions/summary/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_income: String,
    pub total_expense: String,
    pub balance: String,
    pub transaction_count: u64,
}

/// Optional date-range filter for the summary endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRange {
    pub start_date: String,
    pub end_date: String,
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

/// Accepted payment methods, lowercase snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
    DigitalWallet,
    CreditCard,
    Other,
}

/// A line item on a bill. `total` is server-computed (quantity × unit price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A bill as returned by the billing endpoints. All monetary totals are
/// server-computed from the line items, discount, and tax percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: u64,
    pub bill_number: String,
    pub billed_to: String,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub subtotal: String,
    pub tax_percentage: String,
    pub tax_amount: String,
    pub discount_percentage: String,
    pub discount_amount: String,
    pub total_amount: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_details: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub items: Vec<BillItem>,
    #[serde(default)]
    pub issued_by: Option<String>,
    pub issued_at: String,
}

/// A line item in a bill create/update payload; totals are computed
/// server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBillItem {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `POST /bills/` and `PUT /bills/{id}/update/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBill {
    pub bill_number: String,
    pub billed_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub tax_percentage: String,
    pub discount_percentage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub items: Vec<NewBillItem>,
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Message-only acknowledgement, e.g. `{"message": "Transaction Created
/// Successfully"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}
