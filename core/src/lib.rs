//! Typed client for the ledger accounting backend's REST API.
//!
//! # Overview
//! Three layers, leaf to root:
//! - `token`: durable storage for the session's bearer token.
//! - `client`: the request layer — header policy, body decoding, and the
//!   HTTP/network/parse failure taxonomy, over a pluggable `Transport`.
//! - `accounts` / `transactions` / `bills`: per-resource endpoint maps that
//!   bind verb + path + payload to the request layer.
//!
//! # Design
//! - Collaborators are injected: `ApiClient` takes a `Transport` and a
//!   `TokenStore`, so tests script exchanges in memory and hosts choose
//!   where the token lives.
//! - Every failure is a value: `Result<_, ApiError>` with the HTTP, network,
//!   and parse channels as distinct variants.
//! - Every call is a fresh round trip; there is no caching, retry, or
//!   request de-duplication anywhere in the crate.

pub mod accounts;
pub mod bills;
pub mod client;
pub mod error;
pub mod http;
pub mod token;
pub mod transactions;
pub mod transport;
pub mod types;

pub use accounts::AccountsApi;
pub use bills::BillsApi;
pub use client::{ApiClient, ApiResult, RequestOptions, BASE_URL_ENV};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transactions::TransactionsApi;
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    ApiMessage, Bill, BillItem, Credentials, DeleteUser, LoginSession, NewBill, NewBillItem,
    NewTransaction, NewUser, PasswordChange, PaymentMethod, ProfileUpdate, SummaryRange,
    Transaction, TransactionPatch, TransactionSummary, TransactionUser, UserProfile,
};
