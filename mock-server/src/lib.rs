//! In-memory implementation of the ledger backend API, used by the core
//! crate's integration tests and runnable standalone for manual poking.
//!
//! Faithful to the real backend where the client can observe it: bearer-token
//! auth on everything but login, message-only acknowledgements for
//! transaction mutations, 204 deletes, server-computed bill totals, and
//! `application/pdf` for the rendered bill.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Credentials of the seeded admin account.
pub const SEED_EMAIL: &str = "admin@example.com";
pub const SEED_PASSWORD: &str = "admin123";

const SEED_TIMESTAMP: &str = "2025-01-01T00:00:00Z";

#[derive(Clone, Serialize)]
pub struct User {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: String,
    #[serde(skip)]
    password: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Serialize)]
struct TransactionUser {
    email: String,
    username: String,
    full_name: String,
    phone_number: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct Transaction {
    pub id: u64,
    user: TransactionUser,
    pub received_from: String,
    pub amount: String,
    pub note: Option<String>,
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Clone, Serialize)]
struct BillItem {
    description: String,
    quantity: String,
    unit_price: String,
    total: String,
    unit: Option<String>,
    notes: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct Bill {
    pub id: u64,
    pub bill_number: String,
    pub billed_to: String,
    customer_address: Option<String>,
    customer_phone: Option<String>,
    customer_email: Option<String>,
    pub subtotal: String,
    pub tax_percentage: String,
    pub tax_amount: String,
    pub discount_percentage: String,
    pub discount_amount: String,
    pub total_amount: String,
    payment_method: Option<String>,
    payment_details: Option<String>,
    note: Option<String>,
    items: Vec<BillItem>,
    issued_by: Option<String>,
    issued_at: String,
}

#[derive(Default)]
pub struct Inner {
    users: Vec<User>,
    sessions: HashMap<String, String>, // token -> email
    transactions: HashMap<u64, Transaction>,
    bills: HashMap<u64, Bill>,
    next_id: u64,
    next_token: u64,
}

impl Inner {
    fn seeded() -> Self {
        Self {
            users: vec![User {
                email: SEED_EMAIL.to_string(),
                username: "admin".to_string(),
                full_name: "Admin User".to_string(),
                phone_number: None,
                role: "admin".to_string(),
                password: SEED_PASSWORD.to_string(),
                created_at: SEED_TIMESTAMP.to_string(),
                updated_at: SEED_TIMESTAMP.to_string(),
            }],
            ..Self::default()
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Inner>>;

type Failure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Inner::seeded()));
    Router::new()
        .route("/api/accounts/login/", post(login))
        .route("/api/accounts/register/", post(register))
        .route("/api/accounts/profile/", get(profile))
        .route("/api/accounts/update-profile/", put(update_profile))
        .route("/api/accounts/change-password/", post(change_password))
        .route("/api/accounts/delete-user/", delete(delete_user))
        .route("/api/accounts/user/", get(list_users))
        .route("/api/transactions/", get(list_transactions))
        .route("/api/transactions/create/", post(create_transaction))
        .route("/api/transactions/details/{id}/", get(transaction_detail))
        .route("/api/transactions/update/{id}/", put(update_transaction))
        .route("/api/transactions/delete/{id}/", delete(delete_transaction))
        .route("/api/transactions/summary/", get(transaction_summary))
        .route("/api/bills/", get(list_bills).post(create_bill))
        .route("/api/bills/{id}/", get(bill_detail).delete(delete_bill))
        .route("/api/bills/{id}/update/", put(update_bill))
        .route("/api/bills/{id}/pdf/", get(bill_pdf))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "error": message })))
}

fn unauthorized() -> Failure {
    failure(
        StatusCode::UNAUTHORIZED,
        "Authentication credentials were not provided.",
    )
}

/// Resolve the bearer token to the session's user email, or 401.
async fn authed_email(db: &Db, headers: &HeaderMap) -> Result<String, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?
        .to_string();
    let state = db.read().await;
    state.sessions.get(&token).cloned().ok_or_else(unauthorized)
}

fn money(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn fmt_money(value: f64) -> String {
    format!("{value:.2}")
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(
    State(db): State<Db>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, Failure> {
    let mut state = db.write().await;
    let user = state
        .users
        .iter()
        .find(|u| u.email == payload.email && u.password == payload.password)
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    state.next_token += 1;
    let token = format!("session-{:06}", state.next_token);
    state.sessions.insert(token.clone(), user.email.clone());

    Ok(Json(json!({
        "token": token,
        "email": user.email,
        "full_name": user.full_name,
        "role": user.role,
    })))
}

#[derive(Deserialize)]
struct RegisterPayload {
    email: String,
    username: String,
    full_name: String,
    #[serde(default)]
    phone_number: Option<String>,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

async fn register(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    if state.users.iter().any(|u| u.email == payload.email) {
        return Err(failure(StatusCode::BAD_REQUEST, "User Registration Failed"));
    }
    state.users.push(User {
        email: payload.email,
        username: payload.username,
        full_name: payload.full_name,
        phone_number: payload.phone_number,
        role: payload.role.unwrap_or_else(|| "cashier".to_string()),
        password: payload.password,
        created_at: SEED_TIMESTAMP.to_string(),
        updated_at: SEED_TIMESTAMP.to_string(),
    });
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

async fn profile(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    let email = authed_email(&db, &headers).await?;
    let state = db.read().await;
    state
        .users
        .iter()
        .find(|u| u.email == email)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))
}

#[derive(Deserialize)]
struct ProfilePayload {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<User>, Failure> {
    let email = authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    let user = state
        .users
        .iter_mut()
        .find(|u| u.email == email)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    if let Some(full_name) = payload.full_name {
        user.full_name = full_name;
    }
    if let Some(phone_number) = payload.phone_number {
        user.phone_number = Some(phone_number);
    }
    Ok(Json(user.clone()))
}

#[derive(Deserialize)]
struct PasswordPayload {
    old_password: String,
    new_password: String,
    confirm_password: String,
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<PasswordPayload>,
) -> Result<Json<Value>, Failure> {
    let email = authed_email(&db, &headers).await?;
    if payload.new_password != payload.confirm_password {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "New password and confirm password do not match.",
        ));
    }
    let mut state = db.write().await;
    let user = state
        .users
        .iter_mut()
        .find(|u| u.email == email)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    if user.password != payload.old_password {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Old password is incorrect.",
        ));
    }
    user.password = payload.new_password;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

#[derive(Deserialize)]
struct DeleteUserPayload {
    email: String,
}

async fn delete_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<DeleteUserPayload>,
) -> Result<Json<Value>, Failure> {
    authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    let index = state
        .users
        .iter()
        .position(|u| u.email == payload.email)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    state.users.remove(index);
    state.sessions.retain(|_, email| email != &payload.email);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

async fn list_users(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<User>>, Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;
    Ok(Json(state.users.clone()))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NewTransactionPayload {
    received_from: String,
    amount: String,
    #[serde(default)]
    note: Option<String>,
    date: String,
}

async fn create_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<NewTransactionPayload>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let email = authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    let user = state
        .users
        .iter()
        .find(|u| u.email == email)
        .cloned()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    let id = state.next_id();
    state.transactions.insert(
        id,
        Transaction {
            id,
            user: TransactionUser {
                email: user.email,
                username: user.username,
                full_name: user.full_name,
                phone_number: user.phone_number,
            },
            received_from: payload.received_from,
            amount: fmt_money(money(&payload.amount)),
            note: payload.note,
            date: payload.date,
            created_at: SEED_TIMESTAMP.to_string(),
            updated_at: SEED_TIMESTAMP.to_string(),
        },
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Transaction Created Successfully" })),
    ))
}

async fn list_transactions(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Transaction>>, Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;
    let mut transactions: Vec<Transaction> = state.transactions.values().cloned().collect();
    // Backend ordering: newest date first, ties broken by insertion order.
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    Ok(Json(transactions))
}

async fn transaction_detail(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Transaction>, Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;
    state
        .transactions
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Transaction not found"))
}

#[derive(Deserialize)]
struct TransactionPatchPayload {
    #[serde(default)]
    received_from: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

async fn update_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<TransactionPatchPayload>,
) -> Result<Json<Value>, Failure> {
    authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    let transaction = state
        .transactions
        .get_mut(&id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Transaction not found"))?;
    if let Some(received_from) = payload.received_from {
        transaction.received_from = received_from;
    }
    if let Some(amount) = payload.amount {
        transaction.amount = fmt_money(money(&amount));
    }
    if let Some(note) = payload.note {
        transaction.note = Some(note);
    }
    if let Some(date) = payload.date {
        transaction.date = date;
    }
    Ok(Json(json!({ "message": "Transaction Updated Successfully" })))
}

async fn delete_transaction(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    state
        .transactions
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Transaction not found"))
}

#[derive(Deserialize)]
struct SummaryQuery {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

async fn transaction_summary(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>, Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;

    let ranged = query.start_date.is_some() || query.end_date.is_some();
    let in_range = |t: &&Transaction| {
        // ISO dates compare correctly as strings.
        let after_start = query.start_date.as_deref().is_none_or(|s| t.date.as_str() >= s);
        let before_end = query.end_date.as_deref().is_none_or(|e| t.date.as_str() <= e);
        after_start && before_end
    };
    let selected: Vec<&Transaction> = state.transactions.values().filter(in_range).collect();

    if selected.is_empty() && ranged {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No transactions found for the given date range." })),
        ));
    }

    let total_income: f64 = selected
        .iter()
        .map(|t| money(&t.amount))
        .filter(|amount| *amount > 0.0)
        .sum();
    let total_expense: f64 = selected
        .iter()
        .map(|t| money(&t.amount))
        .filter(|amount| *amount < 0.0)
        .sum();

    Ok(Json(json!({
        "total_income": fmt_money(total_income),
        "total_expense": fmt_money(total_expense),
        "balance": fmt_money(total_income + total_expense),
        "transaction_count": selected.len(),
    })))
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NewBillItemPayload {
    description: String,
    quantity: String,
    unit_price: String,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct NewBillPayload {
    bill_number: String,
    billed_to: String,
    #[serde(default)]
    customer_address: Option<String>,
    #[serde(default)]
    customer_phone: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    tax_percentage: String,
    discount_percentage: String,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default)]
    payment_details: Option<String>,
    #[serde(default)]
    note: Option<String>,
    items: Vec<NewBillItemPayload>,
}

/// Build a stored bill from a payload: item totals, subtotal, discount,
/// tax on the discounted amount, grand total.
fn assemble_bill(id: u64, issued_by: String, payload: NewBillPayload) -> Bill {
    let items: Vec<BillItem> = payload
        .items
        .into_iter()
        .map(|item| {
            let total = money(&item.quantity) * money(&item.unit_price);
            BillItem {
                description: item.description,
                quantity: fmt_money(money(&item.quantity)),
                unit_price: fmt_money(money(&item.unit_price)),
                total: fmt_money(total),
                unit: item.unit,
                notes: item.notes,
            }
        })
        .collect();

    let subtotal: f64 = items.iter().map(|item| money(&item.total)).sum();
    let discount_percentage = money(&payload.discount_percentage);
    let tax_percentage = money(&payload.tax_percentage);
    let discount_amount = subtotal * discount_percentage / 100.0;
    let tax_amount = (subtotal - discount_amount) * tax_percentage / 100.0;
    let total_amount = subtotal - discount_amount + tax_amount;

    Bill {
        id,
        bill_number: payload.bill_number,
        billed_to: payload.billed_to,
        customer_address: payload.customer_address,
        customer_phone: payload.customer_phone,
        customer_email: payload.customer_email,
        subtotal: fmt_money(subtotal),
        tax_percentage: fmt_money(tax_percentage),
        tax_amount: fmt_money(tax_amount),
        discount_percentage: fmt_money(discount_percentage),
        discount_amount: fmt_money(discount_amount),
        total_amount: fmt_money(total_amount),
        payment_method: payload.payment_method,
        payment_details: payload.payment_details,
        note: payload.note,
        items,
        issued_by: Some(issued_by),
        issued_at: SEED_TIMESTAMP.to_string(),
    }
}

async fn create_bill(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(payload): Json<NewBillPayload>,
) -> Result<(StatusCode, Json<Bill>), Failure> {
    let email = authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    let id = state.next_id();
    let bill = assemble_bill(id, email, payload);
    state.bills.insert(id, bill.clone());
    Ok((StatusCode::CREATED, Json(bill)))
}

async fn list_bills(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<Bill>>, Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;
    let mut bills: Vec<Bill> = state.bills.values().cloned().collect();
    bills.sort_by(|a, b| b.id.cmp(&a.id));
    Ok(Json(bills))
}

async fn bill_detail(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Bill>, Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;
    state
        .bills
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Bill not found"))
}

async fn update_bill(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<NewBillPayload>,
) -> Result<Json<Bill>, Failure> {
    let email = authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    if !state.bills.contains_key(&id) {
        return Err(failure(StatusCode::NOT_FOUND, "Bill not found"));
    }
    let bill = assemble_bill(id, email, payload);
    state.bills.insert(id, bill.clone());
    Ok(Json(bill))
}

async fn delete_bill(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    authed_email(&db, &headers).await?;
    let mut state = db.write().await;
    state
        .bills
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Bill not found"))
}

async fn bill_pdf(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<([(header::HeaderName, &'static str); 1], String), Failure> {
    authed_email(&db, &headers).await?;
    let state = db.read().await;
    let bill = state
        .bills
        .get(&id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Bill not found"))?;

    let mut document = format!(
        "INVOICE {}\nBilled to: {}\n\n",
        bill.bill_number, bill.billed_to
    );
    for item in &bill.items {
        document.push_str(&format!(
            "{} x {} @ {} = {}\n",
            item.quantity, item.description, item.unit_price, item.total
        ));
    }
    document.push_str(&format!(
        "\nSubtotal: {}\nDiscount: {}\nTax: {}\nTotal: {}\n",
        bill.subtotal, bill.discount_amount, bill.tax_amount, bill.total_amount
    ));

    Ok(([(header::CONTENT_TYPE, "application/pdf")], document))
}
