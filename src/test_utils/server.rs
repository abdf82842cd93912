//! A stand-in for the transaction server, served over real HTTP.
//!
//! Rows are stored as text the way the production server's spreadsheet does:
//! the list endpoint converts numbers, the single-record endpoint returns
//! the raw strings.

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{
    config::ClientConfig, endpoints, http_store::HttpTransactionStore,
    transaction::TransactionId,
};

const MOCK_DATE: &str = "2024-05-01 10:00:00";

#[derive(Debug, Clone)]
struct Row {
    id: String,
    kind: String,
    detail: String,
    price: String,
    qty: String,
    total_price: String,
}

#[derive(Clone, Default)]
struct MockState {
    rows: Arc<Mutex<Vec<Row>>>,
    next_id: Arc<AtomicUsize>,
    list_requests: Arc<AtomicUsize>,
}

pub(crate) struct MockServer {
    address: SocketAddr,
    state: MockState,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub(crate) async fn start() -> Self {
        let state = MockState::default();

        let router = Router::new()
            .route(
                endpoints::TRANSACTIONS,
                get(list_transactions).post(create_transaction),
            )
            .route(
                endpoints::TRANSACTION,
                get(get_transaction)
                    .put(update_transaction)
                    .delete(delete_transaction),
            )
            .route(endpoints::EXPORT, get(export_transactions))
            .route(endpoints::HEALTH, get(health))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind mock server");
        let address = listener.local_addr().expect("Could not get mock server address");
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    shutdown_signal.await.ok();
                })
                .await
                .expect("Mock server failed");
        });

        Self {
            address,
            state,
            shutdown,
            handle,
        }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.address)
    }

    pub(crate) fn store(&self) -> HttpTransactionStore {
        HttpTransactionStore::new(ClientConfig::new(&self.url()).expect("Invalid mock server URL"))
    }

    /// The IDs of the stored transactions, oldest first.
    pub(crate) fn ids(&self) -> Vec<TransactionId> {
        self.state
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| TransactionId::new(row.id.clone()))
            .collect()
    }

    pub(crate) fn list_requests(&self) -> usize {
        self.state.list_requests.load(Ordering::SeqCst)
    }

    pub(crate) async fn shut_down(self) {
        self.shutdown.send(()).ok();
        self.handle.await.expect("Mock server task panicked");
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

fn text_field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn number(text: &str) -> f64 {
    text.parse().unwrap_or(0.0)
}

async fn list_transactions(State(state): State<MockState>) -> Json<Value> {
    state.list_requests.fetch_add(1, Ordering::SeqCst);
    let rows = state.rows.lock().unwrap().clone();

    let mut total_balance = 0.0;
    let mut transactions = Vec::new();

    for row in rows.iter().rev() {
        let total_price = number(&row.total_price);
        if row.kind == "income" {
            total_balance += total_price;
        } else {
            total_balance -= total_price;
        }

        transactions.push(json!({
            "id": row.id,
            "date": MOCK_DATE,
            "type": row.kind,
            "detail": row.detail,
            "price": number(&row.price),
            "qty": number(&row.qty),
            "total_price": total_price,
        }));
    }

    Json(json!({
        "transactions": transactions,
        "total_balance": total_balance,
    }))
}

async fn create_transaction(
    State(state): State<MockState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;

    state.rows.lock().unwrap().push(Row {
        id: format!("tx-{id}"),
        kind: text_field(&body, "type"),
        detail: text_field(&body, "detail"),
        price: text_field(&body, "price"),
        qty: text_field(&body, "qty"),
        total_price: text_field(&body, "total_price"),
    });

    (StatusCode::CREATED, Json(json!({ "status": "success" })))
}

async fn get_transaction(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let rows = state.rows.lock().unwrap();

    match rows.iter().find(|row| row.id == id) {
        Some(row) => Json(json!({
            "id": row.id,
            "date": MOCK_DATE,
            "type": row.kind,
            "detail": row.detail,
            "price": row.price,
            "qty": row.qty,
            "total_price": row.total_price,
        }))
        .into_response(),
        None => not_found(),
    }
}

async fn update_transaction(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut rows = state.rows.lock().unwrap();

    match rows.iter_mut().find(|row| row.id == id) {
        Some(row) => {
            row.kind = text_field(&body, "type");
            row.detail = text_field(&body, "detail");
            row.price = text_field(&body, "price");
            row.qty = text_field(&body, "qty");
            row.total_price = text_field(&body, "total_price");

            Json(json!({ "status": "updated" })).into_response()
        }
        None => not_found(),
    }
}

async fn delete_transaction(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let mut rows = state.rows.lock().unwrap();

    match rows.iter().position(|row| row.id == id) {
        Some(index) => {
            rows.remove(index);
            Json(json!({ "status": "deleted" })).into_response()
        }
        None => not_found(),
    }
}

async fn export_transactions() -> impl IntoResponse {
    (
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=transactions_20240501_100000.xlsx",
        )],
        b"spreadsheet".to_vec(),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": MOCK_DATE }))
}
