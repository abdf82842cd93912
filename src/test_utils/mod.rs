#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod server;

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{
    Error,
    form::{FormMode, FormValues, Total},
    projector::RenderModel,
    session::{LedgerView, Notice},
    store::{ExportFile, HealthStatus, LedgerSnapshot, TransactionStore},
    transaction::{Transaction, TransactionDraft, TransactionId, TransactionType},
};

pub(crate) use html::{
    assert_valid_html, must_select, must_select_one, parse_html_document, parse_html_fragment,
};
pub(crate) use server::MockServer;

pub(crate) fn sample_transaction(id: &str, kind: TransactionType, total_price: f64) -> Transaction {
    Transaction {
        id: TransactionId::new(id),
        date: Some("2024-05-01 10:00:00".to_owned()),
        kind: Some(kind.as_str().to_owned()),
        detail: Some(format!("Detail {id}")),
        price: total_price,
        qty: 1.0,
        total_price,
    }
}

pub(crate) fn sample_draft(
    detail: &str,
    kind: TransactionType,
    price: f64,
    qty: f64,
) -> TransactionDraft {
    TransactionDraft {
        kind,
        detail: detail.to_owned(),
        price,
        qty,
        total_price: price * qty,
    }
}

fn server_error() -> Error {
    Error::NonOkResponse {
        status: 500,
        message: "Could not connect".to_owned(),
    }
}

/// A request received by [FakeStore].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StoreCall {
    List,
    Get(TransactionId),
    Create(TransactionDraft),
    Update(TransactionId, TransactionDraft),
    Delete(TransactionId),
    Export,
    Health,
}

/// An in-memory [TransactionStore] that records every call.
#[derive(Default)]
pub(crate) struct FakeStore {
    transactions: Mutex<Vec<Transaction>>,
    calls: Mutex<Vec<StoreCall>>,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
    fail_list: AtomicBool,
    fail_mutations: AtomicBool,
    fail_export: AtomicBool,
    get_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeStore {
    pub(crate) fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Mutex::new(transactions),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_export(&self, fail: bool) {
        self.fail_export.store(fail, Ordering::SeqCst);
    }

    /// Hold every `get` until `gate` is notified.
    pub(crate) fn gate_get(&self, gate: Arc<Notify>) {
        *self.get_gate.lock().unwrap() = Some(gate);
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_mutation(&self) -> Result<(), Error> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(server_error())
        } else {
            Ok(())
        }
    }

    fn not_found() -> Error {
        Error::NonOkResponse {
            status: 404,
            message: "Not found".to_owned(),
        }
    }
}

#[async_trait]
impl TransactionStore for FakeStore {
    async fn list(&self) -> Result<LedgerSnapshot, Error> {
        self.record(StoreCall::List);
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(server_error());
        }

        let transactions = self.transactions.lock().unwrap().clone();
        let total_balance = transactions
            .iter()
            .map(|transaction| match transaction.transaction_type() {
                Some(TransactionType::Income) => transaction.total_price,
                _ => -transaction.total_price,
            })
            .sum();

        Ok(LedgerSnapshot {
            transactions: Some(transactions),
            total_balance,
        })
    }

    async fn get(&self, id: &TransactionId) -> Result<Transaction, Error> {
        self.record(StoreCall::Get(id.clone()));

        let gate = self.get_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|transaction| &transaction.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create(&self, draft: &TransactionDraft) -> Result<(), Error> {
        self.record(StoreCall::Create(draft.clone()));
        self.check_mutation()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.transactions.lock().unwrap().insert(
            0,
            Transaction {
                id: TransactionId::new(format!("new-{id}")),
                date: Some("2024-05-01 10:00:00".to_owned()),
                kind: Some(draft.kind.as_str().to_owned()),
                detail: Some(draft.detail.clone()),
                price: draft.price,
                qty: draft.qty,
                total_price: draft.total_price,
            },
        );

        Ok(())
    }

    async fn update(&self, id: &TransactionId, draft: &TransactionDraft) -> Result<(), Error> {
        self.record(StoreCall::Update(id.clone(), draft.clone()));
        self.check_mutation()?;

        let mut transactions = self.transactions.lock().unwrap();
        let transaction = transactions
            .iter_mut()
            .find(|transaction| &transaction.id == id)
            .ok_or_else(Self::not_found)?;

        transaction.kind = Some(draft.kind.as_str().to_owned());
        transaction.detail = Some(draft.detail.clone());
        transaction.price = draft.price;
        transaction.qty = draft.qty;
        transaction.total_price = draft.total_price;

        Ok(())
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), Error> {
        self.record(StoreCall::Delete(id.clone()));
        self.check_mutation()?;

        let mut transactions = self.transactions.lock().unwrap();
        let count_before = transactions.len();
        transactions.retain(|transaction| &transaction.id != id);

        if transactions.len() == count_before {
            Err(Self::not_found())
        } else {
            Ok(())
        }
    }

    async fn export(&self) -> Result<ExportFile, Error> {
        self.record(StoreCall::Export);

        if self.fail_export.load(Ordering::SeqCst) {
            return Err(server_error());
        }

        Ok(ExportFile {
            file_name: "transactions.xlsx".to_owned(),
            bytes: b"spreadsheet".to_vec(),
        })
    }

    async fn health(&self) -> Result<HealthStatus, Error> {
        self.record(StoreCall::Health);

        Ok(HealthStatus {
            status: "healthy".to_owned(),
            timestamp: None,
        })
    }
}

/// Something a [RecordingView] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewEvent {
    Rendered(RenderModel),
    LoadFailed(String),
    FormFilled(FormValues, Total),
    FormCleared,
    ModeSet(FormMode),
    Notified(Notice),
    Confirmed(String),
}

/// A [LedgerView] that records what it was asked to display.
///
/// Confirmations are answered with yes unless told otherwise.
pub(crate) struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
    confirm_answer: AtomicBool,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
        }
    }
}

impl RecordingView {
    pub(crate) fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn answer_confirmations(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    fn record(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl LedgerView for RecordingView {
    fn render(&self, model: &RenderModel) {
        self.record(ViewEvent::Rendered(model.clone()));
    }

    fn render_load_error(&self, message: &str) {
        self.record(ViewEvent::LoadFailed(message.to_owned()));
    }

    fn fill_form(&self, values: &FormValues, total: &Total) {
        self.record(ViewEvent::FormFilled(values.clone(), total.clone()));
    }

    fn clear_form(&self) {
        self.record(ViewEvent::FormCleared);
    }

    fn set_mode(&self, mode: FormMode) {
        self.record(ViewEvent::ModeSet(mode));
    }

    fn notify(&self, notice: Notice) {
        self.record(ViewEvent::Notified(notice));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.record(ViewEvent::Confirmed(prompt.to_owned()));
        self.confirm_answer.load(Ordering::SeqCst)
    }
}
