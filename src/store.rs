//! The seam between the session controller and the transaction server.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    Error,
    transaction::{Transaction, TransactionDraft, TransactionId, lenient_number},
};

/// The authoritative list of transactions together with the balance the
/// server computed for it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LedgerSnapshot {
    /// The transactions in the order the server wants them shown, `None` if
    /// the server left the field out.
    #[serde(default)]
    pub transactions: Option<Vec<Transaction>>,
    /// Income minus outcome over every transaction.
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_balance: f64,
}

/// A file produced by the server's export endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// The file name suggested by the server.
    pub file_name: String,
    /// The file contents, in a format the client does not inspect.
    pub bytes: Vec<u8>,
}

/// The server's answer to a health check.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    /// "healthy" when the server is up.
    pub status: String,
    /// The server's local time when it answered.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Handles the remote operations on transactions.
///
/// Every call is attempted exactly once. Implementations should not retry or
/// add timeouts of their own.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Fetch every transaction and the balance.
    async fn list(&self) -> Result<LedgerSnapshot, Error>;

    /// Fetch a single transaction.
    async fn get(&self, id: &TransactionId) -> Result<Transaction, Error>;

    /// Create a new transaction. The server assigns the ID and date.
    async fn create(&self, draft: &TransactionDraft) -> Result<(), Error>;

    /// Overwrite the fields of the transaction `id`, keeping its ID and date.
    async fn update(&self, id: &TransactionId, draft: &TransactionDraft) -> Result<(), Error>;

    /// Delete the transaction `id`.
    async fn delete(&self, id: &TransactionId) -> Result<(), Error>;

    /// Download a spreadsheet of every transaction.
    async fn export(&self) -> Result<ExportFile, Error>;

    /// Check that the server is up.
    async fn health(&self) -> Result<HealthStatus, Error>;
}
