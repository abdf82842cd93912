//! fintrack is a client for a single-page income/outcome ledger.
//!
//! The server owns the list of transactions and the running balance. This
//! library keeps one edit session consistent with that list: every mutation
//! is sent to the server and followed by a full reload, and the reloaded list
//! is projected into display rows for a view to render.
//!
//! The main pieces are:
//! - [SessionController], which owns the edit slot and runs the
//!   create/update/delete/cancel protocol,
//! - [project], which turns a server snapshot into a [RenderModel],
//! - [TransactionStore], the seam to the REST server, with
//!   [HttpTransactionStore] as the production implementation,
//! - [LedgerView], the seam to whatever displays the ledger.

#![warn(missing_docs)]

mod config;
mod currency;
mod date;
pub mod endpoints;
mod export;
mod form;
pub mod html;
mod http_store;
mod logging;
mod projector;
mod session;
mod store;
pub mod terminal;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use config::{ClientConfig, DEFAULT_SERVER_URL};
pub use currency::format_rupiah;
pub use date::{format_transaction_date, parse_timestamp};
pub use export::{default_export_file_name, save_export, write_csv_snapshot};
pub use form::{FormMode, FormValues, Total, calculate_total, coerce_number};
pub use http_store::HttpTransactionStore;
pub use logging::{LOG_BODY_LENGTH_LIMIT, setup_logging};
pub use projector::{
    AmountClass, BalanceClass, BalanceLine, EMPTY_LIST_MESSAGE, ListProjection, RenderModel,
    RowAction, TransactionRow, project,
};
pub use session::{
    DELETE_CONFIRMATION_PROMPT, Deletion, EditSession, LOAD_FAILED_MESSAGE, LedgerView, Notice,
    SessionController,
};
pub use store::{ExportFile, HealthStatus, LedgerSnapshot, TransactionStore};
pub use transaction::{Transaction, TransactionDraft, TransactionId, TransactionType};

/// The errors that may occur while talking to the transaction server or
/// preparing data for display.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request never produced a response, e.g. the server is down or the
    /// connection was reset.
    #[error("could not reach the transaction server: {0}")]
    Network(String),

    /// The server answered with a status outside of the 2xx range.
    ///
    /// `message` is the `error` field of the JSON body when the server sent
    /// one, otherwise the raw body text.
    #[error("the server responded with status {status}: {message}")]
    NonOkResponse {
        /// The HTTP status code.
        status: u16,
        /// The error message extracted from the response body.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("could not parse the server response: {0}")]
    InvalidResponse(String),

    /// A transaction date could not be parsed as a timestamp.
    ///
    /// The projector recovers from this error by falling back to the raw
    /// date text, so it never reaches the view.
    #[error("could not parse \"{0}\" as a timestamp")]
    InvalidDate(String),

    /// The configured server URL is not a valid base URL.
    ///
    /// Holds the offending URL and the reason it was rejected.
    #[error("invalid server URL \"{0}\": {1}")]
    InvalidBaseUrl(String, String),

    /// Writing an exported file or a snapshot to disk failed.
    #[error("could not write file: {0}")]
    Io(String),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Error::InvalidResponse(value.to_string())
        } else {
            Error::Network(value.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Io(value.to_string())
    }
}
