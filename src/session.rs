//! The edit session and the controller that keeps it in step with the server.
//!
//! The controller never patches the displayed list itself. After every
//! successful mutation it asks the server for the whole list again and
//! renders that, so the view always shows what the server has.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{
    Error,
    form::{FormMode, FormValues, Total},
    projector::{RenderModel, RowAction, project},
    store::{ExportFile, TransactionStore},
    transaction::TransactionId,
};

/// The message shown in place of the list when it cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load transactions.";

/// The question asked before deleting a transaction.
pub const DELETE_CONFIRMATION_PROMPT: &str = "Are you sure you want to delete this transaction?";

/// A short-lived message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A new transaction was saved.
    Created,
    /// The transaction under edit was saved.
    Updated,
    /// An export has been requested.
    Exporting,
    /// The export could not be downloaded.
    ExportFailed,
}

impl Notice {
    /// The text shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Created => "Transaksi telah ditambahkan",
            Notice::Updated => "Transaksi telah diperbarui",
            Notice::Exporting => "Sedang mengekspor data...",
            Notice::ExportFailed => "Gagal mengekspor data",
        }
    }
}

/// Displays the ledger and the transaction form.
///
/// Implementations only display what they are told to; all decisions about
/// when to render are made by the [SessionController].
#[async_trait]
pub trait LedgerView: Send + Sync {
    /// Replace the displayed list and balance.
    fn render(&self, model: &RenderModel);

    /// Replace the displayed list with an error message.
    fn render_load_error(&self, message: &str);

    /// Put `values` into the form inputs and show `total`.
    fn fill_form(&self, values: &FormValues, total: &Total);

    /// Reset the form inputs to their defaults.
    fn clear_form(&self);

    /// Switch the form between create and update labelling.
    fn set_mode(&self, mode: FormMode);

    /// Show a short-lived message.
    fn notify(&self, notice: Notice);

    /// Ask the user a yes/no question.
    async fn confirm(&self, prompt: &str) -> bool;
}

/// The client-side marker of which transaction, if any, is being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    editing_id: Option<TransactionId>,
}

impl EditSession {
    /// The transaction being edited, if any.
    pub fn editing_id(&self) -> Option<&TransactionId> {
        self.editing_id.as_ref()
    }

    /// The form mode implied by the session.
    pub fn mode(&self) -> FormMode {
        match self.editing_id {
            Some(_) => FormMode::Update,
            None => FormMode::Create,
        }
    }

    fn begin(&mut self, id: TransactionId) {
        self.editing_id = Some(id);
    }

    fn end(&mut self) {
        self.editing_id = None;
    }
}

/// The outcome of [SessionController::delete_entry].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// The user confirmed and the server deleted the transaction.
    Deleted,
    /// The user declined, nothing was sent.
    Declined,
}

/// Runs the create/update/delete/cancel protocol for a single edit session.
///
/// Methods take `&self` so that actions may interleave while their requests
/// are in flight. The edit session is only locked for synchronous steps and
/// never across a request, and there is no cancellation: an edit fetch that
/// resolves after [SessionController::cancel_edit] still fills the form.
pub struct SessionController<S, V> {
    store: S,
    view: V,
    session: Mutex<EditSession>,
}

impl<S, V> SessionController<S, V>
where
    S: TransactionStore,
    V: LedgerView,
{
    /// Create a controller with no transaction under edit.
    pub fn new(store: S, view: V) -> Self {
        Self {
            store,
            view,
            session: Mutex::new(EditSession::default()),
        }
    }

    /// The store the controller sends requests to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The view the controller drives.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The transaction being edited, if any.
    pub fn editing_id(&self) -> Option<TransactionId> {
        self.session().editing_id().cloned()
    }

    /// Whether submitting creates or updates.
    pub fn mode(&self) -> FormMode {
        self.session().mode()
    }

    fn session(&self) -> MutexGuard<'_, EditSession> {
        // The session is a plain value that is never left half-updated.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the transaction `id` into the form and start editing it.
    ///
    /// # Errors
    /// Returns the store error if the transaction could not be fetched. The
    /// edit session and the form are left untouched in that case.
    pub async fn begin_edit(&self, id: &TransactionId) -> Result<(), Error> {
        tracing::debug!("Fetching transaction {id} for editing");

        let transaction = self.store.get(id).await.inspect_err(|error| {
            tracing::error!("Error fetching transaction {id} for edit: {error}");
        })?;

        let values = FormValues::from_transaction(&transaction);
        self.view.fill_form(&values, &values.total());
        self.session().begin(id.clone());
        self.view.set_mode(FormMode::Update);

        Ok(())
    }

    /// Save the form: update the transaction under edit, or create a new one.
    ///
    /// On success the form is cleared, the session ends and the list is
    /// reloaded once.
    ///
    /// # Errors
    /// Returns the store error if the server rejected the request. Nothing is
    /// changed on the client in that case.
    pub async fn submit(&self, values: &FormValues) -> Result<(), Error> {
        let draft = values.to_draft();
        let editing_id = self.session().editing_id().cloned();

        let (result, notice) = match &editing_id {
            Some(id) => (self.store.update(id, &draft).await, Notice::Updated),
            None => (self.store.create(&draft).await, Notice::Created),
        };

        if let Err(error) = result {
            match &editing_id {
                Some(id) => tracing::error!("Error updating transaction {id}: {error}"),
                None => tracing::error!("Error creating transaction: {error}"),
            }

            return Err(error);
        }

        match &editing_id {
            Some(id) => tracing::info!("Updated transaction {id}"),
            None => tracing::info!("Created transaction"),
        }

        self.view.notify(notice);
        self.reset_form();
        self.reload_after_mutation().await;

        Ok(())
    }

    /// Stop editing and reset the form, whether or not an edit was active.
    pub fn cancel_edit(&self) {
        self.reset_form();
    }

    /// Delete the transaction `id` once the user confirms.
    ///
    /// The edit session is left alone, even when `id` is the transaction
    /// being edited.
    ///
    /// # Errors
    /// Returns the store error if the server rejected the request.
    pub async fn delete_entry(&self, id: &TransactionId) -> Result<Deletion, Error> {
        if !self.view.confirm(DELETE_CONFIRMATION_PROMPT).await {
            tracing::debug!("Deletion of transaction {id} declined");
            return Ok(Deletion::Declined);
        }

        self.store.delete(id).await.inspect_err(|error| {
            tracing::error!("Error deleting transaction {id}: {error}");
        })?;

        tracing::info!("Deleted transaction {id}");
        self.reload_after_mutation().await;

        Ok(Deletion::Deleted)
    }

    /// Fetch the list and balance and render them.
    ///
    /// # Errors
    /// Returns the store error if the list could not be fetched, after the
    /// view has been told to show [LOAD_FAILED_MESSAGE].
    pub async fn request_reload(&self) -> Result<(), Error> {
        match self.store.list().await {
            Ok(snapshot) => {
                let model = project(snapshot.transactions.as_deref(), snapshot.total_balance);
                self.view.render(&model);
                Ok(())
            }
            Err(error) => {
                tracing::error!("Error loading transactions: {error}");
                self.view.render_load_error(LOAD_FAILED_MESSAGE);
                Err(error)
            }
        }
    }

    /// Run the action attached to a transaction row.
    ///
    /// # Errors
    /// Returns the error of the underlying [Self::begin_edit] or
    /// [Self::delete_entry].
    pub async fn dispatch(&self, action: &RowAction) -> Result<(), Error> {
        match action {
            RowAction::Edit(id) => self.begin_edit(id).await,
            RowAction::Delete(id) => self.delete_entry(id).await.map(|_| ()),
        }
    }

    /// Download the server's spreadsheet export.
    ///
    /// # Errors
    /// Returns the store error if the download failed, after the view has
    /// shown [Notice::ExportFailed].
    pub async fn export(&self) -> Result<ExportFile, Error> {
        self.view.notify(Notice::Exporting);

        self.store.export().await.inspect_err(|error| {
            tracing::error!("Export error: {error}");
            self.view.notify(Notice::ExportFailed);
        })
    }

    fn reset_form(&self) {
        self.view.clear_form();
        self.session().end();
        self.view.set_mode(FormMode::Create);
    }

    async fn reload_after_mutation(&self) {
        // Failures are already logged and shown by `request_reload`.
        let _ = self.request_reload().await;
    }
}
