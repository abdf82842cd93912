//! The interactive shell: a [LedgerView] that prints to a terminal, and the
//! command loop that drives a [SessionController] from typed commands.

use std::{
    fmt::Display,
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::{
    Error,
    export::save_export,
    form::{FormMode, FormValues, Total},
    projector::{EMPTY_LIST_MESSAGE, ListProjection, RenderModel, RowAction, TransactionRow},
    session::{LedgerView, Notice, SessionController},
    store::TransactionStore,
    transaction::{TransactionId, TransactionType},
};

const HELP: &str = "\
Commands:
  list                 reload and show the transactions
  type <income|outcome>
  detail <text>
  price <number>
  qty <number>         set a form field
  form                 show the form and its total
  submit               save the form
  edit <row|id>        load a transaction into the form
  cancel               stop editing and clear the form
  delete <row|id>      delete a transaction
  export [dir]         download the spreadsheet export
  help                 show this message
  quit";

/// A command typed into the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Reload and print the list.
    List,
    /// Select the transaction type.
    Type(TransactionType),
    /// Set the detail text.
    Detail(String),
    /// Set the price text.
    Price(String),
    /// Set the quantity text.
    Qty(String),
    /// Print the form.
    Form,
    /// Submit the form.
    Submit,
    /// Edit the transaction given by a row number or ID.
    Edit(String),
    /// Cancel the current edit.
    Cancel,
    /// Delete the transaction given by a row number or ID.
    Delete(String),
    /// Save the export into a directory, or the default one.
    Export(Option<PathBuf>),
    /// Print the command list.
    Help,
    /// Leave the shell.
    Quit,
    /// A blank line.
    Nothing,
}

impl Command {
    /// Parse a line of input.
    ///
    /// # Errors
    /// Returns a message for the user if the line is not a valid command.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, argument) = match line.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (line, ""),
        };

        let required = |usage: &str| {
            if argument.is_empty() {
                Err(format!("usage: {usage}"))
            } else {
                Ok(argument.to_owned())
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "" => Ok(Command::Nothing),
            "list" | "ls" => Ok(Command::List),
            "type" => TransactionType::parse(argument)
                .map(Command::Type)
                .ok_or_else(|| "usage: type <income|outcome>".to_owned()),
            // An empty detail is allowed, it clears the field.
            "detail" => Ok(Command::Detail(argument.to_owned())),
            "price" => required("price <number>").map(Command::Price),
            "qty" => required("qty <number>").map(Command::Qty),
            "form" => Ok(Command::Form),
            "submit" | "save" => Ok(Command::Submit),
            "edit" => required("edit <row|id>").map(Command::Edit),
            "cancel" => Ok(Command::Cancel),
            "delete" | "rm" => required("delete <row|id>").map(Command::Delete),
            "export" => Ok(Command::Export(
                (!argument.is_empty()).then(|| PathBuf::from(argument)),
            )),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command \"{other}\", type help for a list")),
        }
    }
}

type Input = Lines<Box<dyn AsyncBufRead + Send + Unpin>>;

#[derive(Debug, Default)]
struct FormState {
    values: FormValues,
    mode: FormMode,
}

/// A [LedgerView] that prints to a terminal and reads answers from it.
///
/// The view owns the form state, since the terminal has no input widgets to
/// keep it in, and remembers the rows it last printed so that commands can
/// refer to transactions by row number.
pub struct TerminalView {
    input: tokio::sync::Mutex<Input>,
    output: Mutex<Box<dyn Write + Send>>,
    form: Mutex<FormState>,
    rows: Mutex<Vec<TransactionRow>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TerminalView {
    /// A view that reads from `input` and prints to `output`.
    pub fn new(
        input: impl AsyncBufRead + Send + Unpin + 'static,
        output: impl Write + Send + 'static,
    ) -> Self {
        let input: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(input);

        Self {
            input: tokio::sync::Mutex::new(input.lines()),
            output: Mutex::new(Box::new(output)),
            form: Mutex::new(FormState::default()),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// A view on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
    }

    fn print(&self, text: impl Display) {
        let mut output = lock(&self.output);

        if let Err(error) = writeln!(output, "{text}").and_then(|_| output.flush()) {
            tracing::warn!("Could not write to the terminal: {error}");
        }
    }

    fn prompt(&self, text: &str) {
        let mut output = lock(&self.output);

        if let Err(error) = write!(output, "{text}").and_then(|_| output.flush()) {
            tracing::warn!("Could not write to the terminal: {error}");
        }
    }

    /// Read the next line of input, or `None` once the input is closed.
    pub async fn read_line(&self) -> Option<String> {
        match self.input.lock().await.next_line().await {
            Ok(line) => line,
            Err(error) => {
                tracing::error!("Could not read from the terminal: {error}");
                None
            }
        }
    }

    /// The current form values.
    pub fn form_values(&self) -> FormValues {
        lock(&self.form).values.clone()
    }

    /// Change the form values with `update` and print the new total.
    pub fn edit_form(&self, update: impl FnOnce(&mut FormValues)) {
        let total = {
            let mut form = lock(&self.form);
            update(&mut form.values);
            form.values.total()
        };

        self.print(format!("Total: {}", total.display));
    }

    /// Print the form, its mode and its total.
    pub fn show_form(&self) {
        let form = lock(&self.form);
        let values = &form.values;
        let cancel_hint = if form.mode.shows_cancel() {
            " (cancel to stop editing)"
        } else {
            ""
        };

        let text = format!(
            "[{}]{cancel_hint}\n  type:   {}\n  detail: {}\n  price:  {}\n  \
             qty:    {}\n  total:  {}",
            form.mode.submit_label(),
            values.kind,
            values.detail,
            values.price,
            values.qty,
            values.total().display,
        );
        drop(form);

        self.print(text);
    }

    /// The row action for `target`, a row number of the last printed list or
    /// a transaction ID.
    ///
    /// Row numbers take precedence over IDs that look like numbers.
    pub fn row_action(&self, target: &str, delete: bool) -> RowAction {
        let rows = lock(&self.rows);
        let row = target
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| rows.get(index));

        match row {
            Some(row) => {
                let [edit, remove] = row.actions();
                if delete { remove } else { edit }
            }
            None => {
                let id = TransactionId::new(target);
                if delete {
                    RowAction::Delete(id)
                } else {
                    RowAction::Edit(id)
                }
            }
        }
    }

    /// Print an error for the user.
    pub fn show_error(&self, error: impl Display) {
        self.print(format!("Error: {error}"));
    }
}

fn format_row(number: usize, row: &TransactionRow) -> String {
    format!(
        "{number:>3}. {:<10} [{}] {} {}",
        row.date, row.type_label, row.title, row.amount
    )
}

#[async_trait]
impl LedgerView for TerminalView {
    fn render(&self, model: &RenderModel) {
        let rows = match &model.list {
            ListProjection::Empty => Vec::new(),
            ListProjection::Rows(rows) => rows.clone(),
        };

        let mut text = if rows.is_empty() {
            EMPTY_LIST_MESSAGE.to_owned()
        } else {
            rows.iter()
                .enumerate()
                .map(|(index, row)| format_row(index + 1, row))
                .collect::<Vec<_>>()
                .join("\n")
        };
        text.push_str(&format!("\nBalance: {}", model.balance.amount));

        *lock(&self.rows) = rows;
        self.print(text);
    }

    fn render_load_error(&self, message: &str) {
        lock(&self.rows).clear();
        self.print(message);
    }

    fn fill_form(&self, values: &FormValues, total: &Total) {
        lock(&self.form).values = values.clone();
        self.print(format!(
            "Editing \"{}\" ({}), total {}",
            values.detail, values.kind, total.display
        ));
    }

    fn clear_form(&self) {
        lock(&self.form).values = FormValues::default();
    }

    fn set_mode(&self, mode: FormMode) {
        lock(&self.form).mode = mode;
    }

    fn notify(&self, notice: Notice) {
        self.print(notice.message());
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.prompt(&format!("{prompt} [y/N] "));

        matches!(
            self.read_line().await.map(|answer| answer.trim().to_ascii_lowercase()),
            Some(answer) if answer == "y" || answer == "yes"
        )
    }
}

/// Run the shell until the user quits or the input closes.
///
/// The list is loaded once at startup. Failed reloads, edit fetches and
/// exports are printed, failed submits and deletes are only logged. Either
/// way the shell carries on.
pub async fn run_shell<S>(controller: &SessionController<S, TerminalView>, export_dir: &Path)
where
    S: TransactionStore,
{
    let view = controller.view();
    // A failed load is already shown in place of the list.
    let _ = controller.request_reload().await;
    view.print("Type help for a list of commands.");

    loop {
        view.prompt("> ");

        let Some(line) = view.read_line().await else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                view.print(message);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }

        if let Err(error) = execute(controller, command, export_dir).await {
            view.show_error(error);
        }
    }
}

async fn execute<S>(
    controller: &SessionController<S, TerminalView>,
    command: Command,
    export_dir: &Path,
) -> Result<(), Error>
where
    S: TransactionStore,
{
    let view = controller.view();

    match command {
        Command::List => controller.request_reload().await?,
        Command::Type(kind) => view.edit_form(|values| values.kind = kind),
        Command::Detail(detail) => view.edit_form(|values| values.detail = detail),
        Command::Price(price) => view.edit_form(|values| values.price = price),
        Command::Qty(qty) => view.edit_form(|values| values.qty = qty),
        Command::Form => view.show_form(),
        // Failed mutations are only logged by the controller, the form keeps
        // its values so the user can try again.
        Command::Submit => {
            let _ = controller.submit(&view.form_values()).await;
        }
        Command::Edit(target) => controller.dispatch(&view.row_action(&target, false)).await?,
        Command::Cancel => controller.cancel_edit(),
        Command::Delete(target) => {
            let _ = controller.dispatch(&view.row_action(&target, true)).await;
        }
        Command::Export(directory) => {
            let file = controller.export().await?;
            let path = save_export(&file, directory.as_deref().unwrap_or(export_dir)).await?;
            view.print(format!("Saved {}", path.display()));
        }
        Command::Help => view.print(HELP),
        Command::Quit | Command::Nothing => {}
    }

    Ok(())
}
