//! Renders the ledger as HTML with maud.
//!
//! [HtmlView] is a [LedgerView] that keeps the latest state it was told to
//! display and turns it into a standalone page on request.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use maud::{DOCTYPE, Markup, html};

use crate::{
    form::{FormMode, FormValues, Total},
    projector::{
        BalanceLine, EMPTY_LIST_MESSAGE, ListProjection, RenderModel, RowAction, TransactionRow,
    },
    session::{LedgerView, Notice},
    transaction::TransactionType,
};

// Button styles
const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

const BUTTON_SECONDARY_STYLE: &str = "w-full py-2.5 px-5 mb-2 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

const BUTTON_EDIT_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline bg-transparent \
    border-none cursor-pointer";

const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
const FORM_CONTAINER_STYLE: &str = "flex flex-col gap-4 w-full max-w-md \
    text-gray-900 dark:text-white";
const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
const FORM_RADIO_GROUP_STYLE: &str = "flex gap-2";
const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer \
    text-blue-600 border-gray-300 dark:border-gray-600";
const FORM_RADIO_LABEL_STYLE: &str = "flex-1 rounded border border-gray-300 \
    dark:border-gray-600 bg-white dark:bg-gray-700 px-3 py-2 text-sm font-medium \
    text-gray-700 dark:text-white cursor-pointer peer-checked:border-blue-600 \
    peer-checked:bg-blue-50 peer-checked:text-blue-700";

// List styles
const LIST_ITEM_STYLE: &str = "flex justify-between items-center gap-4 px-6 py-4 \
    bg-white border-b dark:bg-gray-800 dark:border-gray-700";

const BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold rounded-full";

// Page container
const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center gap-8 px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

const PAGE_STYLES: &str = r#"
    .income { color: #16a34a; }
    .outcome { color: #dc2626; }
    .badge-income { background-color: #dcfce7; color: #166534; }
    .badge-outcome { background-color: #fee2e2; color: #991b1b; }
    .hidden { display: none; }
"#;

/// Wrap `content` in a complete HTML document.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Fintrack" }
                style { (PAGE_STYLES) }
            }

            body class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

fn transaction_item(row: &TransactionRow) -> Markup {
    html! {
        li class=(LIST_ITEM_STYLE) data-transaction-id=(row.id.as_str())
        {
            div
            {
                p class="font-medium" { (row.title) }

                span class=(format!("{BADGE_STYLE} {}", row.class.badge_class()))
                {
                    (row.type_label)
                }

                p class="text-sm text-gray-500" { (row.date) }
            }

            div class="flex items-center gap-4"
            {
                span class=(format!("amount {}", row.class.css_class())) { (row.amount) }

                @for action in row.actions()
                {
                    @let (style, label) = if matches!(action, RowAction::Edit(_)) {
                        (BUTTON_EDIT_STYLE, "Edit")
                    } else {
                        (BUTTON_DELETE_STYLE, "Delete")
                    };

                    button
                        type="button"
                        class=(style)
                        data-action=(action.name())
                        data-transaction-id=(action.transaction_id().as_str())
                    {
                        (label)
                    }
                }
            }
        }
    }
}

/// The transaction list, or the placeholder when it is empty.
pub fn transaction_list(list: &ListProjection) -> Markup {
    html! {
        ul id="transaction-list" class="w-full max-w-2xl"
        {
            @match list
            {
                ListProjection::Empty =>
                {
                    li class="empty px-6 py-4 text-center" { (EMPTY_LIST_MESSAGE) }
                }
                ListProjection::Rows(rows) =>
                {
                    @for row in rows
                    {
                        (transaction_item(row))
                    }
                }
            }
        }
    }
}

/// The list area showing `message` instead of transactions.
pub fn load_error(message: &str) -> Markup {
    html! {
        ul id="transaction-list" class="w-full max-w-2xl"
        {
            li class="error px-6 py-4 text-center text-red-500" { (message) }
        }
    }
}

/// The balance amount, styled by its sign.
pub fn balance(line: &BalanceLine) -> Markup {
    html! {
        p class="text-xl font-semibold"
        {
            "Total Balance: "
            span id="total-balance" class=(line.class.css_class()) { (line.amount) }
        }
    }
}

fn type_radio(kind: TransactionType, selected: TransactionType, label: &str) -> Markup {
    let id = format!("type-{}", kind.as_str());

    html! {
        div class="flex items-center gap-2"
        {
            input
                type="radio"
                name="type"
                id=(id)
                value=(kind.as_str())
                class=(FORM_RADIO_INPUT_STYLE)
                checked[kind == selected];

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

/// The transaction form with the inputs set to `values`.
///
/// The submit label follows `mode` and the cancel button is hidden unless a
/// transaction is being edited.
pub fn transaction_form(values: &FormValues, total: &Total, mode: FormMode) -> Markup {
    html! {
        form id="transaction-form" class=(FORM_CONTAINER_STYLE) data-mode=(mode_name(mode))
        {
            div class=(FORM_RADIO_GROUP_STYLE)
            {
                (type_radio(TransactionType::Income, values.kind, "Income"))
                (type_radio(TransactionType::Outcome, values.kind, "Outcome"))
            }

            div
            {
                label for="detail" class=(FORM_LABEL_STYLE) { "Detail" }
                input
                    type="text"
                    name="detail"
                    id="detail"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(values.detail);
            }

            div
            {
                label for="price" class=(FORM_LABEL_STYLE) { "Price" }
                input
                    type="number"
                    name="price"
                    id="price"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(values.price);
            }

            div
            {
                label for="qty" class=(FORM_LABEL_STYLE) { "Qty" }
                input
                    type="number"
                    name="qty"
                    id="qty"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(values.qty);
            }

            p { "Total: " span id="total-price" { (total.display) } }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                (mode.submit_label())
            }

            button
                type="button"
                id="cancel-button"
                class=(BUTTON_SECONDARY_STYLE)
                hidden[!mode.shows_cancel()]
            {
                "Cancel"
            }
        }
    }
}

fn mode_name(mode: FormMode) -> &'static str {
    match mode {
        FormMode::Create => "create",
        FormMode::Update => "update",
    }
}

/// A banner showing `notice`.
pub fn alert(notice: Notice) -> Markup {
    html! {
        div
            id="alert"
            role="alert"
            class="w-full max-w-md px-4 py-3 rounded bg-blue-100 text-blue-800"
        {
            (notice.message())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ListState {
    Loading,
    Ready(ListProjection),
    Failed(String),
}

#[derive(Debug)]
struct PageState {
    list: ListState,
    balance: BalanceLine,
    form: FormValues,
    total: Total,
    mode: FormMode,
    notice: Option<Notice>,
}

impl Default for PageState {
    fn default() -> Self {
        let form = FormValues::default();

        Self {
            list: ListState::Loading,
            balance: BalanceLine::new(0.0),
            total: form.total(),
            form,
            mode: FormMode::Create,
            notice: None,
        }
    }
}

/// A [LedgerView] that renders to an HTML page.
///
/// It cannot ask questions, so every confirmation is declined.
#[derive(Debug, Default)]
pub struct HtmlView {
    state: Mutex<PageState>,
}

impl HtmlView {
    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The complete page for the current state.
    pub fn page(&self) -> Markup {
        let state = self.state();

        let list = match &state.list {
            ListState::Loading => html! {
                ul id="transaction-list" { li class="loading" { "Loading..." } }
            },
            ListState::Ready(list) => transaction_list(list),
            ListState::Failed(message) => load_error(message),
        };

        let content = html! {
            div class=(PAGE_CONTAINER_STYLE)
            {
                h1 class="text-2xl font-bold" { "Transactions" }

                @if let Some(notice) = state.notice
                {
                    (alert(notice))
                }

                (balance(&state.balance))
                (transaction_form(&state.form, &state.total, state.mode))
                (list)
            }
        };

        base("Transactions", &content)
    }
}

#[async_trait]
impl LedgerView for HtmlView {
    fn render(&self, model: &RenderModel) {
        let mut state = self.state();
        state.list = ListState::Ready(model.list.clone());
        state.balance = model.balance.clone();
    }

    fn render_load_error(&self, message: &str) {
        self.state().list = ListState::Failed(message.to_owned());
    }

    fn fill_form(&self, values: &FormValues, total: &Total) {
        let mut state = self.state();
        state.form = values.clone();
        state.total = total.clone();
    }

    fn clear_form(&self) {
        let mut state = self.state();
        state.form = FormValues::default();
        state.total = state.form.total();
    }

    fn set_mode(&self, mode: FormMode) {
        self.state().mode = mode;
    }

    fn notify(&self, notice: Notice) {
        self.state().notice = Some(notice);
    }

    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Declining \"{prompt}\", the HTML view cannot ask for confirmation");
        false
    }
}
