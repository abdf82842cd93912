//! Projects a server snapshot into the rows and balance line a view renders.

use crate::{
    currency::format_rupiah,
    date::format_transaction_date,
    transaction::{Transaction, TransactionId, TransactionType},
};

/// The message shown in place of the list when there are no transactions.
pub const EMPTY_LIST_MESSAGE: &str = "No transactions yet.";

const UNTITLED: &str = "Untitled";
const UNKNOWN_TYPE: &str = "unknown";

/// Everything a view needs to display the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    /// The transaction list, or the empty state.
    pub list: ListProjection,
    /// The running balance.
    pub balance: BalanceLine,
}

/// The transaction list part of a [RenderModel].
#[derive(Debug, Clone, PartialEq)]
pub enum ListProjection {
    /// There are no transactions, show [EMPTY_LIST_MESSAGE].
    Empty,
    /// One row per transaction, in the order the server sent them.
    Rows(Vec<TransactionRow>),
}

/// How a row's amount is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountClass {
    /// Money in, shown with a `+`.
    Income,
    /// Money out, or an entry of unknown type, shown with a `-`.
    Outcome,
}

impl AmountClass {
    /// The CSS class for the amount.
    pub fn css_class(&self) -> &'static str {
        match self {
            AmountClass::Income => "income",
            AmountClass::Outcome => "outcome",
        }
    }

    /// The CSS class for the type badge.
    pub fn badge_class(&self) -> &'static str {
        match self {
            AmountClass::Income => "badge-income",
            AmountClass::Outcome => "badge-outcome",
        }
    }
}

/// An action the user can trigger from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Load the transaction into the form for editing.
    Edit(TransactionId),
    /// Delete the transaction after confirmation.
    Delete(TransactionId),
}

impl RowAction {
    /// The transaction the action applies to.
    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            RowAction::Edit(id) | RowAction::Delete(id) => id,
        }
    }

    /// The action name used to tag buttons in rendered output.
    pub fn name(&self) -> &'static str {
        match self {
            RowAction::Edit(_) => "edit",
            RowAction::Delete(_) => "delete",
        }
    }
}

/// A display-ready transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    /// The transaction this row shows.
    pub id: TransactionId,
    /// The detail text, or "Untitled".
    pub title: String,
    /// The type badge text, or "unknown".
    pub type_label: String,
    /// How to style the amount.
    pub class: AmountClass,
    /// The signed, formatted total, e.g. `+Rp 12.500`.
    pub amount: String,
    /// The date as `dd-mm-yyyy`, or the fallback text.
    pub date: String,
}

impl TransactionRow {
    /// The edit and delete actions for this row.
    pub fn actions(&self) -> [RowAction; 2] {
        [
            RowAction::Edit(self.id.clone()),
            RowAction::Delete(self.id.clone()),
        ]
    }
}

/// Whether the balance is shown as healthy or in the red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceClass {
    /// The balance is zero or more.
    NonNegative,
    /// The balance is below zero.
    Negative,
}

impl BalanceClass {
    /// Classify `balance`.
    pub fn of(balance: f64) -> Self {
        if balance >= 0.0 {
            BalanceClass::NonNegative
        } else {
            BalanceClass::Negative
        }
    }

    /// The CSS class for the balance amount.
    pub fn css_class(&self) -> &'static str {
        match self {
            BalanceClass::NonNegative => "income",
            BalanceClass::Negative => "outcome",
        }
    }
}

/// The formatted balance and its styling.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceLine {
    /// The balance as sent by the server.
    pub value: f64,
    /// The balance formatted as Rupiah.
    pub amount: String,
    /// How to style the balance.
    pub class: BalanceClass,
}

impl BalanceLine {
    /// Format `balance` for display.
    pub fn new(balance: f64) -> Self {
        Self {
            value: balance,
            amount: format_rupiah(balance),
            class: BalanceClass::of(balance),
        }
    }
}

/// Build the render model for a snapshot.
///
/// `transactions` is `None` when the server did not send a list, which is
/// displayed the same as an empty list. Rows keep the server's order.
pub fn project(transactions: Option<&[Transaction]>, balance: f64) -> RenderModel {
    let list = match transactions {
        Some(transactions) if !transactions.is_empty() => {
            ListProjection::Rows(transactions.iter().map(project_row).collect())
        }
        _ => ListProjection::Empty,
    };

    RenderModel {
        list,
        balance: BalanceLine::new(balance),
    }
}

fn project_row(transaction: &Transaction) -> TransactionRow {
    let class = match transaction.transaction_type() {
        Some(TransactionType::Income) => AmountClass::Income,
        _ => AmountClass::Outcome,
    };
    let sign = match class {
        AmountClass::Income => '+',
        AmountClass::Outcome => '-',
    };

    TransactionRow {
        id: transaction.id.clone(),
        title: transaction
            .detail
            .clone()
            .unwrap_or_else(|| UNTITLED.to_owned()),
        type_label: transaction
            .kind
            .clone()
            .unwrap_or_else(|| UNKNOWN_TYPE.to_owned()),
        class,
        amount: format!("{sign}{}", format_rupiah(transaction.total_price)),
        date: format_transaction_date(transaction.date.as_deref()),
    }
}
