//! The transaction form: its field values, its mode and the derived total.

use crate::{
    currency::format_rupiah,
    transaction::{Transaction, TransactionDraft, TransactionType},
};

/// Whether submitting the form creates a new transaction or updates the one
/// being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMode {
    /// Submitting creates a new transaction.
    #[default]
    Create,
    /// Submitting updates the transaction under edit.
    Update,
}

impl FormMode {
    /// The text on the submit button.
    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Create => "Tambah Transaksi",
            FormMode::Update => "Update Transaction",
        }
    }

    /// Whether the cancel button is shown.
    pub fn shows_cancel(&self) -> bool {
        matches!(self, FormMode::Update)
    }
}

/// The raw values of the form inputs.
///
/// Price and quantity are kept as typed, they are only coerced to numbers
/// when a total is calculated or the form is submitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormValues {
    /// The selected transaction type.
    pub kind: TransactionType,
    /// The detail text input.
    pub detail: String,
    /// The price text input.
    pub price: String,
    /// The quantity text input.
    pub qty: String,
}

impl FormValues {
    /// The form values for editing `transaction`.
    ///
    /// A transaction without a recognised type selects the default type.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            kind: transaction.transaction_type().unwrap_or_default(),
            detail: transaction.detail.clone().unwrap_or_default(),
            price: transaction.price.to_string(),
            qty: transaction.qty.to_string(),
        }
    }

    /// The total for the current price and quantity.
    pub fn total(&self) -> Total {
        calculate_total(coerce_number(&self.price), coerce_number(&self.qty))
    }

    /// The request body for submitting these values.
    pub fn to_draft(&self) -> TransactionDraft {
        let price = coerce_number(&self.price);
        let qty = coerce_number(&self.qty);

        TransactionDraft {
            kind: self.kind,
            detail: self.detail.clone(),
            price,
            qty,
            total_price: calculate_total(price, qty).value,
        }
    }
}

/// The total price of a form, as a number and as display text.
#[derive(Debug, Clone, PartialEq)]
pub struct Total {
    /// `price * qty`, sent to the server as `total_price`.
    pub value: f64,
    /// The total formatted as Rupiah.
    pub display: String,
}

/// Multiply `price` by `qty` and format the result as Rupiah.
pub fn calculate_total(price: f64, qty: f64) -> Total {
    let value = price * qty;

    Total {
        value,
        display: format_rupiah(value),
    }
}

/// Convert user or server text to a number, treating anything that is not a
/// finite number as zero.
pub fn coerce_number(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}
