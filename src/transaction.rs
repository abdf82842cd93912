//! The transaction records exchanged with the server.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::form::coerce_number;

/// The identifier the server assigned to a transaction.
///
/// Identifiers are opaque to the client. Numeric identifiers are accepted and
/// kept in their decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as it appears in URLs and row actions.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Self(id)),
            Value::Number(id) => Ok(Self(id.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected a string or number for a transaction ID, got {other}"
            ))),
        }
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    #[default]
    Outcome,
}

impl TransactionType {
    /// The wire name of the type, also used as the display badge.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Outcome => "outcome",
        }
    }

    /// Match a type exactly as the server stores it, `income` or `outcome`.
    pub fn from_wire(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionType::Income),
            "outcome" => Some(TransactionType::Outcome),
            _ => None,
        }
    }

    /// Parse a type name typed by the user, ignoring case and surrounding
    /// whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "outcome" => Some(TransactionType::Outcome),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger entry as returned by the server.
///
/// The server is backed by a loosely typed store, so every field except the
/// ID is decoded leniently: numbers may arrive as strings, and missing or
/// malformed values fall back to their defaults instead of failing the whole
/// list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    /// The server-assigned identifier.
    pub id: TransactionId,
    /// When the transaction was recorded, in the server's own format.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// The type text as stored on the server, `None` when missing or empty.
    ///
    /// Only an exact `income` counts as income; see [Transaction::transaction_type].
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    /// A free text label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub detail: Option<String>,
    /// The unit price.
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: f64,
    /// The quantity.
    #[serde(default, deserialize_with = "lenient_number")]
    pub qty: f64,
    /// The total as sent by the client that created or last updated the
    /// transaction.
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_price: f64,
}

impl Transaction {
    /// The type when the server sent exactly `income` or `outcome`.
    pub fn transaction_type(&self) -> Option<TransactionType> {
        self.kind.as_deref().and_then(TransactionType::from_wire)
    }
}

/// The body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDraft {
    /// Income or outcome.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// A free text label, may be empty.
    pub detail: String,
    /// The unit price.
    pub price: f64,
    /// The quantity.
    pub qty: f64,
    /// `price * qty`, computed on the client.
    pub total_price: f64,
}

pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Number(number)) => number.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
        Some(Value::String(text)) => coerce_number(&text),
        _ => 0.0,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Transaction, TransactionDraft, TransactionId, TransactionType};

    #[test]
    fn decodes_numbers_sent_as_strings() {
        let transaction: Transaction = serde_json::from_value(json!({
            "id": "abc",
            "date": "2024-05-01 10:00:00",
            "type": "income",
            "detail": "Gaji",
            "price": "15000",
            "qty": "2",
            "total_price": "30000"
        }))
        .unwrap();

        assert_eq!(
            transaction,
            Transaction {
                id: TransactionId::new("abc"),
                date: Some("2024-05-01 10:00:00".to_owned()),
                kind: Some("income".to_owned()),
                detail: Some("Gaji".to_owned()),
                price: 15000.0,
                qty: 2.0,
                total_price: 30000.0,
            }
        );
    }

    #[test]
    fn missing_and_malformed_fields_fall_back_to_defaults() {
        let transaction: Transaction = serde_json::from_value(json!({
            "id": 7,
            "date": "",
            "type": "refund",
            "price": "abc",
            "qty": null
        }))
        .unwrap();

        assert_eq!(transaction.id, TransactionId::new("7"));
        assert_eq!(transaction.date, None);
        assert_eq!(transaction.kind.as_deref(), Some("refund"));
        assert_eq!(transaction.transaction_type(), None);
        assert_eq!(transaction.detail, None);
        assert_eq!(transaction.price, 0.0);
        assert_eq!(transaction.qty, 0.0);
        assert_eq!(transaction.total_price, 0.0);
    }

    #[test]
    fn rejects_transaction_without_id() {
        let result = serde_json::from_value::<Transaction>(json!({ "detail": "no id" }));

        assert!(result.is_err());
    }

    #[test]
    fn draft_serializes_type_field() {
        let draft = TransactionDraft {
            kind: TransactionType::Outcome,
            detail: "Kopi".to_owned(),
            price: 12000.0,
            qty: 3.0,
            total_price: 36000.0,
        };

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({
                "type": "outcome",
                "detail": "Kopi",
                "price": 12000.0,
                "qty": 3.0,
                "total_price": 36000.0
            })
        );
    }

    #[test]
    fn wire_type_must_match_exactly() {
        let transaction: Transaction = serde_json::from_value(json!({
            "id": "a",
            "type": "Income"
        }))
        .unwrap();

        assert_eq!(transaction.kind.as_deref(), Some("Income"));
        assert_eq!(transaction.transaction_type(), None);
        assert_eq!(TransactionType::from_wire("income"), Some(TransactionType::Income));
        assert_eq!(TransactionType::from_wire("outcome"), Some(TransactionType::Outcome));
        assert_eq!(TransactionType::from_wire(" income"), None);
    }

    #[test]
    fn parses_type_names_case_insensitively() {
        assert_eq!(TransactionType::parse(" Income "), Some(TransactionType::Income));
        assert_eq!(TransactionType::parse("OUTCOME"), Some(TransactionType::Outcome));
        assert_eq!(TransactionType::parse("expense"), None);
    }
}
