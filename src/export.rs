//! Saving server exports and local CSV snapshots of the transaction list.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use serde::Serialize;
use time::{OffsetDateTime, macros::format_description};

use crate::{Error, store::ExportFile, transaction::Transaction};

/// The file name used when the server does not name the export, e.g.
/// `transactions_20240501_093000.xlsx`.
pub fn default_export_file_name() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    export_file_name_at(now)
}

fn export_file_name_at(timestamp: OffsetDateTime) -> String {
    let stamp = timestamp
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string());

    format!("transactions_{stamp}.xlsx")
}

/// Write `file` into `directory`, returning the path of the new file.
pub async fn save_export(file: &ExportFile, directory: &Path) -> Result<PathBuf, Error> {
    let path = directory.join(&file.file_name);
    tokio::fs::write(&path, &file.bytes).await?;

    tracing::info!("Saved export of {} bytes to {}", file.bytes.len(), path.display());

    Ok(path)
}

#[derive(Serialize)]
struct SnapshotRow<'a> {
    id: &'a str,
    date: Option<&'a str>,
    #[serde(rename = "type")]
    kind: Option<&'a str>,
    detail: Option<&'a str>,
    price: f64,
    qty: f64,
    total_price: f64,
}

/// Write `transactions` as CSV with the columns
/// `id,date,type,detail,price,qty,total_price`.
///
/// Missing fields are written as empty cells.
pub fn write_csv_snapshot<W: Write>(transactions: &[Transaction], writer: W) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(["id", "date", "type", "detail", "price", "qty", "total_price"])?;

    for transaction in transactions {
        csv_writer.serialize(SnapshotRow {
            id: transaction.id.as_str(),
            date: transaction.date.as_deref(),
            kind: transaction.kind.as_deref(),
            detail: transaction.detail.as_deref(),
            price: transaction.price,
            qty: transaction.qty,
            total_price: transaction.total_price,
        })?;
    }

    csv_writer.flush()?;

    Ok(())
}
