//! Parsing and display of transaction dates.
//!
//! The server stamps transactions with a local date-time string. Dates are
//! parsed in two stages: a strict timestamp parse, and if that fails, the
//! text before the first space is shown as is.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

const SPACE_SEPARATED_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const ISO_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATE_ONLY_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const DISPLAY_FORMAT: &[BorrowedFormatItem] = format_description!("[day]-[month]-[year]");

/// The text shown when a transaction has no date.
pub const MISSING_DATE: &str = "-";

/// Parse a server timestamp into its calendar date.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339 and a bare
/// `YYYY-MM-DD`.
///
/// # Errors
/// Returns [Error::InvalidDate] if `raw` matches none of these shapes.
pub fn parse_timestamp(raw: &str) -> Result<Date, Error> {
    if let Ok(date_time) = PrimitiveDateTime::parse(raw, SPACE_SEPARATED_FORMAT) {
        return Ok(date_time.date());
    }

    if let Ok(date_time) = PrimitiveDateTime::parse(raw, ISO_FORMAT) {
        return Ok(date_time.date());
    }

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(date_time.date());
    }

    Date::parse(raw, DATE_ONLY_FORMAT).map_err(|_| Error::InvalidDate(raw.to_owned()))
}

/// Format a transaction date as `dd-mm-yyyy`.
///
/// Unparseable dates fall back to the text before the first space, and a
/// missing or empty date is shown as [MISSING_DATE].
pub fn format_transaction_date(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return MISSING_DATE.to_owned(),
    };

    match parse_timestamp(raw) {
        Ok(date) => date
            .format(DISPLAY_FORMAT)
            .unwrap_or_else(|_| fallback_date_text(raw)),
        Err(error) => {
            tracing::debug!("Falling back to raw date text: {error}");
            fallback_date_text(raw)
        }
    }
}

fn fallback_date_text(raw: &str) -> String {
    match raw.split(' ').next() {
        Some(prefix) if !prefix.is_empty() => prefix.to_owned(),
        _ => MISSING_DATE.to_owned(),
    }
}
