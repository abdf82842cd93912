//! Logging setup and helpers for logging the traffic to the transaction server.

use std::{fs::OpenOptions, path::Path, sync::Arc};

use reqwest::{Method, StatusCode, Url};
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::Error;

/// Bodies longer than this many characters are truncated in `debug` logs.
/// The full body is logged at the `trace` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Install the global tracing subscriber.
///
/// Logs go to stderr, filtered by `RUST_LOG` or `default_directive` when
/// `RUST_LOG` is unset. If `log_file` is given, everything at `debug` and
/// above is also appended to that file.
///
/// # Errors
/// Returns [Error::Io] if the log file cannot be opened.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn setup_logging(default_directive: &str, log_file: Option<&Path>) -> Result<(), Error> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .init();

    Ok(())
}

pub(crate) fn log_request(method: &Method, url: &Url, body: &str) {
    if body.is_empty() {
        tracing::debug!("Sending request: {method} {url}");
    } else {
        tracing::debug!("Sending request: {method} {url}\nbody: {}", truncate(body));
        tracing::trace!("Full request body: {body:?}");
    }
}

pub(crate) fn log_response(method: &Method, url: &Url, status: StatusCode, body: &str) {
    tracing::debug!(
        "Received response to {method} {url}: {status}\nbody: {}",
        truncate(body)
    );
    tracing::trace!("Full response body: {body:?}");
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_owned(),
    }
}
