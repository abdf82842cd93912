//! Where to find the transaction server.

use reqwest::Url;

use crate::Error;

/// The server URL used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3636";

/// The settings for talking to the transaction server.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Always ends with a slash so endpoint paths can be joined onto it.
    base_url: Url,
}

impl ClientConfig {
    /// Create a config for the server at `server_url`.
    ///
    /// The URL may include a path prefix, e.g. `https://example.com/ledger`,
    /// in which case every endpoint is resolved below that prefix.
    ///
    /// # Errors
    /// Returns [Error::InvalidBaseUrl] if `server_url` is not an absolute
    /// `http` or `https` URL.
    pub fn new(server_url: &str) -> Result<Self, Error> {
        let invalid =
            |reason: &str| Error::InvalidBaseUrl(server_url.to_owned(), reason.to_owned());

        let mut base_url = Url::parse(server_url).map_err(|error| invalid(&error.to_string()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("the scheme must be http or https"));
        }

        if base_url.cannot_be_a_base() {
            return Err(invalid("the URL cannot be used as a base"));
        }

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { base_url })
    }

    /// The URL of the server, with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path such as `/api/transactions` against the base URL.
    ///
    /// # Errors
    /// Returns [Error::InvalidBaseUrl] if the joined URL is invalid.
    pub fn endpoint_url(&self, endpoint_path: &str) -> Result<Url, Error> {
        self.base_url
            .join(endpoint_path.trim_start_matches('/'))
            .map_err(|error| Error::InvalidBaseUrl(self.base_url.to_string(), error.to_string()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(&format!("{DEFAULT_SERVER_URL}/"))
                .expect("the default server URL is valid"),
        }
    }
}
