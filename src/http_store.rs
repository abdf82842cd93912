//! The [TransactionStore] that talks to the transaction server over HTTP.

use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url, header::CONTENT_DISPOSITION};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    Error,
    config::ClientConfig,
    endpoints::{self, format_endpoint},
    export::default_export_file_name,
    logging::{log_request, log_response},
    store::{ExportFile, HealthStatus, LedgerSnapshot, TransactionStore},
    transaction::{Transaction, TransactionDraft, TransactionId},
};

/// A client for the transaction server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpTransactionStore {
    client: Client,
    config: ClientConfig,
}

/// The body the server sends along with an error status.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpTransactionStore {
    /// Create a store for the server described by `config`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a store that sends its requests with `client`.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Send a request and reject any status outside of the 2xx range.
    async fn send(
        &self,
        method: Method,
        endpoint_path: &str,
        draft: Option<&TransactionDraft>,
    ) -> Result<(Url, Response), Error> {
        let url = self.config.endpoint_url(endpoint_path)?;
        let mut request = self.client.request(method.clone(), url.clone());

        match draft {
            Some(draft) => {
                let body = serde_json::to_string(draft).unwrap_or_default();
                log_request(&method, &url, &body);
                request = request.json(draft);
            }
            None => log_request(&method, &url, ""),
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok((url, response));
        }

        let body = response.text().await.unwrap_or_default();
        log_response(&method, &url, status, &body);

        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|error_body| error_body.error)
            .unwrap_or(body);

        Err(Error::NonOkResponse {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, endpoint_path: &str) -> Result<T, Error> {
        let (url, response) = self.send(Method::GET, endpoint_path, None).await?;
        let status = response.status();
        let body = response.text().await?;
        log_response(&Method::GET, &url, status, &body);

        serde_json::from_str(&body).map_err(|error| Error::InvalidResponse(error.to_string()))
    }

    async fn mutate(
        &self,
        method: Method,
        endpoint_path: &str,
        draft: Option<&TransactionDraft>,
    ) -> Result<(), Error> {
        let (url, response) = self.send(method.clone(), endpoint_path, draft).await?;
        let status = response.status();
        // The body only carries a status message, it is read for the logs.
        let body = response.text().await.unwrap_or_default();
        log_response(&method, &url, status, &body);

        Ok(())
    }
}

#[async_trait]
impl TransactionStore for HttpTransactionStore {
    async fn list(&self) -> Result<LedgerSnapshot, Error> {
        self.fetch_json(endpoints::TRANSACTIONS).await
    }

    async fn get(&self, id: &TransactionId) -> Result<Transaction, Error> {
        self.fetch_json(&format_endpoint(endpoints::TRANSACTION, id.as_str()))
            .await
    }

    async fn create(&self, draft: &TransactionDraft) -> Result<(), Error> {
        self.mutate(Method::POST, endpoints::TRANSACTIONS, Some(draft))
            .await
    }

    async fn update(&self, id: &TransactionId, draft: &TransactionDraft) -> Result<(), Error> {
        self.mutate(
            Method::PUT,
            &format_endpoint(endpoints::TRANSACTION, id.as_str()),
            Some(draft),
        )
        .await
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), Error> {
        self.mutate(
            Method::DELETE,
            &format_endpoint(endpoints::TRANSACTION, id.as_str()),
            None,
        )
        .await
    }

    async fn export(&self) -> Result<ExportFile, Error> {
        let (url, response) = self.send(Method::GET, endpoints::EXPORT, None).await?;
        let status = response.status();

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(file_name_from_content_disposition)
            .unwrap_or_else(default_export_file_name);

        let bytes = response.bytes().await?.to_vec();
        log_response(
            &Method::GET,
            &url,
            status,
            &format!("<{} bytes for {file_name}>", bytes.len()),
        );

        Ok(ExportFile { file_name, bytes })
    }

    async fn health(&self) -> Result<HealthStatus, Error> {
        self.fetch_json(endpoints::HEALTH).await
    }
}

/// Extract the `filename` parameter of a `Content-Disposition` header.
///
/// Directory components are stripped so the name is safe to join onto a
/// local directory.
fn file_name_from_content_disposition(header: &str) -> Option<String> {
    let file_name = header
        .split(';')
        .map(str::trim)
        .find_map(|parameter| parameter.strip_prefix("filename="))?
        .trim_matches('"');

    let file_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    if file_name.is_empty() || file_name == "." || file_name == ".." {
        None
    } else {
        Some(file_name.to_owned())
    }
}
