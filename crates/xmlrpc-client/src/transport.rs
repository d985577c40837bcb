//! Transports that carry request bodies to the server.
//!
//! The codec produces and consumes plain text; a [`Transport`] only has to
//! post a body to an endpoint and hand back the response body.

use std::future::Future;
use std::pin::Pin;

use reqwest::{Client, StatusCode};
use tracing::{trace, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Posts an XML-RPC request body and returns the response body.
///
/// Implementations do not retry; a failed exchange is reported as is.
pub trait Transport: Send + Sync {
    /// Sends `body` to `url` and returns the raw response text.
    fn post(&self, url: &str, body: String) -> BoxFuture<'_, ClientResult<String>>;
}

/// HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the HTTP client from the configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ClientError::network(format!("Failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { client })
    }

    async fn send(&self, url: &str, body: String) -> ClientResult<String> {
        trace!(url = %url, bytes = body.len(), "Posting XML-RPC request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "text/xml")
            .header("Accept", "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::network(format!("Request failed: {}", e)).with_source(e))?;

        let status = response.status();
        trace!(status = %status, "Received response");

        match status {
            StatusCode::OK => response.text().await.map_err(|e| {
                ClientError::network(format!("Failed to read response: {}", e)).with_source(e)
            }),
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::server(format!("Server error ({}): {}", s, body)))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %s, body = %body, "Unexpected response status");
                Err(ClientError::invalid_response(format!(
                    "Unexpected status {}: {}",
                    s, body
                )))
            }
        }
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: String) -> BoxFuture<'_, ClientResult<String>> {
        let url = url.to_string();
        Box::pin(async move { self.send(&url, body).await })
    }
}
