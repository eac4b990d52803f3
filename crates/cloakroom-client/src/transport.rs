//! reqwest-backed relay transport.
//!
//! Provides [`HttpTransport`] for hosts that can reach the relay directly.
//! Hosts that must proxy requests implement [`RelayTransport`] themselves.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};

use crate::relay::{HttpMethod, RelayTransport, TransportResponse};

/// Relay transport over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport with reqwest defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self { client: Client::builder().timeout(timeout).build()? })
    }

    /// Transport reusing an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RelayTransport for HttpTransport {
    async fn request(&self, url: &str, method: HttpMethod, body: Option<String>) -> TransportResponse {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return TransportResponse::failure(e.to_string()),
        };

        let status = i32::from(response.status().as_u16());
        match response.text().await {
            Ok(data) => TransportResponse { status, data },
            Err(e) => TransportResponse::failure(format!("failed to read response body: {e}")),
        }
    }
}
