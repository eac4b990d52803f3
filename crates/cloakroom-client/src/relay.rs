//! Key-exchange relay client.
//!
//! The client never opens sockets itself. Requests go through a
//! [`RelayTransport`] supplied by the host, which may proxy them through a
//! process with looser network restrictions. Transports never fail: a
//! connection-level error is reported as status
//! [`TRANSPORT_FAILURE_STATUS`] with a diagnostic in `data`.

use std::fmt;

use async_trait::async_trait;
use cloakroom_proto::{
    CreateRoomRequest, CreateRoomResponse, ErrorResponse, GetRoomResponse, ROOM_PATH, RoomCode,
    room_path,
};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Status a transport reports when the relay could not be reached.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// HTTP methods the relay protocol uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Fetch a wrapped key
    Get,
    /// Store a wrapped key
    Post,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw transport reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status, or [`TRANSPORT_FAILURE_STATUS`]
    pub status: i32,
    /// Response body, or a diagnostic on transport failure
    pub data: String,
}

impl TransportResponse {
    /// Reply for a request that never reached the relay.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self { status: TRANSPORT_FAILURE_STATUS, data: reason.into() }
    }
}

/// Host-provided request channel to the relay.
///
/// A JSON `body` is sent with `Content-Type: application/json`.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Perform one request. Must not panic on network errors.
    async fn request(&self, url: &str, method: HttpMethod, body: Option<String>)
    -> TransportResponse;
}

#[async_trait]
impl<T: RelayTransport + ?Sized> RelayTransport for &T {
    async fn request(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<String>,
    ) -> TransportResponse {
        (**self).request(url, method, body).await
    }
}

#[async_trait]
impl<T: RelayTransport + ?Sized> RelayTransport for std::sync::Arc<T> {
    async fn request(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<String>,
    ) -> TransportResponse {
        (**self).request(url, method, body).await
    }
}

/// Typed client for the relay's two endpoints.
#[derive(Debug, Clone)]
pub struct RelayClient<T> {
    transport: T,
    base_url: String,
}

impl<T: RelayTransport> RelayClient<T> {
    /// Client for the relay at `base_url`. A trailing `/` is ignored.
    pub fn new(transport: T, base_url: &str) -> Self {
        Self { transport, base_url: base_url.trim_end_matches('/').to_string() }
    }

    /// Relay base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store `blob` under `code`. Returns the code the relay stored it under.
    pub async fn create_room(&self, code: &RoomCode, blob: &str) -> Result<RoomCode, ClientError> {
        let body = serde_json::to_string(&CreateRoomRequest {
            room_code: code.to_string(),
            encrypted_blob: blob.to_string(),
        })
        .map_err(|e| ClientError::Protocol { reason: e.to_string() })?;

        let url = format!("{}{ROOM_PATH}", self.base_url);
        let response = self.transport.request(&url, HttpMethod::Post, Some(body)).await;
        let created: CreateRoomResponse = decode(response)?;

        RoomCode::parse(&created.room_code)
            .map_err(|e| ClientError::Protocol { reason: format!("relay returned {e}") })
    }

    /// Fetch the wrapped key stored under `code`.
    pub async fn fetch_room(&self, code: &RoomCode) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, room_path(code.as_str()));
        let response = self.transport.request(&url, HttpMethod::Get, None).await;
        let room: GetRoomResponse = decode(response)?;

        Ok(room.encrypted_blob)
    }
}

fn decode<R: DeserializeOwned>(response: TransportResponse) -> Result<R, ClientError> {
    match response.status {
        200 => serde_json::from_str(&response.data)
            .map_err(|e| ClientError::Protocol { reason: e.to_string() }),
        400 => Err(ClientError::InvalidRequest { reason: error_text(&response.data) }),
        404 => Err(ClientError::NotFound),
        429 => Err(ClientError::RateLimited),
        TRANSPORT_FAILURE_STATUS => {
            tracing::warn!(reason = %response.data, "relay unreachable");
            Err(ClientError::TransportFailure { reason: response.data })
        },
        status => Err(ClientError::UnexpectedStatus { status }),
    }
}

// Falls back to the raw body if the relay didn't send `{error}`.
fn error_text(data: &str) -> String {
    serde_json::from_str::<ErrorResponse>(data).map_or_else(|_| data.to_string(), |e| e.error)
}
