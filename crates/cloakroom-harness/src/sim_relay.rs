//! In-process relay for client tests.
//!
//! `SimRelay` implements the client's transport seam by feeding requests
//! straight into the relay router, so client flows exercise the real HTTP
//! handlers, status codes and JSON bodies without opening a socket.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, header::CONTENT_TYPE},
};
use cloakroom_client::{HttpMethod, RelayTransport, TransportResponse};
use cloakroom_server::{
    MemoryRoomStore, RelayConfig, RoomExchangeService, X_FORWARDED_FOR, router,
};
use tower::ServiceExt;

use crate::SimEnv;

/// Base URL clients should be configured with when talking to a [`SimRelay`].
pub const SIM_RELAY_URL: &str = "http://relay.sim";

/// Room store type used by the simulated relay.
pub type SimRoomStore = MemoryRoomStore<Duration>;

/// Relay router running on a [`SimEnv`].
///
/// Clones share the relay state. Each clone may present a different client
/// address (via `X-Forwarded-For`) so rate limiting can be observed per
/// client.
#[derive(Clone)]
pub struct SimRelay {
    service: Arc<RoomExchangeService<SimEnv, SimRoomStore>>,
    router: Router,
    client_address: Option<String>,
    requests: Arc<AtomicUsize>,
}

impl SimRelay {
    /// Relay with default policy.
    pub fn new(env: SimEnv) -> Self {
        Self::with_config(env, RelayConfig::default())
    }

    /// Relay with custom policy.
    pub fn with_config(env: SimEnv, config: RelayConfig) -> Self {
        let service = Arc::new(RoomExchangeService::new(env, SimRoomStore::new(), config));
        let router = router(Arc::clone(&service));
        Self { service, router, client_address: None, requests: Arc::new(AtomicUsize::new(0)) }
    }

    /// Handle to the same relay that identifies itself as `address`.
    pub fn as_client(&self, address: &str) -> Self {
        Self { client_address: Some(address.to_string()), ..self.clone() }
    }

    /// The exchange service behind the router.
    pub fn service(&self) -> &RoomExchangeService<SimEnv, SimRoomStore> {
        &self.service
    }

    /// Requests served across all clones.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    async fn dispatch(
        &self,
        url: &str,
        method: HttpMethod,
        body: Option<String>,
    ) -> Result<TransportResponse, String> {
        let path = url.strip_prefix(SIM_RELAY_URL).ok_or_else(|| format!("unknown host in {url}"))?;
        let method = match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(address) = &self.client_address {
            builder = builder.header(X_FORWARDED_FOR, address);
        }
        let request = builder.body(Body::from(body.unwrap_or_default())).map_err(|e| e.to_string())?;

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = i32::from(response.status().as_u16());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.map_err(|e| e.to_string())?;
        let data = String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())?;

        Ok(TransportResponse { status, data })
    }
}

#[async_trait]
impl RelayTransport for SimRelay {
    async fn request(&self, url: &str, method: HttpMethod, body: Option<String>) -> TransportResponse {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.dispatch(url, method, body).await.unwrap_or_else(TransportResponse::failure)
    }
}

/// Transport whose every request fails at the network level.
#[derive(Debug, Default)]
pub struct FailingTransport {
    attempts: AtomicUsize,
}

impl FailingTransport {
    /// New failing transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests attempted so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelayTransport for FailingTransport {
    async fn request(&self, _url: &str, _method: HttpMethod, _body: Option<String>) -> TransportResponse {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        TransportResponse::failure("simulated network failure")
    }
}
