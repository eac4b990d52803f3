//! Cloakroom relay.
//!
//! Short-lived key-exchange service: a room creator stores a
//! passphrase-wrapped room key under a room code, joiners fetch it back by
//! code until it expires. The relay never sees a passphrase or an unwrapped
//! key.
//!
//! # Components
//!
//! - [`RoomExchangeService`]: create/get logic, TTL and rate limiting
//! - [`RoomStore`]: time-limited blob storage ([`MemoryRoomStore`])
//! - [`RateLimiter`]: per-client, per-code lookup quota
//! - [`router`]: axum routes, CORS and request tracing
//! - [`Server`]: binds, serves and runs periodic housekeeping

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod exchange;
mod http;
mod rate_limit;
pub mod storage;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

pub use cloakroom_core::{Environment, SystemEnv};
pub use config::{MAX_RELAY_DURATION, RelayConfig, ServerRuntimeConfig};
pub use error::ServerError;
pub use exchange::{ExchangeError, PurgeStats, RoomExchangeService};
pub use http::{CF_CONNECTING_IP, UNKNOWN_CLIENT, X_FORWARDED_FOR, client_address, router};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use storage::{MemoryRoomStore, RoomStore, StorageError};
use tokio::{
    net::TcpListener,
    task::{JoinError, JoinHandle},
};

/// Production relay.
pub struct Server<E: Environment, S> {
    listener: TcpListener,
    service: Arc<RoomExchangeService<E, S>>,
}

impl Server<SystemEnv, MemoryRoomStore<std::time::Instant>> {
    /// Bind a relay with the system environment and in-memory storage.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        Self::bind_with(config, SystemEnv::new(), MemoryRoomStore::new()).await
    }
}

impl<E, S> Server<E, S>
where
    E: Environment,
    S: RoomStore<E::Instant>,
{
    /// Bind a relay over a custom environment and store.
    pub async fn bind_with(
        config: ServerRuntimeConfig,
        env: E,
        store: S,
    ) -> Result<Self, ServerError> {
        config.relay.validate()?;

        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address: {e}")))?;
        let listener = TcpListener::bind(addr).await?;

        let service = Arc::new(RoomExchangeService::new(env, store, config.relay));
        Ok(Self { listener, service })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared handle to the exchange service.
    pub fn service(&self) -> Arc<RoomExchangeService<E, S>> {
        Arc::clone(&self.service)
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` completes, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %self.local_addr()?, "relay listening");

        let sweeper = spawn_sweeper(Arc::clone(&self.service));
        let app = router(self.service).into_make_service_with_connect_info::<SocketAddr>();

        let served = axum::serve(self.listener, app).with_graceful_shutdown(shutdown).await;
        sweeper.abort();
        let swept = sweeper_outcome(sweeper.await);

        served?;
        swept?;
        tracing::info!("relay stopped");
        Ok(())
    }
}

/// Run housekeeping every `sweep_interval` until aborted.
fn spawn_sweeper<E, S>(service: Arc<RoomExchangeService<E, S>>) -> JoinHandle<()>
where
    E: Environment,
    S: RoomStore<E::Instant>,
{
    let interval: Duration = service.config().sweep_interval;
    tokio::spawn(async move {
        loop {
            service.env().sleep(interval).await;
            match service.purge_expired() {
                Ok(stats) if stats.rooms + stats.counters > 0 => {
                    tracing::debug!(rooms = stats.rooms, counters = stats.counters, "purged expired state");
                },
                Ok(_) => {},
                Err(e) => tracing::warn!(error = %e, "housekeeping failed"),
            }
        }
    })
}

/// Cancellation is the normal way the sweeper ends. A panic is not.
fn sweeper_outcome(joined: Result<(), JoinError>) -> Result<(), ServerError> {
    match joined {
        Ok(()) => Ok(()),
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "housekeeping task panicked");
            Err(ServerError::Internal(format!("housekeeping task panicked: {e}")))
        },
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
