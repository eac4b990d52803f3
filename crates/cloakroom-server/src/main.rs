//! Cloakroom relay binary.
//!
//! # Usage
//!
//! ```bash
//! # Local development
//! cloakroom-relay --bind 127.0.0.1:8787
//!
//! # Behind a proxy, shorter-lived rooms
//! cloakroom-relay --bind 0.0.0.0:8787 --room-ttl-secs 900
//! ```

use std::time::Duration;

use clap::Parser;
use cloakroom_server::{RateLimitConfig, RelayConfig, Server, ServerRuntimeConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Cloakroom key-exchange relay
#[derive(Parser, Debug)]
#[command(name = "cloakroom-relay")]
#[command(about = "Ephemeral key-exchange relay for cloakroom rooms")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:8787")]
    bind: String,

    /// Seconds a stored room stays readable
    #[arg(long, default_value = "3600")]
    room_ttl_secs: u64,

    /// Lookups allowed per client and room within one window
    #[arg(long, default_value = "10")]
    rate_limit_max: u32,

    /// Rate limit window in seconds
    #[arg(long, default_value = "3600")]
    rate_limit_window_secs: u64,

    /// Seconds between purges of expired rooms and counters
    #[arg(long, default_value = "60")]
    sweep_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn runtime_config(&self) -> ServerRuntimeConfig {
        ServerRuntimeConfig {
            bind_address: self.bind.clone(),
            relay: RelayConfig {
                room_ttl: Duration::from_secs(self.room_ttl_secs),
                rate_limit: RateLimitConfig {
                    max_attempts: self.rate_limit_max,
                    window: Duration::from_secs(self.rate_limit_window_secs),
                },
                sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Cloakroom relay starting");
    tracing::info!("Binding to {}", args.bind);

    let server = Server::bind(args.runtime_config()).await?;

    tracing::info!("Relay listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
