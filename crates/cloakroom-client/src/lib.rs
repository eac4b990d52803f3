//! Client
//!
//! Client side of cloakroom: tracks which room key is active for which
//! conversation, talks to the key-exchange relay, and decides per message
//! whether to envelope, decrypt or leave it alone.
//!
//! # Components
//!
//! - [`SessionStore`]: conversation → room key map with change listeners
//! - [`RelayClient`]: `POST /room` / `GET /room/{code}` over a [`RelayTransport`]
//! - [`RoomManager`]: create/join/leave flows tying crypto, relay and sessions
//! - [`MessageGate`]: outbound enveloping and inbound freshness-gated decryption
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, [`transport::HttpTransport`]
//! implements [`RelayTransport`] with reqwest.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod gate;
mod relay;
mod rooms;
mod session;

#[cfg(test)]
mod testing;

#[cfg(feature = "transport")]
pub mod transport;

pub use cloakroom_core::{Environment, SystemEnv};
pub use cloakroom_crypto::RoomKey;
pub use cloakroom_proto::RoomCode;
pub use config::{ClientConfig, DEFAULT_FRESHNESS_WINDOW};
pub use error::ClientError;
pub use gate::{InboundMessage, MessageGate};
pub use relay::{HttpMethod, RelayClient, RelayTransport, TRANSPORT_FAILURE_STATUS, TransportResponse};
pub use rooms::RoomManager;
pub use session::{SessionStore, Subscription};
