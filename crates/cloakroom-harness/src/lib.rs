//! Deterministic test harness for cloakroom.
//!
//! [`SimEnv`] replaces wall-clock time and OS randomness with a manually
//! advanced clock and a seeded RNG, so TTL, rate-limit and freshness
//! behaviour can be exercised without waiting. [`SimRelay`] runs the real
//! relay router in-process behind the client's [`RelayTransport`] seam.
//!
//! [`RelayTransport`]: cloakroom_client::RelayTransport

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_env;
pub mod sim_relay;

pub use sim_env::SimEnv;
pub use sim_relay::{FailingTransport, SIM_RELAY_URL, SimRelay, SimRoomStore};
