//! Cloakroom core abstractions.
//!
//! Decouples room logic from system resources so the relay's TTL and rate
//! limit windows and the client's freshness window can be driven by a virtual
//! clock in tests, while production uses real time and OS randomness.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
mod system_env;

pub use env::Environment;
pub use system_env::SystemEnv;
