//! Relay configuration.

use std::time::Duration;

use crate::{error::ServerError, rate_limit::RateLimitConfig};

/// Longest TTL, window, or sweep interval the relay accepts.
///
/// Durations are added to the environment's clock, so unbounded values
/// would overflow the instant type.
pub const MAX_RELAY_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Relay policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// How long a stored wrapped key stays readable
    pub room_ttl: Duration,
    /// Lookup quota per client and room
    pub rate_limit: RateLimitConfig,
    /// Interval between housekeeping passes
    pub sweep_interval: Duration,
}

impl RelayConfig {
    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.room_ttl.is_zero() {
            return Err(ServerError::Config("room TTL must be positive".into()));
        }
        if self.rate_limit.max_attempts == 0 {
            return Err(ServerError::Config("rate limit must allow at least one lookup".into()));
        }
        if self.rate_limit.window.is_zero() {
            return Err(ServerError::Config("rate limit window must be positive".into()));
        }
        if self.sweep_interval.is_zero() {
            return Err(ServerError::Config("sweep interval must be positive".into()));
        }
        for (name, value) in [
            ("room TTL", self.room_ttl),
            ("rate limit window", self.rate_limit.window),
            ("sweep interval", self.sweep_interval),
        ] {
            if value > MAX_RELAY_DURATION {
                return Err(ServerError::Config(format!(
                    "{name} must not exceed {} seconds",
                    MAX_RELAY_DURATION.as_secs()
                )));
            }
        }
        Ok(())
    }

    /// Copy with every duration capped at [`MAX_RELAY_DURATION`].
    pub fn clamped(self) -> Self {
        Self {
            room_ttl: self.room_ttl.min(MAX_RELAY_DURATION),
            rate_limit: self.rate_limit.clamped(),
            sweep_interval: self.sweep_interval.min(MAX_RELAY_DURATION),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            room_ttl: Duration::from_secs(3600),
            rate_limit: RateLimitConfig::default(),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8787")
    pub bind_address: String,
    /// Relay policy
    pub relay: RelayConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:8787".to_string(), relay: RelayConfig::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.room_ttl, Duration::from_secs(3600));
        assert_eq!(config.rate_limit.max_attempts, 10);
        assert_eq!(config.rate_limit.window, Duration::from_secs(3600));
    }

    #[test]
    fn zero_ttl_rejected() {
        let config = RelayConfig { room_ttl: Duration::ZERO, ..RelayConfig::default() };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn zero_quota_rejected() {
        let config = RelayConfig {
            rate_limit: RateLimitConfig { max_attempts: 0, ..RateLimitConfig::default() },
            ..RelayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unbounded_durations_rejected() {
        let base = RelayConfig::default();
        let too_long = [
            RelayConfig { room_ttl: Duration::MAX, ..base },
            RelayConfig {
                rate_limit: RateLimitConfig { window: Duration::MAX, ..base.rate_limit },
                ..base
            },
            RelayConfig { sweep_interval: MAX_RELAY_DURATION + Duration::from_secs(1), ..base },
        ];

        for config in too_long {
            assert!(matches!(config.validate(), Err(ServerError::Config(_))), "{config:?}");
        }

        let at_limit = RelayConfig { room_ttl: MAX_RELAY_DURATION, ..base };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn clamped_caps_every_duration() {
        let config = RelayConfig {
            room_ttl: Duration::MAX,
            rate_limit: RateLimitConfig { max_attempts: 3, window: Duration::MAX },
            sweep_interval: Duration::MAX,
        }
        .clamped();

        assert_eq!(config.room_ttl, MAX_RELAY_DURATION);
        assert_eq!(config.rate_limit.window, MAX_RELAY_DURATION);
        assert_eq!(config.rate_limit.max_attempts, 3);
        assert_eq!(config.sweep_interval, MAX_RELAY_DURATION);
        assert!(config.validate().is_ok());
    }
}
