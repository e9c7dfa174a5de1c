//! Readiness and wake-signal tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the readiness controller and wake-on-LAN emitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvConfig {
    /// Maximum attempts for `turn_on` / `wake_until_ready` loops.
    pub wake_until_ready_attempts: u32,
    /// Broadcast address the magic packets are sent to.
    pub broadcast_address: String,
    /// Number of magic packets emitted per failed attempt.
    pub wake_requests: u32,
    /// Constant wait between attempts, in milliseconds. No jitter, no backoff.
    pub wake_timeout_ms: u64,
}

impl TvConfig {
    /// Wait between readiness attempts as a [`Duration`].
    pub fn wake_timeout(&self) -> Duration {
        Duration::from_millis(self.wake_timeout_ms)
    }
}

impl Default for TvConfig {
    fn default() -> Self {
        Self {
            wake_until_ready_attempts: 100,
            broadcast_address: "255.255.255.255".to_string(),
            wake_requests: 1,
            wake_timeout_ms: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_firmware_expectations() {
        let config = TvConfig::default();
        assert_eq!(config.wake_until_ready_attempts, 100);
        assert_eq!(config.broadcast_address, "255.255.255.255");
        assert_eq!(config.wake_requests, 1);
        assert_eq!(config.wake_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_roundtrips_through_json() {
        let config = TvConfig {
            wake_until_ready_attempts: 5,
            broadcast_address: "192.168.1.255".to_string(),
            wake_requests: 3,
            wake_timeout_ms: 250,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TvConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.wake_requests, 3);
        assert_eq!(back.broadcast_address, "192.168.1.255");
    }
}
