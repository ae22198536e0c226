//! Core runtime configuration.
//!
//! # Invariants
//! - `storage_prefix` is non-empty and free of whitespace.
//! - `scan_interval` is non-zero (a zero period would spin the scanner).

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_STORAGE_PREFIX: &str = "app_data_";
pub const DEFAULT_STORE_LATENCY: Duration = Duration::from_millis(300);
pub const DEFAULT_AUTH_LATENCY: Duration = Duration::from_millis(800);
pub const DEFAULT_GUEST_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyStoragePrefix,
    InvalidStoragePrefix(String),
    ZeroScanInterval,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStoragePrefix => write!(f, "storage prefix cannot be empty"),
            Self::InvalidStoragePrefix(value) => {
                write!(f, "storage prefix must not contain whitespace: `{value}`")
            }
            Self::ZeroScanInterval => write!(f, "scan interval must be greater than zero"),
        }
    }
}

impl Error for ConfigError {}

/// Latencies, key layout and scan cadence shared by store, session and
/// scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Prefix of every collection key (`{prefix}{team}_{kind}`).
    pub storage_prefix: String,
    /// Artificial delay applied to every store operation.
    pub store_latency: Duration,
    /// Artificial delay applied to register/login.
    pub auth_latency: Duration,
    /// Artificial delay applied to guest login.
    pub guest_latency: Duration,
    /// Period between deadline scans.
    pub scan_interval: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            store_latency: DEFAULT_STORE_LATENCY,
            auth_latency: DEFAULT_AUTH_LATENCY,
            guest_latency: DEFAULT_GUEST_LATENCY,
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

impl CoreConfig {
    /// Same configuration with every artificial latency removed.
    pub fn without_latency(mut self) -> Self {
        self.store_latency = Duration::ZERO;
        self.auth_latency = Duration::ZERO;
        self.guest_latency = Duration::ZERO;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_prefix.is_empty() {
            return Err(ConfigError::EmptyStoragePrefix);
        }
        if self.storage_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidStoragePrefix(self.storage_prefix.clone()));
        }
        if self.scan_interval.is_zero() {
            return Err(ConfigError::ZeroScanInterval);
        }
        Ok(())
    }
}
