//! Resolver configuration.
//!
//! Environment variables:
//! - `VOLMETA_API_TIMEOUT_SECS`: deadline in whole seconds applied to every
//!   cluster API call. Defaults to `30`; zero or unparsable values fall back
//!   to the default.

use std::sync::LazyLock;
use std::time::Duration;

/// Environment variable holding the API call deadline in seconds.
pub const API_TIMEOUT_ENV: &str = "VOLMETA_API_TIMEOUT_SECS";

const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by all live-API queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Deadline for a single claim or volume fetch.
    pub api_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_timeout: DEFAULT_API_TIMEOUT,
        }
    }
}

impl ResolverConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_timeout_value(std::env::var(API_TIMEOUT_ENV).ok().as_deref())
    }

    fn from_timeout_value(value: Option<&str>) -> Self {
        let api_timeout = value
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_API_TIMEOUT);
        Self { api_timeout }
    }
}

/// Globally initialized resolver configuration, read from the environment at
/// first access.
pub static RESOLVER_CONFIG: LazyLock<ResolverConfig> = LazyLock::new(ResolverConfig::from_env);
