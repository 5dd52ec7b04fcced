//! # Consumer configuration.
//!
//! Provides [`ConsumerConfig`], the fully-resolved settings a subscription
//! starts from. Resolution from environment-like sources happens outside
//! this crate; `subscribe` only validates what it is given.
//!
//! ## Field semantics
//! - `url`: operator connection string (must be non-empty)
//! - `version`: protocol version, strict `major.minor.patch`
//! - `prefetch`: max tasks processed concurrently (`>= 1`, default 1)
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)

use crate::error::ConfigError;

/// Fully-resolved configuration for one consumer instance.
///
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    /// Operator connection string.
    pub url: String,

    /// Protocol version as a semantic version string (`major.minor.patch`).
    pub version: String,

    /// Maximum number of tasks processed concurrently.
    ///
    /// This is a hard bound: the intake path never requests another
    /// delivery while `prefetch` slots are taken.
    pub prefetch: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow observers that lag behind more than `bus_capacity` events will
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl ConsumerConfig {
    /// Creates a configuration with the given connection parameters and
    /// default runtime settings.
    pub fn new(url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Checks, in order: `url` non-empty, `version` a strict
    /// `major.minor.patch` numeric triple, `prefetch >= 1`.
    ///
    /// # Example
    /// ```
    /// use opvisor::{ConsumerConfig, ConfigError};
    ///
    /// let cfg = ConsumerConfig::new("operator://localhost", "1.2.3");
    /// assert!(cfg.validate().is_ok());
    ///
    /// let bad = ConsumerConfig::new("operator://localhost", "1.2");
    /// assert!(matches!(bad.validate(), Err(ConfigError::InvalidVersion { .. })));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if !is_semver_triple(&self.version) {
            return Err(ConfigError::InvalidVersion {
                value: self.version.clone(),
            });
        }
        if self.prefetch == 0 {
            return Err(ConfigError::InvalidPrefetch {
                value: self.prefetch,
            });
        }
        Ok(())
    }

    /// Returns a new config with the given prefetch bound.
    pub fn with_prefetch(mut self, prefetch: usize) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    ///
    /// The `Bus` should use this value to avoid constructing an invalid
    /// channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ConsumerConfig {
    /// Default configuration:
    ///
    /// - `url = ""` (must be supplied before `subscribe`)
    /// - `version = ""` (must be supplied before `subscribe`)
    /// - `prefetch = 1` (serial processing)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            url: String::new(),
            version: String::new(),
            prefetch: 1,
            bus_capacity: 1024,
        }
    }
}

/// True if `s` is exactly three dot-separated non-empty decimal components.
fn is_semver_triple(s: &str) -> bool {
    let mut parts = 0usize;
    for part in s.split('.') {
        parts += 1;
        if parts > 3 || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    parts == 3
}
