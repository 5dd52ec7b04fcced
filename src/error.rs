//! Error types used by the opvisor runtime and handlers.
//!
//! This module defines three error families:
//!
//! - [`ConfigError`] — invalid configuration, fatal to `subscribe`.
//! - [`ConsumerError`] — errors raised by the consumer runtime itself.
//! - [`HandlerError`] — the unified handler outcome channel: control
//!   signals (`Retry`/`Abort`) and uncaught faults.
//!
//! All types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// Minimum enforced retry delay.
///
/// A handler-supplied positive delay below this floor is clamped up to it.
/// A zero/absent delay means "retry with no enforced delay" and is never
/// clamped.
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// # Errors produced by configuration validation.
///
/// Raised by [`ConsumerConfig::validate`](crate::ConsumerConfig::validate)
/// before a subscription starts. Never retried automatically.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Connection string is missing or empty.
    #[error("missing operator url")]
    MissingUrl,

    /// Version is not a strict `major.minor.patch` string.
    #[error("invalid version {value:?}: expected major.minor.patch")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
    },

    /// Prefetch must be a positive integer.
    #[error("invalid prefetch {value}: must be >= 1")]
    InvalidPrefetch {
        /// The rejected prefetch value.
        value: usize,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use opvisor::ConfigError;
    ///
    /// let err = ConfigError::MissingUrl;
    /// assert_eq!(err.as_label(), "config_missing_url");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingUrl => "config_missing_url",
            ConfigError::InvalidVersion { .. } => "config_invalid_version",
            ConfigError::InvalidPrefetch { .. } => "config_invalid_prefetch",
        }
    }
}

/// # Errors produced by the consumer runtime.
///
/// These represent failures of the subscription lifecycle or violations of
/// internal invariants. A single task's failure is never reported through
/// this type; handler outcomes are settled locally by the processing loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// Configuration rejected at subscribe time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// More in-flight tasks observed than `prefetch` allows.
    ///
    /// Indicates a transport contract violation; internal fatal.
    #[error("admission violation: {in_flight} in flight, prefetch {prefetch}")]
    AdmissionViolation {
        /// Observed in-flight count.
        in_flight: usize,
        /// Configured bound.
        prefetch: usize,
    },

    /// Connecting to the operator failed.
    #[error("connect failed: {reason}")]
    Connect {
        /// Transport-supplied failure message.
        reason: String,
    },

    /// Tearing down the connection failed.
    #[error("teardown failed: {reason}")]
    Teardown {
        /// Transport-supplied failure message.
        reason: String,
    },

    /// Settling a delivery failed.
    ///
    /// Recovered locally by the processing loop (published as a
    /// `SettleFailed` event); redelivery is the bus's job.
    #[error("settle failed for tag {tag}: {reason}")]
    Settle {
        /// Delivery tag that could not be settled.
        tag: u64,
        /// Transport-supplied failure message.
        reason: String,
    },
}

impl ConsumerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use opvisor::ConsumerError;
    ///
    /// let err = ConsumerError::AdmissionViolation { in_flight: 3, prefetch: 2 };
    /// assert_eq!(err.as_label(), "consumer_admission_violation");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConsumerError::Config(_) => "consumer_config",
            ConsumerError::AdmissionViolation { .. } => "consumer_admission_violation",
            ConsumerError::Connect { .. } => "consumer_connect",
            ConsumerError::Teardown { .. } => "consumer_teardown",
            ConsumerError::Settle { .. } => "consumer_settle",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConsumerError::Config(e) => format!("config: {e}"),
            ConsumerError::AdmissionViolation { in_flight, prefetch } => {
                format!("admission violation: in_flight={in_flight} prefetch={prefetch}")
            }
            ConsumerError::Connect { reason } => format!("connect: {reason}"),
            ConsumerError::Teardown { reason } => format!("teardown: {reason}"),
            ConsumerError::Settle { tag, reason } => format!("settle tag={tag}: {reason}"),
        }
    }
}

/// # Unified handler outcome channel.
///
/// A handler returns `Result<Value, HandlerError>`. The `Err` side carries
/// both the cooperative control signals produced by
/// [`TaskContext::retry`](crate::TaskContext::retry) /
/// [`TaskContext::abort`](crate::TaskContext::abort) and uncaught faults.
/// The processing loop matches on this enum to pick the settle action;
/// nothing here ever propagates past the loop.
///
/// Control signals are non-local exits: `return Err(ctx.retry(None))` ends
/// the invocation, and no handler code after the `return` executes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Redeliver this task's current service step after `delay`.
    #[error("retry scheduled after {delay:?}")]
    Retry {
        /// Effective delay (already clamped to [`MIN_RETRY_DELAY`] if a
        /// smaller positive value was requested; zero = no enforced delay).
        delay: Duration,
    },

    /// Fail this service step immediately.
    ///
    /// Whether the overall task fails is the bus's fail-over decision.
    #[error("aborted: {}", reason.as_deref().unwrap_or("<no reason>"))]
    Abort {
        /// Optional human-readable reason reported to the bus.
        reason: Option<String>,
    },

    /// Any uncaught failure from handler code.
    ///
    /// Translated to an abort-with-reason settle action; the consumer
    /// process never crashes because of a single handler fault.
    #[error("handler fault: {error}")]
    Fault {
        /// The underlying error message.
        error: String,
    },
}

impl HandlerError {
    /// Creates a retry signal, clamping small positive delays.
    ///
    /// - `None` or `Some(0)` → no enforced delay;
    /// - `Some(d)` with `0 < d < 100ms` → clamped to 100ms;
    /// - `Some(d)` with `d >= 100ms` → kept as is.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use opvisor::HandlerError;
    ///
    /// let sig = HandlerError::retry(Some(Duration::from_millis(50)));
    /// assert_eq!(sig, HandlerError::Retry { delay: Duration::from_millis(100) });
    ///
    /// let sig = HandlerError::retry(None);
    /// assert_eq!(sig, HandlerError::Retry { delay: Duration::ZERO });
    /// ```
    pub fn retry(delay: Option<Duration>) -> Self {
        let delay = match delay {
            None => Duration::ZERO,
            Some(d) if d == Duration::ZERO => Duration::ZERO,
            Some(d) => d.max(MIN_RETRY_DELAY),
        };
        HandlerError::Retry { delay }
    }

    /// Creates an abort signal with an optional reason.
    pub fn abort(reason: Option<impl Into<String>>) -> Self {
        HandlerError::Abort {
            reason: reason.map(Into::into),
        }
    }

    /// Wraps any displayable error into a fault.
    pub fn fault(error: impl std::fmt::Display) -> Self {
        HandlerError::Fault {
            error: error.to_string(),
        }
    }

    /// True for the cooperative control signals (`Retry`/`Abort`).
    pub fn is_signal(&self) -> bool {
        matches!(self, HandlerError::Retry { .. } | HandlerError::Abort { .. })
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Retry { .. } => "handler_retry",
            HandlerError::Abort { .. } => "handler_abort",
            HandlerError::Fault { .. } => "handler_fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_clamps_small_positive_delay() {
        let sig = HandlerError::retry(Some(Duration::from_millis(1)));
        assert_eq!(
            sig,
            HandlerError::Retry {
                delay: MIN_RETRY_DELAY
            }
        );
    }

    #[test]
    fn retry_keeps_large_delay() {
        let sig = HandlerError::retry(Some(Duration::from_millis(500)));
        assert_eq!(
            sig,
            HandlerError::Retry {
                delay: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn retry_zero_and_absent_mean_no_delay() {
        for delay in [None, Some(Duration::ZERO)] {
            assert_eq!(
                HandlerError::retry(delay),
                HandlerError::Retry {
                    delay: Duration::ZERO
                }
            );
        }
    }

    #[test]
    fn abort_keeps_optional_reason() {
        assert_eq!(
            HandlerError::abort(Some("bad input")),
            HandlerError::Abort {
                reason: Some("bad input".into())
            }
        );
        assert_eq!(
            HandlerError::abort(None::<String>),
            HandlerError::Abort { reason: None }
        );
    }

    #[test]
    fn signals_are_signals_faults_are_not() {
        assert!(HandlerError::retry(None).is_signal());
        assert!(HandlerError::abort(None::<String>).is_signal());
        assert!(!HandlerError::fault("boom").is_signal());
    }
}
