//! Configuration for what committed events carry.

use std::time::Duration;

/// Configuration options applied when events are committed.
///
/// # Example
///
/// ```rust
/// use sql_recorder::RecorderConfig;
/// use std::time::Duration;
///
/// let config = RecorderConfig::default()
///     .with_sql_recording(true)
///     .with_slow_call_threshold(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Whether to include SQL text in committed events.
    /// Default: `false` (queries may embed sensitive literals)
    pub record_sql: bool,

    /// Whether call events carry their accumulated row count.
    /// Default: `true`
    pub record_row_counts: bool,

    /// Calls slower than this additionally raise a `tracing` warning.
    /// Default: 500ms
    pub slow_call_threshold: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            record_sql: false,
            record_row_counts: true,
            slow_call_threshold: Duration::from_millis(500),
        }
    }
}

impl RecorderConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable SQL text in committed events.
    ///
    /// **Security Warning**: SQL text may expose sensitive data to the
    /// telemetry backend when queries inline credentials or PII.
    pub fn with_sql_recording(mut self, enabled: bool) -> Self {
        self.record_sql = enabled;
        self
    }

    /// Enable or disable row counts on call events.
    pub fn with_row_count_recording(mut self, enabled: bool) -> Self {
        self.record_row_counts = enabled;
        self
    }

    /// Set the threshold above which a call is flagged as slow.
    pub fn with_slow_call_threshold(mut self, threshold: Duration) -> Self {
        self.slow_call_threshold = threshold;
        self
    }

    /// A development-friendly configuration that records everything.
    ///
    /// **Warning**: records all SQL; not intended for production.
    pub fn development() -> Self {
        Self {
            record_sql: true,
            record_row_counts: true,
            slow_call_threshold: Duration::from_millis(100),
        }
    }

    /// A production-safe configuration that omits SQL text.
    pub fn production() -> Self {
        Self {
            record_sql: false,
            record_row_counts: true,
            slow_call_threshold: Duration::from_secs(1),
        }
    }
}
