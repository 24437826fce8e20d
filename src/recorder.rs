//! The recorder handle shared by all proxies of a wrapped object tree.

use std::sync::Arc;

use crate::config::RecorderConfig;
use crate::event::{Event, ObjectKind, OperationGuard, SavepointGuard};
use crate::id::ObjectId;
use crate::sink::{EventSink, TracingSink};

/// Cheaply cloneable handle bundling an [`EventSink`] with a
/// [`RecorderConfig`].
///
/// A connection proxy and every statement and result-set proxy descended
/// from it share clones of one recorder. Configuration is applied at
/// commit time: SQL text and row counts are stripped when disabled, and
/// calls slower than the configured threshold raise a `tracing` warning.
#[derive(Clone)]
pub struct Recorder {
    sink: Arc<dyn EventSink>,
    config: Arc<RecorderConfig>,
}

impl Recorder {
    /// Create a recorder committing to `sink` under `config`.
    pub fn new(sink: Arc<dyn EventSink>, config: RecorderConfig) -> Self {
        Recorder {
            sink,
            config: Arc::new(config),
        }
    }

    /// Recorder with the [`TracingSink`] and default configuration.
    pub fn with_defaults() -> Self {
        Recorder::new(Arc::new(TracingSink::new()), RecorderConfig::default())
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub(crate) fn operation(
        &self,
        object: ObjectKind,
        operation: &'static str,
        sql: Option<Arc<str>>,
    ) -> OperationGuard<'_> {
        OperationGuard::begin(self, object, operation, None, sql)
    }

    pub(crate) fn object_operation(
        &self,
        object: ObjectKind,
        operation: &'static str,
        object_id: ObjectId,
        sql: Option<Arc<str>>,
    ) -> OperationGuard<'_> {
        OperationGuard::begin(self, object, operation, Some(object_id), sql)
    }

    pub(crate) fn savepoint(&self, operation: &'static str) -> SavepointGuard<'_> {
        SavepointGuard::begin(self, operation)
    }

    pub(crate) fn commit(&self, mut event: Event) {
        if !self.config.record_sql {
            match &mut event {
                Event::Operation(record) => record.sql = None,
                Event::Object(record) => record.sql = None,
                Event::Call(record) => record.sql = None,
                Event::Savepoint(_) => {}
            }
        }

        if let Event::Call(record) = &mut event {
            if !self.config.record_row_counts {
                record.row_count = None;
            }
            if record.duration > self.config.slow_call_threshold {
                tracing::warn!(
                    db.statement = record.sql.as_deref().unwrap_or(""),
                    duration_us = record.duration.as_micros() as u64,
                    threshold_us = self.config.slow_call_threshold.as_micros() as u64,
                    "slow call"
                );
            }
        }

        self.sink.commit(event);
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
