//! Event shapes and the scoped lifecycles that produce them.
//!
//! Transient events (operation, object, savepoint) cover a single proxy
//! method: a guard starts timing when the proxy begins the call and ends
//! and commits the event when it goes out of scope, so a delegate error
//! still yields one complete, correctly timed event.
//!
//! A [`CallEvent`] instead spans a whole logical SQL execution. It is
//! shared between the statement proxy that opened it and the result-set
//! proxy it is handed to, and closes exactly once no matter which side
//! (or which exit path) gets there first.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::id::ObjectId;
use crate::recorder::Recorder;

/// The API role a proxied object plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    DataSource,
    Connection,
    Statement,
    PreparedStatement,
    CallableStatement,
    ResultSet,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::DataSource => "data_source",
            ObjectKind::Connection => "connection",
            ObjectKind::Statement => "statement",
            ObjectKind::PreparedStatement => "prepared_statement",
            ObjectKind::CallableStatement => "callable_statement",
            ObjectKind::ResultSet => "result_set",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed telemetry event.
#[derive(Debug, Clone)]
pub enum Event {
    /// A single API call on a role without an object identity.
    Operation(OperationRecord),
    /// A single API call scoped to one long-lived object.
    Object(ObjectRecord),
    /// One logical SQL execution, from preparation to cursor exhaustion.
    Call(CallRecord),
    /// A savepoint create, rollback or release.
    Savepoint(SavepointRecord),
}

#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub object: ObjectKind,
    pub operation: &'static str,
    pub sql: Option<Arc<str>>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub object: ObjectKind,
    pub operation: &'static str,
    pub object_id: ObjectId,
    /// Last-known SQL text for the object, when it has one.
    pub sql: Option<Arc<str>>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub sql: Option<Arc<str>>,
    /// Rows fetched or affected. `None` when row counts are not recorded.
    pub row_count: Option<u64>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct SavepointRecord {
    /// `create`, `rollback` or `release`.
    pub operation: &'static str,
    pub name: Option<String>,
    pub id: Option<i64>,
    pub duration: Duration,
}

/// An open call event for one logical SQL execution.
///
/// Opened when a statement is prepared or an immediate query is executed,
/// and shared with the result set the execution produces. The row counter
/// is widened to `u64` so batch updates cannot overflow it, and only
/// moves while the event is open. `close` commits exactly once; the
/// `Drop` impl covers executions abandoned on an error path.
pub(crate) struct CallEvent {
    recorder: Recorder,
    sql: Arc<str>,
    started: Instant,
    rows: AtomicU64,
    closed: AtomicBool,
}

impl CallEvent {
    /// Open a call event for `sql`, starting its clock now.
    pub(crate) fn begin(recorder: Recorder, sql: Arc<str>) -> Arc<Self> {
        Arc::new(CallEvent {
            recorder,
            sql,
            started: Instant::now(),
            rows: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    pub(crate) fn sql(&self) -> &Arc<str> {
        &self.sql
    }

    /// Add fetched or affected rows. Ignored once the event is closed.
    pub(crate) fn add_rows(&self, rows: u64) {
        if !self.closed.load(Ordering::Acquire) {
            self.rows.fetch_add(rows, Ordering::Relaxed);
        }
    }

    /// Restart row accounting; cursor traversal is starting over.
    pub(crate) fn reset_rows(&self) {
        if !self.closed.load(Ordering::Acquire) {
            self.rows.store(0, Ordering::Relaxed);
        }
    }

    /// End and commit the event. Later calls are no-ops.
    pub(crate) fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.recorder.commit(Event::Call(CallRecord {
                sql: Some(self.sql.clone()),
                row_count: Some(self.rows.load(Ordering::Relaxed)),
                duration: self.started.elapsed(),
            }));
        }
    }
}

impl Drop for CallEvent {
    fn drop(&mut self) {
        self.close();
    }
}

/// Scoped lifecycle for an operation or object event.
///
/// Timing starts at construction; dropping the guard ends the event and
/// commits it, on every exit path.
pub(crate) struct OperationGuard<'r> {
    recorder: &'r Recorder,
    object: ObjectKind,
    operation: &'static str,
    object_id: Option<ObjectId>,
    sql: Option<Arc<str>>,
    started: Instant,
}

impl<'r> OperationGuard<'r> {
    pub(crate) fn begin(
        recorder: &'r Recorder,
        object: ObjectKind,
        operation: &'static str,
        object_id: Option<ObjectId>,
        sql: Option<Arc<str>>,
    ) -> Self {
        OperationGuard {
            recorder,
            object,
            operation,
            object_id,
            sql,
            started: Instant::now(),
        }
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        let duration = self.started.elapsed();
        let event = match self.object_id {
            Some(object_id) => Event::Object(ObjectRecord {
                object: self.object,
                operation: self.operation,
                object_id,
                sql: self.sql.take(),
                duration,
            }),
            None => Event::Operation(OperationRecord {
                object: self.object,
                operation: self.operation,
                sql: self.sql.take(),
                duration,
            }),
        };
        self.recorder.commit(event);
    }
}

/// Scoped lifecycle for a savepoint event.
///
/// The name or id is filled in by the caller once known; commit happens
/// on drop regardless of how the savepoint operation exits.
pub(crate) struct SavepointGuard<'r> {
    recorder: &'r Recorder,
    operation: &'static str,
    name: Option<String>,
    id: Option<i64>,
    started: Instant,
}

impl<'r> SavepointGuard<'r> {
    pub(crate) fn begin(recorder: &'r Recorder, operation: &'static str) -> Self {
        SavepointGuard {
            recorder,
            operation,
            name: None,
            id: None,
            started: Instant::now(),
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Drop for SavepointGuard<'_> {
    fn drop(&mut self) {
        self.recorder.commit(Event::Savepoint(SavepointRecord {
            operation: self.operation,
            name: self.name.take(),
            id: self.id.take(),
            duration: self.started.elapsed(),
        }));
    }
}
