//! Recorded wrapper for result-set cursors.

use std::sync::Arc;

use crate::api::{ResultSet, ResultSetMetadata, Value};
use crate::error::Result;
use crate::event::{CallEvent, ObjectKind, OperationGuard};
use crate::id::ObjectId;
use crate::recorder::Recorder;

/// A recording wrapper around a driver [`ResultSet`].
///
/// When the cursor backs a query execution it carries the call event
/// opened by the statement that produced it and is the authority for
/// closing it: `close` (or drop) records the accumulated row count and
/// commits the event exactly once. Cursors without a backing call event
/// (generated keys) skip the call accounting but are still identified and
/// instrumented.
///
/// Row accounting: every advance that lands on a real row adds one;
/// `first`/`last` restart traversal and reset the counter; `previous`
/// never decrements.
pub struct RecordedResultSet {
    delegate: Box<dyn ResultSet>,
    recorder: Recorder,
    object_id: ObjectId,
    call: Option<Arc<CallEvent>>,
    closed: bool,
}

impl RecordedResultSet {
    pub(crate) fn new(recorder: Recorder, delegate: Box<dyn ResultSet>) -> Self {
        RecordedResultSet {
            delegate,
            recorder,
            object_id: ObjectId::next(),
            call: None,
            closed: false,
        }
    }

    pub(crate) fn with_call(
        recorder: Recorder,
        delegate: Box<dyn ResultSet>,
        call: Arc<CallEvent>,
    ) -> Self {
        RecordedResultSet {
            delegate,
            recorder,
            object_id: ObjectId::next(),
            call: Some(call),
            closed: false,
        }
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    // Borrows only the recorder field so the guard can stay open while
    // the delegate is used mutably.
    fn object_event<'r>(
        recorder: &'r Recorder,
        object_id: ObjectId,
        call: &Option<Arc<CallEvent>>,
        operation: &'static str,
    ) -> OperationGuard<'r> {
        recorder.object_operation(
            ObjectKind::ResultSet,
            operation,
            object_id,
            call.as_ref().map(|call| call.sql().clone()),
        )
    }

    fn add_rows(&self, rows: u64) {
        if let Some(call) = &self.call {
            call.add_rows(rows);
        }
    }

    /// Advance to the next row; a successful advance counts one fetched
    /// row on the call event.
    pub fn next(&mut self) -> Result<bool> {
        let _op = Self::object_event(&self.recorder, self.object_id, &self.call, "next");
        let advanced = self.delegate.next()?;
        if advanced {
            self.add_rows(1);
        }
        Ok(advanced)
    }

    /// Move back one row. Deliberately not accounted: rows revisited
    /// backwards were already counted when first fetched.
    pub fn previous(&mut self) -> Result<bool> {
        self.delegate.previous()
    }

    /// Jump to the first row, restarting row accounting.
    pub fn first(&mut self) -> Result<bool> {
        if let Some(call) = &self.call {
            call.reset_rows();
        }
        self.delegate.first()
    }

    /// Jump to the last row, restarting row accounting.
    pub fn last(&mut self) -> Result<bool> {
        if let Some(call) = &self.call {
            call.reset_rows();
        }
        self.delegate.last()
    }

    pub fn before_first(&mut self) -> Result<()> {
        self.delegate.before_first()
    }

    pub fn after_last(&mut self) -> Result<()> {
        self.delegate.after_last()
    }

    /// Reposition to an absolute row; landing on a real row (row >= 1)
    /// counts one fetched row.
    pub fn absolute(&mut self, row: i64) -> Result<bool> {
        let _op = Self::object_event(&self.recorder, self.object_id, &self.call, "absolute");
        let moved = self.delegate.absolute(row)?;
        if moved && row >= 1 {
            self.add_rows(1);
        }
        Ok(moved)
    }

    /// Reposition relative to the current row; landing on a real row
    /// counts one fetched row.
    pub fn relative(&mut self, delta: i64) -> Result<bool> {
        let _op = Self::object_event(&self.recorder, self.object_id, &self.call, "relative");
        let moved = self.delegate.relative(delta)?;
        if moved {
            self.add_rows(1);
        }
        Ok(moved)
    }

    pub fn row(&self) -> Result<u64> {
        self.delegate.row()
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.delegate.get_bool(index)
    }

    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.delegate.get_i64(index)
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.delegate.get_f64(index)
    }

    pub fn get_text(&self, index: usize) -> Result<String> {
        self.delegate.get_text(index)
    }

    pub fn get_bytes(&self, index: usize) -> Result<Vec<u8>> {
        self.delegate.get_bytes(index)
    }

    pub fn get_value(&self, index: usize) -> Result<Value> {
        self.delegate.get_value(index)
    }

    pub fn was_null(&self) -> Result<bool> {
        self.delegate.was_null()
    }

    pub fn metadata(&self) -> Result<ResultSetMetadata> {
        let _op = Self::object_event(&self.recorder, self.object_id, &self.call, "metadata");
        self.delegate.metadata()
    }

    pub fn set_fetch_size(&mut self, rows: usize) -> Result<()> {
        self.delegate.set_fetch_size(rows)
    }

    pub fn fetch_size(&self) -> Result<usize> {
        self.delegate.fetch_size()
    }

    pub fn warnings(&mut self) -> Result<Option<String>> {
        self.delegate.warnings()
    }

    /// Close the cursor, committing the backing call event if still open.
    /// A second close never recommits.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            if let Some(call) = self.call.take() {
                call.close();
            }
        }
        self.delegate.close()
    }

    pub fn is_closed(&self) -> Result<bool> {
        self.delegate.is_closed()
    }
}

impl std::fmt::Debug for RecordedResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedResultSet")
            .field("object_id", &self.object_id)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
