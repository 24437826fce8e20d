//! Recorded wrappers for prepared and callable statements.

use std::sync::Arc;

use crate::api::{CallableStatement, PreparedStatement, ResultSetMetadata, Value, ValueType};
use crate::connection::RecordedConnection;
use crate::error::Result;
use crate::event::{CallEvent, ObjectKind, OperationGuard};
use crate::id::ObjectId;
use crate::recorder::Recorder;
use crate::result_set::RecordedResultSet;

/// A recording wrapper around a driver [`PreparedStatement`].
///
/// Owns the call event opened when the statement was prepared. The event
/// is handed to every result set the statement produces and closed exactly
/// once by whichever of {result-set close, statement close, parameter
/// clearing} happens first. Clearing parameters accounts a reused prepared
/// statement as a fresh logical call with the same SQL.
///
/// Parameter binders forward with no instrumentation; event volume stays
/// proportional to executions, not to bind chatter.
pub struct RecordedPreparedStatement<'conn> {
    delegate: Box<dyn PreparedStatement>,
    conn: &'conn RecordedConnection,
    object_id: ObjectId,
    call: Arc<CallEvent>,
    closed: bool,
}

impl<'conn> RecordedPreparedStatement<'conn> {
    pub(crate) fn new(
        conn: &'conn RecordedConnection,
        delegate: Box<dyn PreparedStatement>,
        call: Arc<CallEvent>,
    ) -> Self {
        RecordedPreparedStatement {
            delegate,
            conn,
            object_id: ObjectId::next(),
            call,
            closed: false,
        }
    }

    /// The connection this statement belongs to.
    pub fn connection(&self) -> &RecordedConnection {
        self.conn
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// The SQL text this statement was prepared with.
    pub fn sql(&self) -> &str {
        self.call.sql()
    }

    fn recorder(&self) -> &'conn Recorder {
        self.conn.recorder()
    }

    // The guard borrows the connection's recorder, not `self`, so it can
    // stay open across `&mut self` delegate calls.
    fn object_event(&self, operation: &'static str) -> OperationGuard<'conn> {
        self.recorder().object_operation(
            ObjectKind::PreparedStatement,
            operation,
            self.object_id,
            Some(self.call.sql().clone()),
        )
    }

    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        self.delegate.bind_null(index)
    }

    pub fn bind_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.delegate.bind_bool(index, value)
    }

    pub fn bind_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.delegate.bind_i64(index, value)
    }

    pub fn bind_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.delegate.bind_f64(index, value)
    }

    pub fn bind_text(&mut self, index: usize, value: &str) -> Result<()> {
        self.delegate.bind_text(index, value)
    }

    pub fn bind_bytes(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.delegate.bind_bytes(index, value)
    }

    /// Clear bound parameters, closing the current call event and opening
    /// a fresh one with the same SQL: re-binding starts a new logical call
    /// rather than extending the previous one.
    pub fn clear_parameters(&mut self) -> Result<()> {
        if !self.closed {
            self.call.close();
            self.call = CallEvent::begin(self.recorder().clone(), self.call.sql().clone());
        }
        self.delegate.clear_parameters()
    }

    /// Execute the statement and wrap the cursor it produces.
    ///
    /// The call event travels with the result set, which becomes the
    /// authority for closing it.
    pub fn execute_query(&mut self) -> Result<RecordedResultSet> {
        let _op = self.object_event("execute_query");
        let result_set = self.delegate.execute_query()?;
        Ok(RecordedResultSet::with_call(
            self.recorder().clone(),
            result_set,
            self.call.clone(),
        ))
    }

    pub fn execute(&mut self) -> Result<bool> {
        let _op = self.object_event("execute");
        self.delegate.execute()
    }

    /// Execute an update, accounting the affected rows on the call event.
    pub fn execute_update(&mut self) -> Result<u64> {
        let _op = self.object_event("execute_update");
        let affected = self.delegate.execute_update()?;
        self.call.add_rows(affected);
        Ok(affected)
    }

    pub fn add_batch(&mut self) -> Result<()> {
        self.delegate.add_batch()
    }

    /// Execute the accumulated batch, adding the per-statement update
    /// counts to the call event directly.
    pub fn execute_batch(&mut self) -> Result<Vec<u64>> {
        let _op = self.object_event("execute_batch");
        let counts = self.delegate.execute_batch()?;
        self.call.add_rows(counts.iter().sum());
        Ok(counts)
    }

    pub fn metadata(&self) -> Result<ResultSetMetadata> {
        let _op = self.object_event("metadata");
        self.delegate.metadata()
    }

    pub fn parameter_count(&self) -> Result<usize> {
        let _op = self.object_event("parameter_count");
        self.delegate.parameter_count()
    }

    pub fn warnings(&mut self) -> Result<Option<String>> {
        let _op = self.object_event("warnings");
        self.delegate.warnings()
    }

    /// Close the statement, committing its call event if still open.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.call.close();
        }
        self.delegate.close()
    }

    pub fn is_closed(&self) -> Result<bool> {
        self.delegate.is_closed()
    }
}

impl std::fmt::Debug for RecordedPreparedStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedPreparedStatement")
            .field("object_id", &self.object_id)
            .field("sql", &self.sql())
            .finish_non_exhaustive()
    }
}

/// A recording wrapper around a driver [`CallableStatement`].
///
/// Same correlation and lifecycle rules as
/// [`RecordedPreparedStatement`]; output-parameter registration and
/// retrieval forward uninstrumented.
pub struct RecordedCallableStatement<'conn> {
    delegate: Box<dyn CallableStatement>,
    conn: &'conn RecordedConnection,
    object_id: ObjectId,
    call: Arc<CallEvent>,
    closed: bool,
}

impl<'conn> RecordedCallableStatement<'conn> {
    pub(crate) fn new(
        conn: &'conn RecordedConnection,
        delegate: Box<dyn CallableStatement>,
        call: Arc<CallEvent>,
    ) -> Self {
        RecordedCallableStatement {
            delegate,
            conn,
            object_id: ObjectId::next(),
            call,
            closed: false,
        }
    }

    /// The connection this statement belongs to.
    pub fn connection(&self) -> &RecordedConnection {
        self.conn
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// The SQL text this call was prepared with.
    pub fn sql(&self) -> &str {
        self.call.sql()
    }

    fn recorder(&self) -> &'conn Recorder {
        self.conn.recorder()
    }

    fn object_event(&self, operation: &'static str) -> OperationGuard<'conn> {
        self.recorder().object_operation(
            ObjectKind::CallableStatement,
            operation,
            self.object_id,
            Some(self.call.sql().clone()),
        )
    }

    pub fn register_out_parameter(&mut self, index: usize, ty: ValueType) -> Result<()> {
        self.delegate.register_out_parameter(index, ty)
    }

    pub fn out_value(&self, index: usize) -> Result<Value> {
        self.delegate.out_value(index)
    }

    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        self.delegate.bind_null(index)
    }

    pub fn bind_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.delegate.bind_bool(index, value)
    }

    pub fn bind_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.delegate.bind_i64(index, value)
    }

    pub fn bind_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.delegate.bind_f64(index, value)
    }

    pub fn bind_text(&mut self, index: usize, value: &str) -> Result<()> {
        self.delegate.bind_text(index, value)
    }

    pub fn bind_bytes(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.delegate.bind_bytes(index, value)
    }

    /// Same re-execution accounting as
    /// [`RecordedPreparedStatement::clear_parameters`].
    pub fn clear_parameters(&mut self) -> Result<()> {
        if !self.closed {
            self.call.close();
            self.call = CallEvent::begin(self.recorder().clone(), self.call.sql().clone());
        }
        self.delegate.clear_parameters()
    }

    pub fn execute_query(&mut self) -> Result<RecordedResultSet> {
        let _op = self.object_event("execute_query");
        let result_set = self.delegate.execute_query()?;
        Ok(RecordedResultSet::with_call(
            self.recorder().clone(),
            result_set,
            self.call.clone(),
        ))
    }

    pub fn execute(&mut self) -> Result<bool> {
        let _op = self.object_event("execute");
        self.delegate.execute()
    }

    pub fn execute_update(&mut self) -> Result<u64> {
        let _op = self.object_event("execute_update");
        let affected = self.delegate.execute_update()?;
        self.call.add_rows(affected);
        Ok(affected)
    }

    pub fn add_batch(&mut self) -> Result<()> {
        self.delegate.add_batch()
    }

    pub fn execute_batch(&mut self) -> Result<Vec<u64>> {
        let _op = self.object_event("execute_batch");
        let counts = self.delegate.execute_batch()?;
        self.call.add_rows(counts.iter().sum());
        Ok(counts)
    }

    pub fn metadata(&self) -> Result<ResultSetMetadata> {
        let _op = self.object_event("metadata");
        self.delegate.metadata()
    }

    pub fn parameter_count(&self) -> Result<usize> {
        let _op = self.object_event("parameter_count");
        self.delegate.parameter_count()
    }

    pub fn warnings(&mut self) -> Result<Option<String>> {
        let _op = self.object_event("warnings");
        self.delegate.warnings()
    }

    /// Close the statement, committing its call event if still open.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.call.close();
        }
        self.delegate.close()
    }

    pub fn is_closed(&self) -> Result<bool> {
        self.delegate.is_closed()
    }
}

impl std::fmt::Debug for RecordedCallableStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedCallableStatement")
            .field("object_id", &self.object_id)
            .field("sql", &self.sql())
            .finish_non_exhaustive()
    }
}
