//! Recorded wrapper for immediate-SQL statements.

use std::sync::Arc;
use std::time::Duration;

use crate::api::Statement;
use crate::connection::RecordedConnection;
use crate::error::Result;
use crate::event::{CallEvent, ObjectKind, OperationGuard};
use crate::id::ObjectId;
use crate::result_set::RecordedResultSet;

/// A recording wrapper around a driver [`Statement`].
///
/// Carries a process-unique [`ObjectId`] so events from different calls on
/// the same statement can be correlated, and remembers the last SQL text it
/// saw so object events can report it. A call event opened by
/// [`execute_query`](RecordedStatement::execute_query) is handed wholly to
/// the produced result set, which closes it.
pub struct RecordedStatement<'conn> {
    delegate: Box<dyn Statement>,
    conn: &'conn RecordedConnection,
    object_id: ObjectId,
    last_sql: Option<Arc<str>>,
}

impl<'conn> RecordedStatement<'conn> {
    pub(crate) fn new(conn: &'conn RecordedConnection, delegate: Box<dyn Statement>) -> Self {
        RecordedStatement {
            delegate,
            conn,
            object_id: ObjectId::next(),
            last_sql: None,
        }
    }

    /// The connection this statement belongs to.
    pub fn connection(&self) -> &RecordedConnection {
        self.conn
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    // The guard borrows the connection's recorder, not `self`, so it can
    // stay open across `&mut self` delegate calls.
    fn object_event(&self, operation: &'static str) -> OperationGuard<'conn> {
        self.conn.recorder().object_operation(
            ObjectKind::Statement,
            operation,
            self.object_id,
            self.last_sql.clone(),
        )
    }

    /// Execute `sql` and wrap the cursor it produces.
    ///
    /// Opens a call event for the execution and hands it to the result
    /// set; the raw driver cursor never reaches the caller.
    pub fn execute_query(&mut self, sql: &str) -> Result<RecordedResultSet> {
        let sql: Arc<str> = Arc::from(sql);
        self.last_sql = Some(sql.clone());
        let recorder = self.conn.recorder();
        let call = CallEvent::begin(recorder.clone(), sql.clone());
        let _op = recorder.object_operation(
            ObjectKind::Statement,
            "execute_query",
            self.object_id,
            Some(sql.clone()),
        );
        let result_set = self.delegate.execute_query(&sql)?;
        Ok(RecordedResultSet::with_call(
            recorder.clone(),
            result_set,
            call,
        ))
    }

    pub fn execute(&mut self, sql: &str) -> Result<bool> {
        let sql: Arc<str> = Arc::from(sql);
        self.last_sql = Some(sql.clone());
        let _op = self.conn.recorder().object_operation(
            ObjectKind::Statement,
            "execute",
            self.object_id,
            Some(sql.clone()),
        );
        self.delegate.execute(&sql)
    }

    pub fn execute_update(&mut self, sql: &str) -> Result<u64> {
        let sql: Arc<str> = Arc::from(sql);
        self.last_sql = Some(sql.clone());
        let _op = self.conn.recorder().object_operation(
            ObjectKind::Statement,
            "execute_update",
            self.object_id,
            Some(sql.clone()),
        );
        self.delegate.execute_update(&sql)
    }

    pub fn add_batch(&mut self, sql: &str) -> Result<()> {
        let sql: Arc<str> = Arc::from(sql);
        self.last_sql = Some(sql.clone());
        let _op = self.conn.recorder().object_operation(
            ObjectKind::Statement,
            "add_batch",
            self.object_id,
            Some(sql.clone()),
        );
        self.delegate.add_batch(&sql)
    }

    pub fn clear_batch(&mut self) -> Result<()> {
        self.delegate.clear_batch()
    }

    pub fn execute_batch(&mut self) -> Result<Vec<u64>> {
        self.delegate.execute_batch()
    }

    /// Retrieve the keys generated by the last update, wrapped.
    pub fn generated_keys(&mut self) -> Result<RecordedResultSet> {
        let _op = self.object_event("generated_keys");
        let result_set = self.delegate.generated_keys()?;
        Ok(RecordedResultSet::new(
            self.conn.recorder().clone(),
            result_set,
        ))
    }

    pub fn more_results(&mut self) -> Result<bool> {
        let _op = self.object_event("more_results");
        self.delegate.more_results()
    }

    pub fn update_count(&self) -> Result<Option<u64>> {
        self.delegate.update_count()
    }

    pub fn warnings(&mut self) -> Result<Option<String>> {
        let _op = self.object_event("warnings");
        self.delegate.warnings()
    }

    pub fn set_fetch_size(&mut self, rows: usize) -> Result<()> {
        self.delegate.set_fetch_size(rows)
    }

    pub fn fetch_size(&self) -> Result<usize> {
        self.delegate.fetch_size()
    }

    pub fn set_query_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.delegate.set_query_timeout(timeout)
    }

    pub fn query_timeout(&self) -> Result<Duration> {
        self.delegate.query_timeout()
    }

    pub fn cancel(&self) -> Result<()> {
        self.delegate.cancel()
    }

    pub fn close(&mut self) -> Result<()> {
        self.delegate.close()
    }

    pub fn is_closed(&self) -> Result<bool> {
        self.delegate.is_closed()
    }
}

impl std::fmt::Debug for RecordedStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedStatement")
            .field("object_id", &self.object_id)
            .finish_non_exhaustive()
    }
}
