//! Recorded database connection wrapper.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{Connection, DatabaseMetadata, Savepoint};
use crate::error::Result;
use crate::event::{CallEvent, ObjectKind};
use crate::prepared::{RecordedCallableStatement, RecordedPreparedStatement};
use crate::recorder::Recorder;
use crate::savepoint::{resolve, RecordedSavepoint, SavepointVariant};
use crate::statement::RecordedStatement;

/// A recording wrapper around a driver [`Connection`].
///
/// Behaves exactly like the wrapped connection (same results, same
/// errors, same blocking semantics) and additionally commits telemetry
/// events for statement creation, SQL preparation, metadata retrieval and
/// savepoint operations. Statements obtained from it are themselves
/// wrapped, so instrumentation follows the whole object tree.
///
/// # Example
///
/// ```rust,ignore
/// use sql_recorder::{RecordedConnection, Recorder};
///
/// let conn = RecordedConnection::new(driver_connection, Recorder::with_defaults());
///
/// let mut stmt = conn.prepare_statement("SELECT name FROM users WHERE id = ?")?;
/// stmt.bind_i64(0, 42)?;
/// let mut rows = stmt.execute_query()?;
/// while rows.next()? {
///     // every fetched row is accounted on the call event
/// }
/// ```
pub struct RecordedConnection {
    delegate: Box<dyn Connection>,
    recorder: Recorder,
}

impl RecordedConnection {
    /// Wrap `delegate`, committing events through `recorder`.
    pub fn new(delegate: Box<dyn Connection>, recorder: Recorder) -> Self {
        RecordedConnection { delegate, recorder }
    }

    /// Wrap `delegate` with the default recorder.
    pub fn wrap(delegate: Box<dyn Connection>) -> Self {
        RecordedConnection::new(delegate, Recorder::with_defaults())
    }

    /// The recorder shared with statements and result sets created here.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// The wrapped driver connection.
    pub fn inner(&self) -> &dyn Connection {
        self.delegate.as_ref()
    }

    /// Consume the wrapper and return the wrapped connection.
    pub fn into_inner(self) -> Box<dyn Connection> {
        self.delegate
    }

    pub fn create_statement(&self) -> Result<RecordedStatement<'_>> {
        let _op = self
            .recorder
            .operation(ObjectKind::Connection, "create_statement", None);
        let statement = self.delegate.create_statement()?;
        Ok(RecordedStatement::new(self, statement))
    }

    /// Prepares `sql` and opens the call event that will span its
    /// execution, to be closed by the statement or its result set.
    pub fn prepare_statement(&self, sql: &str) -> Result<RecordedPreparedStatement<'_>> {
        let sql: Arc<str> = Arc::from(sql);
        let call = CallEvent::begin(self.recorder.clone(), sql.clone());
        let _op = self.recorder.operation(
            ObjectKind::Connection,
            "prepare_statement",
            Some(sql.clone()),
        );
        let statement = self.delegate.prepare_statement(&sql)?;
        Ok(RecordedPreparedStatement::new(self, statement, call))
    }

    pub fn prepare_call(&self, sql: &str) -> Result<RecordedCallableStatement<'_>> {
        let sql: Arc<str> = Arc::from(sql);
        let call = CallEvent::begin(self.recorder.clone(), sql.clone());
        let _op =
            self.recorder
                .operation(ObjectKind::Connection, "prepare_call", Some(sql.clone()));
        let statement = self.delegate.prepare_call(&sql)?;
        Ok(RecordedCallableStatement::new(self, statement, call))
    }

    pub fn native_sql(&self, sql: &str) -> Result<String> {
        let _op =
            self.recorder
                .operation(ObjectKind::Connection, "native_sql", Some(Arc::from(sql)));
        self.delegate.native_sql(sql)
    }

    pub fn metadata(&self) -> Result<DatabaseMetadata> {
        let _op = self
            .recorder
            .operation(ObjectKind::Connection, "metadata", None);
        self.delegate.metadata()
    }

    pub fn is_valid(&self, timeout: Duration) -> Result<bool> {
        let _op = self
            .recorder
            .operation(ObjectKind::Connection, "is_valid", None);
        self.delegate.is_valid(timeout)
    }

    pub fn set_auto_commit(&self, auto_commit: bool) -> Result<()> {
        self.delegate.set_auto_commit(auto_commit)
    }

    pub fn auto_commit(&self) -> Result<bool> {
        self.delegate.auto_commit()
    }

    pub fn commit(&self) -> Result<()> {
        self.delegate.commit()
    }

    pub fn rollback(&self) -> Result<()> {
        self.delegate.rollback()
    }

    pub fn set_savepoint(&self) -> Result<RecordedSavepoint> {
        let mut guard = self.recorder.savepoint("create");
        let savepoint = self.delegate.set_savepoint()?;
        guard.set_id(savepoint.savepoint_id()?);
        Ok(RecordedSavepoint::unnamed(savepoint))
    }

    pub fn set_named_savepoint(&self, name: &str) -> Result<RecordedSavepoint> {
        let mut guard = self.recorder.savepoint("create");
        guard.set_name(name);
        let savepoint = self.delegate.set_named_savepoint(name)?;
        Ok(RecordedSavepoint::named(savepoint))
    }

    pub fn rollback_to_savepoint(&self, savepoint: &dyn Savepoint) -> Result<()> {
        self.savepoint_operation("rollback", savepoint, |delegate, raw| {
            delegate.rollback_to_savepoint(raw)
        })
    }

    pub fn release_savepoint(&self, savepoint: &dyn Savepoint) -> Result<()> {
        self.savepoint_operation("release", savepoint, |delegate, raw| {
            delegate.release_savepoint(raw)
        })
    }

    /// Dispatch a rollback/release according to the savepoint's
    /// provenance. Foreign savepoints were not created through this layer;
    /// reading either accessor on them could raise a driver error, so the
    /// operation runs uninstrumented.
    fn savepoint_operation(
        &self,
        operation: &'static str,
        savepoint: &dyn Savepoint,
        apply: impl FnOnce(&dyn Connection, &dyn Savepoint) -> Result<()>,
    ) -> Result<()> {
        match resolve(savepoint) {
            SavepointVariant::Named(recorded) => {
                let name = recorded.savepoint_name()?;
                let mut guard = self.recorder.savepoint(operation);
                guard.set_name(name);
                apply(self.delegate.as_ref(), recorded.delegate())
            }
            SavepointVariant::Unnamed(recorded) => {
                let id = recorded.savepoint_id()?;
                let mut guard = self.recorder.savepoint(operation);
                guard.set_id(id);
                apply(self.delegate.as_ref(), recorded.delegate())
            }
            SavepointVariant::Foreign => apply(self.delegate.as_ref(), savepoint),
        }
    }

    pub fn set_read_only(&self, read_only: bool) -> Result<()> {
        self.delegate.set_read_only(read_only)
    }

    pub fn is_read_only(&self) -> Result<bool> {
        self.delegate.is_read_only()
    }

    pub fn schema(&self) -> Result<Option<String>> {
        self.delegate.schema()
    }

    pub fn set_schema(&self, schema: &str) -> Result<()> {
        self.delegate.set_schema(schema)
    }

    pub fn close(&self) -> Result<()> {
        self.delegate.close()
    }

    pub fn is_closed(&self) -> Result<bool> {
        self.delegate.is_closed()
    }
}

impl std::fmt::Debug for RecordedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedConnection").finish_non_exhaustive()
    }
}
