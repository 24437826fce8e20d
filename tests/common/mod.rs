//! An in-memory fake driver for exercising the recording wrappers.
//!
//! Queries against `FakeStatement` produce one row per unit up to the
//! trailing integer in the SQL text ("SELECT X FROM RANGE 5" yields rows
//! 1..=5); `FakePreparedStatement` takes the limit from its first bound
//! parameter instead. SQL containing "FAIL" makes execution error.
//! Transaction-control calls append to a shared operation log so tests
//! can assert what reached the driver.

#![allow(dead_code)]

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use sql_recorder::api::{
    CallableStatement, Connection, ConnectionBuilder, DataSource, DatabaseMetadata,
    PreparedStatement, ResultSet, ResultSetMetadata, Savepoint, Statement, Value, ValueType,
};
use sql_recorder::{
    CallRecord, Error, Event, MemorySink, ObjectRecord, Recorder, RecorderConfig,
    RecordedConnection, Result, SavepointRecord,
};

pub type OpLog = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> OpLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A recorded connection over a fresh fake driver, with the sink it
/// commits to and the driver-side operation log.
pub fn recorded_connection() -> (RecordedConnection, Arc<MemorySink>, OpLog) {
    let sink = Arc::new(MemorySink::new());
    let recorder = Recorder::new(sink.clone(), RecorderConfig::development());
    let log = new_log();
    let conn = RecordedConnection::new(Box::new(FakeConnection::with_log(log.clone())), recorder);
    (conn, sink, log)
}

pub fn call_records(sink: &MemorySink) -> Vec<CallRecord> {
    sink.events()
        .into_iter()
        .filter_map(|event| match event {
            Event::Call(record) => Some(record),
            _ => None,
        })
        .collect()
}

pub fn object_records(sink: &MemorySink) -> Vec<ObjectRecord> {
    sink.events()
        .into_iter()
        .filter_map(|event| match event {
            Event::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

pub fn savepoint_records(sink: &MemorySink) -> Vec<SavepointRecord> {
    sink.events()
        .into_iter()
        .filter_map(|event| match event {
            Event::Savepoint(record) => Some(record),
            _ => None,
        })
        .collect()
}

fn row_limit(sql: &str) -> i64 {
    sql.split_whitespace()
        .last()
        .and_then(|token| token.parse().ok())
        .unwrap_or(0)
}

pub struct FakeConnection {
    log: OpLog,
    next_savepoint_id: Cell<i64>,
    closed: Cell<bool>,
}

impl FakeConnection {
    pub fn new() -> Self {
        FakeConnection::with_log(new_log())
    }

    pub fn with_log(log: OpLog) -> Self {
        FakeConnection {
            log,
            next_savepoint_id: Cell::new(1),
            closed: Cell::new(false),
        }
    }
}

impl Connection for FakeConnection {
    fn create_statement(&self) -> Result<Box<dyn Statement>> {
        Ok(Box::new(FakeStatement::new(self.log.clone())))
    }

    fn prepare_statement(&self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        Ok(Box::new(FakePreparedStatement::new(sql)))
    }

    fn prepare_call(&self, sql: &str) -> Result<Box<dyn CallableStatement>> {
        Ok(Box::new(FakeCallableStatement {
            inner: FakePreparedStatement::new(sql),
        }))
    }

    fn native_sql(&self, sql: &str) -> Result<String> {
        Ok(sql.to_owned())
    }

    fn metadata(&self) -> Result<DatabaseMetadata> {
        Ok(DatabaseMetadata {
            product_name: "fakedb".to_owned(),
            product_version: "1.0".to_owned(),
            user_name: None,
            read_only: false,
        })
    }

    fn is_valid(&self, _timeout: Duration) -> Result<bool> {
        Ok(!self.closed.get())
    }

    fn set_auto_commit(&self, auto_commit: bool) -> Result<()> {
        self.log.borrow_mut().push(format!("auto_commit:{auto_commit}"));
        Ok(())
    }

    fn auto_commit(&self) -> Result<bool> {
        Ok(true)
    }

    fn commit(&self) -> Result<()> {
        self.log.borrow_mut().push("commit".to_owned());
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.log.borrow_mut().push("rollback".to_owned());
        Ok(())
    }

    fn set_savepoint(&self) -> Result<Box<dyn Savepoint>> {
        let id = self.next_savepoint_id.get();
        self.next_savepoint_id.set(id + 1);
        self.log.borrow_mut().push(format!("savepoint:{id}"));
        Ok(Box::new(FakeSavepoint { id, name: None }))
    }

    fn set_named_savepoint(&self, name: &str) -> Result<Box<dyn Savepoint>> {
        let id = self.next_savepoint_id.get();
        self.next_savepoint_id.set(id + 1);
        self.log.borrow_mut().push(format!("savepoint:{name}"));
        Ok(Box::new(FakeSavepoint {
            id,
            name: Some(name.to_owned()),
        }))
    }

    fn rollback_to_savepoint(&self, savepoint: &dyn Savepoint) -> Result<()> {
        let id = savepoint.savepoint_id()?;
        self.log.borrow_mut().push(format!("rollback_to:{id}"));
        Ok(())
    }

    fn release_savepoint(&self, savepoint: &dyn Savepoint) -> Result<()> {
        let id = savepoint.savepoint_id()?;
        self.log.borrow_mut().push(format!("release:{id}"));
        Ok(())
    }

    fn set_read_only(&self, _read_only: bool) -> Result<()> {
        Ok(())
    }

    fn is_read_only(&self) -> Result<bool> {
        Ok(false)
    }

    fn schema(&self) -> Result<Option<String>> {
        Ok(Some("main".to_owned()))
    }

    fn set_schema(&self, _schema: &str) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.closed.set(true);
        Ok(())
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.closed.get())
    }
}

pub struct FakeStatement {
    log: OpLog,
    batch: Vec<String>,
    fetch_size: usize,
    query_timeout: Duration,
    closed: bool,
}

impl FakeStatement {
    fn new(log: OpLog) -> Self {
        FakeStatement {
            log,
            batch: Vec::new(),
            fetch_size: 0,
            query_timeout: Duration::ZERO,
            closed: false,
        }
    }
}

impl Statement for FakeStatement {
    fn execute_query(&mut self, sql: &str) -> Result<Box<dyn ResultSet>> {
        if sql.contains("FAIL") {
            return Err(Error::driver("forced failure"));
        }
        Ok(Box::new(FakeResultSet::with_limit(row_limit(sql))))
    }

    fn execute(&mut self, sql: &str) -> Result<bool> {
        if sql.contains("FAIL") {
            return Err(Error::driver("forced failure"));
        }
        Ok(sql.trim_start().to_ascii_uppercase().starts_with("SELECT"))
    }

    fn execute_update(&mut self, sql: &str) -> Result<u64> {
        if sql.contains("FAIL") {
            return Err(Error::driver("forced failure"));
        }
        Ok(row_limit(sql) as u64)
    }

    fn add_batch(&mut self, sql: &str) -> Result<()> {
        self.batch.push(sql.to_owned());
        Ok(())
    }

    fn clear_batch(&mut self) -> Result<()> {
        self.batch.clear();
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>> {
        let counts = self
            .batch
            .iter()
            .map(|sql| row_limit(sql) as u64)
            .collect();
        self.batch.clear();
        Ok(counts)
    }

    fn generated_keys(&mut self) -> Result<Box<dyn ResultSet>> {
        Ok(Box::new(FakeResultSet::with_rows(vec![101, 102])))
    }

    fn more_results(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn update_count(&self) -> Result<Option<u64>> {
        Ok(None)
    }

    fn warnings(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn set_fetch_size(&mut self, rows: usize) -> Result<()> {
        self.fetch_size = rows;
        Ok(())
    }

    fn fetch_size(&self) -> Result<usize> {
        Ok(self.fetch_size)
    }

    fn set_query_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.query_timeout = timeout;
        Ok(())
    }

    fn query_timeout(&self) -> Result<Duration> {
        Ok(self.query_timeout)
    }

    fn cancel(&self) -> Result<()> {
        self.log.borrow_mut().push("cancel".to_owned());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.closed)
    }
}

pub struct FakePreparedStatement {
    sql: String,
    limit: i64,
    batched: usize,
    closed: bool,
}

impl FakePreparedStatement {
    fn new(sql: &str) -> Self {
        FakePreparedStatement {
            sql: sql.to_owned(),
            limit: 0,
            batched: 0,
            closed: false,
        }
    }
}

impl PreparedStatement for FakePreparedStatement {
    fn bind_null(&mut self, _index: usize) -> Result<()> {
        Ok(())
    }

    fn bind_bool(&mut self, _index: usize, _value: bool) -> Result<()> {
        Ok(())
    }

    fn bind_i64(&mut self, index: usize, value: i64) -> Result<()> {
        if index != 0 {
            return Err(Error::InvalidParameter { index });
        }
        self.limit = value;
        Ok(())
    }

    fn bind_f64(&mut self, _index: usize, _value: f64) -> Result<()> {
        Ok(())
    }

    fn bind_text(&mut self, _index: usize, _value: &str) -> Result<()> {
        Ok(())
    }

    fn bind_bytes(&mut self, _index: usize, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    fn clear_parameters(&mut self) -> Result<()> {
        self.limit = 0;
        Ok(())
    }

    fn execute_query(&mut self) -> Result<Box<dyn ResultSet>> {
        if self.sql.contains("FAIL") {
            return Err(Error::driver("forced failure"));
        }
        Ok(Box::new(FakeResultSet::with_limit(self.limit)))
    }

    fn execute(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn execute_update(&mut self) -> Result<u64> {
        Ok(self.limit as u64)
    }

    fn add_batch(&mut self) -> Result<()> {
        self.batched += 1;
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>> {
        let counts = vec![self.limit as u64; self.batched];
        self.batched = 0;
        Ok(counts)
    }

    fn metadata(&self) -> Result<ResultSetMetadata> {
        Ok(ResultSetMetadata {
            column_names: vec!["x".to_owned()],
        })
    }

    fn parameter_count(&self) -> Result<usize> {
        Ok(self.sql.matches('?').count())
    }

    fn warnings(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.closed)
    }
}

pub struct FakeCallableStatement {
    inner: FakePreparedStatement,
}

impl PreparedStatement for FakeCallableStatement {
    fn bind_null(&mut self, index: usize) -> Result<()> {
        self.inner.bind_null(index)
    }

    fn bind_bool(&mut self, index: usize, value: bool) -> Result<()> {
        self.inner.bind_bool(index, value)
    }

    fn bind_i64(&mut self, index: usize, value: i64) -> Result<()> {
        self.inner.bind_i64(index, value)
    }

    fn bind_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.inner.bind_f64(index, value)
    }

    fn bind_text(&mut self, index: usize, value: &str) -> Result<()> {
        self.inner.bind_text(index, value)
    }

    fn bind_bytes(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.inner.bind_bytes(index, value)
    }

    fn clear_parameters(&mut self) -> Result<()> {
        self.inner.clear_parameters()
    }

    fn execute_query(&mut self) -> Result<Box<dyn ResultSet>> {
        self.inner.execute_query()
    }

    fn execute(&mut self) -> Result<bool> {
        self.inner.execute()
    }

    fn execute_update(&mut self) -> Result<u64> {
        self.inner.execute_update()
    }

    fn add_batch(&mut self) -> Result<()> {
        self.inner.add_batch()
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>> {
        self.inner.execute_batch()
    }

    fn metadata(&self) -> Result<ResultSetMetadata> {
        self.inner.metadata()
    }

    fn parameter_count(&self) -> Result<usize> {
        self.inner.parameter_count()
    }

    fn warnings(&mut self) -> Result<Option<String>> {
        self.inner.warnings()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn is_closed(&self) -> Result<bool> {
        self.inner.is_closed()
    }
}

impl CallableStatement for FakeCallableStatement {
    fn register_out_parameter(&mut self, _index: usize, _ty: ValueType) -> Result<()> {
        Ok(())
    }

    fn out_value(&self, _index: usize) -> Result<Value> {
        Ok(Value::Int(self.inner.limit))
    }
}

/// Scrollable cursor over a fixed set of integer rows.
///
/// Position 0 is before the first row, `rows.len() + 1` after the last.
pub struct FakeResultSet {
    rows: Vec<i64>,
    pos: i64,
    fetch_size: usize,
    closed: bool,
}

impl FakeResultSet {
    pub fn with_limit(limit: i64) -> Self {
        FakeResultSet::with_rows((1..=limit).collect())
    }

    pub fn with_rows(rows: Vec<i64>) -> Self {
        FakeResultSet {
            rows,
            pos: 0,
            fetch_size: 0,
            closed: false,
        }
    }

    fn len(&self) -> i64 {
        self.rows.len() as i64
    }

    fn on_row(&self) -> bool {
        self.pos >= 1 && self.pos <= self.len()
    }

    fn current(&self) -> Result<i64> {
        if self.on_row() {
            Ok(self.rows[(self.pos - 1) as usize])
        } else {
            Err(Error::driver("not positioned on a row"))
        }
    }
}

impl ResultSet for FakeResultSet {
    fn next(&mut self) -> Result<bool> {
        if self.pos < self.len() {
            self.pos += 1;
            Ok(true)
        } else {
            self.pos = self.len() + 1;
            Ok(false)
        }
    }

    fn previous(&mut self) -> Result<bool> {
        if self.pos > 1 {
            self.pos -= 1;
            Ok(self.on_row())
        } else {
            self.pos = 0;
            Ok(false)
        }
    }

    fn first(&mut self) -> Result<bool> {
        if self.rows.is_empty() {
            Ok(false)
        } else {
            self.pos = 1;
            Ok(true)
        }
    }

    fn last(&mut self) -> Result<bool> {
        if self.rows.is_empty() {
            Ok(false)
        } else {
            self.pos = self.len();
            Ok(true)
        }
    }

    fn before_first(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }

    fn after_last(&mut self) -> Result<()> {
        self.pos = self.len() + 1;
        Ok(())
    }

    fn absolute(&mut self, row: i64) -> Result<bool> {
        let target = if row >= 0 { row } else { self.len() + 1 + row };
        if target >= 1 && target <= self.len() {
            self.pos = target;
            Ok(true)
        } else {
            self.pos = if target < 1 { 0 } else { self.len() + 1 };
            Ok(false)
        }
    }

    fn relative(&mut self, delta: i64) -> Result<bool> {
        // A backward move past the first row lands before-first; it must
        // not wrap to from-the-end addressing like a negative `absolute`.
        let target = self.pos + delta;
        if target < 1 {
            self.pos = 0;
            Ok(false)
        } else if target <= self.len() {
            self.pos = target;
            Ok(true)
        } else {
            self.pos = self.len() + 1;
            Ok(false)
        }
    }

    fn row(&self) -> Result<u64> {
        Ok(if self.on_row() { self.pos as u64 } else { 0 })
    }

    fn get_bool(&self, index: usize) -> Result<bool> {
        let _ = self.get_i64(index)?;
        Err(Error::TypeMismatch {
            expected: "bool",
            found: "int",
        })
    }

    fn get_i64(&self, index: usize) -> Result<i64> {
        if index != 0 {
            return Err(Error::InvalidColumn { index });
        }
        self.current()
    }

    fn get_f64(&self, index: usize) -> Result<f64> {
        Ok(self.get_i64(index)? as f64)
    }

    fn get_text(&self, index: usize) -> Result<String> {
        Ok(self.get_i64(index)?.to_string())
    }

    fn get_bytes(&self, index: usize) -> Result<Vec<u8>> {
        Ok(self.get_i64(index)?.to_be_bytes().to_vec())
    }

    fn get_value(&self, index: usize) -> Result<Value> {
        Ok(Value::Int(self.get_i64(index)?))
    }

    fn was_null(&self) -> Result<bool> {
        Ok(false)
    }

    fn metadata(&self) -> Result<ResultSetMetadata> {
        Ok(ResultSetMetadata {
            column_names: vec!["x".to_owned()],
        })
    }

    fn set_fetch_size(&mut self, rows: usize) -> Result<()> {
        self.fetch_size = rows;
        Ok(())
    }

    fn fetch_size(&self) -> Result<usize> {
        Ok(self.fetch_size)
    }

    fn warnings(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.closed)
    }
}

pub struct FakeSavepoint {
    pub id: i64,
    pub name: Option<String>,
}

impl Savepoint for FakeSavepoint {
    fn savepoint_id(&self) -> Result<i64> {
        Ok(self.id)
    }

    fn savepoint_name(&self) -> Result<String> {
        self.name
            .clone()
            .ok_or_else(|| Error::driver("savepoint has no name"))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct FakeDataSource {
    login_timeout: Cell<Duration>,
}

impl FakeDataSource {
    pub fn new() -> Self {
        FakeDataSource {
            login_timeout: Cell::new(Duration::ZERO),
        }
    }
}

impl DataSource for FakeDataSource {
    fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(FakeConnection::new()))
    }

    fn connect_with(&self, _user: &str, _password: &str) -> Result<Box<dyn Connection>> {
        Ok(Box::new(FakeConnection::new()))
    }

    fn create_connection_builder(&self) -> Result<Box<dyn ConnectionBuilder>> {
        Ok(Box::new(FakeConnectionBuilder::default()))
    }

    fn set_login_timeout(&self, timeout: Duration) -> Result<()> {
        self.login_timeout.set(timeout);
        Ok(())
    }

    fn login_timeout(&self) -> Result<Duration> {
        Ok(self.login_timeout.get())
    }
}

#[derive(Default)]
pub struct FakeConnectionBuilder {
    user: Option<String>,
    password: Option<String>,
}

impl ConnectionBuilder for FakeConnectionBuilder {
    fn user(&mut self, user: &str) -> Result<()> {
        self.user = Some(user.to_owned());
        Ok(())
    }

    fn password(&mut self, password: &str) -> Result<()> {
        self.password = Some(password.to_owned());
        Ok(())
    }

    fn build(&mut self) -> Result<Box<dyn Connection>> {
        if self.user.is_none() {
            return Err(Error::driver("user not set"));
        }
        Ok(Box::new(FakeConnection::new()))
    }
}
