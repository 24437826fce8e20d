//! The wrapped database-access contract.
//!
//! One trait per API role: connection, statement, prepared statement,
//! callable statement, result set, savepoint, connection builder, data
//! source. Drivers implement these traits; the `Recorded*` proxies in this
//! crate consume them positionally and forward every call unchanged.
//!
//! The traits deliberately carry only the surface the instrumentation
//! needs: the boundary-crossing operations the proxies time, plus a
//! representative set of plain forwarding methods (parameter binders,
//! column getters, property accessors). Column and parameter indices are
//! zero-based.
//!
//! `Connection` methods take `&self`; drivers that need mutable state use
//! interior mutability, the same discipline synchronous Rust database
//! handles already follow. Statement and cursor methods take `&mut self`.

use std::any::Any;
use std::time::Duration;

use crate::error::Result;

/// A scalar database value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// The name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
        }
    }
}

/// The declared type of an output parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int,
    Real,
    Text,
    Bytes,
}

/// Static facts about the database a connection talks to.
#[derive(Debug, Clone)]
pub struct DatabaseMetadata {
    pub product_name: String,
    pub product_version: String,
    pub user_name: Option<String>,
    pub read_only: bool,
}

/// Shape of the rows a result set (or a prepared statement) produces.
#[derive(Debug, Clone)]
pub struct ResultSetMetadata {
    pub column_names: Vec<String>,
}

impl ResultSetMetadata {
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }
}

/// A live database connection.
pub trait Connection {
    fn create_statement(&self) -> Result<Box<dyn Statement>>;
    fn prepare_statement(&self, sql: &str) -> Result<Box<dyn PreparedStatement>>;
    fn prepare_call(&self, sql: &str) -> Result<Box<dyn CallableStatement>>;

    /// Translate a query into the driver's native SQL dialect.
    fn native_sql(&self, sql: &str) -> Result<String>;
    fn metadata(&self) -> Result<DatabaseMetadata>;
    fn is_valid(&self, timeout: Duration) -> Result<bool>;

    fn set_auto_commit(&self, auto_commit: bool) -> Result<()>;
    fn auto_commit(&self) -> Result<bool>;
    fn commit(&self) -> Result<()>;
    fn rollback(&self) -> Result<()>;

    fn set_savepoint(&self) -> Result<Box<dyn Savepoint>>;
    fn set_named_savepoint(&self, name: &str) -> Result<Box<dyn Savepoint>>;
    fn rollback_to_savepoint(&self, savepoint: &dyn Savepoint) -> Result<()>;
    fn release_savepoint(&self, savepoint: &dyn Savepoint) -> Result<()>;

    fn set_read_only(&self, read_only: bool) -> Result<()>;
    fn is_read_only(&self) -> Result<bool>;
    fn schema(&self) -> Result<Option<String>>;
    fn set_schema(&self, schema: &str) -> Result<()>;

    fn close(&self) -> Result<()>;
    fn is_closed(&self) -> Result<bool>;
}

/// A statement executing immediate SQL strings.
pub trait Statement {
    fn execute_query(&mut self, sql: &str) -> Result<Box<dyn ResultSet>>;
    fn execute(&mut self, sql: &str) -> Result<bool>;
    fn execute_update(&mut self, sql: &str) -> Result<u64>;

    fn add_batch(&mut self, sql: &str) -> Result<()>;
    fn clear_batch(&mut self) -> Result<()>;
    fn execute_batch(&mut self) -> Result<Vec<u64>>;

    fn generated_keys(&mut self) -> Result<Box<dyn ResultSet>>;
    fn more_results(&mut self) -> Result<bool>;
    fn update_count(&self) -> Result<Option<u64>>;
    fn warnings(&mut self) -> Result<Option<String>>;

    fn set_fetch_size(&mut self, rows: usize) -> Result<()>;
    fn fetch_size(&self) -> Result<usize>;
    fn set_query_timeout(&mut self, timeout: Duration) -> Result<()>;
    fn query_timeout(&self) -> Result<Duration>;
    fn cancel(&self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
    fn is_closed(&self) -> Result<bool>;
}

/// A statement prepared once and executed with bound parameters.
pub trait PreparedStatement {
    fn bind_null(&mut self, index: usize) -> Result<()>;
    fn bind_bool(&mut self, index: usize, value: bool) -> Result<()>;
    fn bind_i64(&mut self, index: usize, value: i64) -> Result<()>;
    fn bind_f64(&mut self, index: usize, value: f64) -> Result<()>;
    fn bind_text(&mut self, index: usize, value: &str) -> Result<()>;
    fn bind_bytes(&mut self, index: usize, value: &[u8]) -> Result<()>;
    fn clear_parameters(&mut self) -> Result<()>;

    fn execute_query(&mut self) -> Result<Box<dyn ResultSet>>;
    fn execute(&mut self) -> Result<bool>;
    fn execute_update(&mut self) -> Result<u64>;

    fn add_batch(&mut self) -> Result<()>;
    fn execute_batch(&mut self) -> Result<Vec<u64>>;

    fn metadata(&self) -> Result<ResultSetMetadata>;
    fn parameter_count(&self) -> Result<usize>;
    fn warnings(&mut self) -> Result<Option<String>>;

    fn close(&mut self) -> Result<()>;
    fn is_closed(&self) -> Result<bool>;
}

/// A prepared statement invoking a stored procedure, with output parameters.
pub trait CallableStatement: PreparedStatement {
    fn register_out_parameter(&mut self, index: usize, ty: ValueType) -> Result<()>;
    fn out_value(&self, index: usize) -> Result<Value>;
}

/// A cursor over the rows produced by one execution.
pub trait ResultSet {
    fn next(&mut self) -> Result<bool>;
    fn previous(&mut self) -> Result<bool>;
    fn first(&mut self) -> Result<bool>;
    fn last(&mut self) -> Result<bool>;
    fn before_first(&mut self) -> Result<()>;
    fn after_last(&mut self) -> Result<()>;
    fn absolute(&mut self, row: i64) -> Result<bool>;
    fn relative(&mut self, delta: i64) -> Result<bool>;

    /// One-based index of the current row, `0` when not positioned on one.
    fn row(&self) -> Result<u64>;

    fn get_bool(&self, index: usize) -> Result<bool>;
    fn get_i64(&self, index: usize) -> Result<i64>;
    fn get_f64(&self, index: usize) -> Result<f64>;
    fn get_text(&self, index: usize) -> Result<String>;
    fn get_bytes(&self, index: usize) -> Result<Vec<u8>>;
    fn get_value(&self, index: usize) -> Result<Value>;
    fn was_null(&self) -> Result<bool>;

    fn metadata(&self) -> Result<ResultSetMetadata>;
    fn set_fetch_size(&mut self, rows: usize) -> Result<()>;
    fn fetch_size(&self) -> Result<usize>;
    fn warnings(&mut self) -> Result<Option<String>>;

    fn close(&mut self) -> Result<()>;
    fn is_closed(&self) -> Result<bool>;
}

/// A handle to a point in the current transaction that can be rolled back to.
pub trait Savepoint {
    /// Numeric id of an unnamed savepoint.
    fn savepoint_id(&self) -> Result<i64>;
    /// Name of a named savepoint.
    fn savepoint_name(&self) -> Result<String>;
    /// Downcast seam used to recognize savepoints produced by this layer.
    fn as_any(&self) -> &dyn Any;
}

/// Stepwise construction of a connection.
pub trait ConnectionBuilder {
    fn user(&mut self, user: &str) -> Result<()>;
    fn password(&mut self, password: &str) -> Result<()>;
    fn build(&mut self) -> Result<Box<dyn Connection>>;
}

/// A factory for connections.
pub trait DataSource {
    fn connect(&self) -> Result<Box<dyn Connection>>;
    fn connect_with(&self, user: &str, password: &str) -> Result<Box<dyn Connection>>;
    fn create_connection_builder(&self) -> Result<Box<dyn ConnectionBuilder>>;
    fn set_login_timeout(&self, timeout: Duration) -> Result<()>;
    fn login_timeout(&self) -> Result<Duration>;
}
