//! Basic example showing how to use sql-recorder.
//!
//! Wraps a tiny in-memory driver and prints the committed telemetry as
//! `tracing` output via the default [`TracingSink`].
//!
//! Run with: cargo run --example basic

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use sql_recorder::api::{
    CallableStatement, Connection, DatabaseMetadata, PreparedStatement, ResultSet,
    ResultSetMetadata, Savepoint, Statement, Value,
};
use sql_recorder::{Error, Recorder, RecorderConfig, RecordedConnection, Result, TracingSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sql_recorder=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Wrap a driver connection; the development config records SQL text
    let conn = RecordedConnection::new(
        Box::new(DemoConnection::new()),
        Recorder::new(
            Arc::new(TracingSink::new()),
            RecorderConfig::development(),
        ),
    );

    // All calls through the wrapper are now instrumented
    let mut stmt = conn.prepare_statement("SELECT id FROM users WHERE id <= ?")?;
    stmt.bind_i64(0, 3)?;
    let mut rows = stmt.execute_query()?;
    while rows.next()? {
        tracing::info!(user_id = rows.get_i64(0)?, "fetched user");
    }
    rows.close()?; // commits the call event, row count included
    stmt.close()?;

    // You can also access the inner connection if needed
    let _inner = conn.inner();

    Ok(())
}

/// A toy in-memory driver: forward-only cursors, one integer column,
/// query results driven by the first bound parameter. Unsupported
/// operations report a driver error, as a thin real driver would.

struct DemoConnection {
    closed: Cell<bool>,
}

impl DemoConnection {
    fn new() -> Self {
        DemoConnection {
            closed: Cell::new(false),
        }
    }
}

fn unsupported<T>(what: &str) -> Result<T> {
    Err(Error::driver(format!("demo driver: {what} not supported")))
}

impl Connection for DemoConnection {
    fn create_statement(&self) -> Result<Box<dyn Statement>> {
        Ok(Box::new(DemoStatement { closed: false }))
    }

    fn prepare_statement(&self, _sql: &str) -> Result<Box<dyn PreparedStatement>> {
        Ok(Box::new(DemoPreparedStatement {
            limit: 0,
            closed: false,
        }))
    }

    fn prepare_call(&self, _sql: &str) -> Result<Box<dyn CallableStatement>> {
        unsupported("stored procedures")
    }

    fn native_sql(&self, sql: &str) -> Result<String> {
        Ok(sql.to_owned())
    }

    fn metadata(&self) -> Result<DatabaseMetadata> {
        Ok(DatabaseMetadata {
            product_name: "demodb".to_owned(),
            product_version: "0.1".to_owned(),
            user_name: None,
            read_only: false,
        })
    }

    fn is_valid(&self, _timeout: Duration) -> Result<bool> {
        Ok(!self.closed.get())
    }

    fn set_auto_commit(&self, _auto_commit: bool) -> Result<()> {
        Ok(())
    }

    fn auto_commit(&self) -> Result<bool> {
        Ok(true)
    }

    fn commit(&self) -> Result<()> {
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        Ok(())
    }

    fn set_savepoint(&self) -> Result<Box<dyn Savepoint>> {
        unsupported("savepoints")
    }

    fn set_named_savepoint(&self, _name: &str) -> Result<Box<dyn Savepoint>> {
        unsupported("savepoints")
    }

    fn rollback_to_savepoint(&self, _savepoint: &dyn Savepoint) -> Result<()> {
        unsupported("savepoints")
    }

    fn release_savepoint(&self, _savepoint: &dyn Savepoint) -> Result<()> {
        unsupported("savepoints")
    }

    fn set_read_only(&self, _read_only: bool) -> Result<()> {
        Ok(())
    }

    fn is_read_only(&self) -> Result<bool> {
        Ok(false)
    }

    fn schema(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn set_schema(&self, _schema: &str) -> Result<()> {
        unsupported("schemas")
    }

    fn close(&self) -> Result<()> {
        self.closed.set(true);
        Ok(())
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.closed.get())
    }
}

struct DemoStatement {
    closed: bool,
}

impl Statement for DemoStatement {
    fn execute_query(&mut self, _sql: &str) -> Result<Box<dyn ResultSet>> {
        Ok(Box::new(DemoResultSet::new(0)))
    }

    fn execute(&mut self, _sql: &str) -> Result<bool> {
        Ok(false)
    }

    fn execute_update(&mut self, _sql: &str) -> Result<u64> {
        Ok(0)
    }

    fn add_batch(&mut self, _sql: &str) -> Result<()> {
        unsupported("batches")
    }

    fn clear_batch(&mut self) -> Result<()> {
        unsupported("batches")
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>> {
        unsupported("batches")
    }

    fn generated_keys(&mut self) -> Result<Box<dyn ResultSet>> {
        Ok(Box::new(DemoResultSet::new(0)))
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

    fn set_fetch_size(&mut self, _rows: usize) -> Result<()> {
        Ok(())
    }

    fn fetch_size(&self) -> Result<usize> {
        Ok(0)
    }

    fn set_query_timeout(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn query_timeout(&self) -> Result<Duration> {
        Ok(Duration::ZERO)
    }

    fn cancel(&self) -> Result<()> {
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

struct DemoPreparedStatement {
    limit: i64,
    closed: bool,
}

impl PreparedStatement for DemoPreparedStatement {
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
        Ok(Box::new(DemoResultSet::new(self.limit)))
    }

    fn execute(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn execute_update(&mut self) -> Result<u64> {
        Ok(0)
    }

    fn add_batch(&mut self) -> Result<()> {
        unsupported("batches")
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>> {
        unsupported("batches")
    }

    fn metadata(&self) -> Result<ResultSetMetadata> {
        Ok(ResultSetMetadata {
            column_names: vec!["id".to_owned()],
        })
    }

    fn parameter_count(&self) -> Result<usize> {
        Ok(1)
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

/// Forward-only cursor over the integers `1..=limit`.
struct DemoResultSet {
    limit: i64,
    pos: i64,
    closed: bool,
}

impl DemoResultSet {
    fn new(limit: i64) -> Self {
        DemoResultSet {
            limit,
            pos: 0,
            closed: false,
        }
    }

    fn current(&self) -> Result<i64> {
        if self.pos >= 1 && self.pos <= self.limit {
            Ok(self.pos)
        } else {
            Err(Error::driver("not positioned on a row"))
        }
    }
}

impl ResultSet for DemoResultSet {
    fn next(&mut self) -> Result<bool> {
        if self.pos < self.limit {
            self.pos += 1;
            Ok(true)
        } else {
            self.pos = self.limit + 1;
            Ok(false)
        }
    }

    fn previous(&mut self) -> Result<bool> {
        unsupported("scrolling")
    }

    fn first(&mut self) -> Result<bool> {
        unsupported("scrolling")
    }

    fn last(&mut self) -> Result<bool> {
        unsupported("scrolling")
    }

    fn before_first(&mut self) -> Result<()> {
        unsupported("scrolling")
    }

    fn after_last(&mut self) -> Result<()> {
        unsupported("scrolling")
    }

    fn absolute(&mut self, _row: i64) -> Result<bool> {
        unsupported("scrolling")
    }

    fn relative(&mut self, _delta: i64) -> Result<bool> {
        unsupported("scrolling")
    }

    fn row(&self) -> Result<u64> {
        Ok(if self.pos >= 1 && self.pos <= self.limit {
            self.pos as u64
        } else {
            0
        })
    }

    fn get_bool(&self, _index: usize) -> Result<bool> {
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
            column_names: vec!["id".to_owned()],
        })
    }

    fn set_fetch_size(&mut self, _rows: usize) -> Result<()> {
        Ok(())
    }

    fn fetch_size(&self) -> Result<usize> {
        Ok(0)
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
