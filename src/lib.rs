//! # sql-recorder
//!
//! Structured telemetry instrumentation for synchronous SQL client APIs.
//!
//! This crate wraps every object an application obtains from a database
//! driver (connection, statement, prepared/callable statement, result
//! set, savepoint, data source) in a proxy that forwards all behavior
//! unchanged while committing telemetry events: which operation ran,
//! against which SQL text, how long it took, and how many rows it touched.
//!
//! ## Features
//!
//! - **Transparent Proxies**: same results, same errors, same blocking
//!   semantics as the wrapped driver; the only observable difference is
//!   the telemetry
//! - **Call Correlation**: one call event spans a logical SQL execution
//!   from preparation to cursor exhaustion, closed exactly once no matter
//!   how the statement or result set is torn down
//! - **Object Identities**: statements and result sets carry process-unique
//!   ids so events from different calls can be grouped by object
//! - **Row Accounting**: fetched and affected rows accumulate on the call
//!   event across the cursor's lifetime
//! - **Pluggable Sinks**: events go to `tracing` by default, to an
//!   in-memory buffer for inspection, or to any [`EventSink`] you provide
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sql_recorder::{RecordedConnection, Recorder};
//!
//! // Wrap a connection obtained from your driver
//! let conn = RecordedConnection::new(driver_connection, Recorder::with_defaults());
//!
//! // Use it exactly like the driver connection
//! let mut stmt = conn.prepare_statement("SELECT name FROM users WHERE id = ?")?;
//! stmt.bind_i64(0, 42)?;
//! let mut rows = stmt.execute_query()?;
//! while rows.next()? {
//!     println!("{}", rows.get_text(0)?);
//! }
//! rows.close()?; // commits the call event with its row count
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use sql_recorder::{Recorder, RecorderConfig, TracingSink};
//! use std::{sync::Arc, time::Duration};
//!
//! let recorder = Recorder::new(
//!     Arc::new(TracingSink::new()),
//!     RecorderConfig::default()
//!         .with_sql_recording(true) // include SQL text (default: false)
//!         .with_slow_call_threshold(Duration::from_millis(100)),
//! );
//! ```
//!
//! ## Event Shapes
//!
//! | Event | Description |
//! |-------|-------------|
//! | [`OperationRecord`] | One API call on a role without an object identity |
//! | [`ObjectRecord`] | One API call scoped to an identified statement or cursor |
//! | [`CallRecord`] | One logical SQL execution with its accumulated row count |
//! | [`SavepointRecord`] | A savepoint create, rollback or release |

pub mod api;
mod config;
mod connection;
mod data_source;
mod error;
mod event;
mod id;
mod prepared;
mod recorder;
mod result_set;
mod savepoint;
mod sink;
mod statement;

pub use config::RecorderConfig;
pub use connection::RecordedConnection;
pub use data_source::{RecordedConnectionBuilder, RecordedDataSource};
pub use error::{Error, Result};
pub use event::{CallRecord, Event, ObjectKind, ObjectRecord, OperationRecord, SavepointRecord};
pub use id::ObjectId;
pub use prepared::{RecordedCallableStatement, RecordedPreparedStatement};
pub use recorder::Recorder;
pub use result_set::RecordedResultSet;
pub use savepoint::RecordedSavepoint;
pub use sink::{EventSink, MemorySink, TracingSink};
pub use statement::RecordedStatement;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Event, EventSink, Recorder, RecorderConfig, RecordedConnection, RecordedDataSource,
    };
}
