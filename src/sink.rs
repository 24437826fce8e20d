//! Sinks committed events are handed to.

use std::sync::Mutex;

use crate::event::Event;

/// Destination for committed telemetry events.
///
/// The recording layer calls [`commit`](EventSink::commit) synchronously on
/// the caller's thread, once per event, after the event has been timed and
/// populated. How events are persisted, filtered or displayed is up to the
/// sink.
pub trait EventSink: Send + Sync + 'static {
    fn commit(&self, event: Event);
}

/// Sink that emits each event as a structured [`tracing`] event.
///
/// | Field | Description |
/// |-------|-------------|
/// | `db.object` | Role of the proxied object (`connection`, `result_set`, ...) |
/// | `db.operation` | Name of the instrumented operation |
/// | `db.object_id` | Correlation id of the object, when it has one |
/// | `db.statement` | SQL text, when recording it is enabled |
/// | `db.rows` | Accumulated row count of a call |
/// | `db.savepoint` / `db.savepoint_id` | Savepoint name or id |
/// | `db.duration_us` | Measured duration in microseconds |
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        TracingSink
    }
}

impl EventSink for TracingSink {
    fn commit(&self, event: Event) {
        match event {
            Event::Operation(record) => tracing::info!(
                db.object = record.object.as_str(),
                db.operation = record.operation,
                db.statement = record.sql.as_deref().unwrap_or(""),
                db.duration_us = record.duration.as_micros() as u64,
                "db operation"
            ),
            Event::Object(record) => tracing::info!(
                db.object = record.object.as_str(),
                db.operation = record.operation,
                db.object_id = record.object_id.as_u64(),
                db.statement = record.sql.as_deref().unwrap_or(""),
                db.duration_us = record.duration.as_micros() as u64,
                "db operation"
            ),
            Event::Call(record) => tracing::info!(
                db.statement = record.sql.as_deref().unwrap_or(""),
                db.rows = record.row_count.unwrap_or(0),
                db.duration_us = record.duration.as_micros() as u64,
                "db call"
            ),
            Event::Savepoint(record) => tracing::info!(
                db.operation = record.operation,
                db.savepoint = record.name.as_deref().unwrap_or(""),
                db.savepoint_id = record.id.unwrap_or(0),
                db.duration_us = record.duration.as_micros() as u64,
                "db savepoint"
            ),
        }
    }
}

/// Sink that buffers committed events in memory.
///
/// Useful in tests and anywhere committed events need to be inspected
/// programmatically.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Snapshot of the events committed so far, in commit order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event buffer poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("event buffer poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all buffered events.
    pub fn clear(&self) {
        self.events.lock().expect("event buffer poisoned").clear();
    }
}

impl EventSink for MemorySink {
    fn commit(&self, event: Event) {
        self.events.lock().expect("event buffer poisoned").push(event);
    }
}
