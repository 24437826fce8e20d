//! Savepoint wrappers and variant resolution.

use std::any::Any;

use crate::api::Savepoint;
use crate::error::Result;

/// Whether a savepoint was created with a name or allocated an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavepointKind {
    Named,
    Unnamed,
}

/// A savepoint produced through this layer.
///
/// Tagged as named or unnamed at creation so that later rollback/release
/// operations know whether to report the savepoint's name or its numeric
/// id without probing accessors that the driver may reject.
pub struct RecordedSavepoint {
    delegate: Box<dyn Savepoint>,
    kind: SavepointKind,
}

impl RecordedSavepoint {
    pub(crate) fn named(delegate: Box<dyn Savepoint>) -> Self {
        RecordedSavepoint {
            delegate,
            kind: SavepointKind::Named,
        }
    }

    pub(crate) fn unnamed(delegate: Box<dyn Savepoint>) -> Self {
        RecordedSavepoint {
            delegate,
            kind: SavepointKind::Unnamed,
        }
    }

    /// The raw driver savepoint, handed back to the delegate connection
    /// for rollback and release.
    pub(crate) fn delegate(&self) -> &dyn Savepoint {
        self.delegate.as_ref()
    }
}

impl Savepoint for RecordedSavepoint {
    fn savepoint_id(&self) -> Result<i64> {
        self.delegate.savepoint_id()
    }

    fn savepoint_name(&self) -> Result<String> {
        self.delegate.savepoint_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for RecordedSavepoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedSavepoint")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Provenance of a savepoint handed back to a connection proxy.
pub(crate) enum SavepointVariant<'a> {
    /// Created through this layer with a name; report the name.
    Named(&'a RecordedSavepoint),
    /// Created through this layer without one; report the id.
    Unnamed(&'a RecordedSavepoint),
    /// Not created through this layer. Neither name nor id can be assumed
    /// safe to read, so the operation proceeds without an event.
    Foreign,
}

pub(crate) fn resolve(savepoint: &dyn Savepoint) -> SavepointVariant<'_> {
    match savepoint.as_any().downcast_ref::<RecordedSavepoint>() {
        Some(recorded) => match recorded.kind {
            SavepointKind::Named => SavepointVariant::Named(recorded),
            SavepointKind::Unnamed => SavepointVariant::Unnamed(recorded),
        },
        None => SavepointVariant::Foreign,
    }
}
