//! Recorded wrappers for connection factories.

use std::time::Duration;

use crate::api::{ConnectionBuilder, DataSource};
use crate::connection::RecordedConnection;
use crate::error::Result;
use crate::event::ObjectKind;
use crate::recorder::Recorder;

/// A recording wrapper around a driver [`DataSource`].
///
/// Connections handed out are wrapped in [`RecordedConnection`] sharing
/// this data source's recorder, so a whole connection tree reports into
/// one sink.
pub struct RecordedDataSource {
    delegate: Box<dyn DataSource>,
    recorder: Recorder,
}

impl RecordedDataSource {
    /// Wrap `delegate`, committing events through `recorder`.
    pub fn new(delegate: Box<dyn DataSource>, recorder: Recorder) -> Self {
        RecordedDataSource { delegate, recorder }
    }

    /// Wrap `delegate` with the default recorder.
    pub fn wrap(delegate: Box<dyn DataSource>) -> Self {
        RecordedDataSource::new(delegate, Recorder::with_defaults())
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn connect(&self) -> Result<RecordedConnection> {
        let _op = self
            .recorder
            .operation(ObjectKind::DataSource, "connect", None);
        let connection = self.delegate.connect()?;
        Ok(RecordedConnection::new(connection, self.recorder.clone()))
    }

    pub fn connect_with(&self, user: &str, password: &str) -> Result<RecordedConnection> {
        let _op = self
            .recorder
            .operation(ObjectKind::DataSource, "connect", None);
        let connection = self.delegate.connect_with(user, password)?;
        Ok(RecordedConnection::new(connection, self.recorder.clone()))
    }

    pub fn create_connection_builder(&self) -> Result<RecordedConnectionBuilder> {
        let builder = self.delegate.create_connection_builder()?;
        Ok(RecordedConnectionBuilder {
            delegate: builder,
            recorder: self.recorder.clone(),
        })
    }

    pub fn set_login_timeout(&self, timeout: Duration) -> Result<()> {
        self.delegate.set_login_timeout(timeout)
    }

    pub fn login_timeout(&self) -> Result<Duration> {
        self.delegate.login_timeout()
    }
}

impl std::fmt::Debug for RecordedDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedDataSource").finish_non_exhaustive()
    }
}

/// A recording wrapper around a driver [`ConnectionBuilder`].
pub struct RecordedConnectionBuilder {
    delegate: Box<dyn ConnectionBuilder>,
    recorder: Recorder,
}

impl RecordedConnectionBuilder {
    pub fn user(&mut self, user: &str) -> Result<()> {
        self.delegate.user(user)
    }

    pub fn password(&mut self, password: &str) -> Result<()> {
        self.delegate.password(password)
    }

    /// Build the connection, wrapped.
    pub fn build(&mut self) -> Result<RecordedConnection> {
        let _op = self
            .recorder
            .operation(ObjectKind::DataSource, "build", None);
        let connection = self.delegate.build()?;
        Ok(RecordedConnection::new(connection, self.recorder.clone()))
    }
}

impl std::fmt::Debug for RecordedConnectionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedConnectionBuilder")
            .finish_non_exhaustive()
    }
}
