//! Session body files.
//!
//! Opening the body executes the session's request, once. Reading serves
//! the buffered response body at any offset.

use std::sync::Arc;

use webfs_tree::read_at;

use crate::error::{Error, Result};
use crate::header;
use crate::root::RootState;
use crate::session::SessionCell;

/// The `body` file inside a session directory.
pub struct BodyFile {
    session: Arc<SessionCell>,
    state: Arc<RootState>,
}

impl BodyFile {
    pub fn new(session: Arc<SessionCell>, state: Arc<RootState>) -> Self {
        Self { session, state }
    }

    /// Execute the request unless the session already has a response.
    ///
    /// On failure the session stays Ready and a later open retries.
    pub fn open(&self) -> Result<()> {
        let session = self.session.lock();
        let id = session.id();
        if self.session.exchange().is_some() {
            tracing::debug!(session = id, "body: already executed");
            return Ok(());
        }

        let request = session.prepare()?;
        tracing::debug!(session = id, url = %request.url, "body: launching request");

        let config = self.state.config();
        let response = self
            .state
            .executor()
            .execute(&request, &config.user_agent, config.timeout)
            .map_err(|e| {
                tracing::debug!(session = id, error = %e, "body: request failed");
                Error::from(e)
            })?;
        tracing::debug!(
            session = id,
            status = response.status,
            bytes = response.body.len(),
            "body: response"
        );

        let exchange = self.session.complete(request, response);
        if let Some(dir) = self.session.dir() {
            header::materialize(&dir, &exchange.response.headers, &config.owner);
        }
        Ok(())
    }

    pub fn read(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let exchange = self
            .session
            .exchange()
            .ok_or(Error::UrlNotSet(self.session.id()))?;
        Ok(read_at(&exchange.response.body, buf, offset))
    }
}
