//! Session control files.
//!
//! Writes carry newline-terminated commands:
//! - `url <URL>` sets the target URL (absolute, or relative to `baseurl`)
//! - `baseurl <URL>` sets the base URL used to resolve relative targets
//!
//! A read returns the session id.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::file::single_shot;
use crate::session::{SessionCell, SessionState, UrlRef};

/// One parsed control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CtlMessage {
    Url(UrlRef),
    BaseUrl(UrlRef),
}

impl CtlMessage {
    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut fields = line.split_whitespace();
        let Some(command) = fields.next() else {
            return Ok(None);
        };
        match command {
            "url" => {
                let arg = fields.next().ok_or(Error::MissingArgument)?;
                Ok(Some(CtlMessage::Url(UrlRef::parse(arg)?)))
            }
            "baseurl" => {
                let arg = fields.next().ok_or(Error::MissingArgument)?;
                Ok(Some(CtlMessage::BaseUrl(UrlRef::parse(arg)?)))
            }
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

/// The `ctl` file inside a session directory.
pub struct CtlFile {
    session: Arc<SessionCell>,
}

impl CtlFile {
    pub fn new(session: Arc<SessionCell>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        single_shot(format!("{}\n", self.session.id()).as_bytes(), buf)
    }

    /// Apply each line in order.
    ///
    /// A bad line stops processing, but lines before it stay applied.
    /// On success the whole input counts as consumed.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        let text = String::from_utf8_lossy(data);
        let mut session = self.session.lock();
        for line in text.lines() {
            tracing::info!(session = session.id(), line, "ctl");
            match CtlMessage::parse(line)? {
                Some(CtlMessage::Url(url)) => session.set_target(url),
                Some(CtlMessage::BaseUrl(url)) => session.set_base(url),
                None => {}
            }
        }
        Ok(data.len())
    }
}
