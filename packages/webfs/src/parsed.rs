//! The `parsed/` directory: one read-only file per component of the
//! session's resolved URL.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use crate::error::{Error, Result};
use crate::file::single_shot;
use crate::session::SessionCell;

/// A URL component exposed under `parsed/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsedKind {
    Url,
    Scheme,
    User,
    Pass,
    Host,
    Port,
    Path,
    Query,
    Fragment,
}

impl ParsedKind {
    pub const ALL: [ParsedKind; 9] = [
        ParsedKind::Url,
        ParsedKind::Scheme,
        ParsedKind::User,
        ParsedKind::Pass,
        ParsedKind::Host,
        ParsedKind::Port,
        ParsedKind::Path,
        ParsedKind::Query,
        ParsedKind::Fragment,
    ];

    /// File name under `parsed/`.
    pub fn name(self) -> &'static str {
        match self {
            ParsedKind::Url => "url",
            ParsedKind::Scheme => "scheme",
            ParsedKind::User => "user",
            ParsedKind::Pass => "pass",
            ParsedKind::Host => "host",
            ParsedKind::Port => "port",
            ParsedKind::Path => "path",
            ParsedKind::Query => "query",
            ParsedKind::Fragment => "fragment",
        }
    }

    /// This component of `url`. Absent components are empty.
    pub fn extract(self, url: &Url) -> String {
        match self {
            ParsedKind::Url => url.as_str().to_string(),
            ParsedKind::Scheme => url.scheme().to_string(),
            ParsedKind::User => url.username().to_string(),
            ParsedKind::Pass => url.password().unwrap_or_default().to_string(),
            ParsedKind::Host => url.host_str().unwrap_or_default().to_string(),
            ParsedKind::Port => url.port().map(|p| p.to_string()).unwrap_or_default(),
            ParsedKind::Path => url.path().to_string(),
            ParsedKind::Query => url.query().unwrap_or_default().to_string(),
            ParsedKind::Fragment => url.fragment().unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for ParsedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParsedKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ParsedKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or(Error::NotImplemented("parsed component"))
    }
}

/// One file under `parsed/`.
pub struct ParsedFile {
    kind: ParsedKind,
    session: Arc<SessionCell>,
}

impl ParsedFile {
    pub fn new(kind: ParsedKind, session: Arc<SessionCell>) -> Self {
        Self { kind, session }
    }

    pub fn kind(&self) -> ParsedKind {
        self.kind
    }

    /// Serve the whole component from its start, whatever the offset.
    /// A buffer too small for the value is an error, not a short read.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let exchange = self
            .session
            .exchange()
            .ok_or(Error::UrlNotSet(self.session.id()))?;
        tracing::debug!(kind = %self.kind, "parsedfile read");
        single_shot(self.kind.extract(exchange.url()).as_bytes(), buf)
    }
}
