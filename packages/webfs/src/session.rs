//! Sessions: one HTTP exchange each.
//!
//! A session starts Unconfigured, becomes Ready once a target URL is set,
//! and becomes Executed when its body file is first opened successfully.
//! The response is stored once, with the request that produced it, so "has a
//! response" and "has executed" are the same fact.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, Weak};

use url::Url;
use webfs_http::{HttpRequest, HttpResponse, Method};
use webfs_tree::Node;

use crate::error::{Error, Result};
use crate::file::WebFile;

pub type SessionId = u64;

/// Only used to check that a relative reference is well formed.
const PLACEHOLDER_BASE: &str = "http://webfs.invalid/";

/// A URL as written to a control file: absolute, or a reference to be
/// resolved against the session's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlRef {
    Absolute(Url),
    Relative(String),
}

fn malformed(input: &str, reason: impl fmt::Display) -> Error {
    Error::MalformedUrl {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl UrlRef {
    pub fn parse(input: &str) -> Result<Self> {
        match Url::parse(input) {
            Ok(url) => Ok(UrlRef::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(PLACEHOLDER_BASE)
                    .and_then(|base| base.join(input))
                    .map_err(|e| malformed(input, e))?;
                Ok(UrlRef::Relative(input.to_string()))
            }
            Err(e) => Err(malformed(input, e)),
        }
    }

    /// Resolve against `base`, if any.
    ///
    /// An absolute URL resolves to itself. A relative reference needs an
    /// absolute base.
    pub fn resolve(&self, base: Option<&UrlRef>) -> Result<Url> {
        match (self, base) {
            (UrlRef::Absolute(url), None) => Ok(url.clone()),
            (UrlRef::Absolute(url), Some(UrlRef::Absolute(base))) => base
                .join(url.as_str())
                .map_err(|e| malformed(url.as_str(), e)),
            (UrlRef::Absolute(url), Some(UrlRef::Relative(_))) => Ok(url.clone()),
            (UrlRef::Relative(reference), Some(UrlRef::Absolute(base))) => base
                .join(reference)
                .map_err(|e| malformed(reference, e)),
            (UrlRef::Relative(reference), _) => {
                Err(malformed(reference, "relative url with no absolute baseurl"))
            }
        }
    }
}

impl fmt::Display for UrlRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlRef::Absolute(url) => f.write_str(url.as_str()),
            UrlRef::Relative(reference) => f.write_str(reference),
        }
    }
}

/// The parts of the outgoing request that are known before execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTemplate {
    pub method: Method,
    pub headers: Vec<(String, String)>,
}

/// A completed exchange: what was sent and what came back.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request: HttpRequest,
    pub response: HttpResponse,
}

impl Exchange {
    /// The URL the request was actually sent to.
    pub fn url(&self) -> &Url {
        &self.request.url
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconfigured,
    Ready,
    Executed,
}

/// What a control file configures: the request still to be sent.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    target: Option<UrlRef>,
    base: Option<UrlRef>,
    template: RequestTemplate,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            target: None,
            base: None,
            template: RequestTemplate::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn target(&self) -> Option<&UrlRef> {
        self.target.as_ref()
    }

    pub fn base(&self) -> Option<&UrlRef> {
        self.base.as_ref()
    }

    pub fn set_target(&mut self, url: UrlRef) {
        self.target = Some(url);
    }

    pub fn set_base(&mut self, url: UrlRef) {
        self.base = Some(url);
    }

    pub fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// The target resolved against the base, as it stands now.
    pub fn resolved_url(&self) -> Result<Url> {
        let target = self.target.as_ref().ok_or(Error::UrlNotSet(self.id))?;
        target.resolve(self.base.as_ref())
    }

    /// Build the outgoing request from the template and resolved URL.
    pub fn prepare(&self) -> Result<HttpRequest> {
        let url = self.resolved_url()?;
        let mut request = HttpRequest::new(self.template.method, url);
        request.headers = self.template.headers.clone();
        request.host = host_header(&request.url);
        Ok(request)
    }
}

/// `host[:port]` as it appears in the URL's authority.
fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// A session shared between the files of its directory.
///
/// The mutex serializes control writes against body execution. It is held
/// across the network call, so concurrent opens of the same body wait and
/// then observe the finished exchange. The exchange itself is written once
/// and read without the mutex, so reads never wait on an open in flight.
pub struct SessionCell {
    id: SessionId,
    session: Mutex<Session>,
    exchange: OnceLock<Exchange>,
    dir: Weak<Node<WebFile>>,
}

impl SessionCell {
    pub fn new(id: SessionId, dir: Weak<Node<WebFile>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            session: Mutex::new(Session::new(id)),
            exchange: OnceLock::new(),
            dir,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The finished exchange, once the body has been opened successfully.
    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.get()
    }

    /// Record the response. Only the first call stores anything; later
    /// calls return the exchange already recorded.
    pub fn complete(&self, request: HttpRequest, response: HttpResponse) -> &Exchange {
        self.exchange.get_or_init(|| Exchange { request, response })
    }

    pub fn state(&self) -> SessionState {
        if self.exchange().is_some() {
            return SessionState::Executed;
        }
        match self.lock().target() {
            Some(_) => SessionState::Ready,
            None => SessionState::Unconfigured,
        }
    }

    /// The URL the request was sent to, or will be sent to.
    pub fn resolved_url(&self) -> Result<Url> {
        match self.exchange() {
            Some(exchange) => Ok(exchange.url().clone()),
            None => self.lock().resolved_url(),
        }
    }

    /// The session's directory, while it is still alive.
    pub fn dir(&self) -> Option<Arc<Node<WebFile>>> {
        self.dir.upgrade()
    }
}
