//! Errors surfaced to the caller of a file operation.

use std::time::Duration;

use webfs_tree::TreeError;

use crate::session::SessionId;

/// Errors returned by webfs file operations.
///
/// Every failure goes back to whoever issued the failing open, read, or
/// write. Nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The session has no target URL, or has not executed yet.
    #[error("body: {0} url not set")]
    UrlNotSet(SessionId),

    #[error("ctl: missing argument in control message")]
    MissingArgument,

    #[error("ctl: unknown control message {0}")]
    UnknownCommand(String),

    #[error("ctl: url parse: {input}: {reason}")]
    MalformedUrl { input: String, reason: String },

    /// A single-shot read was given a buffer too small for the whole value.
    #[error("not enough buffer space for result: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("body: request failed: {0}")]
    RequestFailed(String),

    #[error("body: request timed out after {} ms", after.as_millis())]
    RequestTimeout { after: Duration },

    /// Two response headers normalize to the same file name.
    #[error("body: can't make header file {0}: name already in use")]
    DuplicateHeaderKey(String),

    #[error("{0}: not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl From<webfs_http::Error> for Error {
    fn from(error: webfs_http::Error) -> Self {
        match error {
            webfs_http::Error::Timeout { after } => Error::RequestTimeout { after },
            other => Error::RequestFailed(other.to_string()),
        }
    }
}

/// Result type alias for webfs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_not_set_names_session() {
        assert_eq!(Error::UrlNotSet(3).to_string(), "body: 3 url not set");
    }

    #[test]
    fn http_timeout_maps_to_request_timeout() {
        let e: Error = webfs_http::Error::Timeout {
            after: Duration::from_millis(250),
        }
        .into();
        assert!(matches!(e, Error::RequestTimeout { after } if after.as_millis() == 250));
        assert_eq!(e.to_string(), "body: request timed out after 250 ms");
    }

    #[test]
    fn other_http_errors_map_to_request_failed() {
        let e: Error = webfs_http::Error::Request("connection refused".to_string()).into();
        assert!(matches!(e, Error::RequestFailed(ref m) if m.contains("connection refused")));
    }

    #[test]
    fn tree_errors_pass_through() {
        let e: Error = TreeError::PermissionDenied.into();
        assert_eq!(e.to_string(), "permission denied");
    }
}
