use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("request timed out after {} ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("reading body: {0}")]
    Body(String),
}

impl Error {
    /// Classify a failure from sending a request with the given deadline.
    pub fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Error::Timeout { after: timeout }
        } else {
            Error::Request(err.to_string())
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_uses_millis() {
        let e = Error::Timeout {
            after: Duration::from_millis(1500),
        };
        assert_eq!(e.to_string(), "request timed out after 1500 ms");
        assert!(e.is_timeout());
    }

    #[test]
    fn request_error_is_not_timeout() {
        let e = Error::Request("connection refused".to_string());
        assert!(!e.is_timeout());
        assert!(e.to_string().contains("connection refused"));
    }
}
