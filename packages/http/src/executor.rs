//! HTTP execution abstraction.
//!
//! `HttpExecutor` is the seam between webfs and the network. The production
//! implementation uses reqwest's blocking client; tests substitute the
//! recording mock below.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, HOST, USER_AGENT};

use crate::error::Error;
use crate::types::{HeaderMultiMap, HttpRequest, HttpResponse};

/// Trait for executing HTTP requests.
///
/// Implementations block until the full response body has been read or the
/// timeout expires.
pub trait HttpExecutor: Send + Sync {
    /// Execute `request`, identifying as `user_agent` and giving up after
    /// `timeout`.
    fn execute(
        &self,
        request: &HttpRequest,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, Error>;
}

/// Production HTTP executor using reqwest.
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(
        &self,
        request: &HttpRequest,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, Error> {
        let method: http::Method = request.method.into();

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.append(header_name, header_value);
        }
        if let Some(host) = &request.host {
            let value = HeaderValue::try_from(host.as_str())
                .map_err(|e| Error::InvalidHeader(format!("host: {}", e)))?;
            headers.insert(HOST, value);
        }
        let agent = HeaderValue::try_from(user_agent)
            .map_err(|e| Error::InvalidHeader(format!("user-agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self
            .client
            .request(method, request.url.clone())
            .headers(headers)
            .timeout(timeout)
            .send()
            .map_err(|e| Error::from_send(e, timeout))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut resp_headers = HeaderMultiMap::new();
        for (name, value) in response.headers() {
            resp_headers.append(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }

        let body = response.bytes().map_err(|e| {
            if e.is_timeout() {
                Error::Timeout { after: timeout }
            } else {
                Error::Body(e.to_string())
            }
        })?;

        tracing::debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            status_text,
            headers: resp_headers,
            body,
        })
    }
}

/// Mock HTTP executor for testing.
///
/// Returns predefined responses based on request matching.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;

    /// How the mock fails, when configured to.
    #[derive(Clone)]
    enum Failure {
        Request(String),
        Timeout,
    }

    /// A mock HTTP executor that returns predefined responses.
    ///
    /// Clones share state, so a test can keep one clone for inspection and
    /// hand another to the code under test.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Responses keyed by full request URL.
        responses: Arc<Mutex<HashMap<String, HttpResponse>>>,
        /// Default response when no match found.
        default_response: Arc<Mutex<Option<HttpResponse>>>,
        /// Recorded requests for verification.
        recorded_requests: Arc<Mutex<Vec<HttpRequest>>>,
        /// Failure to report instead of a response.
        failure: Arc<Mutex<Option<Failure>>>,
        /// Time to sleep before answering.
        delay: Arc<Mutex<Option<Duration>>>,
    }

    impl MockExecutor {
        /// Create a new mock executor.
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a response for a specific URL.
        pub fn with_response(self, url: impl Into<String>, response: HttpResponse) -> Self {
            self.responses.lock().unwrap().insert(url.into(), response);
            self
        }

        /// Set a default response when no URL matches.
        pub fn with_default_response(self, response: HttpResponse) -> Self {
            *self.default_response.lock().unwrap() = Some(response);
            self
        }

        /// Sleep this long before answering each request.
        pub fn with_delay(self, delay: Duration) -> Self {
            *self.delay.lock().unwrap() = Some(delay);
            self
        }

        /// Configure to fail all requests with an error.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.failure.lock().unwrap() = Some(Failure::Request(message.into()));
            self
        }

        /// Configure to fail all requests as if the deadline passed.
        pub fn fail_with_timeout(self) -> Self {
            *self.failure.lock().unwrap() = Some(Failure::Timeout);
            self
        }

        /// Stop failing; later requests get responses again.
        pub fn recover(&self) {
            *self.failure.lock().unwrap() = None;
        }

        /// Get all recorded requests.
        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// Number of requests executed so far.
        pub fn executions(&self) -> usize {
            self.recorded_requests.lock().unwrap().len()
        }

        /// Create a 200 response with the given body and headers.
        pub fn success_response(body: &str, headers: &[(&str, &str)]) -> HttpResponse {
            HttpResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: headers.iter().copied().collect(),
                body: Bytes::copy_from_slice(body.as_bytes()),
            }
        }

        /// Create a 404 Not Found response.
        pub fn not_found() -> HttpResponse {
            HttpResponse {
                status: 404,
                status_text: "Not Found".to_string(),
                headers: HeaderMultiMap::new(),
                body: Bytes::from_static(b"not found"),
            }
        }
    }

    impl HttpExecutor for MockExecutor {
        fn execute(
            &self,
            request: &HttpRequest,
            _user_agent: &str,
            timeout: Duration,
        ) -> Result<HttpResponse, Error> {
            self.recorded_requests.lock().unwrap().push(request.clone());

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }

            let failure = self.failure.lock().unwrap().clone();
            match failure {
                Some(Failure::Request(message)) => return Err(Error::Request(message)),
                Some(Failure::Timeout) => return Err(Error::Timeout { after: timeout }),
                None => {}
            }

            if let Some(response) = self.responses.lock().unwrap().get(request.url.as_str()) {
                return Ok(response.clone());
            }

            if let Some(ref response) = *self.default_response.lock().unwrap() {
                return Ok(response.clone());
            }

            Ok(Self::not_found())
        }
    }
}
