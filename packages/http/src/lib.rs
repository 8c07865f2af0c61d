//! # webfs-http
//!
//! The HTTP side of webfs: plain-data requests and responses, and the
//! `HttpExecutor` seam that performs the round-trip.
//!
//! Everything about the transport (DNS, TCP, TLS, redirects) is the
//! executor's business. Callers build an `HttpRequest`, hand it to an
//! executor together with the user agent and timeout, and get back an
//! `HttpResponse` whose body is fully buffered.
//!
//! ```ignore
//! use std::time::Duration;
//! use webfs_http::{HttpExecutor, HttpRequest, ReqwestExecutor};
//!
//! let executor = ReqwestExecutor::new()?;
//! let request = HttpRequest::get(url::Url::parse("https://example.com/")?);
//! let response = executor.execute(&request, "webfs", Duration::from_secs(10))?;
//! println!("{} ({} bytes)", response.status, response.body.len());
//! ```

pub mod error;
pub mod executor;
pub mod types;

pub use error::Error;
pub use executor::{HttpExecutor, ReqwestExecutor};
pub use types::{HeaderMultiMap, HttpRequest, HttpResponse, Method};

#[cfg(any(test, feature = "mock"))]
pub use executor::mock;
