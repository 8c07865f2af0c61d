//! # webfs
//!
//! HTTP request/response exchanges exposed as a synthetic file tree.
//!
//! Reading `/clone` allocates a session directory and returns its id.
//! Writing `url <URL>` to the session's `ctl` sets its target; opening the
//! session's `body` performs the request once, after which `body` serves
//! the response bytes, `parsed/*` the pieces of the resolved URL, and one
//! file per response header appears beside them.
//!
//! ```
//! use std::sync::Arc;
//! use webfs::{Config, WebFs};
//! use webfs_http::mock::MockExecutor;
//!
//! let executor = MockExecutor::new()
//!     .with_default_response(MockExecutor::success_response("hello", &[("Content-Type", "text/plain")]));
//! let fs = WebFs::new(Config::default(), Arc::new(executor))?;
//!
//! let (id, _ctl) = fs.clone_session()?;
//! fs.write_file(&format!("{}/ctl", id), b"url http://example.com/\n")?;
//! assert_eq!(fs.read_file(&format!("{}/body", id))?, b"hello");
//! assert_eq!(fs.read_file(&format!("{}/contenttype", id))?, b"text/plain");
//! # Ok::<(), webfs::Error>(())
//! ```

pub mod body;
pub mod config;
pub mod ctl;
pub mod error;
pub mod file;
pub mod fs;
pub mod header;
pub mod parsed;
pub mod root;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use file::{ReadPolicy, WebFile};
pub use fs::WebFs;
pub use parsed::ParsedKind;
pub use session::{SessionId, SessionState, UrlRef};
