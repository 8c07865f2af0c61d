//! The state a shell session carries between commands.

use std::sync::Arc;

use webfs::{Config, WebFs};
use webfs_http::HttpExecutor;

/// Shell context: the tree being browsed.
pub struct Shell {
    fs: WebFs,
}

impl Shell {
    pub fn new(fs: WebFs) -> Self {
        Self { fs }
    }

    /// A shell over a fresh tree using `executor` for requests.
    pub fn with_executor(config: Config, executor: Arc<dyn HttpExecutor>) -> webfs::Result<Self> {
        Ok(Self::new(WebFs::new(config, executor)?))
    }

    pub fn fs(&self) -> &WebFs {
        &self.fs
    }

    /// Number of session directories currently in the tree.
    pub fn session_count(&self) -> usize {
        self.fs.session_ids().len()
    }
}

/// Normalize a user-typed path to the absolute form shown back to the user.
pub fn display_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    format!("/{}", parts.join("/"))
}
