//! Process-wide settings, fixed at startup.

use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "hjdicks";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_OWNER: &str = "none";

/// Environment variable naming the owner of every file in the tree.
pub const OWNER_ENV: &str = "user";

/// Settings shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Sent as `User-Agent` on every request
    pub user_agent: String,

    /// Deadline for a whole request, including reading the body
    pub timeout: Duration,

    /// Owner and group of every node
    pub owner: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            owner: DEFAULT_OWNER.to_string(),
        }
    }
}

impl Config {
    /// Defaults, with the owner taken from `$user` when it is set.
    pub fn from_env() -> Self {
        let owner = std::env::var(OWNER_ENV)
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());
        Self {
            owner,
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Text served by the root `ctl` file.
    pub fn render(&self) -> String {
        format!(
            "useragent {}\ntimeout {}\n",
            self.user_agent,
            self.timeout.as_millis()
        )
    }
}
