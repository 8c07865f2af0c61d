//! Where the shell reads events from and prints to.
//!
//! The core sees only `Host`: the terminal host renders with Reedline and
//! ANSI colors, the scripted host replays a fixed session in tests.

pub mod terminal;

#[cfg(test)]
pub mod scripted;

pub use terminal::TerminalHost;

#[cfg(test)]
pub use scripted::ScriptedHost;

#[derive(Debug, thiserror::Error)]
#[error("terminal: {0}")]
pub struct HostError(#[from] std::io::Error);

/// What the user did at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Line(String),
    /// Ctrl+C.
    Interrupt,
    /// Ctrl+D, or the input ran out.
    Eof,
}

/// How printed text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Command output, printed as is.
    Plain,
    Error,
    /// Messages from the shell itself.
    Notice,
}

pub trait Host {
    /// Prompt the user and wait for the next event. `sessions` is the
    /// number of session directories currently in the tree.
    fn next_event(&mut self, sessions: usize) -> Result<Event, HostError>;

    /// Print one message. It is visible once this returns.
    fn print(&mut self, tone: Tone, text: &str) -> Result<(), HostError>;
}
