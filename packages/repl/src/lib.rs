//! # webfs-repl
//!
//! An interactive shell over a webfs tree.
//!
//! Every command is carried out through the same handle operations a
//! remote client would use: walk, open, read, write, clunk.
//!
//! ## Usage
//!
//! ```bash
//! webfs -A my-agent -T 5000
//!
//! # Inside the shell:
//! > clone
//! 0
//! > write 0/ctl url https://example.com/
//! > cat 0/body
//! > ls 0
//! > cat 0/contenttype
//! ```

pub mod commands;
pub mod completer;
pub mod core;
pub mod host;
pub mod shell;

pub use shell::Shell;

use crate::core::{ExitReason, ReplCore};
use crate::host::TerminalHost;

/// Run the shell on the terminal until the user exits.
pub fn run(shell: Shell) -> Result<ExitReason, Box<dyn std::error::Error>> {
    let mut host = TerminalHost::new()?;
    let mut core = ReplCore::new(shell);
    Ok(core.run(&mut host)?)
}
