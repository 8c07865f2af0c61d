//! Platform-independent shell core.
//!
//! The loop talks to the user only through `Host`, so the terminal host
//! and the scripted test host drive the same code.

use crate::commands::{self, CommandResult};
use crate::host::{Event, Host, HostError, Tone};
use crate::shell::Shell;

/// Why the shell stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The user typed `exit` or `quit`.
    UserExit,
    Eof,
}

pub struct ReplCore {
    shell: Shell,
}

impl ReplCore {
    pub fn new(shell: Shell) -> Self {
        Self { shell }
    }

    /// Read and execute commands until the user leaves.
    pub fn run(&mut self, host: &mut impl Host) -> Result<ExitReason, HostError> {
        host.print(Tone::Notice, BANNER)?;

        loop {
            let line = match host.next_event(self.shell.session_count())? {
                Event::Line(line) => line,
                Event::Interrupt => {
                    host.print(Tone::Notice, "^C (use 'exit' to quit)")?;
                    continue;
                }
                Event::Eof => {
                    host.print(Tone::Notice, "Goodbye!")?;
                    return Ok(ExitReason::Eof);
                }
            };

            match commands::execute(&line, &mut self.shell) {
                CommandResult::Ok(None) => {}
                CommandResult::Ok(Some(output)) => host.print(Tone::Plain, &output)?,
                CommandResult::Error(msg) => {
                    tracing::debug!(line = %line, error = %msg, "command failed");
                    host.print(Tone::Error, &msg)?;
                }
                CommandResult::Help => host.print(Tone::Plain, &commands::format_help())?,
                CommandResult::Exit => {
                    host.print(Tone::Notice, "Goodbye!")?;
                    return Ok(ExitReason::UserExit);
                }
            }
        }
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }
}

const BANNER: &str = r#"
                 _      __
 __ __ __  ___  | |__  / _| ___
 \ V  V / / -_) | '_ \|  _|(_-<
  \_/\_/  \___| |_.__/|_|  /__/

Type 'help' for available commands, 'exit' to quit.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use webfs::Config;
    use webfs_http::mock::MockExecutor;

    use crate::host::ScriptedHost;

    fn core() -> ReplCore {
        let executor = MockExecutor::new()
            .with_default_response(MockExecutor::success_response("payload", &[]));
        ReplCore::new(Shell::with_executor(Config::default(), Arc::new(executor)).unwrap())
    }

    #[test]
    fn test_exit_command() {
        let mut core = core();
        let mut host = ScriptedHost::typing(["exit"]);

        let result = core.run(&mut host);

        assert!(matches!(result, Ok(ExitReason::UserExit)));
        assert_eq!(host.printed(Tone::Notice), vec![BANNER, "Goodbye!"]);
    }

    #[test]
    fn test_eof_ends_session() {
        let mut core = core();
        let mut host = ScriptedHost::new();
        host.push(Event::Eof);
        host.push(Event::Line("clone".to_string()));

        assert!(matches!(core.run(&mut host), Ok(ExitReason::Eof)));
        assert_eq!(core.shell().session_count(), 0);
    }

    #[test]
    fn test_interrupt_keeps_running() {
        let mut core = core();
        let mut host = ScriptedHost::new();
        host.push(Event::Interrupt);
        host.push(Event::Line("exit".to_string()));

        assert!(matches!(core.run(&mut host), Ok(ExitReason::UserExit)));
        assert!(host
            .printed(Tone::Notice)
            .iter()
            .any(|o| o.starts_with("^C")));
    }

    #[test]
    fn test_session_round_trip() {
        let mut core = core();
        let mut host = ScriptedHost::typing([
            "clone",
            "write 0/ctl url http://example.com/",
            "cat 0/body",
            "cat 0/missing",
            "exit",
        ]);

        assert!(matches!(core.run(&mut host), Ok(ExitReason::UserExit)));
        assert_eq!(host.printed(Tone::Plain), vec!["0", "payload"]);
        let errors = host.printed(Tone::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("cat /0/missing:"));

        assert_eq!(host.prompts(), &[0, 1, 1, 1, 1]);
        assert_eq!(core.shell().session_count(), 1);
    }

    #[test]
    fn test_cat_long_parsed_value() {
        let mut core = core();
        let path = format!("/{}", "p".repeat(9000));
        let write = format!("write 0/ctl url http://example.com{}", path);
        let mut host = ScriptedHost::typing(["clone", write.as_str(), "open 0/body"]);
        host.push(Event::Line("cat 0/parsed/path".to_string()));

        assert!(matches!(core.run(&mut host), Ok(ExitReason::Eof)));
        assert!(host.printed(Tone::Error).is_empty());
        assert_eq!(host.printed(Tone::Plain).last(), Some(&path.as_str()));
    }
}
