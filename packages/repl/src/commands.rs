//! Shell command parsing and execution.
//!
//! Commands:
//! - `ls [path]` - List a directory, or describe a file
//! - `cat <path>` - Open a file and read it to the end (alias: read)
//! - `write <path> <text...>` - Write a line of text to a file
//! - `open <path>` - Open a file for reading without reading it
//! - `clone` - Allocate a new session
//! - `help` - Show help
//! - `exit` - Exit the shell
//!
//! A typical session:
//! ```text
//! > clone
//! 0
//! > write 0/ctl url https://example.com/
//! > cat 0/body
//! ```

use nu_ansi_term::{Color, Style};

use webfs_tree::{OpenMode, Stat};

use crate::shell::{display_path, Shell};

/// Result of executing a command
pub enum CommandResult {
    /// Command succeeded, optionally with output to display
    Ok(Option<String>),
    /// Command failed with an error message
    Error(String),
    /// User requested to exit
    Exit,
    /// Show help
    Help,
}

impl CommandResult {
    fn ok_display(display: impl Into<String>) -> Self {
        CommandResult::Ok(Some(display.into()))
    }

    fn ok_none() -> Self {
        CommandResult::Ok(None)
    }
}

/// Parse and execute a command
pub fn execute(input: &str, shell: &mut Shell) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::ok_none();
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match command.to_lowercase().as_str() {
        "help" | "?" => CommandResult::Help,
        "exit" | "quit" | "q" => CommandResult::Exit,
        "ls" => cmd_ls(args, shell),
        "cat" | "read" => cmd_cat(args, shell),
        "write" | "w" => cmd_write(args, shell),
        "open" => cmd_open(args, shell),
        "clone" => cmd_clone(shell),
        _ => CommandResult::Error(format!(
            "Unknown command: '{}'. Type 'help' for available commands.",
            command
        )),
    }
}

/// Format help text
pub fn format_help() -> String {
    let cmd_style = Style::new().bold().fg(Color::Cyan);
    let arg_style = Style::new().fg(Color::Yellow);

    let mut help = String::new();
    help.push_str(&format!("{}\n\n", Style::new().bold().paint("webfs Commands")));

    let commands = [
        ("ls", "[path]", "List a directory or describe a file"),
        ("cat", "<path>", "Read a whole file (alias: read)"),
        ("write", "<path> <text>", "Write a line to a file (alias: w)"),
        ("open", "<path>", "Open a file; opening N/body sends the request"),
        ("clone", "", "Allocate a new session"),
        ("", "", ""),
        ("help", "", "Show this help message"),
        ("exit", "", "Exit the shell (alias: quit, q)"),
    ];

    for (cmd, args, desc) in commands {
        if cmd.is_empty() {
            help.push('\n');
        } else {
            help.push_str(&format!(
                "  {:<12} {:<20} {}\n",
                cmd_style.paint(cmd),
                arg_style.paint(args),
                desc
            ));
        }
    }

    help.push_str(&format!("\n{}\n", Style::new().bold().paint("Sessions")));
    for (what, example) in [
        ("Set the target:", "write 0/ctl url https://example.com/"),
        ("Set a base:", "write 0/ctl baseurl https://example.com/docs/"),
        ("Fetch the body:", "cat 0/body"),
        ("Inspect the URL:", "cat 0/parsed/host"),
        ("Read a header:", "cat 0/contenttype"),
    ] {
        help.push_str(&format!("  {:<18} {}\n", what, arg_style.paint(example)));
    }

    help
}

fn cmd_ls(args: &str, shell: &mut Shell) -> CommandResult {
    let path = if args.is_empty() { "/" } else { args };
    let fs = shell.fs();

    let stat = match stat_path(shell, path) {
        Ok(stat) => stat,
        Err(e) => return CommandResult::Error(format!("ls {}: {}", display_path(path), e)),
    };
    if !stat.mode.is_dir() {
        return CommandResult::ok_display(format_stat(&stat));
    }

    let listing = match fs.read_file(path) {
        Ok(listing) => String::from_utf8_lossy(&listing).into_owned(),
        Err(e) => return CommandResult::Error(format!("ls {}: {}", display_path(path), e)),
    };

    let mut lines = Vec::new();
    for entry in listing.lines() {
        let name = entry.trim_end_matches('/');
        let child = format!("{}/{}", path.trim_end_matches('/'), name);
        match stat_path(shell, &child) {
            Ok(stat) => lines.push(format_stat(&stat)),
            Err(e) => tracing::debug!(path = %child, error = %e, "ls: can't stat entry"),
        }
    }
    CommandResult::ok_display(lines.join("\n"))
}

fn cmd_cat(args: &str, shell: &mut Shell) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: cat <path>".to_string());
    }
    match shell.fs().read_file(args) {
        Ok(data) => {
            let text = String::from_utf8_lossy(&data);
            CommandResult::ok_display(text.trim_end_matches('\n'))
        }
        Err(e) => CommandResult::Error(format!("cat {}: {}", display_path(args), e)),
    }
}

fn cmd_write(args: &str, shell: &mut Shell) -> CommandResult {
    let Some((path, text)) = parse_write_args(args) else {
        return CommandResult::Error("Usage: write <path> <text>".to_string());
    };
    let line = format!("{}\n", text);
    match shell.fs().write_file(&path, line.as_bytes()) {
        Ok(_) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(format!("write {}: {}", display_path(&path), e)),
    }
}

fn cmd_open(args: &str, shell: &mut Shell) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: open <path>".to_string());
    }
    let fs = shell.fs();
    let result = fs
        .open(args, OpenMode::Read)
        .and_then(|fid| fs.server().clunk(fid).map_err(webfs::Error::from));
    match result {
        Ok(()) => CommandResult::ok_display(format!("{}", Color::Green.paint("ok"))),
        Err(e) => CommandResult::Error(format!("open {}: {}", display_path(args), e)),
    }
}

fn cmd_clone(shell: &mut Shell) -> CommandResult {
    let fs = shell.fs();
    let result = fs
        .clone_session()
        .and_then(|(id, fid)| {
            fs.server()
                .clunk(fid)
                .map(|_| id)
                .map_err(webfs::Error::from)
        });
    match result {
        Ok(id) => CommandResult::ok_display(id.to_string()),
        Err(e) => CommandResult::Error(format!("clone: {}", e)),
    }
}

fn stat_path(shell: &Shell, path: &str) -> webfs::Result<Stat> {
    let server = shell.fs().server();
    let fid = server.walk_path(path)?;
    let stat = server.stat(fid);
    server.clunk(fid)?;
    stat.map_err(webfs::Error::from)
}

fn format_stat(stat: &Stat) -> String {
    let name = if stat.mode.is_dir() {
        Color::Blue.bold().paint(&stat.name).to_string()
    } else {
        stat.name.clone()
    };
    format!("{} {} {} {}", stat.mode, stat.owner, stat.group, name)
}

/// Split `write` arguments into a path and the rest of the line.
fn parse_write_args(args: &str) -> Option<(String, String)> {
    let (path, text) = args.split_once(char::is_whitespace)?;
    let text = text.trim_start();
    if path.is_empty() || text.is_empty() {
        return None;
    }
    Some((path.to_string(), text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use webfs::Config;
    use webfs_http::mock::MockExecutor;

    fn shell() -> Shell {
        let executor = MockExecutor::new().with_default_response(MockExecutor::success_response(
            "hello from the web",
            &[("Content-Type", "text/plain")],
        ));
        Shell::with_executor(Config::default(), Arc::new(executor)).unwrap()
    }

    fn display(result: CommandResult) -> String {
        match result {
            CommandResult::Ok(Some(text)) => text,
            CommandResult::Ok(None) => String::new(),
            CommandResult::Error(e) => panic!("unexpected error: {}", e),
            CommandResult::Exit => panic!("unexpected exit"),
            CommandResult::Help => panic!("unexpected help"),
        }
    }

    fn error(result: CommandResult) -> String {
        match result {
            CommandResult::Error(e) => e,
            _ => panic!("expected an error"),
        }
    }

    #[test]
    fn test_parse_write_args() {
        assert_eq!(
            parse_write_args("0/ctl url http://example.com/"),
            Some(("0/ctl".to_string(), "url http://example.com/".to_string()))
        );
        assert_eq!(parse_write_args("0/ctl"), None);
        assert_eq!(parse_write_args(""), None);
    }

    #[test]
    fn test_clone_then_fetch() {
        let mut shell = shell();
        assert_eq!(display(execute("clone", &mut shell)), "0");
        assert_eq!(display(execute("clone", &mut shell)), "1");
        assert_eq!(shell.session_count(), 2);

        display(execute("write 0/ctl url http://example.com/", &mut shell));
        assert_eq!(display(execute("cat 0/body", &mut shell)), "hello from the web");
        assert_eq!(display(execute("read /0/contenttype", &mut shell)), "text/plain");
        assert_eq!(display(execute("cat 0/parsed/host", &mut shell)), "example.com");
    }

    #[test]
    fn test_cat_root_ctl() {
        let mut shell = shell();
        assert_eq!(
            display(execute("cat ctl", &mut shell)),
            "useragent hjdicks\ntimeout 10000"
        );
    }

    #[test]
    fn test_ls_root() {
        let mut shell = shell();
        execute("clone", &mut shell);
        let out = display(execute("ls", &mut shell));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("dr-xr-xr-x none none"));
        assert_eq!(lines[1], "-rw-rw-rw- none none clone");
        assert_eq!(lines[2], "-r--r--r-- none none ctl");
    }

    #[test]
    fn test_ls_file() {
        let mut shell = shell();
        execute("clone", &mut shell);
        assert_eq!(
            display(execute("ls 0/ctl", &mut shell)),
            "-rw-rw-rw- none none ctl"
        );
    }

    #[test]
    fn test_open_body_without_url() {
        let mut shell = shell();
        execute("clone", &mut shell);
        let e = error(execute("open 0/body", &mut shell));
        assert_eq!(e, "open /0/body: body: 0 url not set");
    }

    #[test]
    fn test_write_unknown_ctl_command() {
        let mut shell = shell();
        execute("clone", &mut shell);
        let e = error(execute("write 0/ctl frobnicate", &mut shell));
        assert!(e.contains("unknown control message frobnicate"));
    }

    #[test]
    fn test_missing_path() {
        let mut shell = shell();
        let e = error(execute("cat nowhere", &mut shell));
        assert!(e.starts_with("cat /nowhere:"));
        assert!(error(execute("cat", &mut shell)).starts_with("Usage"));
        assert!(error(execute("write 0/ctl", &mut shell)).starts_with("Usage"));
    }

    #[test]
    fn test_unknown_command() {
        let mut shell = shell();
        let e = error(execute("frobnicate", &mut shell));
        assert!(e.contains("Unknown command: 'frobnicate'"));
    }

    #[test]
    fn test_help_and_exit() {
        let mut shell = shell();
        assert!(matches!(execute("help", &mut shell), CommandResult::Help));
        assert!(matches!(execute("exit", &mut shell), CommandResult::Exit));
        assert!(matches!(execute("   ", &mut shell), CommandResult::Ok(None)));
        assert!(format_help().contains("clone"));
    }
}
