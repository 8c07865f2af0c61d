use reedline::{Completer, Span, Suggestion};

/// Command-name completer for the shell
pub struct ReplCompleter {
    commands: Vec<&'static str>,
}

impl ReplCompleter {
    pub fn new() -> Self {
        Self {
            commands: vec!["cat", "clone", "exit", "help", "ls", "open", "read", "write"],
        }
    }
}

impl Default for ReplCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for ReplCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line_to_pos = &line[..pos];
        let words: Vec<&str> = line_to_pos.split_whitespace().collect();

        // Only the command word is completed.
        if !(words.is_empty() || (words.len() == 1 && !line_to_pos.ends_with(' '))) {
            return Vec::new();
        }
        let prefix = words.first().copied().unwrap_or("");
        let start = line_to_pos.rfind(prefix).unwrap_or(0);

        self.commands
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Suggestion {
                value: cmd.to_string(),
                description: Some(command_description(cmd).to_string()),
                style: None,
                extra: None,
                span: Span::new(start, pos),
                append_whitespace: true,
                match_indices: None,
            })
            .collect()
    }
}

fn command_description(cmd: &str) -> &'static str {
    match cmd {
        "help" => "Show help",
        "exit" => "Exit the shell",
        "ls" => "List a directory",
        "cat" | "read" => "Read a whole file",
        "write" => "Write a line to a file",
        "open" => "Open a file",
        "clone" => "Allocate a session",
        _ => "",
    }
}
