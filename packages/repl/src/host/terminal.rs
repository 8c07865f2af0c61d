//! Terminal host implementation using Reedline.
//!
//! Provides line editing (vi or emacs keys), command completion, and
//! history persisted under the user's data directory.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::PathBuf;

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, DefaultHinter, EditMode, Emacs, KeyCode, KeyModifiers, MenuBuilder, Prompt,
    PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, ReedlineEvent,
    ReedlineMenu, Signal as ReedlineSignal, Vi,
};

use super::{Event, Host, HostError, Tone};
use crate::completer::ReplCompleter;

/// Environment variable forcing the edit mode (`vi` or `emacs`).
pub const EDIT_MODE_ENV: &str = "WEBFS_EDIT_MODE";

/// Terminal host using Reedline for interactive I/O.
pub struct TerminalHost {
    line_editor: Reedline,
}

impl TerminalHost {
    pub fn new() -> io::Result<Self> {
        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name("completion_menu")
                .with_text_style(Style::new().fg(Color::Cyan))
                .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan).bold()),
        );
        let tab = ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]);

        let edit_mode: Box<dyn EditMode> = if should_use_vi_mode() {
            let mut insert_keybindings = default_vi_insert_keybindings();
            insert_keybindings.add_binding(KeyModifiers::NONE, KeyCode::Tab, tab);
            Box::new(Vi::new(insert_keybindings, default_vi_normal_keybindings()))
        } else {
            let mut keybindings = default_emacs_keybindings();
            keybindings.add_binding(KeyModifiers::NONE, KeyCode::Tab, tab);
            Box::new(Emacs::new(keybindings))
        };

        let mut line_editor = Reedline::create()
            .with_completer(Box::new(ReplCompleter::new()))
            .with_hinter(Box::new(
                DefaultHinter::default().with_style(Style::new().fg(Color::LightGray).dimmed()),
            ))
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode);

        if let Some(history_path) = history_path() {
            if let Some(parent) = history_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match reedline::FileBackedHistory::with_file(1000, history_path) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => tracing::debug!(error = %e, "history disabled"),
            }
        }

        Ok(Self { line_editor })
    }
}

impl Host for TerminalHost {
    fn next_event(&mut self, sessions: usize) -> Result<Event, HostError> {
        let prompt = TerminalPrompt {
            session_count: sessions,
        };
        Ok(match self.line_editor.read_line(&prompt)? {
            ReedlineSignal::Success(line) => Event::Line(line),
            ReedlineSignal::CtrlC => Event::Interrupt,
            ReedlineSignal::CtrlD => Event::Eof,
        })
    }

    fn print(&mut self, tone: Tone, text: &str) -> Result<(), HostError> {
        let mut out = io::stdout().lock();
        match tone {
            Tone::Plain => writeln!(out, "{}", text)?,
            Tone::Error => writeln!(out, "{} {}", Color::Red.bold().paint("Error:"), text)?,
            Tone::Notice => writeln!(out, "{}", Color::Cyan.paint(text))?,
        }
        out.flush()?;
        Ok(())
    }
}

struct TerminalPrompt {
    session_count: usize,
}

impl Prompt for TerminalPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let sessions = match self.session_count {
            0 => Color::Yellow.paint("no sessions").to_string(),
            n => Color::Blue.bold().paint(format!("{} session(s)", n)).to_string(),
        };
        Cow::Owned(format!("{} {}", Color::Green.paint("webfs"), sessions))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => {
                Cow::Owned(format!(" {} ", Color::Green.bold().paint(">")))
            }
            PromptEditMode::Vi(vi_mode) => {
                let indicator = match vi_mode {
                    reedline::PromptViMode::Normal => Color::Blue.bold().paint("[N]>"),
                    reedline::PromptViMode::Insert => Color::Green.bold().paint("[I]>"),
                };
                Cow::Owned(format!(" {} ", indicator))
            }
            PromptEditMode::Custom(s) => Cow::Owned(format!(" ({})> ", s)),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(": ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("webfs").join("history.txt"))
}

/// Vi keys when forced by `WEBFS_EDIT_MODE`, else when `EDITOR` or `VISUAL`
/// names vi.
fn should_use_vi_mode() -> bool {
    if let Ok(mode) = std::env::var(EDIT_MODE_ENV) {
        let mode = mode.to_lowercase();
        return mode == "vi" || mode == "vim";
    }
    ["EDITOR", "VISUAL"].iter().any(|var| {
        std::env::var(var)
            .map(|editor| {
                let editor = editor.to_lowercase();
                editor.contains("vim") || editor == "vi"
            })
            .unwrap_or(false)
    })
}
