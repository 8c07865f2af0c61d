use std::collections::VecDeque;

use super::{Event, Host, HostError, Tone};

/// Replays queued events and records what was printed and prompted.
///
/// Once the queue is empty every further event is `Eof`.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    events: VecDeque<Event>,
    printed: Vec<(Tone, String)>,
    prompts: Vec<usize>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that types `lines` in order.
    pub fn typing<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut host = Self::new();
        host.events
            .extend(lines.into_iter().map(|l| Event::Line(l.to_string())));
        host
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Text printed in `tone`, in order.
    pub fn printed(&self, tone: Tone) -> Vec<&str> {
        self.printed
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// The session count shown at each prompt.
    pub fn prompts(&self) -> &[usize] {
        &self.prompts
    }
}

impl Host for ScriptedHost {
    fn next_event(&mut self, sessions: usize) -> Result<Event, HostError> {
        self.prompts.push(sessions);
        Ok(self.events.pop_front().unwrap_or(Event::Eof))
    }

    fn print(&mut self, tone: Tone, text: &str) -> Result<(), HostError> {
        self.printed.push((tone, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_lines_then_eof() {
        let mut host = ScriptedHost::typing(["first", "second"]);
        assert_eq!(host.next_event(0).unwrap(), Event::Line("first".to_string()));
        assert_eq!(host.next_event(2).unwrap(), Event::Line("second".to_string()));
        assert_eq!(host.next_event(2).unwrap(), Event::Eof);
        assert_eq!(host.prompts(), &[0, 2, 2]);
    }

    #[test]
    fn printed_by_tone() {
        let mut host = ScriptedHost::new();
        host.print(Tone::Plain, "ok").unwrap();
        host.print(Tone::Error, "bad").unwrap();
        host.print(Tone::Notice, "note").unwrap();
        assert_eq!(host.printed(Tone::Error), vec!["bad"]);
        assert_eq!(host.printed(Tone::Notice), vec!["note"]);
    }
}
