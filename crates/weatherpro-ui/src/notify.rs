//! Blocking user notifications.

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shows a message the user has to acknowledge.
pub trait Notifier: Send {
    fn alert(&self, message: &str);
}

/// Prints alerts to stdout and, on an interactive terminal, waits for Enter
/// before the dashboard continues.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    acknowledge: bool,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            acknowledge: std::io::stdin().is_terminal(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        let mut out = std::io::stdout().lock();
        let result = if self.acknowledge {
            show_alert(&mut out, Some(&mut std::io::stdin().lock()), message)
        } else {
            show_alert(&mut out, None::<&mut std::io::StdinLock<'_>>, message)
        };
        if let Err(e) = result {
            tracing::warn!("Could not show alert: {}", e);
        }
    }
}

/// Write `message`; with `input`, block until one line is read from it.
fn show_alert<W: Write, R: BufRead>(
    out: &mut W,
    input: Option<&mut R>,
    message: &str,
) -> std::io::Result<()> {
    writeln!(out, "\n[!] {}", message)?;
    match input {
        Some(input) => {
            write!(out, "    (press Enter) ")?;
            out.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
        }
        None => {
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Keeps every alert in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        tracing::debug!("alert: {}", message);
        self.messages.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn alert_waits_for_one_line() {
        let mut out = Vec::new();
        let mut input = std::io::Cursor::new("\nsearch Oslo\n");
        show_alert(&mut out, Some(&mut input), "City not found.").unwrap();

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("[!] City not found."));
        assert!(shown.contains("press Enter"));

        // Only the acknowledgement is consumed; the next command is left.
        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "search Oslo\n");
    }

    #[test]
    fn alert_without_input_does_not_prompt() {
        let mut out = Vec::new();
        show_alert(&mut out, None::<&mut std::io::Cursor<&str>>, "Saved.").unwrap();

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("[!] Saved."));
        assert!(!shown.contains("press Enter"));
    }

    #[test]
    fn clones_share_log() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        notifier.alert("first");
        notifier.alert("second");
        assert_eq!(handle.messages(), vec!["first", "second"]);
        assert_eq!(handle.last().as_deref(), Some("second"));
    }
}
