//! Scripted key sequences for driving a tool's terminal UI

use std::time::Duration;

use regex::Regex;
use tracing::{debug, trace};

use tandem_utils::Result;

use crate::terminal::{CaptureRange, SpecialKey, TerminalProvider};
use crate::text::strip_ansi;

/// One step of a startup or submission sequence
#[derive(Debug, Clone)]
pub enum Step {
    /// Type text literally, optionally followed by Enter
    Keys { text: String, submit: bool },
    Special(SpecialKey),
    Wait(Duration),
    /// Press `key` only when the visible screen matches `pattern`
    DismissIfVisible { pattern: Regex, key: SpecialKey },
}

impl Step {
    pub fn keys(text: impl Into<String>) -> Self {
        Step::Keys {
            text: text.into(),
            submit: false,
        }
    }

    pub fn line(text: impl Into<String>) -> Self {
        Step::Keys {
            text: text.into(),
            submit: true,
        }
    }
}

/// Run steps in order against one session
///
/// Zero-length waits are skipped.
pub async fn run_steps(terminal: &dyn TerminalProvider, name: &str, steps: &[Step]) -> Result<()> {
    for step in steps {
        trace!(session = %name, ?step, "Running step");
        match step {
            Step::Keys { text, submit } => terminal.send_keys(name, text, *submit).await?,
            Step::Special(key) => terminal.send_special_key(name, *key).await?,
            Step::Wait(duration) => {
                if !duration.is_zero() {
                    tokio::time::sleep(*duration).await;
                }
            }
            Step::DismissIfVisible { pattern, key } => {
                let screen = terminal.capture_pane(name, CaptureRange::Visible).await?;
                if pattern.is_match(&strip_ansi(&screen)) {
                    debug!(session = %name, key = %key, "Dismissing dialog");
                    terminal.send_special_key(name, *key).await?;
                }
            }
        }
    }
    Ok(())
}

/// Quote a word for a POSIX shell
///
/// Plain words pass through unchanged; anything else is wrapped in single
/// quotes with embedded quotes written as `'\''`.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Build a shell command line from a program and its arguments
pub fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(shell_quote(program))
        .chain(args.iter().map(|arg| shell_quote(arg.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTerminal, Sent};

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("claude"), "claude");
        assert_eq!(shell_quote("--model=gpt-5"), "--model=gpt-5");
        assert_eq!(shell_quote("hello world"), "'hello world'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$HOME; rm -rf /"), "'$HOME; rm -rf /'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_command_line() {
        assert_eq!(command_line("ollama", &["run", "llama3.2"]), "ollama run llama3.2");
        assert_eq!(command_line::<&str>("claude", &[]), "claude");
        assert_eq!(command_line("gemini", &["-p", "say hi"]), "gemini -p 'say hi'");
    }

    #[tokio::test]
    async fn test_run_steps_records_input() {
        let terminal = FakeTerminal::new().with_session("s", "");
        let steps = vec![
            Step::line("claude"),
            Step::Wait(Duration::ZERO),
            Step::keys("draft"),
            Step::Special(SpecialKey::Enter),
        ];
        run_steps(&terminal, "s", &steps).await.unwrap();

        assert_eq!(
            terminal.sent("s"),
            vec![
                Sent::Keys {
                    text: "claude".into(),
                    submit: true
                },
                Sent::Keys {
                    text: "draft".into(),
                    submit: false
                },
                Sent::Special(SpecialKey::Enter),
            ]
        );
    }

    #[tokio::test]
    async fn test_dismiss_only_when_visible() {
        let terminal = FakeTerminal::new().with_session("s", "\x1b[1mDo you trust the files in this folder?\x1b[0m");
        let step = Step::DismissIfVisible {
            pattern: Regex::new(r"trust the files").unwrap(),
            key: SpecialKey::Enter,
        };
        run_steps(&terminal, "s", &[step.clone()]).await.unwrap();
        assert_eq!(terminal.sent("s"), vec![Sent::Special(SpecialKey::Enter)]);

        terminal.set_screen("s", "ready");
        run_steps(&terminal, "s", &[step]).await.unwrap();
        assert_eq!(terminal.sent("s").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_session_fails() {
        let terminal = FakeTerminal::new();
        assert!(run_steps(&terminal, "gone", &[Step::line("x")]).await.is_err());
    }
}
