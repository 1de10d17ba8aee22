//! tmux-backed terminal provider

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use tandem_utils::{Result, TandemError};

use super::{validate_session_name, CaptureRange, SpecialKey, TerminalProvider};

/// Upper bound for a single tmux invocation
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Pane size for new sessions; wide enough that tool UIs do not wrap
const PANE_WIDTH: u16 = 200;
const PANE_HEIGHT: u16 = 50;

/// Output of one tmux invocation
struct TmuxOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Shells out to the `tmux` binary
#[derive(Debug, Clone)]
pub struct Tmux {
    binary: String,
}

impl Default for Tmux {
    fn default() -> Self {
        Self::new("tmux")
    }
}

impl Tmux {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<TmuxOutput> {
        trace!(binary = %self.binary, ?args, "tmux");

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(COMMAND_TIMEOUT, command.output())
            .await
            .map_err(|_| TandemError::TerminalTimeout {
                seconds: COMMAND_TIMEOUT.as_secs(),
            })?
            .map_err(|e| TandemError::terminal(format!("failed to run {}: {}", self.binary, e)))?;

        Ok(TmuxOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Run and turn a non-zero exit into an error
    async fn run_checked(&self, args: &[String]) -> Result<String> {
        let output = self.run(args).await?;
        if output.success {
            return Ok(output.stdout);
        }

        let command = args.first().map(String::as_str).unwrap_or_default();
        if is_missing_session(&output.stderr) {
            return Err(TandemError::SessionNotFound(output.stderr));
        }
        Err(TandemError::terminal(format!(
            "tmux {command} failed: {}",
            output.stderr
        )))
    }
}

fn is_missing_session(stderr: &str) -> bool {
    stderr.contains("can't find session")
        || stderr.contains("no server running")
        || stderr.contains("session not found")
}

/// `=name` makes tmux match the session name exactly instead of by prefix
fn exact_target(name: &str) -> String {
    format!("={name}")
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn create_args(name: &str, cwd: &Path, scrollback_limit: usize) -> Vec<String> {
    // history-limit only applies to panes created after it is set
    let mut args = owned(&["set-option", "-g", "history-limit"]);
    args.push(scrollback_limit.to_string());
    args.push(";".to_string());
    args.extend(owned(&["new-session", "-d", "-s", name, "-c"]));
    args.push(cwd.to_string_lossy().into_owned());
    args.push("-x".to_string());
    args.push(PANE_WIDTH.to_string());
    args.push("-y".to_string());
    args.push(PANE_HEIGHT.to_string());
    args
}

fn capture_args(name: &str, range: CaptureRange) -> Vec<String> {
    let mut args = owned(&["capture-pane", "-p", "-J", "-t"]);
    args.push(exact_target(name));
    if let CaptureRange::Scrollback(lines) = range {
        args.push("-S".to_string());
        args.push(format!("-{lines}"));
    }
    args
}

fn literal_args(name: &str, text: &str) -> Vec<String> {
    let mut args = owned(&["send-keys", "-t"]);
    args.push(exact_target(name));
    args.push("-l".to_string());
    // A leading dash would be read as a flag
    args.push("--".to_string());
    args.push(text.to_string());
    args
}

fn key_args(name: &str, key: SpecialKey) -> Vec<String> {
    let mut args = owned(&["send-keys", "-t"]);
    args.push(exact_target(name));
    args.push(key.tmux_name().to_string());
    args
}

#[async_trait]
impl TerminalProvider for Tmux {
    async fn has_session(&self, name: &str) -> Result<bool> {
        validate_session_name(name)?;
        let args = vec!["has-session".to_string(), "-t".to_string(), exact_target(name)];
        let output = self.run(&args).await?;
        Ok(output.success)
    }

    async fn create_session(&self, name: &str, cwd: &Path, scrollback_limit: usize) -> Result<()> {
        validate_session_name(name)?;
        debug!(session = name, cwd = %cwd.display(), scrollback_limit, "Creating tmux session");
        let output = self.run(&create_args(name, cwd, scrollback_limit)).await?;
        if output.success {
            return Ok(());
        }
        if output.stderr.contains("duplicate session") {
            return Err(TandemError::SessionExists(name.to_string()));
        }
        Err(TandemError::terminal(format!(
            "tmux new-session failed: {}",
            output.stderr
        )))
    }

    async fn send_keys(&self, name: &str, text: &str, submit: bool) -> Result<()> {
        validate_session_name(name)?;
        if !text.is_empty() {
            self.run_checked(&literal_args(name, text)).await?;
        }
        if submit {
            self.send_special_key(name, SpecialKey::Enter).await?;
        }
        Ok(())
    }

    async fn send_special_key(&self, name: &str, key: SpecialKey) -> Result<()> {
        validate_session_name(name)?;
        self.run_checked(&key_args(name, key)).await?;
        Ok(())
    }

    async fn capture_pane(&self, name: &str, range: CaptureRange) -> Result<String> {
        validate_session_name(name)?;
        self.run_checked(&capture_args(name, range)).await
    }

    async fn kill_session(&self, name: &str) -> Result<()> {
        validate_session_name(name)?;
        debug!(session = name, "Killing tmux session");
        let args = vec!["kill-session".to_string(), "-t".to_string(), exact_target(name)];
        match self.run_checked(&args).await {
            // Already gone
            Err(TandemError::SessionNotFound(_)) => Ok(()),
            other => other.map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_args_scrollback() {
        let args = capture_args("tandem-claude-ws", CaptureRange::Scrollback(2000));
        assert_eq!(
            args,
            ["capture-pane", "-p", "-J", "-t", "=tandem-claude-ws", "-S", "-2000"]
        );
    }

    #[test]
    fn test_capture_args_visible() {
        let args = capture_args("s", CaptureRange::Visible);
        assert_eq!(args, ["capture-pane", "-p", "-J", "-t", "=s"]);
    }

    #[test]
    fn test_literal_args_protect_leading_dash() {
        let args = literal_args("s", "-rf");
        assert_eq!(args, ["send-keys", "-t", "=s", "-l", "--", "-rf"]);
    }

    #[test]
    fn test_key_args() {
        let args = key_args("s", SpecialKey::CtrlC);
        assert_eq!(args, ["send-keys", "-t", "=s", "C-c"]);
    }

    #[test]
    fn test_create_args_sets_history_before_session() {
        let args = create_args("s", Path::new("/tmp/ws"), 5000);
        let history = args.iter().position(|a| a == "history-limit").unwrap();
        let new_session = args.iter().position(|a| a == "new-session").unwrap();
        assert!(history < new_session);
        assert_eq!(args[history + 1], "5000");
        assert!(args.contains(&"/tmp/ws".to_string()));
    }

    #[test]
    fn test_missing_session_detection() {
        assert!(is_missing_session("can't find session: tandem-claude-x"));
        assert!(is_missing_session("no server running on /tmp/tmux-0/default"));
        assert!(!is_missing_session("unknown option"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_terminal_error() {
        let tmux = Tmux::new("tandem-no-such-tmux-binary");
        let result = tmux.has_session("x").await;
        assert!(matches!(result, Err(TandemError::Terminal(_))));
    }

    #[tokio::test]
    async fn test_invalid_name_rejected_before_spawn() {
        // The binary does not exist, so reaching tmux would be a Terminal error
        let tmux = Tmux::new("tandem-no-such-tmux-binary");
        let bad = "ws;rm -rf";
        let invalid = |r: &Result<()>| matches!(r, Err(TandemError::InvalidSessionName(_)));

        assert!(matches!(
            tmux.has_session(bad).await,
            Err(TandemError::InvalidSessionName(_))
        ));
        assert!(invalid(&tmux.create_session(bad, Path::new("/tmp"), 100).await));
        assert!(invalid(&tmux.send_keys(bad, "hi", true).await));
        assert!(invalid(&tmux.send_special_key(bad, SpecialKey::Enter).await));
        assert!(invalid(&tmux.kill_session(bad).await));
        assert!(matches!(
            tmux.capture_pane("a b", CaptureRange::Visible).await,
            Err(TandemError::InvalidSessionName(_))
        ));
    }
}
