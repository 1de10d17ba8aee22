//! Scripted terminal for unit tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use tandem_utils::{Result, TandemError};

use crate::terminal::{validate_session_name, CaptureRange, SpecialKey, TerminalProvider};

/// Input recorded by [`FakeTerminal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Keys { text: String, submit: bool },
    Special(SpecialKey),
}

#[derive(Debug, Default)]
struct FakeSession {
    cwd: PathBuf,
    screen: String,
    sent: Vec<Sent>,
}

/// In-memory stand-in for tmux
///
/// Screens are set by the test; sent input is recorded per session.
#[derive(Debug, Default)]
pub struct FakeTerminal {
    sessions: Mutex<HashMap<String, FakeSession>>,
    presets: Mutex<HashMap<String, String>>,
    failing_captures: AtomicUsize,
    captures: AtomicUsize,
}

impl FakeTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session showing `screen`
    pub fn with_session(self, name: &str, screen: &str) -> Self {
        self.sessions.lock().insert(
            name.to_string(),
            FakeSession {
                screen: screen.to_string(),
                ..Default::default()
            },
        );
        self
    }

    /// Screen shown by `name` once it gets created
    pub fn screen_on_create(&self, name: &str, screen: &str) {
        self.presets.lock().insert(name.to_string(), screen.to_string());
    }

    pub fn set_screen(&self, name: &str, screen: &str) {
        self.sessions.lock().entry(name.to_string()).or_default().screen = screen.to_string();
    }

    /// Make the next `n` captures fail
    pub fn fail_captures(&self, n: usize) {
        self.failing_captures.store(n, Ordering::SeqCst);
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn sent(&self, name: &str) -> Vec<Sent> {
        self.sessions
            .lock()
            .get(name)
            .map(|s| s.sent.clone())
            .unwrap_or_default()
    }

    pub fn cwd(&self, name: &str) -> Option<PathBuf> {
        self.sessions.lock().get(name).map(|s| s.cwd.clone())
    }

    fn record(&self, name: &str, input: Sent) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(name)
            .ok_or_else(|| TandemError::SessionNotFound(name.to_string()))?;
        session.sent.push(input);
        Ok(())
    }
}

#[async_trait]
impl TerminalProvider for FakeTerminal {
    async fn has_session(&self, name: &str) -> Result<bool> {
        validate_session_name(name)?;
        Ok(self.sessions.lock().contains_key(name))
    }

    async fn create_session(&self, name: &str, cwd: &Path, _scrollback_limit: usize) -> Result<()> {
        validate_session_name(name)?;
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(name) {
            return Err(TandemError::SessionExists(name.to_string()));
        }
        let screen = self.presets.lock().remove(name).unwrap_or_default();
        sessions.insert(
            name.to_string(),
            FakeSession {
                cwd: cwd.to_path_buf(),
                screen,
                sent: Vec::new(),
            },
        );
        Ok(())
    }

    async fn send_keys(&self, name: &str, text: &str, submit: bool) -> Result<()> {
        validate_session_name(name)?;
        self.record(
            name,
            Sent::Keys {
                text: text.to_string(),
                submit,
            },
        )
    }

    async fn send_special_key(&self, name: &str, key: SpecialKey) -> Result<()> {
        validate_session_name(name)?;
        self.record(name, Sent::Special(key))
    }

    async fn capture_pane(&self, name: &str, _range: CaptureRange) -> Result<String> {
        validate_session_name(name)?;
        self.captures.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_captures.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_captures.store(failing - 1, Ordering::SeqCst);
            return Err(TandemError::terminal("scripted capture failure"));
        }
        self.sessions
            .lock()
            .get(name)
            .map(|s| s.screen.clone())
            .ok_or_else(|| TandemError::SessionNotFound(name.to_string()))
    }

    async fn kill_session(&self, name: &str) -> Result<()> {
        validate_session_name(name)?;
        self.sessions.lock().remove(name);
        Ok(())
    }
}
