//! Terminal provider abstraction

use std::path::Path;

use async_trait::async_trait;

use tandem_utils::Result;

use super::SpecialKey;

/// Which part of a pane to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRange {
    /// Only the visible screen
    Visible,
    /// The visible screen plus up to this many scrollback lines
    Scrollback(usize),
}

/// Primitive operations over named multiplexer sessions
///
/// Implementations reject names failing
/// [`validate_session_name`](super::validate_session_name) before touching
/// the multiplexer.
#[async_trait]
pub trait TerminalProvider: Send + Sync {
    async fn has_session(&self, name: &str) -> Result<bool>;

    async fn create_session(&self, name: &str, cwd: &Path, scrollback_limit: usize) -> Result<()>;

    /// Type `text` literally, optionally followed by Enter
    async fn send_keys(&self, name: &str, text: &str, submit: bool) -> Result<()>;

    async fn send_special_key(&self, name: &str, key: SpecialKey) -> Result<()>;

    async fn capture_pane(&self, name: &str, range: CaptureRange) -> Result<String>;

    async fn kill_session(&self, name: &str) -> Result<()>;
}
