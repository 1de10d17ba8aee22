//! Tool adapters
//!
//! Each supported CLI gets a [`CliTool`] implementation that knows how to
//! launch it inside a tmux session and how to submit a message to it.
//! Session bookkeeping is shared through [`ToolSession`]; adapters only
//! describe their startup choreography and submission keys.

mod choreography;
mod claude;
mod codex;
mod gemini;
mod local;

pub use choreography::{command_line, run_steps, shell_quote, Step};
pub use claude::ClaudeTool;
pub use codex::CodexTool;
pub use gemini::GeminiTool;
pub use local::LocalTool;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use tandem_protocol::{SessionKey, ToolId};
use tandem_utils::{Result, TandemError};

use crate::config::ConfigHandle;
use crate::terminal::{session_name, SpecialKey, TerminalProvider};
use crate::tools::{profile, ToolTiming};

/// Terminal access and settings shared by all adapters
pub struct ToolSession {
    tool: ToolId,
    binary: String,
    timing: ToolTiming,
    terminal: Arc<dyn TerminalProvider>,
    config: ConfigHandle,
}

impl ToolSession {
    pub fn new(tool: ToolId, terminal: Arc<dyn TerminalProvider>, config: ConfigHandle) -> Self {
        let profile = profile(tool);
        Self {
            tool,
            binary: profile.binary.to_string(),
            timing: profile.timing,
            terminal,
            config,
        }
    }

    /// Use a different executable name or path
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timing(mut self, timing: ToolTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn tool(&self) -> ToolId {
        self.tool
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timing(&self) -> ToolTiming {
        self.timing
    }

    pub fn terminal(&self) -> &dyn TerminalProvider {
        self.terminal.as_ref()
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Shell command launching the tool with configured extra arguments
    pub fn launch_command(&self, args: &[String]) -> String {
        let config = self.config.load();
        let mut all: Vec<String> = args.to_vec();
        all.extend(config.tools.args_for(self.tool).iter().cloned());
        command_line(&self.binary, &all)
    }

    /// Validated session name of a workspace
    pub fn session_name(&self, workspace: &str) -> Result<String> {
        session_name(&SessionKey::new(workspace, self.tool))
    }

    /// Session name of a workspace whose session must exist
    pub async fn existing_session(&self, workspace: &str) -> Result<String> {
        let name = self.session_name(workspace)?;
        if !self.terminal.has_session(&name).await? {
            return Err(TandemError::SessionNotFound(name));
        }
        Ok(name)
    }

    pub async fn pause(&self, duration: std::time::Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// A CLI tool driven through a terminal session
#[async_trait]
pub trait CliTool: Send + Sync {
    fn session(&self) -> &ToolSession;

    /// Keys run right after the session is created
    fn startup_steps(&self) -> Vec<Step>;

    /// Key that stops the tool's current work
    fn interrupt_key(&self) -> SpecialKey {
        SpecialKey::Escape
    }

    /// Type and submit a message in an existing session
    async fn submit(&self, name: &str, text: &str) -> Result<()>;

    fn tool_id(&self) -> ToolId {
        self.session().tool()
    }

    fn session_name(&self, workspace: &str) -> Result<String> {
        self.session().session_name(workspace)
    }

    /// Whether the tool's executable is on `PATH`
    fn is_installed(&self) -> bool {
        which::which(self.session().binary()).is_ok()
    }

    async fn is_running(&self, workspace: &str) -> Result<bool> {
        let name = self.session_name(workspace)?;
        self.session().terminal().has_session(&name).await
    }

    /// Create the session and run the startup choreography
    async fn start_session(&self, workspace: &str, cwd: &Path) -> Result<String> {
        let session = self.session();
        if !self.is_installed() {
            return Err(TandemError::ToolNotInstalled(session.binary().to_string()));
        }

        let name = self.session_name(workspace)?;
        let terminal = session.terminal();
        if terminal.has_session(&name).await? {
            return Err(TandemError::SessionExists(name));
        }

        let scrollback = session.config().load().terminal.scrollback_lines;
        terminal.create_session(&name, cwd, scrollback).await?;
        run_steps(terminal, &name, &self.startup_steps()).await?;

        info!(
            tool = %self.tool_id(),
            session = %name,
            cwd = %cwd.display(),
            "Session started"
        );
        Ok(name)
    }

    async fn send_message(&self, workspace: &str, text: &str) -> Result<()> {
        let name = self.session().existing_session(workspace).await?;
        self.submit(&name, text).await?;
        info!(tool = %self.tool_id(), session = %name, chars = text.len(), "Message sent");
        Ok(())
    }

    async fn interrupt(&self, workspace: &str) -> Result<()> {
        let name = self.session().existing_session(workspace).await?;
        self.session()
            .terminal()
            .send_special_key(&name, self.interrupt_key())
            .await
    }

    async fn kill_session(&self, workspace: &str) -> Result<()> {
        let name = self.session_name(workspace)?;
        self.session().terminal().kill_session(&name).await?;
        info!(tool = %self.tool_id(), session = %name, "Session killed");
        Ok(())
    }
}

/// Adapter for a tool
pub fn adapter(
    tool: ToolId,
    terminal: Arc<dyn TerminalProvider>,
    config: ConfigHandle,
) -> Arc<dyn CliTool> {
    adapter_with(ToolSession::new(tool, terminal, config))
}

/// Adapter around a prepared session
pub fn adapter_with(session: ToolSession) -> Arc<dyn CliTool> {
    match session.tool() {
        ToolId::Claude => Arc::new(ClaudeTool::new(session)),
        ToolId::Codex => Arc::new(CodexTool::new(session)),
        ToolId::Gemini => Arc::new(GeminiTool::new(session)),
        ToolId::Local => Arc::new(LocalTool::new(session)),
    }
}

/// Working directory for a new session, defaulting to the current one
pub fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}
