use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==================== Tool Identity ====================

/// AI coding CLI driven inside a tmux session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    /// Claude Code
    #[default]
    Claude,
    /// OpenAI Codex CLI
    Codex,
    /// Gemini CLI, run one-shot inside a shell
    Gemini,
    /// Local model REPL (ollama)
    Local,
}

impl ToolId {
    /// All known tools, in registry order
    pub const ALL: [ToolId; 4] = [ToolId::Claude, ToolId::Codex, ToolId::Gemini, ToolId::Local];

    /// Stable lowercase identifier used in session names and config
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolId::Claude => "claude",
            ToolId::Codex => "codex",
            ToolId::Gemini => "gemini",
            ToolId::Local => "local",
        }
    }

    /// Resolve a tool id, falling back to Claude for unknown names
    pub fn resolve(name: &str) -> ToolId {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tool id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool id: {0}")]
pub struct ParseToolIdError(pub String);

impl FromStr for ToolId {
    type Err = ParseToolIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(ToolId::Claude),
            "codex" => Ok(ToolId::Codex),
            "gemini" => Ok(ToolId::Gemini),
            "local" | "ollama" => Ok(ToolId::Local),
            _ => Err(ParseToolIdError(s.to_string())),
        }
    }
}
