//! Configuration schema structs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use tandem_protocol::ToolId;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub polling: PollingConfig,
    pub terminal: TerminalConfig,
    pub tools: ToolsConfig,
}

/// Session poller timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between two captures of the same session
    pub interval_ms: u64,
    /// Absolute ceiling after which a poller stops itself
    pub max_duration_secs: u64,
    /// Quiet period after which a session without markers counts as ready
    pub stale_output_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_duration_secs: 30 * 60,
            stale_output_ms: 5000,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    pub fn stale_output(&self) -> Duration {
        Duration::from_millis(self.stale_output_ms)
    }
}

/// tmux settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// `history-limit` applied to new sessions
    pub scrollback_lines: usize,
    /// How many scrollback lines each capture requests
    pub capture_lines: usize,
    /// tmux executable name or path
    pub tmux_binary: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: 10000,
            capture_lines: 10000,
            tmux_binary: "tmux".to_string(),
        }
    }
}

/// Per-tool launch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Model passed to `ollama run`
    pub local_model: String,
    /// Extra command line arguments keyed by tool id (`claude`, `codex`, ...)
    pub extra_args: HashMap<String, Vec<String>>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            local_model: "llama3.2".to_string(),
            extra_args: HashMap::new(),
        }
    }
}

impl ToolsConfig {
    pub fn args_for(&self, tool: ToolId) -> &[String] {
        self.extra_args
            .get(tool.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
