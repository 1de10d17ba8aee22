use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Session Status ====================

/// Live status of a tool session as inferred from its terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Waiting for free-form input
    Ready,
    /// Producing output
    Running,
    /// Blocked on an interactive prompt
    Waiting,
    /// No session running
    Idle,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Ready => "ready",
            SessionStatus::Running => "running",
            SessionStatus::Waiting => "waiting",
            SessionStatus::Idle => "idle",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

/// Which rule of the classifier produced a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusReason {
    PromptDetected,
    ThinkingIndicator,
    InputPrompt,
    NoRecentOutput,
    Default,
    SessionNotRunning,
}

impl StatusReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusReason::PromptDetected => "prompt_detected",
            StatusReason::ThinkingIndicator => "thinking_indicator",
            StatusReason::InputPrompt => "input_prompt",
            StatusReason::NoRecentOutput => "no_recent_output",
            StatusReason::Default => "default",
            StatusReason::SessionNotRunning => "session_not_running",
        }
    }
}

impl fmt::Display for StatusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetectionResult {
    pub status: SessionStatus,
    pub confidence: Confidence,
    pub reason: StatusReason,
    pub has_active_prompt: bool,
}

impl StatusDetectionResult {
    pub fn new(status: SessionStatus, confidence: Confidence, reason: StatusReason) -> Self {
        Self {
            status,
            confidence,
            reason,
            has_active_prompt: false,
        }
    }

    /// Status reported for a session whose tmux session does not exist
    pub fn idle() -> Self {
        Self::new(SessionStatus::Idle, Confidence::High, StatusReason::SessionNotRunning)
    }

    pub fn with_active_prompt(mut self) -> Self {
        self.has_active_prompt = true;
        self
    }
}
