use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::tool::ToolId;

// ==================== Session Identity ====================

/// Identity of one monitored session: a (workspace, tool) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub workspace_id: String,
    pub tool: ToolId,
}

impl SessionKey {
    pub fn new(workspace_id: impl Into<String>, tool: ToolId) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            tool,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workspace_id, self.tool)
    }
}

// ==================== Session State ====================

/// Persisted extraction progress for a session
///
/// `watermark` counts terminal lines already consumed. It only moves
/// backwards when the extractor detects a buffer reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub watermark: usize,
    pub in_progress_message_id: Option<Uuid>,
}

impl SessionState {
    pub fn with_watermark(watermark: usize) -> Self {
        Self {
            watermark,
            in_progress_message_id: None,
        }
    }
}
