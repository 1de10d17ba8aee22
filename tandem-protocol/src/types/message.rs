use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::prompt::PromptData;
use super::session::SessionKey;
use super::tool::ToolId;

// ==================== Messages ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Normal,
    Prompt,
}

/// Lifecycle of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStatus {
    Pending,
    Answered,
}

/// Message record handed to the store for creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub key: SessionKey,
    pub role: MessageRole,
    pub content: String,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_data: Option<PromptData>,
}

impl NewMessage {
    pub fn user(key: SessionKey, content: impl Into<String>) -> Self {
        Self {
            key,
            role: MessageRole::User,
            content: content.into(),
            message_type: MessageType::Normal,
            prompt_data: None,
        }
    }

    pub fn assistant(key: SessionKey, content: impl Into<String>) -> Self {
        Self {
            key,
            role: MessageRole::Assistant,
            content: content.into(),
            message_type: MessageType::Normal,
            prompt_data: None,
        }
    }

    pub fn prompt(key: SessionKey, content: impl Into<String>, data: PromptData) -> Self {
        Self {
            key,
            role: MessageRole::Assistant,
            content: content.into(),
            message_type: MessageType::Prompt,
            prompt_data: Some(data),
        }
    }
}

/// Stored message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub workspace_id: String,
    pub tool: ToolId,
    pub role: MessageRole,
    pub content: String,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_data: Option<PromptData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_status: Option<PromptStatus>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Materialize a record with a fresh id and the current time
    pub fn from_new(record: NewMessage) -> Self {
        let prompt_status = match record.message_type {
            MessageType::Prompt => Some(PromptStatus::Pending),
            MessageType::Normal => None,
        };
        Self {
            id: Uuid::new_v4(),
            workspace_id: record.key.workspace_id,
            tool: record.key.tool,
            role: record.role,
            content: record.content,
            message_type: record.message_type,
            prompt_data: record.prompt_data,
            prompt_status,
            timestamp: Utc::now(),
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.workspace_id.clone(), self.tool)
    }

    pub fn is_pending_prompt(&self) -> bool {
        self.prompt_status == Some(PromptStatus::Pending)
    }
}

// ==================== Extraction ====================

/// Response text extracted from a terminal capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub content: String,
    pub is_complete: bool,
    /// Line count to commit as the new watermark once persisted
    pub consumed_line_count: usize,
    /// Set when the completed content is an interactive prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptData>,
}

impl ExtractionResult {
    pub fn complete(content: impl Into<String>, consumed_line_count: usize) -> Self {
        Self {
            content: content.into(),
            is_complete: true,
            consumed_line_count,
            prompt: None,
        }
    }

    pub fn partial(content: impl Into<String>, consumed_line_count: usize) -> Self {
        Self {
            content: content.into(),
            is_complete: false,
            consumed_line_count,
            prompt: None,
        }
    }

    pub fn prompt(content: impl Into<String>, consumed_line_count: usize, data: PromptData) -> Self {
        Self {
            content: content.into(),
            is_complete: true,
            consumed_line_count,
            prompt: Some(data),
        }
    }

    pub fn is_prompt(&self) -> bool {
        self.prompt.is_some()
    }
}
