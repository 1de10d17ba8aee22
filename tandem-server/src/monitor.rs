//! Session monitor
//!
//! Ties the adapters, pollers, store and sink together. Callers talk to
//! sessions by [`SessionKey`]; the monitor picks the adapter, records the
//! watermark before each message and keeps one poller per key.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use tandem_protocol::{
    Message, MonitorEvent, NewMessage, SessionKey, SessionState, StatusDetectionResult, ToolId,
};
use tandem_utils::{Result, TandemError};

use crate::adapters::{adapter, CliTool};
use crate::config::ConfigHandle;
use crate::extract::{extract_response, send_watermark};
use crate::poller::{commit_response, PollerInfo, PollerManager};
use crate::sink::MessageSink;
use crate::status::classify_status;
use crate::store::MessageStore;
use crate::terminal::{CaptureRange, TerminalProvider};

/// Orchestrates monitored sessions
pub struct SessionMonitor {
    terminal: Arc<dyn TerminalProvider>,
    store: Arc<dyn MessageStore>,
    sink: Arc<dyn MessageSink>,
    config: ConfigHandle,
    adapters: HashMap<ToolId, Arc<dyn CliTool>>,
    pollers: PollerManager,
    /// Last capture and when it changed, for on-demand status checks
    last_output: DashMap<SessionKey, (String, DateTime<Utc>)>,
}

impl SessionMonitor {
    pub fn new(
        terminal: Arc<dyn TerminalProvider>,
        store: Arc<dyn MessageStore>,
        sink: Arc<dyn MessageSink>,
        config: ConfigHandle,
    ) -> Self {
        let adapters = ToolId::ALL
            .iter()
            .map(|&tool| (tool, adapter(tool, terminal.clone(), config.clone())))
            .collect();
        let pollers = PollerManager::new(
            terminal.clone(),
            store.clone(),
            sink.clone(),
            config.clone(),
        );
        Self {
            terminal,
            store,
            sink,
            config,
            adapters,
            pollers,
            last_output: DashMap::new(),
        }
    }

    /// Replace the adapter of its tool
    pub fn with_adapter(mut self, adapter: Arc<dyn CliTool>) -> Self {
        self.adapters.insert(adapter.tool_id(), adapter);
        self
    }

    pub fn adapter(&self, tool: ToolId) -> Arc<dyn CliTool> {
        match self.adapters.get(&tool) {
            Some(adapter) => adapter.clone(),
            None => adapter(tool, self.terminal.clone(), self.config.clone()),
        }
    }

    /// Launch the tool for a workspace, returning the session name
    pub async fn start_session(&self, key: &SessionKey, cwd: &Path) -> Result<String> {
        let name = self
            .adapter(key.tool)
            .start_session(&key.workspace_id, cwd)
            .await?;
        self.store
            .update_session_state(key, SessionState::default())
            .await?;
        Ok(name)
    }

    /// Persist a user message, submit it and start polling for the reply
    ///
    /// Whatever reply text is still on screen is flushed first so it is
    /// not attributed to the new message.
    pub async fn send_message(&self, key: &SessionKey, text: &str) -> Result<Message> {
        let adapter = self.adapter(key.tool);
        let name = adapter.session_name(&key.workspace_id)?;
        if !self.terminal.has_session(&name).await? {
            return Err(TandemError::SessionNotFound(name));
        }

        self.flush_pending_response(key).await?;

        let message = self
            .store
            .create_message(NewMessage::user(key.clone(), text))
            .await?;
        self.sink.broadcast(MonitorEvent::MessageCreated {
            message: message.clone(),
        });

        let raw = self.capture(&name).await?;
        let watermark = send_watermark(&raw, key.tool);
        self.store
            .update_session_state(
                key,
                SessionState {
                    watermark,
                    in_progress_message_id: Some(message.id),
                },
            )
            .await?;
        debug!(key = %key, watermark, "Recorded send watermark");

        adapter.send_message(&key.workspace_id, text).await?;
        self.pollers.start_polling(key.clone())?;

        Ok(message)
    }

    /// Commit any reply text past the watermark, complete or not
    pub async fn flush_pending_response(&self, key: &SessionKey) -> Result<Option<Message>> {
        let name = self.adapter(key.tool).session_name(&key.workspace_id)?;
        if !self.terminal.has_session(&name).await? {
            return Ok(None);
        }

        let raw = match self.capture(&name).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Capture failed during flush");
                return Ok(None);
            }
        };

        let state = self.store.session_state(key).await?;
        let Some(result) = extract_response(&raw, state.watermark, key.tool) else {
            return Ok(None);
        };

        let committed = commit_response(
            self.store.as_ref(),
            self.sink.as_ref(),
            key,
            state.watermark,
            &result,
        )
        .await?;
        if committed.is_some() {
            info!(key = %key, complete = result.is_complete, "Flushed pending response");
        }
        Ok(committed)
    }

    /// Classify the session's current screen
    pub async fn session_status(&self, key: &SessionKey) -> Result<StatusDetectionResult> {
        let name = self.adapter(key.tool).session_name(&key.workspace_id)?;
        if !self.terminal.has_session(&name).await? {
            self.last_output.remove(key);
            return Ok(StatusDetectionResult::idle());
        }

        let raw = self.capture(&name).await?;
        let now = Utc::now();
        let last_output_at = {
            let mut entry = self
                .last_output
                .entry(key.clone())
                .or_insert_with(|| (raw.clone(), now));
            if entry.0 != raw {
                *entry = (raw.clone(), now);
            }
            entry.1
        };

        let stale_after = self.config.load().polling.stale_output();
        Ok(classify_status(&raw, key.tool, Some(last_output_at), now, stale_after))
    }

    pub async fn interrupt(&self, key: &SessionKey) -> Result<()> {
        self.adapter(key.tool).interrupt(&key.workspace_id).await
    }

    /// Stop polling and kill the tmux session
    pub async fn kill_session(&self, key: &SessionKey) -> Result<()> {
        self.pollers.stop_polling(key);
        self.last_output.remove(key);
        self.adapter(key.tool).kill_session(&key.workspace_id).await
    }

    pub fn start_polling(&self, key: SessionKey) -> Result<PollerInfo> {
        self.pollers.start_polling(key)
    }

    pub fn stop_polling(&self, key: &SessionKey) -> bool {
        self.pollers.stop_polling(key)
    }

    pub fn stop_all_polling(&self) -> usize {
        self.pollers.stop_all_polling()
    }

    pub fn active_pollers(&self) -> Vec<PollerInfo> {
        self.pollers.active_pollers()
    }

    async fn capture(&self, name: &str) -> Result<String> {
        let lines = self.config.load().terminal.capture_lines;
        self.terminal
            .capture_pane(name, CaptureRange::Scrollback(lines))
            .await
    }
}
