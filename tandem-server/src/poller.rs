//! Session pollers
//!
//! One background task per session key captures the pane on a fixed
//! interval, broadcasts status changes and partial replies, and commits
//! completed replies. A poller stops itself when it commits a prompt or
//! reaches the configured ceiling; otherwise it runs until cancelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tandem_protocol::{
    ExtractionResult, Message, MonitorEvent, NewMessage, SessionKey, SessionState,
    StatusDetectionResult, StatusReason, StopReason,
};
use tandem_utils::Result;

use crate::config::ConfigHandle;
use crate::extract::extract_response;
use crate::sink::MessageSink;
use crate::status::classify_status;
use crate::store::MessageStore;
use crate::terminal::{session_name, CaptureRange, TerminalProvider};

/// Snapshot of a running poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerInfo {
    pub key: SessionKey,
    pub session_name: String,
    pub started_at: DateTime<Utc>,
    /// Distinguishes a restarted poller from the one it replaced
    pub generation: u64,
}

struct PollerEntry {
    info: PollerInfo,
    cancel: CancellationToken,
}

/// Collaborators shared by every poller task
#[derive(Clone)]
struct PollerContext {
    terminal: Arc<dyn TerminalProvider>,
    store: Arc<dyn MessageStore>,
    sink: Arc<dyn MessageSink>,
    config: ConfigHandle,
}

/// Registry of running pollers, at most one per session key
pub struct PollerManager {
    ctx: PollerContext,
    pollers: Arc<DashMap<SessionKey, PollerEntry>>,
    next_generation: AtomicU64,
}

impl PollerManager {
    pub fn new(
        terminal: Arc<dyn TerminalProvider>,
        store: Arc<dyn MessageStore>,
        sink: Arc<dyn MessageSink>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            ctx: PollerContext {
                terminal,
                store,
                sink,
                config,
            },
            pollers: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Start polling a session
    ///
    /// A poller already running for the same key is cancelled first, so
    /// starting twice leaves exactly one poller.
    pub fn start_polling(&self, key: SessionKey) -> Result<PollerInfo> {
        let name = session_name(&key)?;

        if let Some((_, old)) = self.pollers.remove(&key) {
            old.cancel.cancel();
            debug!(key = %key, generation = old.info.generation, "Replacing existing poller");
        }

        let info = PollerInfo {
            key: key.clone(),
            session_name: name,
            started_at: Utc::now(),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
        };
        let cancel = CancellationToken::new();

        self.pollers.insert(
            key,
            PollerEntry {
                info: info.clone(),
                cancel: cancel.clone(),
            },
        );

        tokio::spawn(run_poller(
            self.ctx.clone(),
            Arc::clone(&self.pollers),
            info.clone(),
            cancel,
        ));

        info!(
            key = %info.key,
            session = %info.session_name,
            generation = info.generation,
            "Poller started"
        );

        Ok(info)
    }

    /// Stop the poller of a session
    ///
    /// Returns true if a poller was running.
    pub fn stop_polling(&self, key: &SessionKey) -> bool {
        match self.pollers.remove(key) {
            Some((_, entry)) => {
                entry.cancel.cancel();
                info!(key = %key, "Poller stopped");
                true
            }
            None => false,
        }
    }

    /// Stop every poller, returning how many were running
    pub fn stop_all_polling(&self) -> usize {
        let keys: Vec<SessionKey> = self.pollers.iter().map(|e| e.key().clone()).collect();
        let stopped = keys.iter().filter(|key| self.stop_polling(key)).count();
        if stopped > 0 {
            info!(count = stopped, "All pollers stopped");
        }
        stopped
    }

    pub fn active_pollers(&self) -> Vec<PollerInfo> {
        self.pollers.iter().map(|e| e.info.clone()).collect()
    }

    pub fn is_polling(&self, key: &SessionKey) -> bool {
        self.pollers.contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.pollers.len()
    }
}

impl Drop for PollerManager {
    fn drop(&mut self) {
        for entry in self.pollers.iter() {
            entry.cancel.cancel();
        }
    }
}

/// Per-task memory between two polls
struct PollState {
    last_capture: Option<String>,
    last_output_at: DateTime<Utc>,
    last_status: Option<StatusDetectionResult>,
    last_progress: Option<String>,
    last_committed: Option<String>,
    prompts_resolved: bool,
}

impl PollState {
    fn new() -> Self {
        Self {
            last_capture: None,
            last_output_at: Utc::now(),
            last_status: None,
            last_progress: None,
            last_committed: None,
            prompts_resolved: false,
        }
    }
}

enum PollOutcome {
    Continue,
    AwaitingUser,
}

async fn run_poller(
    ctx: PollerContext,
    pollers: Arc<DashMap<SessionKey, PollerEntry>>,
    info: PollerInfo,
    cancel: CancellationToken,
) {
    let polling = ctx.config.load_full().polling.clone();
    let deadline = Instant::now() + polling.max_duration();
    let mut state = PollState::new();

    let reason = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break StopReason::Cancelled,
            _ = sleep_until(deadline) => break StopReason::TimedOut,
            _ = sleep(polling.interval()) => {}
        }

        if let PollOutcome::AwaitingUser = poll_once(&ctx, &info, &mut state).await {
            break StopReason::AwaitingUser;
        }
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }
    };

    // A newer poller for the same key keeps its registry slot
    pollers.remove_if(&info.key, |_, entry| entry.info.generation == info.generation);

    info!(key = %info.key, generation = info.generation, ?reason, "Poller exited");
    ctx.sink.broadcast(MonitorEvent::PollerStopped {
        key: info.key,
        reason,
    });
}

async fn poll_once(ctx: &PollerContext, info: &PollerInfo, state: &mut PollState) -> PollOutcome {
    let key = &info.key;
    let config = ctx.config.load_full();

    let raw = match ctx
        .terminal
        .capture_pane(
            &info.session_name,
            CaptureRange::Scrollback(config.terminal.capture_lines),
        )
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key = %key, error = %e, "Capture failed");
            return PollOutcome::Continue;
        }
    };

    let now = Utc::now();
    if state.last_capture.as_deref() != Some(raw.as_str()) {
        state.last_output_at = now;
        state.last_capture = Some(raw.clone());
    }

    let status = classify_status(
        &raw,
        key.tool,
        Some(state.last_output_at),
        now,
        config.polling.stale_output(),
    );
    if state.last_status != Some(status) {
        debug!(key = %key, status = %status.status, reason = ?status.reason, "Status changed");
        state.last_status = Some(status);
        ctx.sink.broadcast(MonitorEvent::StatusChanged {
            key: key.clone(),
            status,
        });
    }

    // The tool only resumes work once a pending prompt was answered in the terminal
    if status.reason == StatusReason::ThinkingIndicator && !state.prompts_resolved {
        state.prompts_resolved = true;
        match ctx.store.mark_pending_prompts_as_answered(key).await {
            Ok(0) => {}
            Ok(count) => {
                info!(key = %key, count, "Pending prompts answered in terminal");
                ctx.sink.broadcast(MonitorEvent::PromptsAnswered {
                    key: key.clone(),
                    count,
                });
            }
            Err(e) => warn!(key = %key, error = %e, "Failed to resolve pending prompts"),
        }
    }

    let observed = match ctx.store.session_state(key).await {
        Ok(observed) => observed,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read session state");
            return PollOutcome::Continue;
        }
    };

    let Some(result) = extract_response(&raw, observed.watermark, key.tool) else {
        return PollOutcome::Continue;
    };

    if !result.is_complete {
        if state.last_progress.as_deref() != Some(result.content.as_str()) {
            state.last_progress = Some(result.content.clone());
            ctx.sink.broadcast(MonitorEvent::ResponseProgress {
                key: key.clone(),
                content: result.content,
            });
        }
        return PollOutcome::Continue;
    }

    // A reset can surface the reply that was just committed
    if state.last_committed.as_deref() == Some(result.content.as_str()) {
        if let Err(e) =
            advance_watermark(ctx.store.as_ref(), key, observed, result.consumed_line_count).await
        {
            warn!(key = %key, error = %e, "Failed to advance watermark");
        }
        return PollOutcome::Continue;
    }

    match commit_response(
        ctx.store.as_ref(),
        ctx.sink.as_ref(),
        key,
        observed.watermark,
        &result,
    )
    .await
    {
        Ok(Some(_)) => {
            state.last_progress = None;
            state.last_committed = Some(result.content.clone());
            if result.is_prompt() {
                return PollOutcome::AwaitingUser;
            }
        }
        Ok(None) => {}
        Err(e) => warn!(key = %key, error = %e, "Failed to commit response"),
    }

    PollOutcome::Continue
}

/// Persist a completed extraction and advance the watermark
///
/// The watermark is re-read first. When another writer already moved it
/// past `observed` and at least to the pending value, the result is
/// stale and nothing is written.
pub(crate) async fn commit_response(
    store: &dyn MessageStore,
    sink: &dyn MessageSink,
    key: &SessionKey,
    observed: usize,
    result: &ExtractionResult,
) -> Result<Option<Message>> {
    let pending = result.consumed_line_count;
    let latest = store.session_state(key).await?;
    if latest.watermark > observed && latest.watermark >= pending {
        debug!(
            key = %key,
            observed,
            latest = latest.watermark,
            pending,
            "Skipping commit, watermark already advanced"
        );
        return Ok(None);
    }

    let record = match &result.prompt {
        Some(data) => NewMessage::prompt(key.clone(), result.content.clone(), data.clone()),
        None => NewMessage::assistant(key.clone(), result.content.clone()),
    };
    let message = store.create_message(record).await?;
    store
        .update_session_state(key, SessionState::with_watermark(pending))
        .await?;

    debug!(key = %key, message_id = %message.id, watermark = pending, "Response committed");
    sink.broadcast(MonitorEvent::MessageCreated {
        message: message.clone(),
    });

    Ok(Some(message))
}

async fn advance_watermark(
    store: &dyn MessageStore,
    key: &SessionKey,
    observed: SessionState,
    pending: usize,
) -> Result<()> {
    let latest = store.session_state(key).await?;
    if latest.watermark != observed.watermark || latest.watermark == pending {
        return Ok(());
    }
    store
        .update_session_state(
            key,
            SessionState {
                watermark: pending,
                ..latest
            },
        )
        .await
}
