use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use tandem_utils::Result;

use super::{CliTool, Step, ToolSession};
use crate::terminal::SpecialKey;

lazy_static! {
    static ref TRUST_DIALOG: Regex = Regex::new(
        r"(?i)allow codex to work in this folder|trust (the files in )?this (folder|directory)"
    )
    .unwrap();
}

/// Codex TUI
///
/// Codex treats fast multi-line input as a paste and holds it for review,
/// so lines are typed one by one with `C-j` between them.
pub struct CodexTool {
    session: ToolSession,
}

impl CodexTool {
    pub fn new(session: ToolSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CliTool for CodexTool {
    fn session(&self) -> &ToolSession {
        &self.session
    }

    fn startup_steps(&self) -> Vec<Step> {
        let timing = self.session.timing();
        vec![
            Step::line(self.session.launch_command(&[])),
            Step::Wait(timing.banner_wait),
            Step::DismissIfVisible {
                pattern: TRUST_DIALOG.clone(),
                key: SpecialKey::Enter,
            },
            Step::Wait(timing.step_delay),
            // First-run selection screens
            Step::Special(SpecialKey::Enter),
            Step::Wait(timing.step_delay),
            Step::Special(SpecialKey::Enter),
        ]
    }

    async fn submit(&self, name: &str, text: &str) -> Result<()> {
        let terminal = self.session.terminal();
        let mut lines = text.lines().peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                terminal.send_keys(name, line, false).await?;
            }
            if lines.peek().is_some() {
                terminal.send_special_key(name, SpecialKey::CtrlJ).await?;
            }
        }
        self.session.pause(self.session.timing().submit_delay).await;
        terminal.send_special_key(name, SpecialKey::Enter).await
    }
}
