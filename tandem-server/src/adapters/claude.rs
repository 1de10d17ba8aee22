use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use tandem_utils::Result;

use super::{CliTool, Step, ToolSession};
use crate::terminal::SpecialKey;

lazy_static! {
    static ref TRUST_DIALOG: Regex =
        Regex::new(r"(?i)do you trust the files|trust this folder|Yes, proceed").unwrap();
}

/// Claude Code TUI
pub struct ClaudeTool {
    session: ToolSession,
}

impl ClaudeTool {
    pub fn new(session: ToolSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CliTool for ClaudeTool {
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
        ]
    }

    async fn submit(&self, name: &str, text: &str) -> Result<()> {
        let terminal = self.session.terminal();
        terminal.send_keys(name, text, false).await?;
        self.session.pause(self.session.timing().submit_delay).await;
        terminal.send_special_key(name, SpecialKey::Enter).await
    }
}
