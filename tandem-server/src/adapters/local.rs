use async_trait::async_trait;

use tandem_utils::Result;

use super::{CliTool, Step, ToolSession};
use crate::terminal::SpecialKey;

/// Local model served through `ollama run`
pub struct LocalTool {
    session: ToolSession,
}

impl LocalTool {
    pub fn new(session: ToolSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CliTool for LocalTool {
    fn session(&self) -> &ToolSession {
        &self.session
    }

    fn startup_steps(&self) -> Vec<Step> {
        let model = self.session.config().load().tools.local_model.clone();
        vec![
            Step::line(self.session.launch_command(&["run".to_string(), model])),
            Step::Wait(self.session.timing().banner_wait),
        ]
    }

    fn interrupt_key(&self) -> SpecialKey {
        SpecialKey::CtrlC
    }

    async fn submit(&self, name: &str, text: &str) -> Result<()> {
        let terminal = self.session.terminal();
        let timing = self.session.timing();
        terminal.send_keys(name, text, false).await?;
        self.session.pause(timing.submit_delay).await;
        terminal.send_special_key(name, SpecialKey::Enter).await?;
        // Second Enter closes the compose area
        self.session.pause(timing.step_delay).await;
        terminal.send_special_key(name, SpecialKey::Enter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use tandem_protocol::ToolId;

    use crate::adapters::test_support::fake_session;
    use crate::testing::{FakeTerminal, Sent};

    #[tokio::test]
    async fn test_startup_runs_configured_model() {
        let terminal = Arc::new(FakeTerminal::new());
        let tool = LocalTool::new(fake_session(ToolId::Local, terminal.clone()));

        let name = tool.start_session("api", Path::new("/tmp")).await.unwrap();
        assert_eq!(
            terminal.sent(&name),
            vec![Sent::Keys {
                text: "sh run llama3.2".into(),
                submit: true
            }]
        );
    }

    #[tokio::test]
    async fn test_double_enter_submit() {
        let terminal = Arc::new(FakeTerminal::new().with_session("tandem-local-api", ""));
        let tool = LocalTool::new(fake_session(ToolId::Local, terminal.clone()));

        tool.send_message("api", "why is the sky blue").await.unwrap();
        assert_eq!(
            terminal.sent("tandem-local-api"),
            vec![
                Sent::Keys {
                    text: "why is the sky blue".into(),
                    submit: false
                },
                Sent::Special(SpecialKey::Enter),
                Sent::Special(SpecialKey::Enter),
            ]
        );
    }
}
