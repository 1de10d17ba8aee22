use async_trait::async_trait;

use tandem_utils::Result;

use super::{CliTool, Step, ToolSession};
use crate::terminal::SpecialKey;

/// Gemini CLI in one-shot mode
///
/// The session is a plain shell; every message runs `gemini -p` and the
/// reply is complete once the shell prompt returns.
pub struct GeminiTool {
    session: ToolSession,
}

impl GeminiTool {
    pub fn new(session: ToolSession) -> Self {
        Self { session }
    }

    /// Shell command sending `text` as a one-shot prompt
    pub fn prompt_command(&self, text: &str) -> String {
        self.session
            .launch_command(&["-p".to_string(), text.to_string()])
    }
}

#[async_trait]
impl CliTool for GeminiTool {
    fn session(&self) -> &ToolSession {
        &self.session
    }

    fn startup_steps(&self) -> Vec<Step> {
        Vec::new()
    }

    fn interrupt_key(&self) -> SpecialKey {
        SpecialKey::CtrlC
    }

    async fn submit(&self, name: &str, text: &str) -> Result<()> {
        self.session
            .terminal()
            .send_keys(name, &self.prompt_command(text), true)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tandem_protocol::ToolId;

    use crate::adapters::test_support::fake_session;
    use crate::testing::{FakeTerminal, Sent};

    #[test]
    fn test_prompt_command_quoting() {
        let tool = GeminiTool::new(fake_session(ToolId::Gemini, Arc::new(FakeTerminal::new())));
        assert_eq!(tool.prompt_command("hi"), "sh -p hi");
        assert_eq!(
            tool.prompt_command("what's in $PATH?"),
            r"sh -p 'what'\''s in $PATH?'"
        );
    }

    #[tokio::test]
    async fn test_submit_runs_one_shot_command() {
        let terminal = Arc::new(FakeTerminal::new().with_session("tandem-gemini-api", ""));
        let tool = GeminiTool::new(fake_session(ToolId::Gemini, terminal.clone()));

        tool.send_message("api", "say hi").await.unwrap();
        assert_eq!(
            terminal.sent("tandem-gemini-api"),
            vec![Sent::Keys {
                text: "sh -p 'say hi'".into(),
                submit: true
            }]
        );
    }
}
