//! Deterministic tmux session names

use lazy_static::lazy_static;
use regex::Regex;

use tandem_protocol::SessionKey;
use tandem_utils::{Result, TandemError};

/// Prefix shared by every session tandem creates
pub const SESSION_PREFIX: &str = "tandem";

/// tmux itself accepts more, but names end up in shell commands
const MAX_SESSION_NAME_LEN: usize = 128;

lazy_static! {
    static ref SESSION_NAME: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Build the session name for a key, rejecting unsafe workspace ids
pub fn session_name(key: &SessionKey) -> Result<String> {
    let name = format!("{}-{}-{}", SESSION_PREFIX, key.tool, key.workspace_id);
    validate_session_name(&name)?;
    Ok(name)
}

/// Check a session name against the allow-list
///
/// Must pass before the name reaches any tmux invocation.
pub fn validate_session_name(name: &str) -> Result<()> {
    if name.len() > MAX_SESSION_NAME_LEN || !SESSION_NAME.is_match(name) {
        return Err(TandemError::InvalidSessionName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_protocol::ToolId;

    #[test]
    fn test_session_name_format() {
        let key = SessionKey::new("api_server-2", ToolId::Codex);
        assert_eq!(session_name(&key).unwrap(), "tandem-codex-api_server-2");
    }

    #[test]
    fn test_session_name_is_deterministic() {
        let key = SessionKey::new("ws1", ToolId::Gemini);
        assert_eq!(session_name(&key).unwrap(), session_name(&key).unwrap());
    }

    #[test]
    fn test_rejects_shell_metacharacters() {
        for workspace in ["ws;rm -rf", "ws name", "ws$(id)", "../ws", "ws:1", "ws.1"] {
            let key = SessionKey::new(workspace, ToolId::Claude);
            let result = session_name(&key);
            assert!(
                matches!(result, Err(TandemError::InvalidSessionName(_))),
                "{workspace:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty_and_long_names() {
        assert!(validate_session_name("").is_err());
        assert!(validate_session_name(&"a".repeat(MAX_SESSION_NAME_LEN + 1)).is_err());
        assert!(validate_session_name(&"a".repeat(MAX_SESSION_NAME_LEN)).is_ok());
    }
}
