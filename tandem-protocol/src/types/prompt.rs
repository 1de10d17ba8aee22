use serde::{Deserialize, Serialize};

// ==================== Interactive Prompts ====================

/// One selectable option of a multiple-choice prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Number shown before the label (1-based)
    pub number: u32,
    pub label: String,
    /// Whether the selection cursor sits on this option
    pub is_default: bool,
    /// Whether picking this option asks for free-form text
    pub requires_text_input: bool,
}

/// Structured prompt awaiting a human decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptData {
    YesNo {
        question: String,
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_option: Option<String>,
    },
    MultipleChoice {
        question: String,
        options: Vec<ChoiceOption>,
    },
}

impl PromptData {
    pub fn question(&self) -> &str {
        match self {
            PromptData::YesNo { question, .. } | PromptData::MultipleChoice { question, .. } => {
                question
            }
        }
    }

    /// Human readable kind, as serialized in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            PromptData::YesNo { .. } => "yes_no",
            PromptData::MultipleChoice { .. } => "multiple_choice",
        }
    }
}

/// Outcome of running the prompt detector over captured text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDetectionResult {
    pub is_prompt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_data: Option<PromptData>,
    pub clean_content: String,
    pub raw_content: String,
}

impl PromptDetectionResult {
    /// Result for text that holds no prompt
    pub fn none(text: &str) -> Self {
        let trimmed = text.trim().to_string();
        Self {
            is_prompt: false,
            prompt_data: None,
            clean_content: trimmed.clone(),
            raw_content: trimmed,
        }
    }

    pub fn prompt(data: PromptData, raw: &str) -> Self {
        Self {
            is_prompt: true,
            clean_content: data.question().to_string(),
            prompt_data: Some(data),
            raw_content: raw.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_data_tagged_serialization() {
        let data = PromptData::YesNo {
            question: "Continue?".into(),
            options: vec!["yes".into(), "no".into()],
            default_option: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "yes_no");
        assert_eq!(json["question"], "Continue?");
        assert!(json.get("default_option").is_none());
    }

    #[test]
    fn test_multiple_choice_deserializes_from_tag() {
        let json = r#"{
            "type": "multiple_choice",
            "question": "Pick one",
            "options": [
                {"number": 1, "label": "Yes", "is_default": true, "requires_text_input": false},
                {"number": 2, "label": "No", "is_default": false, "requires_text_input": false}
            ]
        }"#;
        let data: PromptData = serde_json::from_str(json).unwrap();
        assert_eq!(data.kind(), "multiple_choice");
        assert_eq!(data.question(), "Pick one");
    }

    #[test]
    fn test_none_result_trims_content() {
        let result = PromptDetectionResult::none("  hello\n\n");
        assert!(!result.is_prompt);
        assert!(result.prompt_data.is_none());
        assert_eq!(result.clean_content, "hello");
    }

    #[test]
    fn test_prompt_result_uses_question_as_clean_content() {
        let data = PromptData::YesNo {
            question: "Delete it?".into(),
            options: vec!["yes".into(), "no".into()],
            default_option: Some("no".into()),
        };
        let result = PromptDetectionResult::prompt(data, "Delete it? [y/N]\n");
        assert!(result.is_prompt);
        assert_eq!(result.clean_content, "Delete it?");
        assert_eq!(result.raw_content, "Delete it? [y/N]");
    }
}
