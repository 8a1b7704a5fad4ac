//! Per-store AI assistant settings.
//!
//! The assistant itself runs elsewhere; the platform only stores what it
//! should call itself and how it should talk.

use serde::{Deserialize, Serialize};

use super::{InputError, MAX_TEXT_LENGTH, required_text};

const MAX_AGENT_NAME_LENGTH: usize = 60;
const MAX_PROMPT_LENGTH: usize = 4_000;

/// Assistant settings, stored as JSON on the store row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiAgentConfig {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "tom")]
    pub tone: String,
    pub custom_prompt: String,
    pub use_emojis: bool,
    pub is_active: bool,
}

impl Default for AiAgentConfig {
    fn default() -> Self {
        Self {
            name: "Assistente".to_owned(),
            tone: "amigavel".to_owned(),
            custom_prompt: String::new(),
            use_emojis: true,
            is_active: true,
        }
    }
}

impl AiAgentConfig {
    /// Trim fields and enforce limits.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank name or tone, or oversized text.
    pub fn normalized(self) -> Result<Self, InputError> {
        let custom_prompt = self.custom_prompt.trim().to_owned();
        if custom_prompt.chars().count() > MAX_PROMPT_LENGTH {
            return Err(InputError(format!(
                "customPrompt must be at most {MAX_PROMPT_LENGTH} characters"
            )));
        }
        Ok(Self {
            name: required_text(&self.name, "name", MAX_AGENT_NAME_LENGTH)?,
            tone: required_text(&self.tone, "tone", MAX_TEXT_LENGTH)?,
            custom_prompt,
            ..self
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: AiAgentConfig = serde_json::from_str(r#"{"useEmojis":false}"#).unwrap();
        assert_eq!(config.name, "Assistente");
        assert!(!config.use_emojis);
        assert!(config.is_active);
    }

    #[test]
    fn test_portuguese_aliases() {
        let config: AiAgentConfig =
            serde_json::from_str(r#"{"nome":"Luna","tom":"formal"}"#).unwrap();
        assert_eq!(config.name, "Luna");
        assert_eq!(config.tone, "formal");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["name"], "Luna");
    }

    #[test]
    fn test_blank_name_rejected() {
        let config = AiAgentConfig {
            name: "  ".to_owned(),
            ..AiAgentConfig::default()
        };
        assert!(config.normalized().is_err());
    }
}
