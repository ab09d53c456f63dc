use serde::{Deserialize, Serialize};

/// Sender tag the front end uses for messages written by the character.
pub const SENDER_CHARACTER: &str = "character";

/// Body of a chat request. Every field may be missing or `null`; the
/// endpoint extracts and validates it leniently rather than through this
/// derive.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub character_name: Option<String>,
    #[serde(default)]
    pub character_personality: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<Vec<HistoryTurn>>,
}

impl ChatRequest {
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn character_name(&self) -> &str {
        self.character_name.as_deref().unwrap_or_default()
    }

    pub fn character_personality(&self) -> &str {
        self.character_personality.as_deref().unwrap_or_default()
    }

    pub fn history(&self) -> &[HistoryTurn] {
        self.conversation_history.as_deref().unwrap_or_default()
    }
}

/// One turn of the caller-supplied conversation history.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HistoryTurn {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl HistoryTurn {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            text: Some(text.into()),
        }
    }

    /// Whether the turn was spoken by the character (anything else is the user).
    pub fn is_character(&self) -> bool {
        self.sender.as_deref() == Some(SENDER_CHARACTER)
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub character_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
