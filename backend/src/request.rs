use crate::error::{ChatError, ChatResult};
use serde_json::{Map, Value};
use shared::models::{ChatRequest, HistoryTurn};

/// Decode and validate a chat request body.
///
/// Only malformed text is `Invalid JSON`. A well-formed body of the wrong
/// shape is an unexpected failure, and blank required fields are reported
/// as missing before their types are looked at.
pub fn parse_request(body: &str) -> ChatResult<ChatRequest> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::debug!("Body is not JSON: {}", e);
        ChatError::Validation("Invalid JSON".to_string())
    })?;

    let object = value.as_object().ok_or_else(|| {
        ChatError::Unexpected(format!(
            "Request body must be a JSON object, got {}",
            kind_of(&value)
        ))
    })?;

    if is_blank(object.get("message")) || is_blank(object.get("characterName")) {
        return Err(ChatError::Validation("Missing required fields".to_string()));
    }

    Ok(ChatRequest {
        message: string_field(object, "message")?,
        character_name: string_field(object, "characterName")?,
        character_personality: string_field(object, "characterPersonality")?,
        conversation_history: history_field(object)?,
    })
}

/// Absent, null, false, zero and empty values all count as not supplied.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(Value::Bool(true)) => false,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> ChatResult<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ChatError::Unexpected(format!(
            "Field '{key}' must be a string, got {}",
            kind_of(other)
        ))),
    }
}

fn history_field(object: &Map<String, Value>) -> ChatResult<Option<Vec<HistoryTurn>>> {
    let turns = match object.get("conversationHistory") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(turns)) => turns,
        Some(other) => {
            return Err(ChatError::Unexpected(format!(
                "Field 'conversationHistory' must be an array, got {}",
                kind_of(other)
            )));
        }
    };

    turns
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let turn = turn.as_object().ok_or_else(|| {
                ChatError::Unexpected(format!(
                    "conversationHistory[{i}] must be an object, got {}",
                    kind_of(turn)
                ))
            })?;
            // Senders that are not strings can never be the character.
            let sender = turn
                .get("sender")
                .and_then(Value::as_str)
                .map(str::to_string);
            let text = string_field(turn, "text")
                .map_err(|_| ChatError::Unexpected(format!("conversationHistory[{i}].text must be a string")))?;
            Ok(HistoryTurn { sender, text })
        })
        .collect::<ChatResult<Vec<_>>>()
        .map(Some)
}
