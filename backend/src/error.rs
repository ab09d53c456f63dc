use async_openai::error::OpenAIError;
use shared::models::{ChatReply, ErrorBody};
use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Unexpected(String),
}

impl ChatError {
    pub fn status(&self) -> u16 {
        match self {
            ChatError::MethodNotAllowed => 405,
            ChatError::Validation(_) => 400,
            ChatError::Configuration(_) | ChatError::Provider(_) | ChatError::Unexpected(_) => {
                500
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::MethodNotAllowed => "method",
            ChatError::Validation(_) => "validation",
            ChatError::Configuration(_) => "configuration",
            ChatError::Provider(_) => "provider",
            ChatError::Unexpected(_) => "unexpected",
        }
    }

    pub fn into_reply(self) -> ChatReply {
        ChatReply::json(self.status(), &ErrorBody::new(self.to_string()))
    }
}

impl From<OpenAIError> for ChatError {
    fn from(e: OpenAIError) -> Self {
        ChatError::Provider(e.to_string())
    }
}
