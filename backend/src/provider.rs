use crate::error::{ChatError, ChatResult};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use shared::models::{PromptMessage, ROLE_ASSISTANT, ROLE_SYSTEM};

/// Sampling parameters and credential for a single completion call.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionParams {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A chat-completion backend that turns a conversation into one reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn generate(
        &self,
        messages: &[PromptMessage],
        params: &CompletionParams,
    ) -> ChatResult<String>;
}

/// OpenAI-compatible chat completions over HTTP.
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    api_base: String,
}

impl OpenAiProvider {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

fn to_request_message(msg: &PromptMessage) -> ChatResult<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let req_msg = if msg.role == ROLE_SYSTEM {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?;
        ChatCompletionRequestMessage::System(system_msg)
    } else if msg.role == ROLE_ASSISTANT {
        let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(ChatCompletionRequestAssistantMessageContent::Text(content))
            .build()?;
        ChatCompletionRequestMessage::Assistant(assistant_msg)
    } else {
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?;
        ChatCompletionRequestMessage::User(user_msg)
    };
    Ok(req_msg)
}

/// The chat-completion request sent for `messages`, in order.
pub fn completion_request(
    messages: &[PromptMessage],
    params: &CompletionParams,
) -> ChatResult<CreateChatCompletionRequest> {
    let conversation = messages
        .iter()
        .map(to_request_message)
        .collect::<ChatResult<Vec<_>>>()?;

    let request = CreateChatCompletionRequestArgs::default()
        .model(params.model.clone())
        .messages(conversation)
        .max_tokens(params.max_tokens)
        .temperature(params.temperature)
        .build()?;
    Ok(request)
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn generate(
        &self,
        messages: &[PromptMessage],
        params: &CompletionParams,
    ) -> ChatResult<String> {
        let config = OpenAIConfig::new()
            .with_api_key(params.api_key.clone())
            .with_api_base(self.api_base.clone());
        let client = Client::with_config(config);

        let request = completion_request(messages, params)?;

        tracing::debug!(model = %params.model, messages = messages.len(), "Requesting completion");
        let response = client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Provider("Provider returned no completion".to_string()))
    }
}
