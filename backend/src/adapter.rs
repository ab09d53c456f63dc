use crate::config::AdapterConfig;
use crate::error::{ChatError, ChatResult};
use crate::prompt::build_conversation;
use crate::request::parse_request;
use crate::provider::{ChatProvider, CompletionParams, OpenAiProvider};
use shared::models::{ChatEvent, ChatReply, ChatResponse, METHOD_OPTIONS, METHOD_POST};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Stateless request/response adapter between the chat front end and the
/// completion provider. Cloning is cheap; clones share the provider.
#[derive(Clone)]
pub struct ChatAdapter {
    config: Arc<AdapterConfig>,
    provider: Arc<dyn ChatProvider>,
}

impl ChatAdapter {
    pub fn new(config: AdapterConfig, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }

    /// Adapter backed by the OpenAI-compatible endpoint in `config.api_base`.
    pub fn openai(config: AdapterConfig) -> Self {
        let provider = Arc::new(OpenAiProvider::new(config.api_base.clone()));
        Self::new(config, provider)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Handle one invocation. Always yields a reply; failures become JSON
    /// error bodies.
    pub async fn handle(&self, event: ChatEvent) -> ChatReply {
        self.respond(&event.http_method, Ok(event.body_text())).await
    }

    /// Handle a request whose body arrived as raw bytes. Bytes that are not
    /// UTF-8 are malformed JSON; a body that could not be read at all fails
    /// with `body`'s error once the method has been accepted.
    pub async fn handle_body(&self, method: &str, body: ChatResult<&[u8]>) -> ChatReply {
        let text = body.and_then(|bytes| {
            std::str::from_utf8(bytes).map_err(|e| {
                tracing::debug!("Body is not UTF-8: {}", e);
                ChatError::Validation("Invalid JSON".to_string())
            })
        });
        self.respond(method, text).await
    }

    async fn respond(&self, method: &str, body: ChatResult<&str>) -> ChatReply {
        let span = tracing::info_span!("chat", request_id = %Uuid::new_v4(), method = %method);

        async move {
            if method == METHOD_OPTIONS {
                tracing::debug!("Answering preflight");
                return ChatReply::preflight();
            }

            match self.process(method, body).await {
                Ok(response) => {
                    tracing::info!(status = 200, "Character replied");
                    ChatReply::json(200, &response)
                }
                Err(e) => {
                    match &e {
                        ChatError::Provider(msg) => {
                            tracing::error!(kind = e.kind(), "Completion failed: {}", msg)
                        }
                        ChatError::Configuration(msg) | ChatError::Unexpected(msg) => {
                            tracing::error!(kind = e.kind(), "{}", msg)
                        }
                        _ => tracing::warn!(kind = e.kind(), status = e.status(), "Rejected: {}", e),
                    }
                    e.into_reply()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&self, method: &str, body: ChatResult<&str>) -> ChatResult<ChatResponse> {
        if method != METHOD_POST {
            return Err(ChatError::MethodNotAllowed);
        }

        let request = parse_request(body?)?;

        let api_key = self.config.api_key().ok_or_else(|| {
            ChatError::Configuration("OpenAI API key not configured".to_string())
        })?;

        let messages = build_conversation(&request, &self.config);
        let params = CompletionParams {
            api_key: api_key.to_string(),
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.provider.generate(&messages, &params).await?;

        Ok(ChatResponse {
            response,
            character_name: request.character_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::models::{ErrorBody, PromptMessage};
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoProvider {
        calls: Mutex<Vec<(Vec<PromptMessage>, CompletionParams)>>,
    }

    #[async_trait]
    impl ChatProvider for EchoProvider {
        async fn generate(
            &self,
            messages: &[PromptMessage],
            params: &CompletionParams,
        ) -> ChatResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.to_vec(), params.clone()));
            Ok("Привет!".to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ChatProvider for FailingProvider {
        async fn generate(&self, _: &[PromptMessage], _: &CompletionParams) -> ChatResult<String> {
            Err(ChatError::Provider("Incorrect API key provided".to_string()))
        }
    }

    fn adapter(provider: Arc<dyn ChatProvider>) -> ChatAdapter {
        ChatAdapter::new(AdapterConfig::default().with_api_key("sk-test"), provider)
    }

    fn error_of(reply: &ChatReply) -> String {
        serde_json::from_str::<ErrorBody>(&reply.body).unwrap().error
    }

    #[tokio::test]
    async fn preflight_skips_provider() {
        let provider = Arc::new(EchoProvider::default());
        let reply = adapter(provider.clone())
            .handle(ChatEvent::new("OPTIONS", "{not json"))
            .await;
        assert_eq!(reply, ChatReply::preflight());
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        for method in ["GET", "PUT", "DELETE", "post"] {
            let reply = adapter(Arc::new(EchoProvider::default()))
                .handle(ChatEvent::new(method, "{}"))
                .await;
            assert_eq!(reply.status_code, 405, "{method}");
            assert_eq!(error_of(&reply), "Method not allowed");
            assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
        }
    }

    #[tokio::test]
    async fn missing_method_defaults_to_get() {
        let event: ChatEvent = serde_json::from_str(r#"{"body": "{}"}"#).unwrap();
        let reply = adapter(Arc::new(EchoProvider::default())).handle(event).await;
        assert_eq!(reply.status_code, 405);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_json() {
        let reply = adapter(Arc::new(EchoProvider::default()))
            .handle(ChatEvent::new("POST", "{not json"))
            .await;
        assert_eq!(reply.status_code, 400);
        assert_eq!(error_of(&reply), "Invalid JSON");
    }

    #[tokio::test]
    async fn wrong_shaped_bodies_take_the_generic_failure_path() {
        let provider = Arc::new(EchoProvider::default());
        for (body, error) in [
            ("[]", "Request body must be a JSON object, got an array"),
            ("\"str\"", "Request body must be a JSON object, got a string"),
            ("5", "Request body must be a JSON object, got a number"),
            (
                r#"{"message": 5, "characterName": "X"}"#,
                "Field 'message' must be a string, got a number",
            ),
        ] {
            let reply = adapter(provider.clone())
                .handle(ChatEvent::new("POST", body))
                .await;
            assert_eq!(reply.status_code, 500, "{body}");
            assert_eq!(error_of(&reply), error);
            assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
        }
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn numeric_sender_is_a_user_turn() {
        let provider = Arc::new(EchoProvider::default());
        let reply = adapter(provider.clone())
            .handle(ChatEvent::new(
                "POST",
                r#"{"message": "hi", "characterName": "X", "conversationHistory": [{"sender": 1, "text": "earlier"}]}"#,
            ))
            .await;
        assert_eq!(reply.status_code, 200);
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].0[1], PromptMessage::user("earlier"));
    }

    #[tokio::test]
    async fn empty_body_is_invalid_json() {
        let reply = adapter(Arc::new(EchoProvider::default()))
            .handle(ChatEvent::new("POST", ""))
            .await;
        assert_eq!(reply.status_code, 400);
        assert_eq!(error_of(&reply), "Invalid JSON");
    }

    #[tokio::test]
    async fn raw_bodies_follow_the_same_order() {
        let adapter = adapter(Arc::new(EchoProvider::default()));

        let reply = adapter.handle_body("POST", Ok(&[0xff, 0xfe, 0x7b])).await;
        assert_eq!(reply.status_code, 400);
        assert_eq!(error_of(&reply), "Invalid JSON");

        let reply = adapter.handle_body("OPTIONS", Ok(&[0xff])).await;
        assert_eq!(reply, ChatReply::preflight());

        let reply = adapter.handle_body("GET", Ok(&[0xff])).await;
        assert_eq!(reply.status_code, 405);

        let reply = adapter
            .handle_body("POST", Err(ChatError::Unexpected("body stream closed".into())))
            .await;
        assert_eq!(reply.status_code, 500);
        assert_eq!(error_of(&reply), "body stream closed");

        let reply = adapter
            .handle_body("POST", Ok(br#"{"message": "hi", "characterName": "X"}"#))
            .await;
        assert_eq!(reply.status_code, 200);
    }

    #[tokio::test]
    async fn missing_body_reads_as_empty_object() {
        let event = ChatEvent {
            http_method: "POST".into(),
            body: None,
        };
        let reply = adapter(Arc::new(EchoProvider::default())).handle(event).await;
        assert_eq!(reply.status_code, 400);
        assert_eq!(error_of(&reply), "Missing required fields");
    }

    #[tokio::test]
    async fn empty_message_is_missing_field() {
        for body in [
            r#"{"characterName": "X"}"#,
            r#"{"message": "", "characterName": "X"}"#,
            r#"{"message": "hi"}"#,
            r#"{"message": "hi", "characterName": null}"#,
        ] {
            let reply = adapter(Arc::new(EchoProvider::default()))
                .handle(ChatEvent::new("POST", body))
                .await;
            assert_eq!(reply.status_code, 400, "{body}");
            assert_eq!(error_of(&reply), "Missing required fields");
        }
    }

    #[tokio::test]
    async fn missing_key_is_reported_before_calling_provider() {
        let provider = Arc::new(EchoProvider::default());
        let adapter = ChatAdapter::new(AdapterConfig::default(), provider.clone());
        let reply = adapter
            .handle(ChatEvent::new("POST", r#"{"message": "hi", "characterName": "X"}"#))
            .await;
        assert_eq!(reply.status_code, 500);
        assert_eq!(error_of(&reply), "OpenAI API key not configured");
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_echoes_character_name() {
        let provider = Arc::new(EchoProvider::default());
        let reply = adapter(provider.clone())
            .handle(ChatEvent::new(
                "POST",
                r#"{"message": "Привет", "characterName": "Кот", "characterPersonality": "Ленивый"}"#,
            ))
            .await;

        assert_eq!(reply.status_code, 200);
        assert_eq!(reply.header("Content-Type"), Some("application/json"));
        let body: ChatResponse = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(
            body,
            ChatResponse {
                response: "Привет!".into(),
                character_name: "Кот".into(),
            }
        );

        let calls = provider.calls.lock().unwrap();
        let (messages, params) = &calls[0];
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("Ленивый"));
        assert_eq!(messages[1], PromptMessage::user("Привет"));
        assert_eq!(params.api_key, "sk-test");
        assert_eq!(params.model, "gpt-4o-mini");
        assert_eq!(params.max_tokens, 300);
        assert_eq!(params.temperature, 0.8);
    }

    #[tokio::test]
    async fn provider_failure_surfaces_its_description() {
        let reply = adapter(Arc::new(FailingProvider))
            .handle(ChatEvent::new("POST", r#"{"message": "hi", "characterName": "X"}"#))
            .await;
        assert_eq!(reply.status_code, 500);
        assert_eq!(error_of(&reply), "Incorrect API key provided");
        assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    }
}
