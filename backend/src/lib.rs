mod adapter;
pub mod config;
mod error;
mod handlers;
mod prompt;
mod provider;
mod request;

pub use crate::adapter::ChatAdapter;
pub use crate::config::AdapterConfig;
pub use crate::error::{ChatError, ChatResult};
pub use crate::prompt::{Locale, build_conversation, system_prompt};
pub use crate::provider::{ChatProvider, CompletionParams, OpenAiProvider, completion_request};
pub use crate::request::parse_request;

use crate::handlers::chat;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{any, get},
};
use tower_http::trace::TraceLayer;

pub fn init(router: Router<ChatAdapter>, adapter: ChatAdapter) -> Router<()> {
    router
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/chat", any(chat))
        .route("/", any(chat))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(adapter)
}
