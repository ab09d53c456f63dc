use crate::{ChatAdapter, ChatError};
use axum::{
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use shared::models::ChatReply;

pub async fn chat(
    State(adapter): State<ChatAdapter>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = body
        .as_deref()
        .map_err(|rejection| ChatError::Unexpected(rejection.body_text()));
    reply_to_response(adapter.handle_body(method.as_str(), body).await)
}

/// Copy an HTTP-shaped reply onto a real response verbatim.
pub fn reply_to_response(reply: ChatReply) -> Response {
    let status = StatusCode::from_u16(reply.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &reply.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(reply.body)).unwrap_or_else(|e| {
        tracing::error!("Failed to build response: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
