use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const METHOD_POST: &str = "POST";
pub const METHOD_OPTIONS: &str = "OPTIONS";

pub const HEADER_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const HEADER_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const HEADER_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
pub const HEADER_MAX_AGE: &str = "Access-Control-Max-Age";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// An HTTP-shaped invocation, as delivered by a serverless runtime.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatEvent {
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ChatEvent {
    pub fn new(http_method: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            body: Some(body.into()),
        }
    }

    /// The raw body text; a missing body reads as an empty JSON object.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("{}")
    }
}

/// An HTTP-shaped response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ChatReply {
    /// Answer to a CORS preflight probe.
    pub fn preflight() -> Self {
        let headers = [
            (HEADER_ALLOW_ORIGIN, "*"),
            (HEADER_ALLOW_METHODS, "POST, OPTIONS"),
            (HEADER_ALLOW_HEADERS, "Content-Type"),
            (HEADER_MAX_AGE, "86400"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            status_code: 200,
            headers,
            body: String::new(),
        }
    }

    pub fn json<T: Serialize>(status_code: u16, body: &T) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            serde_json::json!({ "error": e.to_string() }).to_string()
        });
        let headers = [
            (HEADER_CONTENT_TYPE, "application/json"),
            (HEADER_ALLOW_ORIGIN, "*"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
