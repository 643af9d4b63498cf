use async_trait::async_trait;
use serde::{de, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Body of a chat request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub context: Map<String, Value>,
}

/// Reply from the chat endpoint. Fields other than `response` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "falsy_or_string")]
    pub response: Option<String>,
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

// Falsy values render as an empty reply; any other non-string is undecodable.
fn falsy_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(Value::String(text)) if !text.is_empty() => Ok(Some(text)),
        Some(value) if is_falsy(&value) => Ok(None),
        Some(other) => Err(de::Error::custom(format!(
            "`response` must be a string, got {other}"
        ))),
    }
}


#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply>;
}
