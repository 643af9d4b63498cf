use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::WidgetConfig;
use crate::error::{ChatWidgetError, Result};
use crate::interfaces::backend::{ChatBackend, ChatReply, ChatRequest};

/// Relays chat requests to the backend over HTTP.
#[derive(Clone, Debug)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl HttpChatBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        let mut backend = Self::new(config.chat_url());
        backend.timeout = config.request_timeout();
        backend
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply> {
        let mut builder = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            // The body is still decoded; error replies may carry a `response` too.
            warn!(%status, url = %self.url, "chat endpoint returned non-success status");
        }

        let body = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&body).map_err(|e| {
            ChatWidgetError::Serialization(format!("invalid chat reply (HTTP {status}): {e}"))
        })?;
        debug!(%status, has_response = reply.response.is_some(), "chat reply decoded");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::{json, Map};

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            context: Map::new(),
        }
    }

    #[tokio::test]
    async fn posts_json_and_decodes_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/chat")
                    .header("content-type", "application/json")
                    .json_body(json!({"message": "hi", "context": {}}));
                then.status(200)
                    .json_body(json!({"response": "**hello**", "extra": 1}));
            })
            .await;

        let backend = HttpChatBackend::new(server.url("/api/chat"));
        let reply = backend.send(&request("hi")).await.expect("reply");
        assert_eq!(reply.response.as_deref(), Some("**hello**"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_still_decodes_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500)
                    .json_body(json!({"response": "brain offline"}));
            })
            .await;

        let backend = HttpChatBackend::new(server.url("/api/chat"));
        let reply = backend.send(&request("hi")).await.expect("reply");
        assert_eq!(reply.response.as_deref(), Some("brain offline"));
    }

    #[tokio::test]
    async fn non_json_body_is_a_serialization_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(502).body("<html>bad gateway</html>");
            })
            .await;

        let backend = HttpChatBackend::new(server.url("/api/chat"));
        let err = backend.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, ChatWidgetError::Serialization(_)));
    }

    #[tokio::test]
    async fn numeric_response_is_a_serialization_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200).json_body(json!({"response": 42}));
            })
            .await;

        let backend = HttpChatBackend::new(server.url("/api/chat"));
        let err = backend.send(&request("hi")).await.unwrap_err();
        assert!(matches!(err, ChatWidgetError::Serialization(_)));
    }

    #[tokio::test]
    async fn falsy_response_decodes_as_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(200).json_body(json!({"response": false}));
            })
            .await;

        let backend = HttpChatBackend::new(server.url("/api/chat"));
        let reply = backend.send(&request("hi")).await.expect("reply");
        assert_eq!(reply.response, None);
    }

    #[test]
    fn from_config_uses_chat_url_and_timeout() {
        let mut config = WidgetConfig::convention_defaults();
        config.server_url = "http://ayur.local:9000/".to_string();
        config.request_timeout_seconds = Some(5);
        let backend = HttpChatBackend::from_config(&config);
        assert_eq!(backend.url(), "http://ayur.local:9000/api/chat");
        assert_eq!(backend.timeout, Some(Duration::from_secs(5)));
    }
}
