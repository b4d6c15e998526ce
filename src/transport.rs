//! Answering endpoint client
//!
//! The transport turns every exchange into a [`ChatReply`]: an answer, an
//! error reported by the endpoint itself, or a local failure. It never
//! returns an `Err`, so the session always has one shape to branch on.
//! Queuing and de-duplication are left to the caller.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::config::ChatConfig;

/// Outcome of one exchange with the answering endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    /// The endpoint answered the query
    Answer {
        /// Markdown answer text
        text: String,
        /// Documents the answer was drawn from, passed through untouched
        sources: Vec<Value>,
    },

    /// The endpoint reported an error payload
    Remote(String),

    /// Network, status or parse failure; carries the diagnostic only
    Failure(String),
}

/// Sends one query and resolves to a [`ChatReply`]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, query: &str) -> ChatReply;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    sources: Option<Vec<Value>>,
}

/// HTTP transport posting `{query}` as JSON
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    health_endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            health_endpoint: config.health_endpoint.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Probe the companion health endpoint
    ///
    /// Returns `Ok(false)` when the endpoint answers with a non-success status.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint cannot be reached
    pub async fn health(&self) -> Result<bool> {
        let response = self.client.get(&self.health_endpoint).send().await?;
        let status = response.status();
        tracing::debug!(%status, url = %self.health_endpoint, "health probe");
        Ok(status.is_success())
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, query: &str) -> ChatReply {
        tracing::debug!(endpoint = %self.endpoint, chars = query.len(), "sending query");

        let response = match self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { query })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ChatReply::Failure(format!("request failed: {e}")),
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => parse_reply(status, &body),
            Err(e) => ChatReply::Failure(format!("failed to read reply body: {e}")),
        }
    }
}

/// Map a status and raw body to a reply
///
/// A non-empty `error` wins over `response`.
#[must_use]
pub fn parse_reply(status: StatusCode, body: &str) -> ChatReply {
    if !status.is_success() {
        return ChatReply::Failure(format!("endpoint returned {status}"));
    }

    let parsed: ChatResponseBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return ChatReply::Failure(format!("invalid reply body: {e}")),
    };

    if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
        return ChatReply::Remote(error);
    }

    match parsed.response {
        Some(text) => ChatReply::Answer {
            text,
            sources: parsed.sources.unwrap_or_default(),
        },
        None => ChatReply::Failure("reply carries neither response nor error".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_with_sources() {
        let reply = parse_reply(
            StatusCode::OK,
            r#"{"response": "**Hi**", "sources": [{"page": 3}], "error": null}"#,
        );
        assert_eq!(
            reply,
            ChatReply::Answer {
                text: "**Hi**".to_string(),
                sources: vec![serde_json::json!({"page": 3})],
            }
        );
    }

    #[test]
    fn error_takes_precedence() {
        let reply = parse_reply(
            StatusCode::OK,
            r#"{"response": "The assistant failed", "error": "quota exceeded"}"#,
        );
        assert_eq!(reply, ChatReply::Remote("quota exceeded".to_string()));
    }

    #[test]
    fn blank_error_is_ignored() {
        let reply = parse_reply(StatusCode::OK, r#"{"response": "ok", "error": ""}"#);
        assert!(matches!(reply, ChatReply::Answer { ref text, .. } if text == "ok"));
    }

    #[test]
    fn non_success_status_is_failure() {
        let reply = parse_reply(StatusCode::BAD_GATEWAY, r#"{"response": "ok"}"#);
        assert!(matches!(reply, ChatReply::Failure(_)));
    }

    #[test]
    fn malformed_body_is_failure() {
        assert!(matches!(
            parse_reply(StatusCode::OK, "<html>oops</html>"),
            ChatReply::Failure(_)
        ));
        assert!(matches!(
            parse_reply(StatusCode::OK, r#"{"sources": []}"#),
            ChatReply::Failure(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_failure() {
        let config = ChatConfig {
            endpoint: "http://127.0.0.1:9/api/chat".to_string(),
            health_endpoint: "http://127.0.0.1:9/api/chat/health".to_string(),
            timeout: std::time::Duration::from_secs(2),
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert!(matches!(transport.send("hello").await, ChatReply::Failure(_)));
    }
}
