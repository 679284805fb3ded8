//! HTTP implementation of [`AssistantClient`] for the storefront REST API.

use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::chat::core::config::ApiConfig;
use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::message::Message;
use crate::chat::session::capabilities::{AssistantClient, ClientFuture, IdentityProvider};

/// Body of the ask request.
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Body of the ask response.
#[derive(Debug, Deserialize)]
struct AskResponse {
    #[serde(alias = "answer", alias = "response")]
    reply: String,
}

/// REST client for the chatbot endpoints.
pub struct HttpAssistantClient {
    client: reqwest::Client,
    identity: Arc<dyn IdentityProvider>,
    history_url: Url,
    ask_url: Url,
}

impl HttpAssistantClient {
    /// Create a client from endpoint settings.
    ///
    /// # Errors
    /// Returns an error if the URLs are invalid or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, identity: Arc<dyn IdentityProvider>) -> ChatResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            identity,
            history_url: config.endpoint(&config.history_path)?,
            ask_url: config.endpoint(&config.ask_path)?,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.identity.current_user().and_then(|user| user.token) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl AssistantClient for HttpAssistantClient {
    fn fetch_history(&self) -> ClientFuture<'_, ChatResult<Vec<Message>>> {
        Box::pin(async move {
            if self.identity.current_user().is_none() {
                return Err(ChatError::Unauthenticated);
            }

            let response = self
                .authorize(self.client.get(self.history_url.clone()))
                .send()
                .await?
                .error_for_status()?;
            let messages: Vec<Message> = response.json().await?;
            debug!("Fetched {} history messages", messages.len());
            Ok(messages)
        })
    }

    fn send_question(&self, text: &str) -> ClientFuture<'_, ChatResult<String>> {
        let text = text.to_string();
        Box::pin(async move {
            let response = self
                .authorize(self.client.post(self.ask_url.clone()))
                .json(&AskRequest { question: &text })
                .send()
                .await?
                .error_for_status()?;
            let body: AskResponse = response.json().await?;
            if body.reply.trim().is_empty() {
                return Err(ChatError::EmptyReply);
            }
            Ok(body.reply)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use crate::chat::core::message::Sender;
    use crate::chat::session::capabilities::{StaticIdentity, UserIdentity};

    async fn serve(router: Router) -> ApiConfig {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        ApiConfig {
            base_url: format!("http://{addr}/api/"),
            request_timeout: Duration::from_secs(5),
            ..ApiConfig::default()
        }
    }

    fn signed_in() -> Arc<dyn IdentityProvider> {
        Arc::new(StaticIdentity::user(UserIdentity::new("u-1").with_token("secret")))
    }

    async fn history(headers: AxumHeaders) -> Result<Json<Value>, StatusCode> {
        let auth = headers.get("authorization").and_then(|value| value.to_str().ok());
        if auth != Some("Bearer secret") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(Json(json!([
            {"id": 1, "sender": "user", "content": "giày?", "created_at": "2024-05-01T10:00:00Z"},
            {"id": 2, "sender": "bot", "content": "[Giày ABC](/product/123)", "created_at": "2024-05-01T10:00:01Z"}
        ])))
    }

    async fn ask(Json(body): Json<Value>) -> Json<Value> {
        let question = body["question"].as_str().unwrap_or_default();
        Json(json!({ "answer": format!("echo: {question}") }))
    }

    #[tokio::test]
    async fn test_fetch_history_sends_bearer_token() {
        let router = Router::new().route("/api/chatbot/history", get(history));
        let config = serve(router).await;
        let client = HttpAssistantClient::new(&config, signed_in()).unwrap();

        let messages = client.fetch_history().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.as_str(), "1");
        assert_eq!(messages[1].sender, Sender::Bot);
    }

    #[tokio::test]
    async fn test_fetch_history_requires_identity() {
        let config = ApiConfig::default();
        let client =
            HttpAssistantClient::new(&config, Arc::new(StaticIdentity::guest())).unwrap();
        assert!(matches!(
            client.fetch_history().await,
            Err(ChatError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_send_question_round_trip() {
        let router = Router::new().route("/api/chatbot/ask", post(ask));
        let config = serve(router).await;
        let client = HttpAssistantClient::new(&config, signed_in()).unwrap();

        let reply = client.send_question("size 42").await.unwrap();
        assert_eq!(reply, "echo: size 42");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let router = Router::new().route(
            "/api/chatbot/ask",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let config = serve(router).await;
        let client = HttpAssistantClient::new(&config, signed_in()).unwrap();

        let err = client.send_question("hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Http(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let router = Router::new().route(
            "/api/chatbot/ask",
            post(|| async { Json(json!({ "reply": "  " })) }),
        );
        let config = serve(router).await;
        let client = HttpAssistantClient::new(&config, signed_in()).unwrap();

        assert!(matches!(
            client.send_question("hello").await,
            Err(ChatError::EmptyReply)
        ));
    }
}
