//! Chat-completion client used by the analysis stage.
//!
//! Stages never build HTTP requests themselves; they hold an
//! `Arc<dyn ChatModel>` so tests can swap in a scripted model.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gave up after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A chat model that answers with a single JSON object.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier recorded in reports.
    fn model(&self) -> &str;

    /// Sends one system + one user message and returns the raw JSON text of
    /// the reply, with any code fences removed. Parsing is left to callers.
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            base_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn backoff(attempt: u32) -> Duration {
        Duration::from_secs(1 << (attempt - 1))
    }

    /// One HTTP round trip. `Err(Retry)` means the attempt may be repeated.
    async fn attempt(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, Attempt> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(LlmError::Http(e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ChatResponse>()
                .await
                .map_err(|e| Attempt::Fatal(LlmError::Http(e)));
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);
        let error = LlmError::Api {
            status: status.as_u16(),
            message,
        };
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!("Chat completions returned {status}");
            Err(Attempt::Retry(error))
        } else {
            Err(Attempt::Fatal(error))
        }
    }

    /// Sends the request, retrying transport errors, 429 and 5xx up to
    /// `MAX_ATTEMPTS` times with 1s, 2s backoff.
    pub async fn call(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let mut last = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Self::backoff(attempt);
                warn!("Retrying chat completion in {}s (attempt {})", delay.as_secs(), attempt + 1);
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&body).await {
                Ok(response) => {
                    if let Some(usage) = &response.usage {
                        debug!(
                            prompt_tokens = usage.prompt_tokens,
                            completion_tokens = usage.completion_tokens,
                            "Chat completion succeeded"
                        );
                    }
                    return Ok(response);
                }
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) => last = Some(e),
            }
        }

        Err(last.unwrap_or(LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }
}

enum Attempt {
    Retry(LlmError),
    Fatal(LlmError),
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete_json(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(system, prompt).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(strip_json_fences(text).to_string())
    }
}

/// Removes a surrounding Markdown code fence (with or without a language
/// tag) that some models add despite `response_format`.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const ADA_REPLY: &str =
        r#"{"choices": [{"message": {"content": "{\"name\": \"Ada\"}"}}]}"#;

    /// Reads one HTTP request and returns its body.
    async fn read_body(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return String::new();
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let start = end + 4;
            if buf.len() >= start + len {
                return String::from_utf8_lossy(&buf[start..start + len]).into_owned();
            }
        }
    }

    /// Chat-completions stand-in that answers each connection with the next
    /// scripted `(status, body)` and records the request bodies it saw.
    async fn scripted_server(script: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            for (status, reply) in script {
                let (mut socket, _) = listener.accept().await.unwrap();
                let body = read_body(&mut socket).await;
                seen.lock().unwrap().push(body);
                let response = format!(
                    "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                    reply.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        (base_url, requests)
    }

    fn client(base_url: String) -> OpenAiClient {
        OpenAiClient::new(
            "sk-test".into(),
            "gpt-4o".into(),
            base_url,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_succeeds() {
        let (base_url, requests) = scripted_server(vec![
            (500, r#"{"error": {"message": "overloaded"}}"#),
            (200, ADA_REPLY),
        ])
        .await;

        let reply = client(base_url)
            .complete_json("json only", "resume text")
            .await
            .unwrap();

        assert_eq!(reply, "{\"name\": \"Ada\"}");
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let sent: serde_json::Value = serde_json::from_str(&requests[0]).unwrap();
        assert_eq!(sent["response_format"]["type"], "json_object");
        assert_eq!(sent["model"], "gpt-4o");
        assert_eq!(sent["messages"][1]["content"], "resume text");
    }

    #[tokio::test]
    async fn test_client_error_fails_without_retry() {
        let (base_url, requests) =
            scripted_server(vec![(400, r#"{"error": {"message": "unknown model"}}"#)]).await;

        let err = client(base_url).call("json only", "resume text").await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "unknown model");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_fenced_reply_is_unwrapped() {
        let reply = "```json\n{\"name\": \"Jane Roe\"}\n```";
        assert_eq!(strip_json_fences(reply), "{\"name\": \"Jane Roe\"}");

        let untagged = "```\n{\"skills\": []}\n```";
        assert_eq!(strip_json_fences(untagged), "{\"skills\": []}");
    }

    #[test]
    fn test_plain_and_unterminated_replies() {
        assert_eq!(strip_json_fences("  {\"name\": \"Ada\"}\n"), "{\"name\": \"Ada\"}");
        assert_eq!(strip_json_fences("```json\n{\"name\": \"Ada\"}"), "{\"name\": \"Ada\"}");
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(OpenAiClient::backoff(1), Duration::from_secs(1));
        assert_eq!(OpenAiClient::backoff(2), Duration::from_secs(2));
    }

    #[test]
    fn test_request_body_asks_for_json_object() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "json only",
                },
                ChatMessage {
                    role: "user",
                    content: "resume text",
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "resume text");
    }

    #[test]
    fn test_response_text_takes_first_choice() {
        let json = r#"{
            "choices": [{"message": {"content": "{\"name\": \"Ada\"}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("{\"name\": \"Ada\"}"));
    }

    #[test]
    fn test_response_without_content_is_empty() {
        let json = r#"{"choices": [{"message": {"content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.text().is_none());

        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = OpenAiClient::new(
            "sk-test".into(),
            "gpt-4o".into(),
            "http://localhost:8080/v1/".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), "gpt-4o");
    }
}
