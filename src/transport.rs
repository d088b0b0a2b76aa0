use crate::models::{ChatError, ChatRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

impl From<TransportError> for ChatError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ChatError::Timeout,
            TransportError::Connect(_) => ChatError::Connection,
            TransportError::Other(description) => ChatError::unexpected(description),
        }
    }
}

/// Performs the single authenticated POST behind every reply.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        api_key: &str,
        request: &ChatRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        api_key: &str,
        request: &ChatRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| TransportError::Other(format!("Invalid API key format: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(request)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatMessage, Role, Temperature};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: "hi".to_string(),
            }],
            temperature: Temperature::DEFAULT,
        }
    }

    #[test]
    fn transport_errors_map_to_reply_errors() {
        assert_eq!(ChatError::from(TransportError::Timeout), ChatError::Timeout);
        assert_eq!(
            ChatError::from(TransportError::Connect("refused".into())),
            ChatError::Connection
        );
        assert_eq!(
            ChatError::from(TransportError::Other("tls handshake".into())).to_string(),
            "❌ Unexpected error: tls handshake"
        );
    }

    #[tokio::test]
    async fn malformed_key_fails_before_sending() {
        let transport = ReqwestTransport::new();
        let err = transport
            .post(
                "http://127.0.0.1:1/v1/chat/completions",
                "bad\nkey",
                &request(),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Other(ref msg) if msg.starts_with("Invalid API key format")));
    }

    #[tokio::test]
    async fn refused_connection_is_classified() {
        let transport = ReqwestTransport::new();
        let err = transport
            .post(
                "http://127.0.0.1:1/v1/chat/completions",
                "key",
                &request(),
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)));
    }

    // Reads one HTTP/1.1 request: headers, then `content-length` bytes of body.
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse::<usize>().ok())
                    })
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    #[tokio::test]
    async fn request_goes_out_with_bearer_header_and_json_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/openai/v1/chat/completions", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let body = r#"{"choices":[{"message":{"content":"Recursion is..."}}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            request
        });

        let response = ReqwestTransport::new()
            .post(&url, "gsk_wire_key", &request(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        let parsed: crate::models::ChatResponse = serde_json::from_str(&response.body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Recursion is...");

        let captured = server.await.unwrap();
        let lower = captured.to_lowercase();
        assert!(captured.starts_with("POST /openai/v1/chat/completions "));
        assert!(lower.contains("authorization: bearer gsk_wire_key"));
        assert!(lower.contains("content-type: application/json"));
        assert!(captured.contains(r#""model":"test-model""#));
        assert!(captured.contains(r#""messages":[{"role":"user","content":"hi"}]"#));
        assert!(captured.contains(r#""temperature":0.7"#));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _request = read_request(&mut stream).await;
            // Hold the connection open without answering.
            tokio::time::sleep(Duration::from_secs(3)).await;
            drop(stream);
        });

        let err = ReqwestTransport::new()
            .post(&url, "key", &request(), Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout), "got {:?}", err);
        server.abort();
    }
}
