use crate::config::Config;
use crate::models::{ChatError, ChatMessage, ChatRequest, ChatResponse, Role, Temperature, Turn};
use crate::transport::{ReqwestTransport, Transport};
use log::{debug, warn};

/// Chat-completion client. Every outcome, good or bad, comes back as the
/// text to show in place of the assistant's reply.
pub struct ChatClient<T = ReqwestTransport> {
    transport: T,
    config: Config,
}

impl ChatClient<ReqwestTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> ChatClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// System prompt first, then every turn in order, reduced to role and
    /// content.
    pub fn build_request(&self, turns: &[Turn], temperature: Temperature) -> ChatRequest {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ChatMessage {
            role: Role::System,
            content: self.config.system_prompt.clone(),
        });
        messages.extend(turns.iter().map(Turn::to_message));

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
        }
    }

    pub async fn send(&self, turns: &[Turn], temperature: Temperature) -> String {
        match self.try_send(turns, temperature).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!("Chat request failed: {:?}", err);
                err.to_string()
            }
        }
    }

    pub async fn try_send(
        &self,
        turns: &[Turn],
        temperature: Temperature,
    ) -> Result<String, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ChatError::MissingCredential)?;

        let request = self.build_request(turns, temperature);
        debug!(
            "POST {} with {} messages at temperature {}",
            self.config.endpoint,
            request.messages.len(),
            temperature
        );

        let response = self
            .transport
            .post(
                &self.config.endpoint,
                api_key.expose(),
                &request,
                self.config.timeout,
            )
            .await?;
        debug!("Chat endpoint answered with status {}", response.status);

        if let Some(err) = ChatError::from_status(response.status, &response.body) {
            return Err(err);
        }
        parse_reply(&response.body)
    }
}

fn parse_reply(body: &str) -> Result<String, ChatError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(ChatError::unexpected)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ChatError::unexpected("response contained no choices"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpResponse, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Canned {
        Status(u16, &'static str),
        Body(u16, String),
        Timeout,
        Refused,
        Broken,
    }

    struct CannedTransport {
        canned: Canned,
        calls: AtomicUsize,
    }

    impl CannedTransport {
        fn new(canned: Canned) -> Self {
            Self {
                canned,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn post(
            &self,
            _url: &str,
            _api_key: &str,
            _request: &ChatRequest,
            _timeout: Duration,
        ) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.canned {
                Canned::Status(status, body) => Ok(HttpResponse::new(*status, *body)),
                Canned::Body(status, body) => Ok(HttpResponse::new(*status, body.clone())),
                Canned::Timeout => Err(TransportError::Timeout),
                Canned::Refused => Err(TransportError::Connect("connection refused".into())),
                Canned::Broken => Err(TransportError::Other("y".repeat(500))),
            }
        }
    }

    fn client(canned: Canned) -> ChatClient<CannedTransport> {
        ChatClient::with_transport(
            Config::default().with_api_key("gsk_test_key_123"),
            CannedTransport::new(canned),
        )
    }

    async fn reply(canned: Canned) -> String {
        client(canned)
            .send(&[Turn::user("Explain recursion")], Temperature::DEFAULT)
            .await
    }

    #[tokio::test]
    async fn success_returns_content_verbatim() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Recursion is..."}}]}"#;
        assert_eq!(reply(Canned::Status(200, body)).await, "Recursion is...");
    }

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let client = ChatClient::with_transport(
            Config::default(),
            CannedTransport::new(Canned::Status(200, "{}")),
        );
        let text = client.send(&[Turn::user("hi")], Temperature::DEFAULT).await;
        assert_eq!(
            text,
            "⚠️ API key not configured. Please set the GROQ_API_KEY environment variable."
        );
        assert_eq!(client.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn status_codes_map_to_fixed_messages() {
        assert_eq!(
            reply(Canned::Status(401, "nope")).await,
            "🔑 Authentication failed. Please check your GROQ_API_KEY."
        );
        assert_eq!(
            reply(Canned::Status(429, "slow down")).await,
            "⏳ Rate limit exceeded. Please wait a moment and try again."
        );
        assert_eq!(
            reply(Canned::Status(503, "")).await,
            "🔧 Server error. The GROQ service might be temporarily unavailable."
        );
        assert_eq!(
            reply(Canned::Status(400, r#"{"error":"bad model"}"#)).await,
            r#"❌ API Error (400): {"error":"bad model"}"#
        );
    }

    #[tokio::test]
    async fn transport_failures_map_to_fixed_messages() {
        assert_eq!(
            reply(Canned::Timeout).await,
            "⏱️ Request timed out. Please try again."
        );
        assert_eq!(
            reply(Canned::Refused).await,
            "🌐 Connection error. Please check your internet connection."
        );
        assert_eq!(
            reply(Canned::Broken).await,
            format!("❌ Unexpected error: {}", "y".repeat(200))
        );
    }

    #[tokio::test]
    async fn malformed_success_body_is_unexpected() {
        let text = reply(Canned::Status(200, "not json")).await;
        assert!(text.starts_with("❌ Unexpected error: "));

        let text = reply(Canned::Status(200, r#"{"choices":[]}"#)).await;
        assert_eq!(text, "❌ Unexpected error: response contained no choices");
    }

    #[tokio::test]
    async fn null_content_is_unexpected() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[]}}]}"#;
        let text = reply(Canned::Status(200, body)).await;
        assert!(text.starts_with("❌ Unexpected error: "));
        assert!(text.contains("null"));
    }

    #[tokio::test]
    async fn multibyte_error_body_is_cut_at_200_chars() {
        let text = reply(Canned::Body(418, "é".repeat(250))).await;
        assert_eq!(text, format!("❌ API Error (418): {}", "é".repeat(200)));
    }

    #[test]
    fn request_starts_with_single_system_message() {
        let client = client(Canned::Timeout);
        let turns = vec![
            Turn::user("What is a pointer?"),
            Turn::assistant("A pointer holds an address."),
            Turn::user("And a reference?"),
        ];
        let request = client.build_request(&turns, Temperature::new(0.4).unwrap());

        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, crate::config::SYSTEM_PROMPT);
        assert!(request.messages[1..].iter().all(|m| m.role != Role::System));
        assert_eq!(request.messages[3].content, "And a reference?");
    }
}
