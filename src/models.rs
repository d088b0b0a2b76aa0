use chrono::{DateTime, Local};
use rustyline::error::ReadlineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of characters of a response body or failure description
/// echoed back to the user.
pub const EXCERPT_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a conversation. The timestamp is display metadata only and
/// never leaves the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    role: Role,
    content: String,
    sent_at: DateTime<Local>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sent_at(&self) -> DateTime<Local> {
        self.sent_at
    }

    /// Wire projection: role and content, nothing else.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Temperature,
}

#[derive(Debug, Deserialize)]
pub struct ReplyMessage {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

/// Sampling temperature, kept within the slider range of 0.2 to 1.0 and
/// snapped to tenths.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Temperature(f32);

impl Temperature {
    pub const MIN: f32 = 0.2;
    pub const MAX: f32 = 1.0;
    pub const DEFAULT: Temperature = Temperature(0.7);

    pub fn new(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::Temperature(value.to_string()));
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(Error::Temperature(value.to_string()));
        }
        let tenths = (value * 10.0).round();
        Ok(Self(tenths / 10.0))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl FromStr for Temperature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s
            .trim()
            .parse::<f32>()
            .map_err(|_| Error::Temperature(s.trim().to_string()))?;
        Self::new(value)
    }
}

/// Everything that can go wrong while producing a reply. The `Display` form
/// is the exact text shown to the user in place of the reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("⚠️ API key not configured. Please set the GROQ_API_KEY environment variable.")]
    MissingCredential,
    #[error("🔑 Authentication failed. Please check your GROQ_API_KEY.")]
    Unauthorized,
    #[error("⏳ Rate limit exceeded. Please wait a moment and try again.")]
    RateLimited,
    #[error("🔧 Server error. The GROQ service might be temporarily unavailable.")]
    ServerUnavailable,
    #[error("❌ API Error ({status}): {excerpt}")]
    Http { status: u16, excerpt: String },
    #[error("⏱️ Request timed out. Please try again.")]
    Timeout,
    #[error("🌐 Connection error. Please check your internet connection.")]
    Connection,
    #[error("❌ Unexpected error: {0}")]
    Unexpected(String),
}

const ERROR_MARKERS: [&str; 7] = ["⚠️", "🔑", "⏳", "🔧", "❌", "⏱️", "🌐"];

impl ChatError {
    /// Classifies a status code. `None` means success (200 only).
    pub fn from_status(status: u16, body: &str) -> Option<Self> {
        match status {
            200 => None,
            401 => Some(ChatError::Unauthorized),
            429 => Some(ChatError::RateLimited),
            s if s >= 500 => Some(ChatError::ServerUnavailable),
            s => Some(ChatError::Http {
                status: s,
                excerpt: excerpt(body),
            }),
        }
    }

    pub fn unexpected(description: impl fmt::Display) -> Self {
        ChatError::Unexpected(excerpt(&description.to_string()))
    }

    /// Whether a reply string carries one of the leading error glyphs.
    pub fn is_error_reply(text: &str) -> bool {
        ERROR_MARKERS.iter().any(|marker| text.starts_with(marker))
    }
}

/// First `EXCERPT_LEN` characters of `text`, never splitting a code point.
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LEN).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Temperature must be a number between 0.2 and 1.0, got `{0}`")]
    Temperature(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Terminal error: {0}")]
    Terminal(#[from] clearscreen::Error),
    #[error("Readline error: {0}")]
    Readline(String),
}

impl From<ReadlineError> for Error {
    fn from(err: ReadlineError) -> Self {
        Error::Readline(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
