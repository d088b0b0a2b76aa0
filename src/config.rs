use std::env;
use std::fmt;
use std::time::Duration;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const ENDPOINT_VAR: &str = "GROQ_API_URL";
pub const MODEL_VAR: &str = "GROQ_MODEL";

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const SYSTEM_PROMPT: &str = "
You are CodeMentor, a friendly programming tutor.
Explain programming concepts clearly with simple examples.
Help beginners understand Python, C++, and algorithms.
";

/// Bearer token for the chat-completion service. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// An empty value counts as no key at all.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last two characters, enough to tell keys apart in logs.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("{}****{}", head, tail)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<ApiKey>,
    pub endpoint: String,
    pub model: String,
    pub system_prompt: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv` first if `.env` files
    /// should be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            api_key: lookup(API_KEY_VAR).and_then(ApiKey::new),
            endpoint: lookup(ENDPOINT_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.endpoint),
            model: lookup(MODEL_VAR)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.model),
            ..defaults
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiKey::new(key);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
