pub mod client;
pub mod config;
pub mod conversation;
pub mod models;
pub mod renderer;
pub mod transport;
pub mod ui;

pub use client::ChatClient;
pub use config::{ApiKey, Config};
pub use conversation::{ChatHandler, Conversation};
pub use models::{ChatError, ChatMessage, ChatRequest, ChatResponse, Role, Temperature, Turn};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
