//! Kokoro Bot - an empathetic emotional-support chatbot backend.
//!
//! This crate mediates multi-turn conversations between a client and the
//! Gemini generative-language API: it accepts a message (optionally tagged
//! with a session token), rebuilds the conversation's context, asks the
//! generator for a reply, and records both turns.
//!
//! # Architecture
//!
//! The service is organized around these core components:
//!
//! - **Messages** ([`message`]) - immutable conversation turns and the two
//!   role vocabularies (client-facing and generator-facing)
//! - **Sessions** ([`session`]) - in-memory conversation state with
//!   per-session locking, bounded history, and optional idle sweeping
//! - **Generator** ([`generator`]) - the text-generation boundary and its
//!   Gemini adapter
//! - **Chat** ([`chat`]) - the request-level workflow tying store and
//!   generator together
//! - **Gateway** ([`gateway`]) - thin HTTP surface (`/chat`, `/health`)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kokoro_bot::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let store = Arc::new(SessionStore::new());
//!     let generator = GeminiGenerator::new(GeminiConfig::new(config.generator.api_key.clone()));
//!     let service = Arc::new(ChatService::new(store, generator));
//!     kokoro_bot::gateway::serve(service, &config.server).await
//! }
//! ```

pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod message;
pub mod session;
pub mod util;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error types (centralized)
    pub use crate::error::{
        ChatError, ConfigError, ConfigResult, GeneratorError, GeneratorResult, Result,
    };

    // Chat workflow
    pub use crate::chat::{ChatReply, ChatService, MAX_MESSAGE_CHARS};

    // Config
    pub use crate::config::{
        BotConfig, GeneratorConfig, ServerConfig, SessionTuning, split_origins,
    };

    // Gateway DTOs
    pub use crate::gateway::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

    // Generator boundary
    pub use crate::generator::{GeminiConfig, GeminiGenerator, Generator, SharedGenerator};

    // Messages
    pub use crate::message::{ContextMessage, GeneratorRole, Message, Role};

    // Sessions
    pub use crate::session::{
        IdleSweeper, SessionConfig, SessionHandle, SessionStore, SweeperConfig, SweeperHandle,
    };

    // Utilities
    pub use crate::util::{generate_session_token, timestamp_ms};
}
