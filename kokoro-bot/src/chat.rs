//! Conversation orchestration.
//!
//! [`ChatService`] is the request-level workflow: resolve the session,
//! snapshot its history, call the generator with the normalized context, and
//! persist the `[user, assistant]` pair only after the generator succeeds.
//! The store is never locked across the generator call; each request touches
//! its session in two short critical sections (snapshot, append).

use crate::error::{ChatError, Result};
use crate::generator::Generator;
use crate::message::Message;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on a single user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Reply produced by a successful [`ChatService::converse`] call.
///
/// The token is the only state the caller must carry across turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Generated assistant text.
    pub reply: String,
    /// Token of the session the exchange was recorded under.
    pub session_token: String,
}

/// The request-level conversation workflow.
pub struct ChatService<G: Generator> {
    store: Arc<SessionStore>,
    generator: G,
}

impl<G: Generator> std::fmt::Debug for ChatService<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService").finish_non_exhaustive()
    }
}

impl<G: Generator> ChatService<G> {
    /// Create a service over the given store and generator.
    pub fn new(store: Arc<SessionStore>, generator: G) -> Self {
        Self { store, generator }
    }

    /// The session store backing this service.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Handle one user turn.
    ///
    /// On success the session's history has grown by exactly two messages,
    /// the user turn then the reply, appended as one atomic unit.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty or oversized text, rejected before any
    /// session state is touched. Generator failures pass through as
    /// [`ChatError::Generator`]; in that case nothing was persisted and the
    /// session's history is exactly as it was before the call, so the caller
    /// may simply retry with the same token.
    pub async fn converse(&self, text: &str, session_token: Option<&str>) -> Result<ChatReply> {
        if text.trim().is_empty() {
            return Err(ChatError::invalid_input("message must not be empty"));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::invalid_input(format!(
                "message exceeds {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let session = self.store.resolve(session_token).await;
        let history = session.snapshot().await;
        let context: Vec<_> = history.iter().map(Message::normalized).collect();

        debug!(token = %session.token(), turns = history.len(), "invoking generator");

        let reply = match self.generator.generate(&context, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(token = %session.token(), error = %e, "generator call failed");
                return Err(e.into());
            }
        };

        session
            .append([Message::user(text), Message::assistant(reply.clone())])
            .await;

        Ok(ChatReply {
            reply,
            session_token: session.token().to_string(),
        })
    }
}
