//! Text-generation boundary.
//!
//! The [`Generator`] trait is everything the rest of the crate knows about
//! reply generation. The Gemini adapter lives behind it; tests substitute a
//! scripted stub.

mod gemini;

pub use gemini::{GeminiConfig, GeminiGenerator};

use crate::error::GeneratorResult;
use crate::message::ContextMessage;
use async_trait::async_trait;
use std::sync::Arc;

/// External text-generation capability.
///
/// `history` is the conversation so far, already translated into the
/// generator vocabulary and in chronological order. `latest_user_text` is the
/// turn being answered; it is not part of `history` and has not been
/// persisted anywhere when this is called.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a reply to `latest_user_text` given the prior conversation.
    async fn generate(
        &self,
        history: &[ContextMessage],
        latest_user_text: &str,
    ) -> GeneratorResult<String>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(
        &self,
        history: &[ContextMessage],
        latest_user_text: &str,
    ) -> GeneratorResult<String> {
        (**self).generate(history, latest_user_text).await
    }
}

/// A shared, reference-counted generator for use across tasks.
pub type SharedGenerator = Arc<dyn Generator>;
