//! Gemini `generateContent` adapter.
//!
//! Implements [`Generator`] against Google's generative-language API. The
//! provider is consumed as an opaque service: this module owns the wire
//! format and the mapping from HTTP outcomes to [`GeneratorError`] kinds,
//! nothing more.

use super::Generator;
use crate::error::{GeneratorError, GeneratorResult};
use crate::message::ContextMessage;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Persona instruction sent with every request.
const SYSTEM_INSTRUCTION: &str = "You are Kokoro, an empathetic emotional support chatbot. \
Your role is to provide warm, validating, and non-judgmental support. \
Keep responses concise (2-4 sentences), natural, and emotionally attuned. \
Ask gentle follow-up questions to understand the user better. \
Offer simple, practical coping strategies when appropriate (breathing exercises, grounding techniques, journaling). \
Do NOT provide medical, legal, or professional advice. \
If the user expresses intent to self-harm or immediate danger, \
encourage them to contact local emergency services or a trusted person immediately. \
Always respond with empathy and understanding.";

/// Gemini client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for the generative-language endpoint.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Reply length cap, in tokens.
    pub max_output_tokens: u32,
    /// Nucleus sampling bound.
    pub top_p: f64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("top_p", &self.top_p)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Create a configuration with defaults tuned for short empathetic turns.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 300,
            top_p: 0.9,
            timeout_secs: 120,
        }
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the reply length cap.
    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// [`Generator`] implementation backed by the Gemini API.
pub struct GeminiGenerator {
    config: GeminiConfig,
    http: reqwest::Client,
    system_instruction: String,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Create a generator with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client fails to build.
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            config,
        }
    }

    /// Replace the persona instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = text.into();
        self
    }

    fn api_url(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.config.model)
    }

    /// Build the JSON request body.
    ///
    /// History turns keep their order; the latest user text becomes the final
    /// `user` entry of `contents`.
    fn build_request_body(&self, history: &[ContextMessage], latest_user_text: &str) -> Value {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "parts": [{ "text": msg.content }]
                })
            })
            .collect();
        contents.push(json!({
            "role": "user",
            "parts": [{ "text": latest_user_text }]
        }));

        json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": self.system_instruction }]
            },
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens,
                "topP": self.config.top_p,
            }
        })
    }

    fn classify_status(status: StatusCode) -> GeneratorError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GeneratorError::AuthFailure,
            StatusCode::TOO_MANY_REQUESTS => GeneratorError::QuotaExceeded,
            other => GeneratorError::Unavailable(format!("HTTP {other}")),
        }
    }

    /// Extract the reply text from a response body.
    fn parse_reply(body: &Value) -> GeneratorResult<String> {
        let first = body["candidates"]
            .as_array()
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| {
                GeneratorError::MalformedResponse("no candidates in response".to_string())
            })?;

        let mut reply = String::new();
        if let Some(parts) = first["content"]["parts"].as_array() {
            for part in parts {
                if let Some(text) = part["text"].as_str() {
                    reply.push_str(text);
                }
            }
        }

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(GeneratorError::MalformedResponse(
                "reply contained no text".to_string(),
            ));
        }
        Ok(reply.to_string())
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(
        &self,
        history: &[ContextMessage],
        latest_user_text: &str,
    ) -> GeneratorResult<String> {
        let body = self.build_request_body(history, latest_user_text);

        debug!(model = %self.config.model, turns = history.len(), "gemini request");

        let response = self
            .http
            .post(self.api_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "gemini request rejected");
            return Err(Self::classify_status(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeneratorError::MalformedResponse(e.to_string()))?;
        Self::parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::GeneratorRole;

    fn generator() -> GeminiGenerator {
        GeminiGenerator::new(GeminiConfig::new("test-key"))
    }

    #[test]
    fn test_request_body_orders_history_before_latest_turn() {
        let history = vec![
            ContextMessage {
                role: GeneratorRole::User,
                content: "Hello".to_string(),
            },
            ContextMessage {
                role: GeneratorRole::Model,
                content: "Hi there".to_string(),
            },
        ];

        let body = generator().build_request_body(&history, "How are you?");
        let contents = body["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "How are you?");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 300);
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Kokoro"));
    }

    #[test]
    fn test_parse_reply_concatenates_parts() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I'm " }, { "text": "here for you." }] }
            }]
        });
        assert_eq!(
            GeminiGenerator::parse_reply(&body).unwrap(),
            "I'm here for you."
        );
    }

    #[test]
    fn test_parse_reply_rejects_missing_candidates() {
        let err = GeminiGenerator::parse_reply(&json!({})).unwrap_err();
        assert!(matches!(err, GeneratorError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_reply_rejects_empty_text() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        });
        let err = GeminiGenerator::parse_reply(&body).unwrap_err();
        assert!(matches!(err, GeneratorError::MalformedResponse(_)));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            GeminiGenerator::classify_status(StatusCode::UNAUTHORIZED),
            GeneratorError::AuthFailure
        ));
        assert!(matches!(
            GeminiGenerator::classify_status(StatusCode::FORBIDDEN),
            GeneratorError::AuthFailure
        ));
        assert!(matches!(
            GeminiGenerator::classify_status(StatusCode::TOO_MANY_REQUESTS),
            GeneratorError::QuotaExceeded
        ));
        assert!(matches!(
            GeminiGenerator::classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            GeneratorError::Unavailable(_)
        ));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret-key");
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("[REDACTED]"));
    }
}
