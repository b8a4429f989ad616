//! Remote AI provider abstractions and implementations.
//!
//! Handlers and the generation wrapper only see the traits here, so the
//! Gemini and Translate backends can be swapped for the mocks in tests.

pub mod gemini;
pub mod mock;
pub mod translate_tts;

use crate::models::ImageAttachment;
use async_trait::async_trait;
use service_core::retry::{Classify, ErrorClass};
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl Classify for ProviderError {
    fn classify(&self) -> ErrorClass {
        match self {
            ProviderError::RateLimited(_) => ErrorClass::Transient,
            // Some gateways wrap quota failures in a generic error; match the text last.
            ProviderError::ApiError { message, .. } | ProviderError::NetworkError(message)
                if mentions_rate_limit(message) =>
            {
                ErrorClass::Transient
            }
            _ => ErrorClass::Permanent,
        }
    }
}

fn mentions_rate_limit(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("429") || lowered.contains("quota")
}

/// One generation call: prompt text plus an optional inline image.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

/// Generation parameters for text requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a text response with the given model id.
    async fn generate(
        &self,
        model: &str,
        request: &PromptRequest,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;

    /// Model ids that accept `generateContent`, without the `models/` prefix.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;
}

/// Trait for text-to-speech backends returning MP3 frames.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize one chunk. `index` and `total` describe its place in the utterance.
    async fn synthesize(
        &self,
        chunk: &str,
        language: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, ProviderError>;
}
