//! Text-to-speech rendition of the report.

use super::metrics;
use super::providers::{ProviderError, SpeechProvider};
use crate::report::sanitize::strip_markup;
use std::sync::Arc;
use thiserror::Error;

/// Longest chunk the Translate endpoint accepts, in characters.
pub const MAX_CHUNK_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("there is no text to read aloud")]
    EmptyText,

    #[error("speech service returned no audio")]
    EmptyAudio,

    #[error("speech service failed: {0}")]
    Provider(#[from] ProviderError),
}

pub struct SpeechRenderer {
    provider: Arc<dyn SpeechProvider>,
    language: String,
}

impl SpeechRenderer {
    pub fn new(provider: Arc<dyn SpeechProvider>, language: impl Into<String>) -> Self {
        Self {
            provider,
            language: language.into(),
        }
    }

    /// Synthesize `text` as one MP3 stream.
    pub async fn render_audio(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let result = self.synthesize(text).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Speech rendering failed");
            metrics::record_render_failure("speech");
        }
        result
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let plain = strip_markup(text);
        let chunks = split_chunks(&plain, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let frames = self
                .provider
                .synthesize(chunk, &self.language, index, total)
                .await?;
            audio.extend_from_slice(&frames);
        }

        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        tracing::debug!(chunks = total, size_bytes = audio.len(), "Synthesized speech");
        Ok(audio)
    }
}

/// Split on whitespace into chunks of at most `max_chars` characters.
/// Single words longer than that are cut.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word_chars: Vec<char> = word.chars().collect();

        while word_chars.len() > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word_chars.split_off(max_chars);
            chunks.push(word_chars.into_iter().collect());
            word_chars = rest;
        }

        let word_len = word_chars.len();
        if word_len == 0 {
            continue;
        }
        let needed = if current_len == 0 { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word_chars);
        current_len += word_len;
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}
