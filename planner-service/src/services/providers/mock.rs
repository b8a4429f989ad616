//! Mock provider implementations for testing.

use super::{GenerationParams, PromptRequest, ProviderError, SpeechProvider, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock text provider.
///
/// Replays scripted results in order, then echoes a fixed reply once the
/// script runs out. Every prompt it receives is recorded.
pub struct MockTextProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: String,
    models: Result<Vec<String>, ProviderError>,
    prompts: Mutex<Vec<PromptRequest>>,
}

impl MockTextProvider {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            models: Ok(vec!["mock-model".to_string()]),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(
        fallback: impl Into<String>,
        script: impl IntoIterator<Item = Result<String, ProviderError>>,
    ) -> Self {
        let provider = Self::new(fallback);
        if let Ok(mut queue) = provider.script.lock() {
            queue.extend(script);
        }
        provider
    }

    pub fn with_models(mut self, models: Result<Vec<String>, ProviderError>) -> Self {
        self.models = models;
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<PromptRequest> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        _model: &str,
        request: &PromptRequest,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.clone());
        }

        let scripted = self.script.lock().ok().and_then(|mut q| q.pop_front());
        scripted.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        self.models.clone()
    }
}

/// Mock speech provider returning a fake MP3 frame per chunk.
pub struct MockSpeechProvider {
    enabled: bool,
    chunks: Mutex<Vec<String>>,
}

impl MockSpeechProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            chunks: Mutex::new(Vec::new()),
        }
    }

    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(
        &self,
        chunk: &str,
        _language: &str,
        _index: usize,
        _total: usize,
    ) -> Result<Vec<u8>, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock speech provider not enabled".to_string(),
            ));
        }
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push(chunk.to_string());
        }
        // MPEG frame sync followed by padding.
        let mut frame = vec![0xFF, 0xFB, 0x90, 0x00];
        frame.resize(64, 0);
        Ok(frame)
    }
}
