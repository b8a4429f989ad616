//! Google Translate text-to-speech endpoint.

use super::{ProviderError, SpeechProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

pub struct TranslateTtsProvider {
    endpoint: String,
    client: Client,
}

impl TranslateTtsProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl SpeechProvider for TranslateTtsProvider {
    async fn synthesize(
        &self,
        chunk: &str,
        language: &str,
        index: usize,
        total: usize,
    ) -> Result<Vec<u8>, ProviderError> {
        let index = index.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", index.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited("speech endpoint returned 429".into()));
        }
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: "speech synthesis failed".into(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }
}
