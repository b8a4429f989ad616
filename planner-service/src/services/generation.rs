//! Model client wrapper: retries rate-limited calls and never fails.

use super::metrics;
use super::providers::{GenerationParams, PromptRequest, ProviderError, TextProvider};
use crate::workflow::Generator;
use async_trait::async_trait;
use service_core::retry::{retry_call, Classify, ErrorClass, RetryConfig, RetryError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Returned when every attempt was rate limited.
pub const BUSY_SENTINEL: &str =
    "The AI service is busy at the moment. Please wait a minute and try again.";

const ERROR_SENTINEL_PREFIX: &str = "An error occurred while contacting the AI service: ";

/// Used when no preference is configured at all.
pub const FALLBACK_MODEL: &str = "gemini-flash-latest";

pub fn error_sentinel(err: &ProviderError) -> String {
    format!("{}{}", ERROR_SENTINEL_PREFIX, err)
}

/// True for text produced by the wrapper instead of the model.
pub fn is_sentinel(text: &str) -> bool {
    text == BUSY_SENTINEL || text.starts_with(ERROR_SENTINEL_PREFIX)
}

pub struct GenerationClient {
    provider: Arc<dyn TextProvider>,
    model: String,
    params: GenerationParams,
    retry: RetryConfig,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        model: impl Into<String>,
        params: GenerationParams,
        retry: RetryConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            params,
            retry,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the request, retrying rate limits. Failures come back as sentinel text.
    pub async fn invoke(&self, request: &PromptRequest) -> String {
        let started = Instant::now();
        let attempts = AtomicU32::new(0);

        let result = retry_call(&self.retry, "generate_content", || {
            if attempts.fetch_add(1, Ordering::SeqCst) > 0 {
                metrics::record_retry(&self.model);
            }
            self.provider.generate(&self.model, request, &self.params)
        })
        .await;

        let (outcome, text) = match result {
            Ok(text) => ("success", text),
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::warn!(model = %self.model, attempts, error = %last, "Model stayed rate limited");
                ("busy", BUSY_SENTINEL.to_string())
            }
            Err(RetryError::Permanent(err)) => {
                tracing::error!(model = %self.model, error = %err, "Model call failed");
                ("error", error_sentinel(&err))
            }
        };

        metrics::record_generation(&self.model, outcome, started.elapsed());
        text
    }
}

#[async_trait]
impl Generator for GenerationClient {
    async fn generate(&self, request: PromptRequest) -> String {
        self.invoke(&request).await
    }
}

/// Pick the first preferred model the provider actually serves.
///
/// Runs once at startup. When listing fails or nothing matches, the first
/// preference is used as is.
pub async fn resolve_model(provider: &dyn TextProvider, preferred: &[String]) -> String {
    let first = preferred
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_MODEL.to_string());

    match provider.list_models().await {
        Ok(available) => {
            match preferred
                .iter()
                .find(|wanted| available.iter().any(|m| m == *wanted))
            {
                Some(model) => {
                    tracing::info!(model = %model, "Resolved generation model");
                    model.clone()
                }
                None => {
                    tracing::warn!(
                        preferred = ?preferred,
                        fallback = %first,
                        "No preferred model is listed, using first preference"
                    );
                    first
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                transient = e.classify() == ErrorClass::Transient,
                fallback = %first,
                "Model listing failed, using first preference"
            );
            first
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockTextProvider;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant as TokioInstant;

    fn rate_limited() -> ProviderError {
        ProviderError::RateLimited("RESOURCE_EXHAUSTED".into())
    }

    fn request() -> PromptRequest {
        PromptRequest {
            text: "prompt".into(),
            image: None,
        }
    }

    fn client(provider: Arc<dyn TextProvider>) -> GenerationClient {
        GenerationClient::new(
            provider,
            "mock-model",
            GenerationParams::default(),
            RetryConfig::linear(3, Duration::from_secs(5)),
        )
    }

    /// Records the (virtual) time of each call.
    struct TimedProvider {
        inner: MockTextProvider,
        stamps: Mutex<Vec<TokioInstant>>,
    }

    #[async_trait]
    impl TextProvider for TimedProvider {
        async fn generate(
            &self,
            model: &str,
            request: &PromptRequest,
            params: &GenerationParams,
        ) -> Result<String, ProviderError> {
            self.stamps.lock().unwrap().push(TokioInstant::now());
            self.inner.generate(model, request, params).await
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            self.inner.list_models().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_twice_then_success() {
        let provider = Arc::new(TimedProvider {
            inner: MockTextProvider::with_script(
                "unused",
                [Err(rate_limited()), Err(rate_limited()), Ok("Q1 Q2 Q3".to_string())],
            ),
            stamps: Mutex::new(Vec::new()),
        });

        let text = client(provider.clone()).invoke(&request()).await;

        assert_eq!(text, "Q1 Q2 Q3");
        assert_eq!(provider.inner.calls(), 3);
        let stamps = provider.stamps.lock().unwrap();
        let first_wait = stamps[1] - stamps[0];
        let second_wait = stamps[2] - stamps[1];
        assert!(first_wait >= Duration::from_secs(5));
        assert!(second_wait > first_wait);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_rate_limited_returns_busy_sentinel() {
        let provider = Arc::new(MockTextProvider::with_script(
            "unused",
            (0..5).map(|_| Err(rate_limited())),
        ));

        let text = client(provider.clone()).invoke(&request()).await;

        assert_eq!(text, BUSY_SENTINEL);
        assert_eq!(provider.calls(), 3);
        assert!(is_sentinel(&text));
    }

    #[tokio::test]
    async fn test_permanent_error_is_surfaced_without_retry() {
        let err = ProviderError::ApiError {
            status: 400,
            message: "API key not valid".into(),
        };
        let provider = Arc::new(MockTextProvider::with_script("unused", [Err(err)]));

        let text = client(provider.clone()).invoke(&request()).await;

        assert_eq!(provider.calls(), 1);
        assert!(is_sentinel(&text));
        assert!(text.contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_resolve_model_takes_first_available_preference() {
        let provider = MockTextProvider::new("x").with_models(Ok(vec![
            "gemini-pro".to_string(),
            "gemini-1.5-flash".to_string(),
        ]));
        let preferred = vec![
            "gemini-flash-latest".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-pro".to_string(),
        ];

        assert_eq!(resolve_model(&provider, &preferred).await, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_resolve_model_falls_back_when_listing_fails() {
        let provider =
            MockTextProvider::new("x").with_models(Err(ProviderError::NetworkError("down".into())));
        let preferred = vec!["gemini-flash-latest".to_string()];

        assert_eq!(resolve_model(&provider, &preferred).await, "gemini-flash-latest");
        assert_eq!(resolve_model(&provider, &[]).await, FALLBACK_MODEL);
    }
}
