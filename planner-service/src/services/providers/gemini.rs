//! Gemini text provider over the `generativelanguage` REST API.

use super::{GenerationParams, PromptRequest, ProviderError, TextProvider};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method
        )
    }

    fn build_request(request: &PromptRequest, params: &GenerationParams) -> GenerateContentRequest {
        let mut parts = vec![ContentPart::Text {
            text: request.text.clone(),
        }];

        if let Some(image) = &request.image {
            parts.push(ContentPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.data),
                },
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
            }),
        }
    }
}

/// Map a non-success response onto a [`ProviderError`].
///
/// Quota exhaustion is reported either as HTTP 429 or as
/// `RESOURCE_EXHAUSTED` in the error body.
fn error_from_response(status: StatusCode, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let (api_status, message) = match parsed {
        Some(envelope) => (envelope.error.status, envelope.error.message),
        None => (None, body.to_string()),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || api_status.as_deref() == Some("RESOURCE_EXHAUSTED")
    {
        return ProviderError::RateLimited(message);
    }

    ProviderError::ApiError {
        status: status.as_u16(),
        message,
    }
}

fn text_from_response(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
        return Err(ProviderError::ContentFiltered);
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(ProviderError::ContentFiltered);
    }

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| match p {
            ContentPart::Text { text } => Some(text),
            ContentPart::InlineData { .. } => None,
        })
        .collect();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(
        &self,
        model: &str,
        request: &PromptRequest,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let body = Self::build_request(request, params);
        let url = self.api_url(model, "generateContent");

        tracing::debug!(
            model = %model,
            prompt_len = request.text.len(),
            has_image = request.image.is_some(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.expose_secret().as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &error_text));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status: 200,
                message: format!("Failed to parse response: {}", e.without_url()),
            }
        })?;

        text_from_response(api_response)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/models", self.config.api_base.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.config.api_key.expose_secret().as_str()),
                ("pageSize", "1000"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &error_text));
        }

        let listing: ListModelsResponse = response.json().await.map_err(|e| {
            ProviderError::ApiError {
                status: 200,
                message: format!("Failed to parse model list: {}", e.without_url()),
            }
        })?;

        Ok(listing
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageAttachment;

    #[test]
    fn test_http_429_is_rate_limited() {
        let err = error_from_response(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err, ProviderError::RateLimited("slow down".into()));
    }

    #[test]
    fn test_resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error":{"code":403,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = error_from_response(StatusCode::FORBIDDEN, body);
        assert_eq!(err, ProviderError::RateLimited("Quota exceeded".into()));
    }

    #[test]
    fn test_other_status_is_api_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err = error_from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err,
            ProviderError::ApiError {
                status: 400,
                message: "API key not valid".into()
            }
        );
    }

    #[test]
    fn test_request_carries_inline_image() {
        let request = PromptRequest {
            text: "describe".into(),
            image: Some(ImageAttachment {
                mime_type: "image/png".into(),
                data: vec![1, 2, 3],
            }),
        };
        let body = GeminiTextProvider::build_request(&request, &GenerationParams::default());
        let json = serde_json::to_value(&body).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
        assert!(json["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_text_is_joined_across_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Q1 "},{"text":"Q2"}]},"finishReason":"STOP"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(text_from_response(response).unwrap(), "Q1 Q2");
    }

    #[test]
    fn test_safety_stop_is_filtered() {
        let raw = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(text_from_response(response), Err(ProviderError::ContentFiltered));
    }

    #[test]
    fn test_no_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(text_from_response(response), Err(ProviderError::EmptyResponse));
    }
}
