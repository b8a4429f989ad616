use crate::prompts::PromptStyle;
use crate::services::providers::translate_tts::DEFAULT_TTS_URL;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::retry::RetryConfig;
use std::time::Duration;

/// Environment variable consulted when `google.api_key` is not configured.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
    pub google: GoogleSettings,
    pub models: ModelSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub prompt: PromptStyle,
    pub report: ReportSettings,
    #[serde(default)]
    pub speech: SpeechSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Sessions are dropped after this much inactivity.
    #[serde(default = "default_session_expiry_minutes")]
    pub session_expiry_minutes: i64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_session_expiry_minutes() -> i64 {
    120
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector, e.g. `http://tempo:4317`. Tracing export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone)]
pub struct GoogleSettings {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub api_key: Option<Secret<String>>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

#[derive(Deserialize, Clone)]
pub struct ModelSettings {
    /// Candidate model ids, most preferred first.
    pub preferred: Vec<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

#[derive(Deserialize, Clone)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_seconds: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_seconds: 5,
        }
    }
}

impl RetrySettings {
    pub fn to_config(&self) -> RetryConfig {
        RetryConfig::linear(self.max_attempts, Duration::from_secs(self.base_delay_seconds))
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReportSettings {
    pub title: String,
    pub caption: Option<String>,
    pub font_path: Option<String>,
    pub logo_path: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct SpeechSettings {
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            language: default_language(),
            endpoint: default_tts_endpoint(),
        }
    }
}

fn default_speech_enabled() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tts_endpoint() -> String {
    DEFAULT_TTS_URL.to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("current directory: {}", e)))?;

    // Check if we're already in planner-service directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("planner-service") {
        base_path.join("config")
    } else {
        base_path.join("planner-service").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The Gemini API key, from settings or the plain `GOOGLE_API_KEY` variable.
pub fn require_api_key(settings: &GoogleSettings) -> Result<Secret<String>, AppError> {
    let configured = settings
        .api_key
        .as_ref()
        .filter(|key| !key.expose_secret().trim().is_empty())
        .cloned();

    configured
        .or_else(|| {
            std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(Secret::new)
        })
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "Gemini API key is missing: set APP_GOOGLE__API_KEY or {}",
                API_KEY_ENV
            ))
        })
}
