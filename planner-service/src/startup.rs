use crate::config::{require_api_key, Settings};
use crate::handlers::{
    app::{health_check, index},
    metrics::metrics,
    planner::{reset, start, submit_answers},
    report::{download_pdf, read_aloud},
};
use crate::middleware::metrics::metrics_middleware;
use crate::report::ReportRenderer;
use crate::services::generation::{resolve_model, GenerationClient};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::translate_tts::TranslateTtsProvider;
use crate::services::providers::{GenerationParams, TextProvider};
use crate::services::speech::SpeechRenderer;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Router-level knobs that come from `ServerSettings`.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub session_expiry: time::Duration,
    pub max_upload_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            session_expiry: time::Duration::minutes(120),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_expiry(Expiry::OnInactivity(options.session_expiry));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/start", post(start))
        .route("/answers", post(submit_answers))
        .route("/reset", post(reset))
        .route("/report.pdf", get(download_pdf))
        .route("/report/speech", post(read_aloud))
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Wire providers, renderers and state from settings.
///
/// Fails when the API key is missing. Model resolution talks to the
/// provider once; failures there only produce a warning.
pub async fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let api_key = require_api_key(&settings.google)?;
    let timeout = std::time::Duration::from_secs(settings.google.timeout_seconds);

    let provider: Arc<dyn TextProvider> = Arc::new(GeminiTextProvider::new(GeminiConfig {
        api_key,
        api_base: settings.google.api_base.clone(),
        timeout,
    })?);

    let model = resolve_model(provider.as_ref(), &settings.models.preferred).await;
    let generator = GenerationClient::new(
        provider,
        model,
        GenerationParams {
            temperature: settings.models.temperature,
            max_tokens: settings.models.max_output_tokens,
        },
        settings.retry.to_config(),
    );

    let renderer = ReportRenderer::from_settings(&settings.report);

    let speech = if settings.speech.enabled {
        let tts = TranslateTtsProvider::new(settings.speech.endpoint.clone(), timeout)?;
        Some(SpeechRenderer::new(Arc::new(tts), settings.speech.language.clone()))
    } else {
        None
    };

    Ok(AppState::new(
        Arc::new(generator),
        settings.prompt.clone(),
        renderer,
        speech,
    ))
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let state = build_state(&settings).await?;
        let router = build_router(
            state,
            RouterOptions {
                session_expiry: time::Duration::minutes(settings.server.session_expiry_minutes),
                max_upload_bytes: settings.server.max_upload_bytes,
            },
        );

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!(port = self.port, "Listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
