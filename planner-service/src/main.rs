use dotenvy::dotenv;
use planner_service::config::get_configuration;
use planner_service::startup::Application;
use service_core::observability::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    // Initialize tracing using shared logic
    init_tracing(
        "planner-service",
        &configuration.observability.log_level,
        configuration.observability.otlp_endpoint.as_deref(),
    );

    planner_service::services::metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let application = Application::build(configuration).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        e
    })?;

    tracing::info!(port = application.port(), "Starting planner-service");
    application.run_until_stopped().await
}
