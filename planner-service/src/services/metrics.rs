//! Prometheus metrics for planner-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so unit tests
//! and library users never need a registry.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

static INIT_LOCK: Mutex<()> = Mutex::new(());

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// HTTP metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Generation metrics
pub static GENERATION_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENERATION_RETRIES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENERATION_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Rendering metrics
pub static RENDER_FAILURES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;

    let request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )?;

    // outcome: success, busy, error
    let generation_requests = IntCounterVec::new(
        Opts::new("generation_requests_total", "Model invocations by outcome"),
        &["model", "outcome"],
    )?;

    let generation_retries = IntCounterVec::new(
        Opts::new("generation_retries_total", "Rate-limited attempts that were retried"),
        &["model"],
    )?;

    let generation_latency = HistogramVec::new(
        HistogramOpts::new(
            "generation_latency_seconds",
            "Model invocation latency including retries",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["model"],
    )?;

    // kind: pdf, speech
    let render_failures = IntCounterVec::new(
        Opts::new("render_failures_total", "Report rendering failures"),
        &["kind"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration.clone()))?;
    registry.register(Box::new(generation_requests.clone()))?;
    registry.register(Box::new(generation_retries.clone()))?;
    registry.register(Box::new(generation_latency.clone()))?;
    registry.register(Box::new(render_failures.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(request_duration);
    let _ = GENERATION_REQUESTS_TOTAL.set(generation_requests);
    let _ = GENERATION_RETRIES_TOTAL.set(generation_retries);
    let _ = GENERATION_LATENCY_SECONDS.set(generation_latency);
    let _ = RENDER_FAILURES_TOTAL.set(render_failures);

    Ok(())
}

/// Render the registry in the Prometheus text format.
pub fn get_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return String::new();
    };
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    let status = status.to_string();
    if let Some(counter) = HTTP_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[method, path, &status]).inc();
    }
    if let Some(histogram) = HTTP_REQUEST_DURATION_SECONDS.get() {
        histogram
            .with_label_values(&[method, path, &status])
            .observe(elapsed.as_secs_f64());
    }
}

pub fn record_generation(model: &str, outcome: &str, elapsed: Duration) {
    if let Some(counter) = GENERATION_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[model, outcome]).inc();
    }
    if let Some(histogram) = GENERATION_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[model])
            .observe(elapsed.as_secs_f64());
    }
}

pub fn record_retry(model: &str) {
    if let Some(counter) = GENERATION_RETRIES_TOTAL.get() {
        counter.with_label_values(&[model]).inc();
    }
}

pub fn record_render_failure(kind: &str) {
    if let Some(counter) = RENDER_FAILURES_TOTAL.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_exposes_recorded_series() {
        init_metrics().unwrap();
        record_generation("mock-model", "success", Duration::from_millis(20));
        record_render_failure("pdf");

        let text = get_metrics();
        assert!(text.contains("generation_requests_total"));
        assert!(text.contains("render_failures_total{kind=\"pdf\"}"));
    }
}
