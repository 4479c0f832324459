//! Observability utilities for the cost estimator services.
//!
//! Wraps the Prometheus recorder setup so binaries only need:
//!
//! ```rust,ignore
//! observability::init_metrics();
//!
//! // anywhere in the code
//! observability::counter!("proxy_requests_total", "status" => "ok").increment(1);
//!
//! // on the router
//! .route("/metrics", get(|| async { observability::metrics_handler().await }))
//! ```

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at application startup; later calls return the existing handle.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        handle
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for the /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // Proxy metrics
    describe_counter!(
        "proxy_requests_total",
        "Upstream pricing API requests relayed, by status"
    );
    describe_histogram!(
        "proxy_request_duration_seconds",
        "Upstream pricing API request duration in seconds"
    );

    // Collection metrics
    describe_counter!(
        "pricing_collection_runs_total",
        "Pricing collection runs, by status"
    );
    describe_counter!(
        "pricing_collection_errors_total",
        "Service/region fetches that failed during collection"
    );
    describe_histogram!(
        "pricing_collection_duration_seconds",
        "Pricing collection run duration in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render_after_init() {
        init_metrics();
        counter!("proxy_requests_total", "status" => "ok").increment(1);

        let handle = get_metrics_handle().expect("recorder installed");
        let rendered = handle.render();
        assert!(rendered.contains("proxy_requests_total"));
    }

    #[test]
    fn test_init_metrics_is_idempotent() {
        let first = init_metrics() as *const _;
        let second = init_metrics() as *const _;
        assert_eq!(first, second);
    }
}
