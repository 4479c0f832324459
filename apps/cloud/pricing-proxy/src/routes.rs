//! HTTP surface of the pricing proxy

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::AppInfo;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Instant;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Errors surfaced to proxy clients
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream API could not be reached or returned a failure status
    #[error("Upstream pricing API request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_GATEWAY;
        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));
        (status, body).into_response()
    }
}

/// Shared state for the relay handlers
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub upstream: String,
    pub app: AppInfo,
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    /// OData `$filter` expression forwarded to the upstream API
    #[serde(default)]
    pub filter: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: &'static str,
    version: &'static str,
}

/// Build the proxy router.
///
/// CORS is fully permissive: the relay exists precisely so browsers can
/// query the pricing API without tripping the same-origin restriction.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/prices", get(prices))
        .route("/health", get(health))
        .route("/metrics", get(observability::metrics_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Relay one request to the upstream pricing API
async fn prices(
    State(state): State<AppState>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<Value>, ProxyError> {
    let url = format!(
        "{}?$filter={}",
        state.upstream,
        urlencoding::encode(&query.filter)
    );
    info!(url = %url, "Proxying pricing request");

    let started = Instant::now();
    let result = relay(&state.client, &url).await;

    let status = if result.is_ok() { "ok" } else { "error" };
    observability::counter!("proxy_requests_total", "status" => status).increment(1);
    observability::histogram!("proxy_request_duration_seconds")
        .record(started.elapsed().as_secs_f64());

    result.map(Json)
}

async fn relay(client: &reqwest::Client, url: &str) -> Result<Value, ProxyError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.app.name,
        version: state.app.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::app_info;

    fn state_with_upstream(upstream: &str) -> AppState {
        AppState {
            client: reqwest::Client::new(),
            upstream: upstream.to_string(),
            app: app_info!(),
        }
    }

    #[tokio::test]
    async fn test_health_reports_app_info() {
        let state = state_with_upstream("http://127.0.0.1:9/api/retail/prices");
        let Json(response) = health(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.name, "pricing-proxy");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_maps_to_bad_gateway() {
        let state = state_with_upstream("http://127.0.0.1:9/api/retail/prices");
        let query = PricesQuery {
            filter: "serviceName eq 'Virtual Machines'".to_string(),
        };
        let err = prices(State(state), Query(query)).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_filter_is_url_encoded() {
        let filter = "serviceName eq 'Virtual Machines' and armRegionName eq 'eastus'";
        let encoded = urlencoding::encode(filter);
        assert!(!encoded.contains(' '));
        assert!(encoded.contains("%20"));
    }
}
