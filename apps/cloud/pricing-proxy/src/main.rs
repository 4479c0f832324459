//! Pricing Proxy
//!
//! A small relay between browser/CLI clients and the Azure Retail Prices
//! API. Browsers cannot query the pricing API directly because of the
//! same-origin restriction; this service forwards `GET /api/prices?filter=`
//! requests upstream and relays the JSON back with permissive CORS.

use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, app_info};
use eyre::{Result, eyre};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;

use config::ProxyConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);
    observability::init_metrics();

    let config = ProxyConfig::from_env()?;

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let state = AppState {
        client,
        upstream: config.upstream.clone(),
        app: app_info!(),
    };

    let listener = bind_first_available(&config.host, &config.ports).await?;
    let addr = listener.local_addr()?;
    info!("Pricing proxy listening on {addr}");
    info!("Prices endpoint at http://{addr}/api/prices");
    info!("Health check at http://{addr}/health");

    axum::serve(listener, routes::router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Bind the first free port from the candidate list.
async fn bind_first_available(host: &str, ports: &[u16]) -> Result<TcpListener> {
    for &port in ports {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                warn!(port = port, "Port already in use, trying next");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(eyre!(
        "could not bind any of the candidate ports {ports:?}; free one up or set PORT"
    ))
}

/// Complete on SIGINT or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_first_available_skips_taken_port() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        // The taken port is skipped; binding port 0 always succeeds
        let listener = bind_first_available("127.0.0.1", &[taken_port, 0])
            .await
            .unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), taken_port);
    }
}
