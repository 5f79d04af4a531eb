pub mod admission;
pub mod api;
pub mod certs;
pub mod cli;
pub mod config;
pub mod context;
pub mod reconciler;
pub mod store;
pub mod tracing;

#[cfg(test)]
mod test_utils;

use ::tracing::info;
use anyhow::{Result, anyhow};
use axum::{
    Router,
    routing::{get, post},
};
use axum_server::Handle;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::{self, TraceLayer};

use crate::api::handlers::{healthz_handler, mutate_handler, readiness_handler};
use crate::api::state::ApiServerState;
use crate::certs::create_tls_config_and_watch_certificate_changes;
use crate::config::{Config, SERVICE_NAME, TlsConfig};
use crate::context::WebhookContext;

/// In-flight requests are given this long to complete once a shutdown signal
/// has been received
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub struct WebhookServer {
    router: Router,
    addr: SocketAddr,
    tls_config: TlsConfig,
    namespace: String,
}

impl WebhookServer {
    /// Build the server using the in-cluster (or kubeconfig) credentials
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let client = kube::Client::try_default()
            .await
            .map_err(|e| anyhow!("Cannot connect to Kubernetes: {e}"))?;

        Ok(Self::new_with_client(config, client))
    }

    pub fn new_with_client(config: Config, client: kube::Client) -> Self {
        let state = Arc::new(ApiServerState {
            context: WebhookContext::new(client, &config),
        });

        let router = Router::new()
            .route("/mutate", post(mutate_handler))
            .route("/healthz", get(healthz_handler))
            .route("/readiness", get(readiness_handler))
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(::tracing::Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(::tracing::Level::INFO)),
            );

        Self {
            router,
            addr: config.addr,
            tls_config: config.tls_config,
            namespace: config.namespace,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self) -> Result<()> {
        let rustls_config = create_tls_config_and_watch_certificate_changes(self.tls_config).await?;

        let handle = Handle::new();
        tokio::spawn(shutdown_on_signal(handle.clone()));

        info!(
            service = SERVICE_NAME,
            address = %self.addr,
            namespace = self.namespace.as_str(),
            "started HTTPS server"
        );
        axum_server::bind_rustls(self.addr, rustls_config)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;
        info!("HTTPS server stopped");

        Ok(())
    }
}

async fn shutdown_on_signal(handle: Handle) {
    wait_for_signal().await;
    info!(
        grace_period_seconds = SHUTDOWN_GRACE_PERIOD.as_secs(),
        "shutdown signal received, draining in-flight requests"
    );
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = tokio::signal::ctrl_c() => {},
            }
        }
        Err(e) => {
            ::tracing::warn!(error = %e, "cannot listen for SIGTERM, only SIGINT is handled");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
