//! Axum server setup, shared application state, and graceful shutdown.
//!
//! [`AppState`] only holds the outbound HTTP client, which is immutable
//! and safe to share across every in-flight request. [`build_router`]
//! mounts the relay on `/proxy` for every method.

use std::sync::Arc;

use axum::body::Body;
use axum::routing::any;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::proxy;

pub const PROXY_PATH: &str = "/proxy";

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
/// Request bodies are axum bodies so the caller's stream is handed to
/// the target without being collected first.
pub type HttpClient = Client<HttpsConnector, Body>;

pub struct AppState {
    pub http_client: HttpClient,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_client: build_http_client(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Client with stock transport settings: no request timeout, default pool.
#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new()).build(https)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(PROXY_PATH, any(proxy::proxy_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl+C");
        return std::future::pending().await;
    }
    "Ctrl+C"
}

#[cfg(unix)]
async fn terminate() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
            "SIGTERM"
        }
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for SIGTERM");
            std::future::pending().await
        }
    }
}

#[cfg(not(unix))]
async fn terminate() -> &'static str {
    std::future::pending().await
}

/// Resolves on the first shutdown signal. A signal whose handler cannot
/// be installed never fires.
pub async fn shutdown_signal() {
    let signal = tokio::select! {
        name = ctrl_c() => name,
        name = terminate() => name,
    };
    tracing::info!(signal, "shutdown requested, draining connections");
}
