//! Process bootstrap: set up logging, bind the listener, serve until a
//! shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::Cli;
use crate::error::RelayError;
use crate::logging;
use crate::server::{self, AppState, PROXY_PATH};

pub async fn execute(cli: Cli) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(
        cli.log_format,
        std::io::IsTerminal::is_terminal(&std::io::stdout()),
    );
    logging::init(&cli.log_level, log_format);

    let addr: SocketAddr = listen_addr(&cli.host, cli.port)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind { addr, source })?;

    let router = server::build_router(Arc::new(AppState::new()));

    tracing::info!(addr = %addr, path = PROXY_PATH, "proxy server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .map_err(RelayError::Serve)?;

    tracing::info!("proxy server stopped");
    Ok(())
}

/// IPv6 literals are accepted with or without brackets.
pub fn listen_addr(host: &str, port: u16) -> Result<SocketAddr, RelayError> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let ip: std::net::IpAddr = host.parse()?;
    Ok(SocketAddr::new(ip, port))
}
