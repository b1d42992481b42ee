//! The forwarding handler.
//!
//! [`proxy_handler`] answers `OPTIONS` preflights locally and relays
//! everything else to the target named by the `url` query parameter.
//! Submodules handle target extraction ([`target`]), header assembly
//! ([`headers`]), and outbound dispatch with redirect following
//! ([`redirect`]).
//!
//! Both bodies are streamed: the caller's body goes straight into the
//! outbound request and the target's body straight back to the caller.
//! One outbound exchange per inbound request, never retried.

pub mod headers;
pub mod redirect;
pub mod target;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;

use crate::error::ProxyError;
use crate::server::AppState;

pub async fn proxy_handler(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let request_id = uuid::Uuid::new_v4();

    // Preflights never reach the target, whatever `url` holds.
    if request.method() == Method::OPTIONS {
        tracing::debug!(request_id = %request_id, "answered preflight");
        return (StatusCode::OK, headers::cors_headers()).into_response();
    }

    let method = request.method().clone();
    let start = Instant::now();

    match relay(&state, request).await {
        Ok((target, response)) => {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                target = %target,
                status = response.status().as_u16(),
                latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "request relayed"
            );
            relay_response(response, request_id)
        }
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(request_id = %request_id, method = %method, error = %e, "relay failed");
            } else {
                tracing::warn!(request_id = %request_id, method = %method, error = %e, "rejected request");
            }
            e.into_response()
        }
    }
}

async fn relay(
    state: &AppState,
    request: Request,
) -> Result<(url::Url, hyper::Response<hyper::body::Incoming>), ProxyError> {
    let (parts, body) = request.into_parts();
    let target = target::from_query(parts.uri.query())?;

    let outbound = redirect::Outbound {
        method: parts.method,
        headers: headers::forwarded_headers(&parts.headers, &target),
        target: target.clone(),
        body,
    };
    let response = redirect::send(&state.http_client, outbound).await?;
    Ok((target, response))
}

/// Turn the target's response into the caller's. Status and headers are
/// committed before the body streams, so a body failure can only be
/// logged.
fn relay_response(
    upstream: hyper::Response<hyper::body::Incoming>,
    request_id: uuid::Uuid,
) -> Response {
    let (parts, incoming) = upstream.into_parts();
    let body = incoming.map_err(move |e| {
        tracing::warn!(request_id = %request_id, error = %e, "response body relay failed");
        e
    });

    let mut response = Response::new(Body::new(body));
    *response.status_mut() = parts.status;
    *response.headers_mut() = headers::relayed_headers(&parts.headers);
    response
}
