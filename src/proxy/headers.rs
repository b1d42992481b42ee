//! Header assembly for both legs of a relay.
//!
//! [`forwarded_headers`] builds the outbound request headers: a copy of
//! the caller's headers minus `Host`, `Origin` and `Referer`, with `Host`
//! rewritten to the target. [`relayed_headers`] builds the caller-facing
//! response headers: the fixed CORS set followed by every upstream
//! header, unfiltered.
//!
//! Upstream response headers are forwarded as-is, hop-by-hop and
//! `Set-Cookie` included. That permissive behavior is intentional.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::percent_decode_str;

/// Request headers never copied to the target.
const STRIPPED_REQUEST_HEADERS: [HeaderName; 3] = [header::HOST, header::ORIGIN, header::REFERER];

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, PATCH, HEAD";

#[must_use]
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers
}

/// `host[:port]` as it should appear in a `Host` header. The port is only
/// present when it differs from the scheme default: `url::Url` normalizes
/// `https://example.com:443/` to `https://example.com/`, so that target
/// gets `Host: example.com`. Both forms address the same origin.
#[must_use]
pub fn host_header(target: &url::Url) -> Option<HeaderValue> {
    let host = target.host_str()?;
    let value = target
        .port()
        .map_or_else(|| host.to_string(), |port| format!("{host}:{port}"));
    HeaderValue::from_str(&value).ok()
}

/// `Authorization: Basic ...` built from the user info of `target`, if it
/// has any. Both parts are percent-decoded before encoding.
#[must_use]
pub fn basic_auth(target: &url::Url) -> Option<HeaderValue> {
    if target.username().is_empty() && target.password().is_none() {
        return None;
    }
    let username = percent_decode_str(target.username()).decode_utf8_lossy();
    let password = percent_decode_str(target.password().unwrap_or("")).decode_utf8_lossy();
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    HeaderValue::from_str(&format!("Basic {encoded}")).ok()
}

pub fn set_host(headers: &mut HeaderMap, target: &url::Url) {
    match host_header(target) {
        Some(value) => {
            headers.insert(header::HOST, value);
        }
        None => {
            headers.remove(header::HOST);
        }
    }
}

/// Copy every caller header except `Host`, `Origin` and `Referer`, keeping
/// all values of repeated headers in order, then point `Host` at the
/// target.
#[must_use]
pub fn forwarded_headers(inbound: &HeaderMap, target: &url::Url) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.keys_len());
    for name in inbound.keys() {
        // HeaderName comparison is already case-insensitive: names are
        // normalized to lowercase on parse.
        if STRIPPED_REQUEST_HEADERS.contains(name) {
            continue;
        }
        for value in inbound.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    set_host(&mut headers, target);
    headers
}

/// CORS headers first, then every upstream header appended as-is.
#[must_use]
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = cors_headers();
    headers.reserve(upstream.len());
    for (name, value) in upstream {
        headers.append(name.clone(), value.clone());
    }
    headers
}
