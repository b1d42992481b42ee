//! Error types for cors-relay.
//!
//! [`RelayError`] covers process startup and is fatal. [`ProxyError`]
//! is scoped to a single relayed request: it maps to a 400 or 500
//! status and renders as a plain-text body that still carries the CORS
//! headers, so browser callers can read it.

use std::error::Error as StdError;
use std::fmt::Write;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::proxy::headers::cors_headers;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Invalid listen address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Missing 'url' parameter")]
    MissingTarget,

    #[error("Invalid URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("Error creating request: {0}")]
    Build(#[from] http::Error),

    #[error("Error sending request: {}", error_chain(.0))]
    Dispatch(#[source] hyper_util::client::legacy::Error),

    #[error("Error sending request: stopped after {0} redirects")]
    TooManyRedirects(usize),

    #[error("Error sending request: failed to parse Location header {location:?}: {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingTarget | Self::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            Self::Build(_)
            | Self::Dispatch(_)
            | Self::TooManyRedirects(_)
            | Self::InvalidLocation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut headers = cors_headers();
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        (self.status(), headers, format!("{self}\n")).into_response()
    }
}

/// Render an error followed by its `source()` chain, `: ` separated.
///
/// hyper's client errors only name the failing stage at the top level
/// ("client error (Connect)"); the cause sits further down the chain.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut buf = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        // write! to String is infallible
        let _ = write!(buf, ": {cause}");
        source = cause.source();
    }
    buf
}
