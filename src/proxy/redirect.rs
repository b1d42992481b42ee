//! Outbound dispatch with transparent redirect following.
//!
//! hyper's client never follows redirects, so [`send`] walks the chain
//! itself, with the policy a stock HTTP client applies by default:
//!
//! - at most [`MAX_REDIRECTS`] hops;
//! - 301/302 turn everything but `GET` and `HEAD` into `GET`, 303 turns
//!   everything but `HEAD` into `GET`, and none of them carry the body;
//! - 307/308 keep method and body, and are only followed when the body is
//!   known to be empty, since a streamed body cannot be sent twice;
//! - credentials embedded in a hop's URL are sent as Basic auth for that
//!   hop only;
//! - credentials and cookies stay with the original host and its
//!   subdomains;
//! - each hop gets a `Referer` pointing at the previous URL, except on an
//!   `https` to `http` downgrade.

use axum::body::{Body, HttpBody};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Method, Request, Response, StatusCode};
use hyper::body::Incoming;

use super::headers::{basic_auth, set_host};
use crate::error::ProxyError;
use crate::server::HttpClient;

pub const MAX_REDIRECTS: usize = 10;

const CREDENTIAL_HEADERS: [HeaderName; 4] = [
    header::AUTHORIZATION,
    header::WWW_AUTHENTICATE,
    header::COOKIE,
    HeaderName::from_static("cookie2"),
];

/// Everything needed to issue the first hop.
pub struct Outbound {
    pub method: Method,
    pub target: url::Url,
    pub headers: HeaderMap,
    pub body: Body,
}

#[derive(Debug, PartialEq, Eq)]
struct Hop {
    method: Method,
    keep_body: bool,
}

/// Send `outbound` and follow redirects until a final response arrives.
///
/// Intermediate redirect responses are dropped as soon as the next hop
/// is known, which releases their connections.
pub async fn send(
    client: &HttpClient,
    outbound: Outbound,
) -> Result<Response<Incoming>, ProxyError> {
    let Outbound {
        mut method,
        target,
        mut headers,
        body,
    } = outbound;

    let empty_body = body.size_hint().exact() == Some(0);
    let mut body = Some(body);
    let mut current = target.clone();
    let mut followed = 0;

    loop {
        let request = build_request(
            &method,
            &current,
            &headers,
            body.take().unwrap_or_else(Body::empty),
        )?;
        let response = client.request(request).await.map_err(ProxyError::Dispatch)?;

        let status = response.status();
        let Some(hop) = next_hop(&method, status, empty_body) else {
            return Ok(response);
        };
        let Some(location) = response.headers().get(header::LOCATION) else {
            return Ok(response);
        };
        if followed == MAX_REDIRECTS {
            return Err(ProxyError::TooManyRedirects(MAX_REDIRECTS));
        }

        let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
        let mut next = current
            .join(&location)
            .map_err(|source| ProxyError::InvalidLocation { location, source })?;
        next.set_fragment(None);
        drop(response);

        tracing::debug!(
            status = status.as_u16(),
            from = %current,
            to = %next,
            "following redirect"
        );

        if !hop.keep_body {
            headers.remove(header::CONTENT_LENGTH);
            headers.remove(header::TRANSFER_ENCODING);
        }
        if !same_host_or_subdomain(&target, &next) {
            for name in &CREDENTIAL_HEADERS {
                headers.remove(name);
            }
        }
        match referer(&current, &next) {
            Some(value) => {
                headers.insert(header::REFERER, value);
            }
            None => {
                headers.remove(header::REFERER);
            }
        }
        set_host(&mut headers, &next);

        method = hop.method;
        current = next;
        followed += 1;
    }
}

/// Credentials embedded in `target` never go on the wire as part of the
/// URI. They become a Basic `Authorization` header for this hop only,
/// unless the caller already supplied one.
fn build_request(
    method: &Method,
    target: &url::Url,
    headers: &HeaderMap,
    body: Body,
) -> Result<Request<Body>, ProxyError> {
    let mut uri = target.clone();
    // Only fails for URLs that cannot carry credentials in the first place.
    let _ = uri.set_username("");
    let _ = uri.set_password(None);

    let mut request = Request::builder()
        .method(method.clone())
        .uri(uri.as_str())
        .body(body)?;
    *request.headers_mut() = headers.clone();
    if !headers.contains_key(header::AUTHORIZATION) {
        if let Some(value) = basic_auth(target) {
            request.headers_mut().insert(header::AUTHORIZATION, value);
        }
    }
    Ok(request)
}

fn next_hop(method: &Method, status: StatusCode, empty_body: bool) -> Option<Hop> {
    match status {
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
            let to_get = if status == StatusCode::SEE_OTHER {
                *method != Method::HEAD
            } else {
                *method != Method::GET && *method != Method::HEAD
            };
            Some(Hop {
                method: if to_get { Method::GET } else { method.clone() },
                keep_body: false,
            })
        }
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT if empty_body => Some(Hop {
            method: method.clone(),
            keep_body: true,
        }),
        _ => None,
    }
}

fn same_host_or_subdomain(origin: &url::Url, dest: &url::Url) -> bool {
    match (origin.host_str(), dest.host_str()) {
        (Some(parent), Some(host)) => {
            host == parent
                || (!host.contains(':')
                    && host
                        .strip_suffix(parent)
                        .is_some_and(|rest| rest.ends_with('.')))
        }
        _ => false,
    }
}

fn referer(previous: &url::Url, next: &url::Url) -> Option<HeaderValue> {
    if previous.scheme() == "https" && next.scheme() == "http" {
        return None;
    }
    let mut referer = previous.clone();
    // Only fails for URLs that cannot carry credentials in the first place.
    let _ = referer.set_username("");
    let _ = referer.set_password(None);
    HeaderValue::from_str(referer.as_str()).ok()
}
