//! Extraction of the relay target from the `url` query parameter.

use crate::error::ProxyError;

pub const TARGET_PARAM: &str = "url";

/// Pull the first `url` value out of a raw query string and
/// parse it as an absolute URL. The fragment is dropped: it never goes on
/// the wire.
pub fn from_query(query: Option<&str>) -> Result<url::Url, ProxyError> {
    let raw = query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == TARGET_PARAM)
                .map(|(_, value)| value)
        })
        .filter(|value| !value.is_empty())
        .ok_or(ProxyError::MissingTarget)?;

    let mut target = url::Url::parse(&raw)?;
    target.set_fragment(None);
    Ok(target)
}
