//! Shared HTTP client construction for the remote and git sources.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::warn;

use crate::config::HttpConfig;
use crate::error::SourceError;

/// User-Agent sent with every request. GitHub's API rejects requests
/// without one.
pub const USER_AGENT: &str = concat!("standards-hub/", env!("CARGO_PKG_VERSION"));

/// Build a client with the configured per-request timeout.
pub fn build_client(http: &HttpConfig) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(http.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?)
}

/// Convert configured header pairs into a [`HeaderMap`].
///
/// Pairs that are not valid HTTP header names or values are dropped with a
/// warning rather than failing the whole source.
pub fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let parsed_name = HeaderName::from_bytes(name.as_bytes());
        let parsed_value = HeaderValue::from_str(value);
        match (parsed_name, parsed_value) {
            (Ok(n), Ok(v)) => {
                map.insert(n, v);
            }
            _ => warn!(header = %name, "skipping invalid HTTP header"),
        }
    }
    map
}

/// GET `url` and return the body as text, treating non-2xx as unavailable.
pub async fn get_text(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
) -> Result<String, SourceError> {
    let resp = client.get(url).headers(headers.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::unavailable(url, format!("HTTP {}", status)));
    }
    Ok(resp.text().await?)
}
