use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::errors::{redact_query, QuoteError};

/// The regional exchange API rejects requests without a browser-like agent.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Build the `reqwest::Client` shared by all live providers.
pub fn build_client(timeout: Duration) -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send `request` and decode the body as untyped JSON.
///
/// Transport errors, non-2xx statuses and undecodable bodies all map to
/// `QuoteError::Transient`.
pub(crate) async fn get_json(provider: &str, request: RequestBuilder) -> Result<Value, QuoteError> {
    get_json_as(provider, request).await
}

pub(crate) async fn get_json_as<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, QuoteError> {
    let resp = request.send().await.map_err(|e| transport(provider, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(QuoteError::transient(provider, format!("HTTP {status}")));
    }
    resp.json::<T>().await.map_err(|e| transport(provider, e))
}

fn transport(provider: &str, e: reqwest::Error) -> QuoteError {
    QuoteError::transient(provider, redact_query(&e.to_string()))
}
