//! Outbound HTTP client construction and OAuth token payloads.

use pb_common::Secret;
use pb_config::HttpClientConfig;
use serde::Deserialize;
use std::time::Duration;

/// Build a `reqwest::Client` with the configured timeouts.
///
/// A request that exceeds the timeout surfaces as a transport error on the
/// calling client.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()
}

/// OAuth 2.0 token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Secret,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Read a non-success response body for logging, capped so vendor HTML
/// error pages do not flood the logs.
pub async fn error_body(response: reqwest::Response) -> String {
    const MAX_LEN: usize = 512;
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_LEN {
        let mut cut = MAX_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}
