//! Expiry-aware bearer token cache.
//!
//! Each vendor client owns one `TokenCache`. Callers pass the fetch future to
//! [`TokenCache::get_or_refresh`]; the cache decides whether to run it.

use std::future::Future;
use std::time::Duration;

use pb_common::Secret;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::http::{error_body, TokenResponse};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Upper bound on the lifetime taken from `expires_in`.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 3600);

/// Tokens this close to expiry are refreshed instead of reused.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed token response: {0}")]
    Malformed(String),
}

struct CachedToken {
    value: Secret,
    expires_at: Instant,
}

pub struct TokenCache {
    name: &'static str,
    margin: Duration,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(name: &'static str) -> Self {
        Self::with_margin(name, DEFAULT_REFRESH_MARGIN)
    }

    pub fn with_margin(name: &'static str, margin: Duration) -> Self {
        Self {
            name,
            margin,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached token, or run `fetch` and cache its result.
    ///
    /// The lock is held across `fetch`, so concurrent callers wait for the
    /// single in-flight refresh instead of issuing their own.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Secret, TokenError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenResponse, TokenError>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > Instant::now() + self.margin {
                return Ok(cached.value.clone());
            }
        }

        debug!(cache = self.name, "Refreshing access token");
        let token = fetch().await?;
        let now = Instant::now();
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
            .min(MAX_TOKEN_LIFETIME);
        let expires_at = now
            .checked_add(lifetime)
            .unwrap_or_else(|| now + Duration::from_secs(DEFAULT_EXPIRES_IN_SECS));
        let value = token.access_token;

        *slot = Some(CachedToken {
            value: value.clone(),
            expires_at,
        });

        Ok(value)
    }

    /// Drop the cached token; the next call fetches a fresh one.
    pub async fn invalidate(&self) {
        debug!(cache = self.name, "Invalidating access token");
        *self.slot.lock().await = None;
    }
}

/// Send a prepared token request and parse the OAuth response.
pub async fn request_token(request: reqwest::RequestBuilder) -> Result<TokenResponse, TokenError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(TokenError::Rejected {
            status: status.as_u16(),
            body: error_body(response).await,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| TokenError::Malformed(e.to_string()))
}
