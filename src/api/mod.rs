//! Typed client for the concert platform's REST backend.
//!
//! Endpoint groups live in submodules as `impl ApiClient` blocks. Every request
//! carries the session's bearer token when one is present.

pub mod auth;
pub mod characters;
pub mod collections;
pub mod concerts;
pub mod files;
pub mod search;
pub mod songs;

use crate::cache::TtlCache;
use crate::common::constants::IMMINENT_CACHE_SECS;
use crate::common::error::{Result, StageError};
use crate::common::types::Concert;
use crate::config::ApiConfig;
use crate::session::SessionStore;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    imminent_cache: TtlCache<Vec<Concert>>,
    concert_cache: TtlCache<Concert>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            imminent_cache: TtlCache::new(Duration::from_secs(IMMINENT_CACHE_SECS)),
            concert_cache: TtlCache::new(Duration::from_secs(IMMINENT_CACHE_SECS)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Logged-in user id, required by the per-user endpoints
    pub fn current_user_id(&self) -> Result<i64> {
        self.session
            .user_id()
            .ok_or_else(|| StageError::validation("not logged in"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("request failed").to_string()
        });
        warn!("Backend returned {}: {}", status.as_u16(), message);
        Err(StageError::Api { status: status.as_u16(), message })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await?;
        Ok(())
    }

    /// Body that is either a JSON string or bare text
    async fn send_text(&self, builder: RequestBuilder) -> Result<String> {
        let body = self.send(builder).await?.text().await?;
        Ok(match serde_json::from_str::<String>(&body) {
            Ok(s) => s,
            Err(_) => body.trim().to_string(),
        })
    }
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return Some(msg.to_string());
            }
        }
    }
    Some(trimmed.chars().take(200).collect())
}
