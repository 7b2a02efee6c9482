use crate::app::ports::ImageSource;
use crate::common::error::{Result, StageError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Loads image assets over HTTP(S), or from disk for anything that is not a URL
pub struct AssetImageSource {
    client: reqwest::Client,
}

impl AssetImageSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[async_trait]
impl ImageSource for AssetImageSource {
    async fn load(&self, location: &str) -> Result<Vec<u8>> {
        if location.trim().is_empty() {
            return Err(StageError::NotFound("empty image location".into()));
        }
        if !is_remote(location) {
            let path = location.strip_prefix("file://").unwrap_or(location);
            return match tokio::fs::read(path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(StageError::NotFound(path.to_string()))
                }
                Err(e) => Err(e.into()),
            };
        }

        let resp = self.client.get(location).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StageError::Api {
                status: status.as_u16(),
                message: format!("image {} unavailable", location),
            });
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        debug!("Loaded {} ({} bytes, {})", location, bytes.len(), content_type);
        Ok(bytes)
    }
}
