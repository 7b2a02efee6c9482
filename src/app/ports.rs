use crate::common::error::Result;
use crate::common::types::{CollectionItem, PerformanceRecord};
use async_trait::async_trait;
use std::path::PathBuf;

/// Source of the by-month performance listing
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    /// `month` is 1-based, as the backend expects it
    async fn performances_by_month(&self, year: i32, month: u32) -> Result<Vec<PerformanceRecord>>;
}

/// Loads raw image bytes (concert photos, the ticket mask) by URL or path
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, location: &str) -> Result<Vec<u8>>;
}

/// Receives finished ticket PNGs; the "download" step of an export
#[async_trait]
pub trait TicketSink: Send + Sync {
    async fn save(&self, file_name: &str, png: &[u8]) -> Result<PathBuf>;
}

/// A user's collected tickets
#[async_trait]
pub trait CollectionSource: Send + Sync {
    async fn collection(&self, user_id: i64) -> Result<Vec<CollectionItem>>;
}
