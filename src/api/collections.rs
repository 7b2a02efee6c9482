use super::ApiClient;
use crate::app::ports::CollectionSource;
use crate::common::constants::{COLLECTION_PAGE_SIZE, MAX_COLLECTION_PAGES};
use crate::common::error::Result;
use crate::common::types::{CollectionItem, Page};
use async_trait::async_trait;
use reqwest::Method;
use tracing::warn;

impl ApiClient {
    pub async fn try_collection_page(&self, user_id: i64, page: u32) -> Result<Page<CollectionItem>> {
        self.send_json(
            self.request(Method::GET, &format!("/collections/user/{}", user_id))
                .query(&[("page", page), ("size", COLLECTION_PAGE_SIZE)]),
        )
        .await
    }

    /// One page of a user's collected tickets; an unreachable backend reads as an empty page
    pub async fn collection_page(&self, user_id: i64, page: u32) -> Page<CollectionItem> {
        match self.try_collection_page(user_id, page).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Collection fetch for user {} page {} failed: {}", user_id, page, e);
                Page::empty_page()
            }
        }
    }

    /// Every page of a user's collection, stopping at the last page or after `MAX_COLLECTION_PAGES`
    pub async fn full_collection(&self, user_id: i64) -> Vec<CollectionItem> {
        let mut items = Vec::new();
        for number in 0..MAX_COLLECTION_PAGES {
            let page = self.collection_page(user_id, number).await;
            let more = has_more(&page, number);
            items.extend(page.content);
            if !more {
                return items;
            }
        }
        warn!(
            "Collection of user {} still had pages after {}; returning {} items",
            user_id,
            MAX_COLLECTION_PAGES,
            items.len()
        );
        items
    }
}

/// Whether another page follows the one requested as `number`.
/// Paging metadata wins when present; otherwise a short page is the last one.
fn has_more(page: &Page<CollectionItem>, number: u32) -> bool {
    if page.content.is_empty() || page.last {
        return false;
    }
    if page.total_pages > 0 {
        return number + 1 < page.total_pages;
    }
    let size = if page.size > 0 { page.size } else { COLLECTION_PAGE_SIZE };
    page.content.len() >= size as usize
}

#[async_trait]
impl CollectionSource for ApiClient {
    async fn collection(&self, user_id: i64) -> Result<Vec<CollectionItem>> {
        Ok(self.full_collection(user_id).await)
    }
}
