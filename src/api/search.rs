use super::ApiClient;
use crate::common::constants::SEARCH_PAGE_SIZE;
use crate::common::error::Result;
use crate::common::types::{Page, UserSummary, ViewHistoryItem};
use reqwest::Method;

impl ApiClient {
    pub async fn search_users(&self, display_name: &str, page: u32) -> Result<Page<UserSummary>> {
        let query = display_name.trim();
        if query.is_empty() {
            return Ok(Page::empty_page());
        }
        self.send_json(self.request(Method::GET, "/search/user/displayName").query(&[
            ("displayName", query.to_string()),
            ("page", page.to_string()),
            ("size", SEARCH_PAGE_SIZE.to_string()),
        ]))
        .await
    }

    pub async fn view_history(&self, user_id: i64, page: u32) -> Result<Page<ViewHistoryItem>> {
        self.send_json(
            self.request(Method::GET, &format!("/view-history/user/{}", user_id))
                .query(&[("page", page), ("size", SEARCH_PAGE_SIZE)]),
        )
        .await
    }
}
