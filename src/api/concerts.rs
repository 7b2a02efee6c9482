use super::ApiClient;
use crate::app::ports::PerformanceSource;
use crate::common::constants::IMMINENT_LIMIT;
use crate::common::error::{Result, StageError};
use crate::common::types::{Concert, ConcertUpdate, Page, PerformanceRecord};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info, warn};

/// A user's concerts split by where `now` falls relative to start and end
#[derive(Debug, Default, Clone, Serialize)]
pub struct CategorizedConcerts {
    pub upcoming: Vec<Concert>,
    pub ongoing: Vec<Concert>,
    pub past: Vec<Concert>,
}

/// Past once the end time has gone by, ongoing between start and end, upcoming otherwise.
/// Concerts with unparseable times count as upcoming.
pub fn categorize_concerts(concerts: Vec<Concert>, now: NaiveDateTime) -> CategorizedConcerts {
    let mut out = CategorizedConcerts::default();
    for concert in concerts {
        match (concert.starts_at(), concert.ends_at()) {
            (_, Some(end)) if end < now => out.past.push(concert),
            (Some(start), Some(_)) if start <= now => out.ongoing.push(concert),
            _ => out.upcoming.push(concert),
        }
    }
    out
}

fn imminent_key(limit: u32) -> String {
    format!("imminent:{}", limit)
}

pub(super) fn concert_key(id: i64) -> String {
    format!("concert:{}", id)
}

impl ApiClient {
    /// `month` is 1-based
    pub async fn concerts_by_month(&self, year: i32, month: u32) -> Result<Vec<PerformanceRecord>> {
        if !(1..=12).contains(&month) {
            return Err(StageError::validation(format!("month {} out of range", month)));
        }
        let records: Vec<PerformanceRecord> = self
            .send_json(
                self.request(Method::GET, "/concerts/by-month")
                    .query(&[("year", year.to_string()), ("month", month.to_string())]),
            )
            .await?;
        debug!("{} performances in {}-{:02}", records.len(), year, month);
        Ok(records)
    }

    pub async fn list_concerts(&self, page: u32, size: u32) -> Result<Page<Concert>> {
        self.send_json(self.request(Method::GET, "/concerts").query(&[("page", page), ("size", size)]))
            .await
    }

    /// The next few concerts, cached for a few minutes
    pub async fn imminent_concerts(&self) -> Result<Vec<Concert>> {
        let key = imminent_key(IMMINENT_LIMIT);
        self.imminent_cache
            .get_or_try_insert_with(&key, || async move {
                self.send_json(
                    self.request(Method::GET, "/concerts/imminent")
                        .query(&[("limit", IMMINENT_LIMIT)]),
                )
                .await
            })
            .await
    }

    pub async fn get_concert(&self, id: i64) -> Result<Concert> {
        let key = concert_key(id);
        self.concert_cache
            .get_or_try_insert_with(&key, || async move {
                self.send_json(self.request(Method::GET, &format!("/concerts/{}", id)))
                    .await
            })
            .await
    }

    pub async fn create_concert(&self, form: &ConcertUpdate) -> Result<Concert> {
        form.validate()?;
        let concert: Concert = self
            .send_json(self.request(Method::POST, "/concerts").json(form))
            .await?;
        self.imminent_cache.invalidate(&imminent_key(IMMINENT_LIMIT));
        info!("Created concert {} ({})", concert.id, concert.name);
        Ok(concert)
    }

    pub async fn update_concert(&self, id: i64, form: &ConcertUpdate) -> Result<()> {
        form.validate()?;
        self.send_empty(self.request(Method::PUT, &format!("/concerts/{}", id)).json(form))
            .await?;
        self.invalidate_concert(id);
        info!("Updated concert {}", id);
        Ok(())
    }

    pub async fn delete_concert(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/concerts/{}", id)))
            .await?;
        self.invalidate_concert(id);
        info!("Deleted concert {}", id);
        Ok(())
    }

    fn invalidate_concert(&self, id: i64) {
        self.concert_cache.invalidate(&concert_key(id));
        self.imminent_cache.invalidate(&imminent_key(IMMINENT_LIMIT));
    }

    pub async fn user_concerts(&self, user_id: i64) -> Result<Page<Concert>> {
        self.send_json(self.request(Method::GET, &format!("/concerts/user/{}", user_id)))
            .await
    }

    /// The logged-in user's concerts, categorized against `now`
    pub async fn my_concerts(&self, now: NaiveDateTime) -> Result<CategorizedConcerts> {
        let user_id = self.current_user_id()?;
        let page = self.user_concerts(user_id).await?;
        Ok(categorize_concerts(page.content, now))
    }

    /// Whether the user may register a concert; false when logged out
    pub async fn check_concert_registration(&self) -> Result<bool> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(false);
        };
        self.send_json(self.request(
            Method::GET,
            &format!("/concerts/check-registration/{}", user_id),
        ))
        .await
    }
}

#[async_trait]
impl PerformanceSource for ApiClient {
    async fn performances_by_month(&self, year: i32, month: u32) -> Result<Vec<PerformanceRecord>> {
        self.concerts_by_month(year, month).await.map_err(|e| {
            warn!("Month fetch {}-{:02} failed: {}", year, month, e);
            e
        })
    }
}
