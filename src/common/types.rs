use crate::common::error::{Result, StageError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Parse the leading `YYYY-MM-DD` of a date or date-time string
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let head = value.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parse `HH:MM[:SS[.fff]]`
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// One performance as returned by the by-month query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "img", default)]
    pub image_url: Option<String>,
    pub concert_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub ticket_price: i64,
    #[serde(default)]
    pub stage_name: String,
    #[serde(rename = "stageImg", default, skip_serializing_if = "Option::is_none")]
    pub stage_image_url: Option<String>,
}

impl PerformanceRecord {
    pub fn concert_day(&self) -> Option<NaiveDate> {
        parse_day(&self.concert_date)
    }
}

/// A collected concert, the data behind one ticket card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub concert_id: i64,
    #[serde(default)]
    pub concert_image: String,
    pub concert_name: String,
    #[serde(default)]
    pub concert_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_date: Option<String>,
}

impl CollectionItem {
    /// Date shown on the ticket back, falling back to the collection timestamp
    pub fn display_date(&self) -> String {
        let source = if self.concert_date.is_empty() {
            self.collected_date.as_deref().unwrap_or_default()
        } else {
            &self.concert_date
        };
        match parse_day(source) {
            Some(day) => day.format("%Y-%m-%d").to_string(),
            None => source.to_string(),
        }
    }

    /// `HH:MM` start time, falling back to the time component of the collection timestamp
    pub fn display_time(&self) -> String {
        if let Some(time) = parse_time(&self.start_time) {
            return time.format("%H:%M").to_string();
        }
        if !self.start_time.is_empty() {
            return self.start_time.clone();
        }
        self.collected_date
            .as_deref()
            .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// Spring-style page envelope used by every paginated endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number_of_elements: u32,
}

impl<T> Page<T> {
    pub fn empty_page() -> Self {
        Self {
            content: Vec::new(),
            last: true,
            first: true,
            empty: true,
            number: 0,
            size: 0,
            total_pages: 0,
            total_elements: 0,
            number_of_elements: 0,
        }
    }

    /// Index of the page to request next, if any
    pub fn next_page(&self) -> Option<u32> {
        if self.last {
            None
        } else {
            Some(self.number + 1)
        }
    }
}

/// Session payload returned by login and persisted by the session store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_img: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<()> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_img: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        require("userName", &self.user_name)?;
        require("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(StageError::validation("email must contain '@'"));
        }
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Full concert detail as served by `/concerts/{id}` and the list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub img: Option<String>,
    pub concert_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub stage_id: Option<i64>,
    #[serde(default)]
    pub ticket_price: serde_json::Value,
    #[serde(default)]
    pub people_scale: serde_json::Value,
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Concert {
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(parse_day(&self.concert_date)?.and_time(parse_time(&self.start_time)?))
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        Some(parse_day(&self.concert_date)?.and_time(parse_time(&self.end_time)?))
    }
}

/// Body of `PUT /concerts/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcertUpdate {
    pub name: String,
    pub concert_date: String,
    pub start_time: String,
    pub end_time: String,
    pub ticket_price: String,
    pub people_scale: String,
    #[serde(default)]
    pub song_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl ConcertUpdate {
    pub fn from_concert(concert: &Concert) -> Self {
        Self {
            name: concert.name.clone(),
            concert_date: concert.concert_date.clone(),
            start_time: concert.start_time.clone(),
            end_time: concert.end_time.clone(),
            ticket_price: json_scalar(&concert.ticket_price),
            people_scale: json_scalar(&concert.people_scale),
            song_ids: concert.songs.iter().map(|s| s.id).collect(),
            img: concert.img.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("concertDate", &self.concert_date)?;
        if parse_day(&self.concert_date).is_none() {
            return Err(StageError::validation("concertDate must be YYYY-MM-DD"));
        }
        let start = parse_time(&self.start_time)
            .ok_or_else(|| StageError::validation("startTime must be HH:MM"))?;
        let end = parse_time(&self.end_time)
            .ok_or_else(|| StageError::validation("endTime must be HH:MM"))?;
        if end <= start {
            return Err(StageError::validation("endTime must be after startTime"));
        }
        if self.ticket_price.trim().parse::<u64>().is_err() {
            return Err(StageError::validation("ticketPrice must be a whole number"));
        }
        Ok(())
    }
}

/// Body of `POST /songs`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongCreate {
    pub title: String,
    pub url: String,
    pub artist_id: Option<i64>,
    pub concert_id: i64,
    pub duration: u32,
}

impl SongCreate {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("url", &self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub model_url: String,
    #[serde(default)]
    pub active: bool,
}

/// An in-memory file ready for a multipart upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }
}

#[derive(Debug, Clone)]
pub struct CharacterCreate {
    pub name: String,
    pub description: String,
    pub image: UploadFile,
    pub model: UploadFile,
}

impl CharacterCreate {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("description", &self.description)?;
        if self.image.bytes.is_empty() {
            return Err(StageError::validation("image file is empty"));
        }
        if self.model.bytes.is_empty() {
            return Err(StageError::validation("model file is empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<UploadFile>,
    pub model: Option<UploadFile>,
    pub active: Option<bool>,
}

impl CharacterUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.model.is_none()
            && self.active.is_none()
    }
}

/// Row of the display-name search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(alias = "userId")]
    pub id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_img: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewHistoryItem {
    #[serde(default)]
    pub concert_id: Option<i64>,
    #[serde(default)]
    pub concert_name: Option<String>,
    #[serde(default)]
    pub concert_image: Option<String>,
    #[serde(default)]
    pub viewed_at: Option<String>,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StageError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn json_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_performance_record_wire_names() {
        let record: PerformanceRecord = serde_json::from_value(json!({
            "id": 7,
            "name": "Moonlight Live",
            "img": "http://img/7.png",
            "concertDate": "2024-11-11T19:00:00",
            "startTime": "19:00:00",
            "ticketPrice": 15000,
            "stageName": "Main Hall"
        }))
        .unwrap();

        assert_eq!(record.image_url.as_deref(), Some("http://img/7.png"));
        assert_eq!(record.stage_image_url, None);
        assert_eq!(record.concert_day(), NaiveDate::from_ymd_opt(2024, 11, 11));
    }

    #[test]
    fn test_page_defaults_when_fields_missing() {
        let page: Page<CollectionItem> = serde_json::from_value(json!({
            "content": [{"concertId": 16, "concertName": "Virtual Concert B"}],
            "last": false,
            "number": 0
        }))
        .unwrap();

        assert_eq!(page.content.len(), 1);
        assert_eq!(page.total_elements, 0);
        assert_eq!(page.next_page(), Some(1));
    }

    #[test]
    fn test_collection_item_falls_back_to_collected_date() {
        let item: CollectionItem = serde_json::from_value(json!({
            "concertId": 18,
            "concertName": "Virtual Concert B",
            "collectedDate": "2024-11-11T15:16:38.413406"
        }))
        .unwrap();

        assert_eq!(item.display_date(), "2024-11-11");
        assert_eq!(item.display_time(), "15:16");
    }

    #[test]
    fn test_user_info_accepts_id_alias() {
        let info: UserInfo = serde_json::from_value(json!({"id": 3, "token": "abc"})).unwrap();
        assert_eq!(info.user_id, Some(3));
        assert_eq!(info.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_concert_update_validation() {
        let mut form = ConcertUpdate {
            name: "Live".into(),
            concert_date: "2025-01-02".into(),
            start_time: "19:00".into(),
            end_time: "21:00:00".into(),
            ticket_price: "12000".into(),
            people_scale: "100".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        form.end_time = "18:00".into();
        assert!(matches!(form.validate(), Err(StageError::Validation(_))));

        form.end_time = "22:00".into();
        form.name = "  ".into();
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_register_request_requires_email_shape() {
        let req = RegisterRequest {
            user_name: "mina".into(),
            email: "not-an-email".into(),
            password: "pw".into(),
            user_img: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
