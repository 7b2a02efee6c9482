//! Month calendar of performances.
//!
//! [`MonthPerformances`] buckets one month's fetched records by day and
//! [`CalendarController`] owns the view state (displayed month and selected
//! date) and sequences the by-month fetches that feed it.

use crate::app::ports::PerformanceSource;
use crate::common::constants::WEEKDAY_LABELS;
use crate::common::error::{Result, StageError};
use crate::common::types::{parse_day, PerformanceRecord};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Number of days in `month` (0-based) of `year`: the day before the first of the next month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month > 11 {
        return 0;
    }
    let (next_year, next_month) = if month == 11 { (year + 1, 1) } else { (year, month + 2) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(0)
}

/// Blank cells before day 1 in a Sunday-first grid
pub fn leading_blank_cells(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
        .map(|first| first.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// `YYYY-MM-DD` for a 0-based month
pub fn format_day(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month + 1, day)
}

/// A displayed month; `month` is 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if month > 11 {
            return Err(StageError::validation(format!("month must be 0-11, got {}", month)));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month0() }
    }

    pub fn next(self) -> Self {
        if self.month == 11 {
            Self { year: self.year + 1, month: 0 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 0 {
            Self { year: self.year - 1, month: 11 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// 1-based month for the wire
    pub fn wire_month(self) -> u32 {
        self.month + 1
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month
    }

    pub fn label(self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month + 1))
    }
}

/// One month's performances, restricted to records that fall inside the month
#[derive(Debug, Clone, Serialize)]
pub struct MonthPerformances {
    key: MonthKey,
    records: Vec<PerformanceRecord>,
}

impl MonthPerformances {
    pub fn new(key: MonthKey, records: Vec<PerformanceRecord>) -> Self {
        let total = records.len();
        let records: Vec<PerformanceRecord> = records
            .into_iter()
            .filter(|r| r.concert_day().is_some_and(|d| key.contains(d)))
            .collect();
        if records.len() != total {
            debug!("Dropped {} records outside {}", total - records.len(), key.label());
        }
        Self { key, records }
    }

    pub fn empty(key: MonthKey) -> Self {
        Self { key, records: Vec::new() }
    }

    pub fn key(&self) -> MonthKey {
        self.key
    }

    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    /// Distinct days with at least one performance, ascending
    pub fn performance_dates(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self
            .records
            .iter()
            .filter_map(|r| r.concert_day())
            .map(|d| d.day())
            .collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    pub fn is_performance_day(&self, day: u32) -> bool {
        self.records
            .iter()
            .filter_map(|r| r.concert_day())
            .any(|d| d.day() == day)
    }

    /// Records whose `concertDate` starts with `date` (date-time strings match their day)
    pub fn performances_on_date(&self, date: &str) -> Vec<&PerformanceRecord> {
        self.records
            .iter()
            .filter(|r| r.concert_date.starts_with(date))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarViewState {
    pub year: i32,
    /// 0-based
    pub month: u32,
    pub selected_date: Option<String>,
}

/// Handle for one issued by-month fetch. Only the newest one may install records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRequest {
    pub generation: u64,
    pub key: MonthKey,
}

pub struct CalendarController {
    state: CalendarViewState,
    performances: MonthPerformances,
    generation: u64,
}

impl CalendarController {
    /// Controller showing the month of `today`, nothing selected and nothing fetched yet
    pub fn new(today: NaiveDate) -> Self {
        let key = MonthKey::of(today);
        Self {
            state: CalendarViewState { year: key.year, month: key.month, selected_date: None },
            performances: MonthPerformances::empty(key),
            generation: 0,
        }
    }

    pub fn state(&self) -> &CalendarViewState {
        &self.state
    }

    pub fn key(&self) -> MonthKey {
        MonthKey { year: self.state.year, month: self.state.month }
    }

    pub fn performances(&self) -> &MonthPerformances {
        &self.performances
    }

    /// Initial mount: jump to today's month, select today and issue the first fetch
    pub fn mount(&mut self, today: NaiveDate) -> MonthRequest {
        let key = MonthKey::of(today);
        self.show(key);
        self.state.selected_date = Some(today.format("%Y-%m-%d").to_string());
        self.issue()
    }

    pub fn next_month(&mut self) -> MonthRequest {
        self.change_month(self.key().next())
    }

    pub fn prev_month(&mut self) -> MonthRequest {
        self.change_month(self.key().prev())
    }

    /// Jump straight to a month; clears the selection like the arrow buttons do
    pub fn go_to(&mut self, key: MonthKey) -> MonthRequest {
        self.change_month(key)
    }

    fn change_month(&mut self, key: MonthKey) -> MonthRequest {
        self.show(key);
        self.state.selected_date = None;
        self.issue()
    }

    fn show(&mut self, key: MonthKey) {
        self.state.year = key.year;
        self.state.month = key.month;
        if self.performances.key() != key {
            self.performances = MonthPerformances::empty(key);
        }
    }

    fn issue(&mut self) -> MonthRequest {
        self.generation += 1;
        MonthRequest { generation: self.generation, key: self.key() }
    }

    pub fn select_day(&mut self, day: u32) -> Result<()> {
        let key = self.key();
        if day == 0 || day > key.days() {
            return Err(StageError::validation(format!(
                "day {} is outside {} (1-{})",
                day,
                key.label(),
                key.days()
            )));
        }
        self.state.selected_date = Some(format_day(key.year, key.month, day));
        Ok(())
    }

    /// Select by `YYYY-MM-DD`; the date has to be inside the displayed month
    pub fn select_date(&mut self, date: &str) -> Result<()> {
        let parsed = parse_day(date)
            .filter(|_| date.len() == 10)
            .ok_or_else(|| StageError::validation(format!("'{}' is not a YYYY-MM-DD date", date)))?;
        if !self.key().contains(parsed) {
            return Err(StageError::validation(format!(
                "{} is not in {}",
                date,
                self.key().label()
            )));
        }
        self.state.selected_date = Some(date.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_date = None;
    }

    /// Performances for the selected date; with no selection every record of the month matches.
    pub fn selected_performances(&self) -> Vec<&PerformanceRecord> {
        let prefix = self.state.selected_date.as_deref().unwrap_or("");
        self.performances.performances_on_date(prefix)
    }

    /// Install a fetch result. Returns false when the request is stale.
    /// A failed fetch installs an empty month.
    pub fn apply(&mut self, request: MonthRequest, result: Result<Vec<PerformanceRecord>>) -> bool {
        if request.generation != self.generation {
            debug!(
                "Ignoring stale response for {} (generation {} < {})",
                request.key.label(),
                request.generation,
                self.generation
            );
            return false;
        }
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to fetch performances for {}: {}", request.key.label(), e);
                Vec::new()
            }
        };
        self.performances = MonthPerformances::new(request.key, records);
        info!(
            "Loaded {} performances for {}",
            self.performances.records().len(),
            request.key.label()
        );
        true
    }

    /// Fetch the month named by `request` and install it
    pub async fn load(&mut self, source: &dyn PerformanceSource, request: MonthRequest) -> bool {
        let result = source
            .performances_by_month(request.key.year, request.key.wire_month())
            .await;
        self.apply(request, result)
    }

    pub async fn navigate_next(&mut self, source: &dyn PerformanceSource) -> bool {
        let request = self.next_month();
        self.load(source, request).await
    }

    pub async fn navigate_prev(&mut self, source: &dyn PerformanceSource) -> bool {
        let request = self.prev_month();
        self.load(source, request).await
    }

    /// Text grid: weekday header, blank lead-in cells, `[dd]` for the selection and `*` after performance days
    pub fn render_grid(&self) -> String {
        let key = self.key();
        let mut out = String::new();
        out.push_str(&key.label());
        out.push('\n');

        let header: Vec<String> = WEEKDAY_LABELS.iter().map(|l| format!("{:<5}", l)).collect();
        out.push_str(header.concat().trim_end());
        out.push('\n');

        let mut cells: Vec<String> = (0..leading_blank_cells(key.year, key.month))
            .map(|_| "     ".to_string())
            .collect();
        for day in 1..=key.days() {
            let marker = if self.performances.is_performance_day(day) { '*' } else { ' ' };
            let selected = self.state.selected_date.as_deref()
                == Some(format_day(key.year, key.month, day).as_str());
            if selected {
                cells.push(format!("[{:>2}]{}", day, marker));
            } else {
                cells.push(format!(" {:>2} {}", day, marker));
            }
        }

        for row in cells.chunks(7) {
            out.push_str(row.concat().trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn record(id: i64, date: &str) -> PerformanceRecord {
        PerformanceRecord {
            id,
            name: format!("Show {}", id),
            image_url: None,
            concert_date: date.to_string(),
            start_time: "19:00:00".into(),
            ticket_price: 10000,
            stage_name: "Main".into(),
            stage_image_url: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct RecordingSource {
        calls: Mutex<Vec<(i32, u32)>>,
        fail: bool,
    }

    impl RecordingSource {
        fn new(fail: bool) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail }
        }
    }

    #[async_trait]
    impl PerformanceSource for RecordingSource {
        async fn performances_by_month(&self, year: i32, month: u32) -> Result<Vec<PerformanceRecord>> {
            self.calls.lock().unwrap().push((year, month));
            if self.fail {
                return Err(StageError::Api { status: 500, message: "down".into() });
            }
            Ok(vec![record(1, &format!("{:04}-{:02}-03", year, month))])
        }
    }

    #[test]
    fn test_days_in_month_gregorian() {
        assert_eq!(days_in_month(2024, 1), 29);
        assert_eq!(days_in_month(2023, 1), 28);
        assert_eq!(days_in_month(1900, 1), 28);
        assert_eq!(days_in_month(2000, 1), 29);
        assert_eq!(days_in_month(2024, 0), 31);
        assert_eq!(days_in_month(2024, 3), 30);
        assert_eq!(days_in_month(2024, 11), 31);
        assert_eq!(days_in_month(2024, 12), 0);

        for year in 1999..2030 {
            for month in 0..12 {
                let expected = (1..=31)
                    .filter(|d| NaiveDate::from_ymd_opt(year, month + 1, *d).is_some())
                    .count() as u32;
                assert_eq!(days_in_month(year, month), expected, "{}-{}", year, month + 1);
            }
        }
    }

    #[test]
    fn test_leading_blank_cells() {
        // 2024-11-01 is a Friday, 2024-09-01 a Sunday
        assert_eq!(leading_blank_cells(2024, 10), 5);
        assert_eq!(leading_blank_cells(2024, 8), 0);
    }

    #[test]
    fn test_month_key_wraps_years() {
        let dec = MonthKey::new(2024, 11).unwrap();
        assert_eq!(dec.next(), MonthKey { year: 2025, month: 0 });
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(MonthKey { year: 2024, month: 0 }.prev(), MonthKey { year: 2023, month: 11 });
        assert!(MonthKey::new(2024, 12).is_err());
    }

    #[test]
    fn test_performance_days_and_prefix_filter() {
        let key = MonthKey::new(2024, 10).unwrap();
        let month = MonthPerformances::new(
            key,
            vec![
                record(1, "2024-11-11"),
                record(2, "2024-11-11T20:30:00"),
                record(3, "2024-11-02"),
                record(4, "2024-12-11"),
                record(5, "garbage"),
            ],
        );

        assert_eq!(month.records().len(), 3);
        assert_eq!(month.performance_dates(), vec![2, 11]);
        for day in 1..=30 {
            assert_eq!(month.is_performance_day(day), day == 2 || day == 11, "day {}", day);
        }
        let ids: Vec<i64> = month.performances_on_date("2024-11-11").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(month.performances_on_date("2024-11-12").is_empty());
    }

    #[tokio::test]
    async fn test_month_change_clears_selection_and_fetches_once() {
        let source = RecordingSource::new(false);
        let mut calendar = CalendarController::new(date(2024, 11, 20));
        let request = calendar.mount(date(2024, 11, 20));
        assert!(calendar.load(&source, request).await);
        assert_eq!(calendar.state().selected_date.as_deref(), Some("2024-11-20"));

        assert!(calendar.navigate_next(&source).await);
        assert_eq!(calendar.state().selected_date, None);
        assert_eq!((calendar.state().year, calendar.state().month), (2024, 11));
        assert_eq!(*source.calls.lock().unwrap(), vec![(2024, 11), (2024, 12)]);

        assert!(calendar.navigate_next(&source).await);
        assert_eq!((calendar.state().year, calendar.state().month), (2025, 0));
        assert_eq!(source.calls.lock().unwrap().last(), Some(&(2025, 1)));
        assert_eq!(calendar.performances().performance_dates(), vec![3]);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_to_empty_month() {
        let mut calendar = CalendarController::new(date(2024, 11, 1));
        let ok = RecordingSource::new(false);
        let request = calendar.mount(date(2024, 11, 1));
        calendar.load(&ok, request).await;
        assert_eq!(calendar.performances().records().len(), 1);

        let failing = RecordingSource::new(true);
        assert!(calendar.navigate_prev(&failing).await);
        assert!(calendar.performances().records().is_empty());
        assert_eq!(calendar.performances().key(), MonthKey { year: 2024, month: 9 });
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut calendar = CalendarController::new(date(2024, 11, 1));
        let november = calendar.mount(date(2024, 11, 1));
        let december = calendar.next_month();

        assert!(calendar.apply(december, Ok(vec![record(9, "2024-12-24")])));
        // November's response arrives late and must not clobber December
        assert!(!calendar.apply(november, Ok(vec![record(1, "2024-11-11")])));
        assert_eq!(calendar.performances().key(), december.key);
        assert_eq!(calendar.performances().performance_dates(), vec![24]);
    }

    #[test]
    fn test_selection_is_validated_against_month() {
        let mut calendar = CalendarController::new(date(2023, 2, 1));
        assert!(calendar.select_day(28).is_ok());
        assert_eq!(calendar.state().selected_date.as_deref(), Some("2023-02-28"));
        assert!(calendar.select_day(29).is_err());
        assert!(calendar.select_day(0).is_err());
        assert!(calendar.select_date("2023-03-01").is_err());
        assert!(calendar.select_date("2023-02-1").is_err());
        assert!(calendar.select_date("2023-02-14").is_ok());
    }

    #[test]
    fn test_render_grid_marks_selection_and_performances() {
        let mut calendar = CalendarController::new(date(2024, 11, 1));
        let request = calendar.mount(date(2024, 11, 1));
        calendar.apply(request, Ok(vec![record(1, "2024-11-11")]));
        calendar.select_day(11).unwrap();

        let grid = calendar.render_grid();
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "November 2024");
        assert!(lines[1].starts_with("Sun  Mon"));
        // five blank cells precede Friday the 1st
        assert!(lines[2].starts_with(&" ".repeat(25)));
        assert!(grid.contains("[11]*"));
        assert_eq!(lines.len(), 2 + 5);
    }
}
