use crate::errors::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted part of one calendar day.
///
/// `holiday` is deliberately absent: it is overlaid from the static table on
/// every read. Missing fields default so that partial documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredDay {
    pub crossed: bool,
    pub note: String,
    pub minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_start: Option<i64>,
    pub is_timer_running: bool,
}

impl StoredDay {
    /// Re-derives `is_timer_running` from `timer_start`.
    pub fn normalize(&mut self) {
        self.is_timer_running = self.timer_start.is_some();
    }
}

/// Every stored day, keyed by `YYYY-MM-DD`. Serialized as a bare JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StudyData {
    pub days: BTreeMap<String, StoredDay>,
}

impl StudyData {
    pub fn normalize(&mut self) {
        self.days.values_mut().for_each(StoredDay::normalize);
    }

    /// Iterates entries whose key parses as a date, skipping malformed keys.
    pub fn dated(&self) -> impl Iterator<Item = (NaiveDate, &StoredDay)> {
        self.days
            .iter()
            .filter_map(|(key, day)| parse_date_key(key).ok().map(|date| (date, day)))
    }
}

/// A day as the calendar sees it: stored fields merged over defaults, plus
/// the holiday label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    pub date_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,
    pub crossed: bool,
    pub note: String,
    pub minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_start: Option<i64>,
    pub is_timer_running: bool,
}

/// Fields a caller may overwrite in one `update_entry` call.
///
/// Timer fields are not patchable; they only move through start/stop so the
/// running flag can never disagree with the start timestamp.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayPatch {
    pub crossed: Option<bool>,
    pub note: Option<String>,
    pub minutes: Option<u32>,
}

/// Minute totals for the API. Like the other response types it keeps
/// snake_case field names; only `DayEntry` uses camelCase, because it mirrors
/// the persisted day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub weekly_minutes: u64,
    pub monthly_minutes: u64,
    pub total_minutes: u64,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub entry: DayEntry,
    pub saved: bool,
}

#[derive(Debug, Deserialize)]
pub struct MinutesRequest {
    pub action: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct MonthDay {
    #[serde(flatten)]
    pub entry: DayEntry,
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub today: String,
    pub days: Vec<MonthDay>,
    pub totals: Totals,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub minutes: u32,
    pub crossed: bool,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week_start: String,
    pub end_date: String,
    pub total_minutes: u64,
    pub study_days: u8,
}

#[derive(Debug, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub total_minutes: u64,
    pub study_days: u32,
    pub crossed_days: u32,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub last_7_days: Vec<DailyPoint>,
    pub weekly: Vec<WeeklyPoint>,
    pub monthly: Vec<MonthlyPoint>,
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a strict `YYYY-MM-DD` key with a four-digit year. Unpadded, signed
/// or otherwise non-canonical spellings are rejected so one day never maps to
/// two keys.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, StoreError> {
    let bytes = key.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(StoreError::InvalidDateKey(key.to_string()));
    }

    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .ok()
        .filter(|date| date_key(*date) == key)
        .ok_or_else(|| StoreError::InvalidDateKey(key.to_string()))
}
