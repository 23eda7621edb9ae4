use crate::clock::Clock;
use crate::errors::StoreError;
use crate::filters::CalendarFilters;
use crate::holidays::holiday_for;
use crate::models::{
    date_key, DayEntry, DayPatch, MonthDay, StatsResponse, StoredDay, StudyData, Totals,
};
use crate::stats;
use crate::storage::{decode_snapshot, encode_snapshot, StudyStorage};
use chrono::{Datelike, Duration, NaiveDate};
use std::sync::Arc;
use tracing::{error, info, warn};

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Populate a few demonstration days when storage holds no document yet.
    pub seed_demo_data: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
        }
    }
}

/// Owns every day record and is the only thing that talks to storage.
///
/// Each mutation rewrites the whole mapping. A failed write is logged and the
/// in-memory change is kept; `last_save_succeeded` reports the outcome.
pub struct StudyStore {
    storage: Box<dyn StudyStorage>,
    clock: Arc<dyn Clock>,
    data: StudyData,
    last_save_ok: bool,
}

impl StudyStore {
    pub fn open(
        storage: Box<dyn StudyStorage>,
        clock: Arc<dyn Clock>,
        options: StoreOptions,
    ) -> Self {
        let mut store = Self {
            storage,
            clock,
            data: StudyData::default(),
            last_save_ok: true,
        };

        match store.storage.load() {
            Ok(Some(data)) => {
                info!(days = data.days.len(), "restored study data");
                store.data = data;
            }
            Ok(None) if options.seed_demo_data => {
                store.data = seed_data(store.clock.today());
                info!(days = store.data.days.len(), "no saved data, seeded demonstration days");
                store.persist();
            }
            Ok(None) => info!("no saved data, starting with an empty calendar"),
            Err(err) => error!("{err}; starting with an empty calendar"),
        }

        store
    }

    pub fn data(&self) -> &StudyData {
        &self.data
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn last_save_succeeded(&self) -> bool {
        self.last_save_ok
    }

    /// Never fails: unknown dates come back with defaults.
    pub fn get_entry(&self, date: NaiveDate) -> DayEntry {
        let key = date_key(date);
        let stored = self.data.days.get(&key).cloned().unwrap_or_default();
        DayEntry {
            holiday: holiday_for(&key).map(str::to_string),
            date_key: key,
            crossed: stored.crossed,
            note: stored.note,
            minutes: stored.minutes,
            timer_start: stored.timer_start,
            is_timer_running: stored.timer_start.is_some(),
        }
    }

    pub fn update_entry(&mut self, date: NaiveDate, patch: DayPatch) -> DayEntry {
        self.mutate(date, |day| {
            if let Some(crossed) = patch.crossed {
                day.crossed = crossed;
            }
            if let Some(note) = patch.note {
                day.note = note;
            }
            if let Some(minutes) = patch.minutes {
                day.minutes = minutes;
            }
        })
    }

    pub fn toggle_completed(&mut self, date: NaiveDate) -> DayEntry {
        self.mutate(date, |day| day.crossed = !day.crossed)
    }

    /// Starts a live timer. A timer that is already running keeps its
    /// original start so no elapsed time is lost.
    pub fn start_timer(&mut self, date: NaiveDate) -> DayEntry {
        let current = self.get_entry(date);
        if current.is_timer_running {
            warn!(date = %current.date_key, "timer already running, keeping original start");
            return current;
        }

        let now = self.clock.now_millis();
        self.mutate(date, |day| {
            day.timer_start = Some(now);
            day.is_timer_running = true;
        })
    }

    /// Credits the elapsed whole minutes (rounded) and clears the timer.
    /// Without a running timer this is a no-op.
    pub fn stop_timer(&mut self, date: NaiveDate) -> DayEntry {
        let started = self
            .data
            .days
            .get(&date_key(date))
            .and_then(|day| day.timer_start);
        let Some(started) = started else {
            return self.get_entry(date);
        };

        let elapsed = self.clock.now_millis().saturating_sub(started).max(0);
        let credited = elapsed_minutes(elapsed);
        self.mutate(date, |day| {
            day.minutes = day.minutes.saturating_add(credited);
            day.timer_start = None;
            day.is_timer_running = false;
        })
    }

    /// Adds manually entered minutes. Input without a leading number, or
    /// with a negative one, leaves the entry untouched.
    pub fn add_minutes(&mut self, date: NaiveDate, input: &str) -> DayEntry {
        match parse_minutes(input) {
            Ok(minutes) => {
                self.mutate(date, |day| day.minutes = day.minutes.saturating_add(minutes))
            }
            Err(err) => {
                warn!("{err}; ignoring");
                self.get_entry(date)
            }
        }
    }

    /// Removes manually entered minutes, never going below zero.
    pub fn subtract_minutes(&mut self, date: NaiveDate, input: &str) -> DayEntry {
        match parse_minutes(input) {
            Ok(minutes) => {
                self.mutate(date, |day| day.minutes = day.minutes.saturating_sub(minutes))
            }
            Err(err) => {
                warn!("{err}; ignoring");
                self.get_entry(date)
            }
        }
    }

    pub fn export_snapshot(&self) -> Result<String, StoreError> {
        encode_snapshot(&self.data)
    }

    /// Replaces the whole mapping with the parsed document. A document that
    /// does not parse changes nothing.
    pub fn import_snapshot(&mut self, text: &str) -> bool {
        match decode_snapshot(text) {
            Ok(data) => {
                info!(days = data.days.len(), "imported study data");
                self.data = data;
                self.persist();
                true
            }
            Err(err) => {
                warn!("{}", StoreError::ImportParse(err));
                false
            }
        }
    }

    pub fn compute_totals(&self, reference: NaiveDate) -> Totals {
        stats::compute_totals(&self.data, reference)
    }

    pub fn stats(&self, reference: NaiveDate) -> StatsResponse {
        stats::build_stats_at(reference, &self.data)
    }

    /// Every day of the given month, flagged by whether it passes `filters`.
    pub fn month_entries(
        &self,
        year: i32,
        month: u32,
        filters: &CalendarFilters,
    ) -> Result<Vec<MonthDay>, StoreError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| StoreError::InvalidDateKey(format!("{year}-{month:02}")))?;

        Ok(first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| {
                let entry = self.get_entry(date);
                MonthDay {
                    visible: filters.matches(&entry),
                    entry,
                }
            })
            .collect())
    }

    fn mutate(&mut self, date: NaiveDate, apply: impl FnOnce(&mut StoredDay)) -> DayEntry {
        let day = self.data.days.entry(date_key(date)).or_default();
        apply(day);
        self.persist();
        self.get_entry(date)
    }

    fn persist(&mut self) {
        match self.storage.save(&self.data) {
            Ok(()) => self.last_save_ok = true,
            Err(err) => {
                error!("{err}; keeping unsaved changes in memory");
                self.last_save_ok = false;
            }
        }
    }
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("study-calendar-backup-{}.json", date_key(today))
}

/// Reads the leading whole number of `input`: `"45 min"` is 45 and `"1.5"`
/// is 1. Input with no leading digits or a minus sign is rejected.
pub fn parse_minutes(input: &str) -> Result<u32, StoreError> {
    let trimmed = input.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_len = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(StoreError::InvalidMinutesInput(input.to_string()));
    }

    // Only overflow can fail here; very large inputs saturate.
    Ok(unsigned[..digits_len].parse::<u32>().unwrap_or(u32::MAX))
}

/// Whole minutes, rounding half up.
fn elapsed_minutes(elapsed_ms: i64) -> u32 {
    let minutes = elapsed_ms.saturating_add(MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn seed_data(today: NaiveDate) -> StudyData {
    let seeds = [
        (0, true, "Data structures: arrays, linked lists and their complexity.", 120),
        (-1, false, "Operating systems: process management and scheduling algorithms.", 45),
        (-2, true, "Algorithms: binary search and sorting techniques.", 90),
        (1, false, "Databases: SQL queries and normalization.", 0),
    ];

    let mut data = StudyData::default();
    for (offset, crossed, note, minutes) in seeds {
        data.days.insert(
            date_key(today + Duration::days(offset)),
            StoredDay {
                crossed,
                note: note.to_string(),
                minutes,
                ..StoredDay::default()
            },
        );
    }
    data
}
