use crate::models::DayEntry;

/// Calendar view filters. All conditions must hold for a day to be shown.
#[derive(Debug, Clone, Default)]
pub struct CalendarFilters {
    pub search_query: String,
    pub notes_only: bool,
    pub completed_only: bool,
    pub time_logged_only: bool,
}

impl CalendarFilters {
    pub fn matches(&self, entry: &DayEntry) -> bool {
        let query = self.search_query.trim().to_lowercase();
        if !query.is_empty() {
            let in_note = entry.note.to_lowercase().contains(&query);
            let in_holiday = entry
                .holiday
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&query));
            if !in_note && !in_holiday {
                return false;
            }
        }

        if self.notes_only && entry.note.is_empty() {
            return false;
        }
        if self.completed_only && !entry.crossed {
            return false;
        }
        if self.time_logged_only && entry.minutes == 0 {
            return false;
        }

        true
    }
}
