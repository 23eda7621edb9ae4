use crate::models::{
    date_key, DailyPoint, MonthlyPoint, StatsResponse, StudyData, Totals, WeeklyPoint,
};
use chrono::{Datelike, Duration, NaiveDate};

const WEEK_COUNT: i64 = 8;
const MONTH_COUNT: u32 = 6;

/// Weekly, monthly and all-time minute totals relative to `reference`.
///
/// Weeks start on Sunday. Entries with malformed keys only count toward the
/// all-time total.
pub fn compute_totals(data: &StudyData, reference: NaiveDate) -> Totals {
    let start = week_start(reference);
    let end = shift(start, 6).unwrap_or(NaiveDate::MAX);

    let total_minutes = data
        .days
        .values()
        .map(|day| u64::from(day.minutes))
        .sum();

    let mut weekly_minutes = 0u64;
    let mut monthly_minutes = 0u64;
    for (date, day) in data.dated() {
        let minutes = u64::from(day.minutes);
        if date >= start && date <= end {
            weekly_minutes += minutes;
        }
        if date.year() == reference.year() && date.month() == reference.month() {
            monthly_minutes += minutes;
        }
    }

    Totals {
        weekly_minutes,
        monthly_minutes,
        total_minutes,
    }
}

pub fn build_stats_at(today: NaiveDate, data: &StudyData) -> StatsResponse {
    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let Some(date) = shift(today, -offset) else {
            continue;
        };
        let day = data.days.get(&date_key(date)).cloned().unwrap_or_default();
        last_7_days.push(DailyPoint {
            date: date_key(date),
            minutes: day.minutes,
            crossed: day.crossed,
        });
    }

    let current_week_start = week_start(today);
    let mut weekly = Vec::with_capacity(WEEK_COUNT as usize);
    for offset in (0..WEEK_COUNT).rev() {
        let Some(start) = shift(current_week_start, -7 * offset) else {
            continue;
        };
        let end = shift(start, 6).unwrap_or(NaiveDate::MAX);

        let mut total_minutes = 0u64;
        let mut study_days = 0u8;
        for date in (0..7).filter_map(|day_offset| shift(start, day_offset)) {
            if let Some(day) = data.days.get(&date_key(date)) {
                total_minutes += u64::from(day.minutes);
                if day.minutes > 0 {
                    study_days += 1;
                }
            }
        }

        weekly.push(WeeklyPoint {
            week_start: date_key(start),
            end_date: date_key(end),
            total_minutes,
            study_days,
        });
    }

    let mut monthly = Vec::with_capacity(MONTH_COUNT as usize);
    for back in (0..MONTH_COUNT).rev() {
        let (year, month) = months_before(today.year(), today.month(), back);
        let mut point = MonthlyPoint {
            month: format!("{year:04}-{month:02}"),
            total_minutes: 0,
            study_days: 0,
            crossed_days: 0,
        };
        for (_, day) in data
            .dated()
            .filter(|(date, _)| date.year() == year && date.month() == month)
        {
            point.total_minutes += u64::from(day.minutes);
            if day.minutes > 0 {
                point.study_days += 1;
            }
            if day.crossed {
                point.crossed_days += 1;
            }
        }
        monthly.push(point);
    }

    StatsResponse {
        last_7_days,
        weekly,
        monthly,
    }
}

/// The Sunday on or before `date`, or `date` itself at the edge of the
/// representable range.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    shift(date, -i64::from(date.weekday().num_days_from_sunday())).unwrap_or(date)
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

fn months_before(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
