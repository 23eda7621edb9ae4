use crate::errors::AppError;
use crate::filters::CalendarFilters;
use crate::models::{
    date_key, parse_date_key, DayEntry, DayPatch, ImportResponse, MinutesRequest, MonthResponse,
    MutationResponse, StatsResponse, Totals,
};
use crate::state::AppState;
use crate::store::{export_file_name, StudyStore};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::sync::Arc;
use tokio::task;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub q: String,
    pub notes_only: bool,
    pub completed_only: bool,
    pub time_logged_only: bool,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let store = state.store.lock().await;
    let today = store.today();
    Html(render_index(&date_key(today), &store.compute_totals(today)))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayEntry>, AppError> {
    let date = parse_date(&date)?;
    let store = state.store.lock().await;
    Ok(Json(store.get_entry(date)))
}

pub async fn update_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(patch): Json<DayPatch>,
) -> Result<Json<MutationResponse>, AppError> {
    let date = parse_date(&date)?;
    apply(&state, move |store| store.update_entry(date, patch)).await
}

pub async fn toggle_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let date = parse_date(&date)?;
    apply(&state, move |store| store.toggle_completed(date)).await
}

pub async fn start_timer(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let date = parse_date(&date)?;
    apply(&state, move |store| store.start_timer(date)).await
}

pub async fn stop_timer(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let date = parse_date(&date)?;
    apply(&state, move |store| store.stop_timer(date)).await
}

pub async fn adjust_minutes(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<MinutesRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let date = parse_date(&date)?;
    let MinutesRequest { action, amount } = payload;
    match action.trim() {
        "add" => apply(&state, move |store| store.add_minutes(date, &amount)).await,
        "sub" => apply(&state, move |store| store.subtract_minutes(date, &amount)).await,
        _ => Err(AppError::bad_request("action must be 'add' or 'sub'")),
    }
}

pub async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthResponse>, AppError> {
    let store = state.store.lock().await;
    let today = store.today();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());
    let filters = CalendarFilters {
        search_query: query.q,
        notes_only: query.notes_only,
        completed_only: query.completed_only,
        time_logged_only: query.time_logged_only,
    };

    let days = store.month_entries(year, month, &filters)?;
    Ok(Json(MonthResponse {
        year,
        month,
        today: date_key(today),
        days,
        totals: store.compute_totals(today),
    }))
}

pub async fn get_totals(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Totals>, AppError> {
    let store = state.store.lock().await;
    let reference = reference_date(&store, query.date.as_deref())?;
    Ok(Json(store.compute_totals(reference)))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let store = state.store.lock().await;
    let reference = reference_date(&store, query.date.as_deref())?;
    Ok(Json(store.stats(reference)))
}

pub async fn export_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.lock().await;
    let body = store.export_snapshot()?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(store.today()));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn import_data(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    let success = with_store(&state, move |store| store.import_snapshot(&body)).await?;
    Ok(Json(ImportResponse { success }))
}

async fn apply(
    state: &AppState,
    mutation: impl FnOnce(&mut StudyStore) -> DayEntry + Send + 'static,
) -> Result<Json<MutationResponse>, AppError> {
    let response = with_store(state, move |store| {
        let entry = mutation(store);
        MutationResponse {
            entry,
            saved: store.last_save_succeeded(),
        }
    })
    .await?;
    Ok(Json(response))
}

/// Runs a store call that may write to storage on the blocking pool, holding
/// the store lock for the whole call.
async fn with_store<T: Send + 'static>(
    state: &AppState,
    work: impl FnOnce(&mut StudyStore) -> T + Send + 'static,
) -> Result<T, AppError> {
    let mut store = Arc::clone(&state.store).lock_owned().await;
    task::spawn_blocking(move || work(&mut store))
        .await
        .map_err(AppError::internal)
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    Ok(parse_date_key(raw.trim())?)
}

fn reference_date(store: &StudyStore, raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(store.today()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{KeyValueStorage, MemoryBackend};
    use crate::store::StoreOptions;
    use axum::http::StatusCode;

    // 2025-06-02T00:00:00Z
    const T0: i64 = 1_748_822_400_000;

    fn state_over(backend: &MemoryBackend) -> AppState {
        AppState::new(StudyStore::open(
            Box::new(KeyValueStorage::new(backend.clone())),
            Arc::new(ManualClock::new(T0)),
            StoreOptions {
                seed_demo_data: false,
            },
        ))
    }

    fn path(date: &str) -> Path<String> {
        Path(date.to_string())
    }

    fn date_query(date: &str) -> Query<DateQuery> {
        Query(DateQuery {
            date: Some(date.to_string()),
        })
    }

    #[tokio::test]
    async fn failed_write_reports_unsaved_but_keeps_change() {
        let backend = MemoryBackend::new();
        let state = state_over(&backend);

        let saved = toggle_day(State(state.clone()), path("2025-06-01")).await.unwrap();
        assert!(saved.0.saved);

        backend.fail_writes(true);
        let unsaved = adjust_minutes(
            State(state.clone()),
            path("2025-06-01"),
            Json(MinutesRequest {
                action: "add".into(),
                amount: "30".into(),
            }),
        )
        .await
        .unwrap();
        assert!(!unsaved.0.saved);
        assert_eq!(unsaved.0.entry.minutes, 30);

        let current = get_day(State(state), path("2025-06-01")).await.unwrap();
        assert_eq!(current.0.minutes, 30);
        assert!(current.0.crossed);
    }

    #[tokio::test]
    async fn import_runs_through_the_store() {
        let backend = MemoryBackend::new();
        let state = state_over(&backend);

        let failed = import_data(State(state.clone()), "not json".into()).await.unwrap();
        assert!(!failed.0.success);

        let body = r#"{"2025-06-09": {"minutes": 10}}"#.to_string();
        let imported = import_data(State(state.clone()), body).await.unwrap();
        assert!(imported.0.success);
        let day = get_day(State(state), path("2025-06-09")).await.unwrap();
        assert_eq!(day.0.minutes, 10);
    }

    #[tokio::test]
    async fn out_of_range_reference_dates_are_rejected() {
        let state = state_over(&MemoryBackend::new());

        for raw in ["+262142-12-31", "-262143-01-01", "2025-13-01", "soon"] {
            let err = get_totals(State(state.clone()), date_query(raw)).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "{raw}");
            let err = get_stats(State(state.clone()), date_query(raw)).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "{raw}");
        }

        let totals = get_totals(State(state), date_query("2025-06-04")).await.unwrap();
        assert_eq!(totals.0, Totals::default());
    }

    #[tokio::test]
    async fn unknown_minutes_action_is_a_bad_request() {
        let state = state_over(&MemoryBackend::new());
        let err = adjust_minutes(
            State(state),
            path("2025-06-01"),
            Json(MinutesRequest {
                action: "multiply".into(),
                amount: "2".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
