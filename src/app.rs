use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/days/:date", get(handlers::get_day).patch(handlers::update_day))
        .route("/api/days/:date/toggle", post(handlers::toggle_day))
        .route("/api/days/:date/timer/start", post(handlers::start_timer))
        .route("/api/days/:date/timer/stop", post(handlers::stop_timer))
        .route("/api/days/:date/minutes", post(handlers::adjust_minutes))
        .route("/api/month", get(handlers::get_month))
        .route("/api/totals", get(handlers::get_totals))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/export", get(handlers::export_data))
        .route("/api/import", post(handlers::import_data))
        .with_state(state)
}
