use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/today", get(handlers::get_today))
        .route(
            "/api/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/api/entries/:id",
            put(handlers::update_entry).delete(handlers::delete_entry),
        )
        .route("/api/import", post(handlers::import_entries))
        .route(
            "/api/sample-data",
            post(handlers::add_sample_entries).delete(handlers::remove_sample_entries),
        )
        .route("/api/report", get(handlers::get_report))
        .route("/api/report/export", get(handlers::export_report))
        .route("/api/export", get(handlers::export_all))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/calendar/day", get(handlers::get_calendar_day))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::save_settings),
        )
        .route("/api/settings/categories", post(handlers::add_category))
        .route("/api/settings/categories/:id", delete(handlers::remove_category))
        .route("/api/settings/quick-buttons", post(handlers::add_quick_button))
        .route(
            "/api/settings/quick-buttons/:id",
            delete(handlers::remove_quick_button),
        )
        .route("/api/settings/reorder", post(handlers::reorder_settings))
        .route("/api/insights", post(handlers::get_insights))
        .with_state(state)
}
