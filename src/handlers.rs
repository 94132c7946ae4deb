use crate::entries;
use crate::errors::AppError;
use crate::export::{CsvExport, build_export};
use crate::insights::analyze;
use crate::models::{
    CalendarMonth, CalendarQuery, DayDetail, DayQuery, EntryDraft, ImportResponse, InsightsRequest,
    InsightsResponse, IntakeCategory, LogEntry, NewCategoryRequest, NewQuickButtonRequest,
    QuickButton, Report, ReorderList, ReorderRequest, ReportQuery, TodaySummary, UserSettings,
};
use crate::settings;
use crate::state::AppState;
use crate::stats::{
    ReportWindow, build_report, calendar_month, entries_on_day, range_filter, sort_newest_first,
    today_summary,
};
use crate::storage::{persist_entries, persist_settings};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, Local, NaiveDate};
use tracing::info;

const REPORT_DEFAULT_DAYS: i64 = 7;
/// Longest date range a report or report export may cover.
pub const REPORT_MAX_DAYS: i64 = 3660;
const SAMPLE_DAYS: u32 = 30;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    let summary = today_summary(&data.entries, today(), &Local);
    Html(render_index(&summary, &data.settings))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodaySummary>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(today_summary(&data.entries, today(), &Local)))
}

pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    let data = state.data.lock().await;
    Json(data.entries.clone())
}

pub async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<EntryDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    let Json(draft) = payload?;
    let mut data = state.data.lock().await;
    let entry = entries::add_entry(&mut data.entries, draft)?;
    persist_entries(&state.data_dir, &data.entries).await?;

    info!("logged {:?} entry {}", entry.entry_type, entry.id);
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EntryDraft>, JsonRejection>,
) -> Result<Json<LogEntry>, AppError> {
    let Json(draft) = payload?;
    let mut data = state.data.lock().await;
    let entry = entries::update_entry(&mut data.entries, &id, draft)?;
    sort_newest_first(&mut data.entries);
    persist_entries(&state.data_dir, &data.entries).await?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    entries::delete_entry(&mut data.entries, &id)?;
    persist_entries(&state.data_dir, &data.entries).await?;

    info!("deleted entry {id}");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn import_entries(
    State(state): State<AppState>,
    payload: Result<Json<Vec<LogEntry>>, JsonRejection>,
) -> Result<Json<ImportResponse>, AppError> {
    let Json(incoming) = payload?;
    let offered = incoming.len();
    let mut data = state.data.lock().await;
    let added = entries::import_merge(&mut data.entries, incoming);
    persist_entries(&state.data_dir, &data.entries).await?;

    info!("imported {added} of {offered} entries");
    Ok(Json(ImportResponse {
        added,
        total: data.entries.len(),
    }))
}

pub async fn add_sample_entries(
    State(state): State<AppState>,
) -> Result<Json<ImportResponse>, AppError> {
    let seed = uuid::Uuid::new_v4().as_u128() as u64;
    let generated = entries::generate_sample_data(today(), SAMPLE_DAYS, &Local, seed);
    let added = generated.len();

    let mut data = state.data.lock().await;
    data.entries.extend(generated);
    sort_newest_first(&mut data.entries);
    persist_entries(&state.data_dir, &data.entries).await?;

    info!("generated {added} sample entries over {SAMPLE_DAYS} days");
    Ok(Json(ImportResponse {
        added,
        total: data.entries.len(),
    }))
}

pub async fn remove_sample_entries(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    let removed = entries::remove_sample_data(&mut data.entries);
    persist_entries(&state.data_dir, &data.entries).await?;

    info!("removed {removed} sample entries");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, AppError> {
    let window = report_window(query)?;
    let data = state.data.lock().await;
    Ok(Json(build_report(&data.entries, &data.settings, &window, &Local)))
}

pub async fn export_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let window = report_window(query)?;
    let data = state.data.lock().await;
    let filtered = range_filter(&data.entries, &window, &Local);
    let export = build_export(
        &filtered,
        &data.settings.intake_categories,
        Local::now().naive_local(),
        &Local,
    )?;
    Ok(csv_response(export))
}

pub async fn export_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let data = state.data.lock().await;
    let export = build_export(
        &data.entries,
        &data.settings.intake_categories,
        Local::now().naive_local(),
        &Local,
    )?;
    Ok(csv_response(export))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>, AppError> {
    let now = today();
    let year = query.year.unwrap_or(now.year());
    let month = query.month.unwrap_or(now.month());

    let data = state.data.lock().await;
    calendar_month(&data.entries, year, month, &Local)
        .map(Json)
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))
}

pub async fn get_calendar_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Json<DayDetail> {
    let data = state.data.lock().await;
    Json(entries_on_day(&data.entries, query.date, &Local))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<UserSettings> {
    let data = state.data.lock().await;
    Json(data.settings.clone())
}

pub async fn save_settings(
    State(state): State<AppState>,
    Json(payload): Json<UserSettings>,
) -> Result<Json<UserSettings>, AppError> {
    let prepared = settings::prepare_for_save(payload)?;
    let mut data = state.data.lock().await;
    data.settings = prepared;
    persist_settings(&state.data_dir, &data.settings).await?;

    info!("settings saved");
    Ok(Json(data.settings.clone()))
}

pub async fn add_category(
    State(state): State<AppState>,
    Json(payload): Json<NewCategoryRequest>,
) -> Result<(StatusCode, Json<IntakeCategory>), AppError> {
    let mut data = state.data.lock().await;
    let category = settings::add_intake_category(&mut data.settings, &payload.label)?;
    persist_settings(&state.data_dir, &data.settings).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn remove_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    settings::remove_intake_category(&mut data.settings, &id)?;
    persist_settings(&state.data_dir, &data.settings).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_quick_button(
    State(state): State<AppState>,
    Json(payload): Json<NewQuickButtonRequest>,
) -> Result<(StatusCode, Json<QuickButton>), AppError> {
    let mut data = state.data.lock().await;
    let button = settings::add_quick_button(
        &mut data.settings,
        payload.entry_type,
        &payload.label,
        payload.amount,
    )?;
    persist_settings(&state.data_dir, &data.settings).await?;
    Ok((StatusCode::CREATED, Json(button)))
}

pub async fn remove_quick_button(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    settings::remove_quick_button(&mut data.settings, &id)?;
    persist_settings(&state.data_dir, &data.settings).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder_settings(
    State(state): State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<UserSettings>, AppError> {
    let mut data = state.data.lock().await;
    match payload.list {
        ReorderList::Categories => {
            settings::move_item(&mut data.settings.intake_categories, payload.from, payload.to)?
        }
        ReorderList::QuickButtons => {
            settings::move_item(&mut data.settings.quick_buttons, payload.from, payload.to)?
        }
    }
    persist_settings(&state.data_dir, &data.settings).await?;
    Ok(Json(data.settings.clone()))
}

pub async fn get_insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Json<InsightsResponse> {
    let (log, profile) = {
        let data = state.data.lock().await;
        (data.entries.clone(), data.settings.clone())
    };
    Json(analyze(&state.insights, &log, &profile, today(), request).await)
}

/// Fills missing bounds with the last week. Inverted ranges pass through and
/// yield an empty report; ranges longer than [`REPORT_MAX_DAYS`] are refused.
fn report_window(query: ReportQuery) -> Result<ReportWindow, AppError> {
    let defaults = ReportWindow::last_days(today(), REPORT_DEFAULT_DAYS);
    let window = ReportWindow {
        start_date: query.start_date.unwrap_or(defaults.start_date),
        end_date: query.end_date.unwrap_or(defaults.end_date),
        start_time: query.start_time.unwrap_or(defaults.start_time),
        end_time: query.end_time.unwrap_or(defaults.end_time),
    };
    if window.span_days() > REPORT_MAX_DAYS {
        return Err(AppError::bad_request(format!(
            "report range {}..{} exceeds {REPORT_MAX_DAYS} days",
            window.start_date, window.end_date
        )));
    }
    Ok(window)
}

fn csv_response(export: CsvExport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
