use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tauri::{command, AppHandle, Emitter, State, Window};
use tauri_plugin_dialog::DialogExt;
use tokio::sync::Mutex;

use crate::calendar::{FilterOption, QualificationFilter, YearMonth};
use crate::config::CalendarConfig;
use crate::excel::{self, ExcelError, SheetInfo};
use crate::ingest::{self, IngestError, Upload};
use crate::session::{CalendarSession, CalendarView, UploadOutcome};

pub struct AppState {
    pub config: CalendarConfig,
    pub session: Mutex<CalendarSession>,
}

impl AppState {
    pub fn new(config: CalendarConfig) -> Self {
        let session = CalendarSession::from_config(&config);
        AppState {
            config,
            session: Mutex::new(session),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl From<IngestError> for CommandError {
    fn from(e: IngestError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<ExcelError> for CommandError {
    fn from(e: ExcelError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

// ==================== Config Commands ====================

#[command]
pub fn get_config(state: State<'_, Arc<AppState>>) -> CalendarConfig {
    state.config.clone()
}

/// Configured selector entries plus any other qualification seen in loaded files
#[command]
pub async fn get_filter_options(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<FilterOption>, CommandError> {
    let session = state.session.lock().await;
    Ok(session.filter_options(&state.config.filter_options))
}

// ==================== Upload Commands ====================

/// Load timetable workbooks from disk; each file succeeds or fails on its own
#[command]
pub async fn load_exam_files(
    window: Window,
    state: State<'_, Arc<AppState>>,
    paths: Vec<String>,
) -> Result<Vec<UploadOutcome>, CommandError> {
    let paths = paths.into_iter().map(PathBuf::from).collect();
    let loads = ingest::load_files(paths, &state.config.ingest_options()).await;

    let outcomes = state.session.lock().await.apply_loads(loads);
    let _ = window.emit("exams-loaded", &outcomes);

    Ok(outcomes)
}

/// Load files the webview read itself (an `<input type="file">` selection)
#[command]
pub async fn load_uploaded_files(
    window: Window,
    state: State<'_, Arc<AppState>>,
    uploads: Vec<Upload>,
) -> Result<Vec<UploadOutcome>, CommandError> {
    let loads = ingest::load_uploads(uploads, &state.config.ingest_options()).await;

    let outcomes = state.session.lock().await.apply_loads(loads);
    let _ = window.emit("exams-loaded", &outcomes);

    Ok(outcomes)
}

/// Show the native file picker and load whatever the user chose
#[command]
pub async fn pick_and_load_exam_files(
    app: AppHandle,
    window: Window,
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<UploadOutcome>, CommandError> {
    let extensions = state.config.accepted_extensions.clone();

    let picked = tokio::task::spawn_blocking(move || {
        let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
        app.dialog()
            .file()
            .add_filter("Exam timetables", &extensions)
            .blocking_pick_files()
    })
    .await
    .map_err(|e| CommandError { message: format!("Task join error: {}", e) })?;

    let Some(files) = picked else {
        return Ok(Vec::new());
    };

    let paths: Vec<PathBuf> = files
        .into_iter()
        .filter_map(|file| file.into_path().ok())
        .collect();

    let loads = ingest::load_files(paths, &state.config.ingest_options()).await;
    let outcomes = state.session.lock().await.apply_loads(loads);
    let _ = window.emit("exams-loaded", &outcomes);

    Ok(outcomes)
}

/// Get the list of sheets in a workbook
#[command]
pub async fn list_workbook_sheets(path: String) -> Result<Vec<SheetInfo>, CommandError> {
    let result = tokio::task::spawn_blocking(move || excel::get_sheets(&PathBuf::from(path)))
        .await
        .map_err(|e| CommandError { message: format!("Task join error: {}", e) })??;

    Ok(result)
}

/// Get the list of sheets in a workbook the webview read itself
#[command]
pub async fn list_uploaded_workbook_sheets(upload: Upload) -> Result<Vec<SheetInfo>, CommandError> {
    let result = tokio::task::spawn_blocking(move || excel::get_sheets_from_bytes(&upload.bytes))
        .await
        .map_err(|e| CommandError { message: format!("Task join error: {}", e) })??;

    Ok(result)
}

// ==================== Calendar Commands ====================

#[command]
pub async fn get_calendar(state: State<'_, Arc<AppState>>) -> Result<CalendarView, CommandError> {
    Ok(state.session.lock().await.view())
}

/// Apply a selector value (`"ALL"` or a qualification)
#[command]
pub async fn set_filter(
    state: State<'_, Arc<AppState>>,
    value: String,
) -> Result<CalendarView, CommandError> {
    let mut session = state.session.lock().await;
    session.set_filter(QualificationFilter::from_value(&value));
    Ok(session.view())
}

/// Jump straight to a month; `month` is 1-based
#[command]
pub async fn go_to_month(
    state: State<'_, Arc<AppState>>,
    year: i32,
    month: u32,
) -> Result<CalendarView, CommandError> {
    let target = YearMonth::new(year, month).ok_or_else(|| CommandError {
        message: format!("month {} is out of range (expected 1-12)", month),
    })?;

    let mut session = state.session.lock().await;
    session.go_to(target);
    Ok(session.view())
}

#[command]
pub async fn next_month(state: State<'_, Arc<AppState>>) -> Result<CalendarView, CommandError> {
    let mut session = state.session.lock().await;
    session.next_month();
    Ok(session.view())
}

#[command]
pub async fn prev_month(state: State<'_, Arc<AppState>>) -> Result<CalendarView, CommandError> {
    let mut session = state.session.lock().await;
    session.prev_month();
    Ok(session.view())
}

/// Select a day for the detail panel; days without exams leave it unchanged
#[command]
pub async fn select_day(
    state: State<'_, Arc<AppState>>,
    day: u32,
) -> Result<CalendarView, CommandError> {
    let mut session = state.session.lock().await;
    session.select_day(day);
    Ok(session.view())
}

#[command]
pub async fn clear_selection(state: State<'_, Arc<AppState>>) -> Result<CalendarView, CommandError> {
    let mut session = state.session.lock().await;
    session.clear_selection();
    Ok(session.view())
}
