//! Month-view calendar for examination timetable spreadsheets.
//!
//! The core (workbook reading, normalization, grid computation and the view
//! session) is plain Rust; the Tauri shell in `commands` is only built with
//! the `desktop` feature.

pub mod calendar;
pub mod config;
pub mod exam;
pub mod excel;
pub mod ingest;
pub mod logging;
pub mod session;
pub mod store;

#[cfg(feature = "desktop")]
mod commands;

pub use calendar::{build_grid, CalendarGrid, QualificationFilter, YearMonth};
pub use config::CalendarConfig;
pub use exam::{normalize, ExamDate, ExamRecord};
pub use ingest::{load_files, load_uploads, load_workbook, load_workbook_bytes, IngestError, IngestOptions};
pub use session::{CalendarSession, CalendarView, UploadOutcome};
pub use store::ExamStore;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::AppState;
    use std::sync::Arc;
    use tauri::Manager;

    logging::init();

    let config = CalendarConfig::load_or_default();
    tracing::info!(sheet = %config.sheet_name, month = %config.initial_month, "starting exam calendar");

    let app_state = Arc::new(AppState::new(config));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // Config commands
            commands::get_config,
            commands::get_filter_options,
            // Upload commands
            commands::load_exam_files,
            commands::load_uploaded_files,
            commands::pick_and_load_exam_files,
            commands::list_workbook_sheets,
            commands::list_uploaded_workbook_sheets,
            // Calendar commands
            commands::get_calendar,
            commands::set_filter,
            commands::go_to_month,
            commands::next_month,
            commands::prev_month,
            commands::select_day,
            commands::clear_selection,
        ])
        .setup(|app| {
            #[cfg(debug_assertions)]
            {
                if let Some(window) = app.get_webview_window("main") {
                    window.open_devtools();
                }
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
