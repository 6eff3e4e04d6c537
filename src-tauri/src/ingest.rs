//! Top-level boundary around file processing.
//!
//! Every failure while loading a workbook stops here: it is logged and
//! reported for that file only, so other files in the same selection still
//! load.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::DEFAULT_SHEET_NAME;
use crate::exam::{self, ExamRecord, NormalizeError, NormalizeOptions};
use crate::excel::{self, ExcelError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file type for '{file}' (expected {expected})")]
    UnsupportedExtension { file: String, expected: String },
    #[error(transparent)]
    Excel(#[from] ExcelError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("processing task failed: {0}")]
    Task(String),
}

impl IngestError {
    pub fn is_sheet_not_found(&self) -> bool {
        matches!(self, IngestError::Excel(e) if e.is_sheet_not_found())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOptions {
    pub sheet_name: String,
    pub accepted_extensions: Vec<String>,
    pub normalize: NormalizeOptions,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            accepted_extensions: vec!["xlsx".to_string(), "xls".to_string()],
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Bytes of a file chosen in the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Summary of one successfully loaded workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReport {
    pub id: Uuid,
    pub file_name: String,
    pub checksum: String,
    pub sheet: String,
    pub rows_read: usize,
    pub records: usize,
    pub invalid_dates: usize,
    pub missing_columns: Vec<String>,
}

#[derive(Debug)]
pub struct LoadedWorkbook {
    pub report: UploadReport,
    pub records: Vec<ExamRecord>,
}

/// Result of loading one file of a selection
#[derive(Debug)]
pub struct FileLoad {
    pub file_name: String,
    pub result: Result<LoadedWorkbook, IngestError>,
}

impl FileLoad {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Load a workbook from disk
pub fn load_workbook(path: &Path, options: &IngestOptions) -> Result<LoadedWorkbook, IngestError> {
    let file_name = file_name_of(path);
    check_extension(&file_name, options)?;

    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    load_workbook_bytes(&file_name, &bytes, options)
}

/// Load a workbook from an uploaded file's bytes
pub fn load_workbook_bytes(
    file_name: &str,
    bytes: &[u8],
    options: &IngestOptions,
) -> Result<LoadedWorkbook, IngestError> {
    check_extension(file_name, options)?;

    let checksum = excel::compute_checksum(bytes);
    let sheet = excel::read_sheet_from_bytes(bytes, &options.sheet_name)?;

    let missing_columns: Vec<String> = exam::missing_columns(&sheet.headers)
        .into_iter()
        .map(String::from)
        .collect();
    if !missing_columns.is_empty() {
        tracing::warn!(file = file_name, missing = ?missing_columns, "timetable is missing expected columns");
    }

    let records = exam::normalize(&sheet.rows, &options.normalize)?;
    let invalid_dates = records.iter().filter(|r| !r.date.is_valid()).count();

    let report = UploadReport {
        id: Uuid::new_v4(),
        file_name: file_name.to_string(),
        checksum,
        sheet: sheet.sheet,
        rows_read: sheet.rows.len(),
        records: records.len(),
        invalid_dates,
        missing_columns,
    };

    Ok(LoadedWorkbook { report, records })
}

/// Load every file of a selection.
///
/// Files are read concurrently and decoded on the blocking pool; the returned
/// loads follow the order of `paths`.
pub async fn load_files(paths: Vec<PathBuf>, options: &IngestOptions) -> Vec<FileLoad> {
    let loads = paths.into_iter().map(|path| {
        let options = options.clone();
        async move {
            let file_name = file_name_of(&path);
            let result = match check_extension(&file_name, &options) {
                Err(e) => Err(e),
                Ok(()) => match tokio::fs::read(&path).await {
                    Ok(bytes) => decode(file_name.clone(), bytes, options).await,
                    Err(source) => Err(IngestError::Io { path, source }),
                },
            };
            finish(file_name, result)
        }
    });

    join_all(loads).await
}

/// Load uploaded file contents, in selection order
pub async fn load_uploads(uploads: Vec<Upload>, options: &IngestOptions) -> Vec<FileLoad> {
    let loads = uploads.into_iter().map(|upload| {
        let options = options.clone();
        async move {
            let result = decode(upload.file_name.clone(), upload.bytes, options).await;
            finish(upload.file_name, result)
        }
    });

    join_all(loads).await
}

async fn decode(
    file_name: String,
    bytes: Vec<u8>,
    options: IngestOptions,
) -> Result<LoadedWorkbook, IngestError> {
    tokio::task::spawn_blocking(move || load_workbook_bytes(&file_name, &bytes, &options))
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
}

fn finish(file_name: String, result: Result<LoadedWorkbook, IngestError>) -> FileLoad {
    match &result {
        Ok(loaded) => tracing::info!(
            file = %file_name,
            records = loaded.report.records,
            invalid_dates = loaded.report.invalid_dates,
            "loaded timetable"
        ),
        Err(e) if e.is_sheet_not_found() => {
            tracing::warn!(file = %file_name, error = %e, "skipping workbook without timetable sheet")
        }
        Err(e) => tracing::error!(file = %file_name, error = %e, "error processing file"),
    }

    FileLoad { file_name, result }
}

fn check_extension(file_name: &str, options: &IngestOptions) -> Result<(), IngestError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if options
        .accepted_extensions
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(extension))
    {
        Ok(())
    } else {
        Err(IngestError::UnsupportedExtension {
            file: file_name.to_string(),
            expected: options
                .accepted_extensions
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_extension() {
        let options = IngestOptions::default();
        assert!(check_extension("timetable.xlsx", &options).is_ok());
        assert!(check_extension("TIMETABLE.XLS", &options).is_ok());

        let err = check_extension("timetable.csv", &options).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedExtension { .. }));
        assert!(err.to_string().contains(".xlsx, .xls"));
        assert!(check_extension("timetable", &options).is_err());
    }

    #[test]
    fn test_garbage_bytes_fail_without_panic() {
        let err = load_workbook_bytes("broken.xlsx", b"garbage", &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::Excel(_)));
        assert!(!err.is_sheet_not_found());
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let loads = load_files(
            vec![PathBuf::from("/no/such/dir/timetable.xlsx")],
            &IngestOptions::default(),
        )
        .await;

        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].file_name, "timetable.xlsx");
        assert!(matches!(loads[0].result, Err(IngestError::Io { .. })));
    }
}
