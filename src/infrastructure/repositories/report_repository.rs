use super::artifact_repository::{FsArtifactRepository, ARTIFACT_EXTENSION};
use crate::domain::batch::{ArtifactError, OutcomeRecord, OutcomeStatus};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Cell written for outcomes that did not produce an artifact
pub const FAILED_MARKER: &str = "FAILED";

/// Column layout of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportColumns {
    /// `id,filename`, the second cell holds the bare file name
    IdFilename,
    /// `name,local_path`, the second cell holds the full artifact path
    NameLocalPath,
}

impl ReportColumns {
    pub fn header(&self) -> [&'static str; 2] {
        match self {
            ReportColumns::IdFilename => ["id", "filename"],
            ReportColumns::NameLocalPath => ["name", "local_path"],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("artifact directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

impl From<ArtifactError> for ReportError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::Io { path, source } => ReportError::Io { path, source },
            ArtifactError::AlreadyExists(path) => ReportError::Io {
                path,
                source: std::io::Error::from(ErrorKind::AlreadyExists),
            },
            ArtifactError::InvalidName(name) => ReportError::Io {
                path: PathBuf::from(name),
                source: std::io::Error::from(ErrorKind::InvalidInput),
            },
        }
    }
}

/// Append-only CSV report of batch outcomes
pub struct CsvReportRepository {
    path: PathBuf,
    columns: ReportColumns,
}

impl CsvReportRepository {
    pub fn new(path: impl Into<PathBuf>, columns: ReportColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn row_for(&self, outcome: &OutcomeRecord) -> [String; 2] {
        let cell = match (&outcome.status, self.columns) {
            (OutcomeStatus::Failed, _) => FAILED_MARKER.to_string(),
            (OutcomeStatus::Saved(path), ReportColumns::NameLocalPath) => {
                path.display().to_string()
            }
            (OutcomeStatus::Saved(path), ReportColumns::IdFilename) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        };
        [outcome.display_name.clone(), cell]
    }

    /// Append one row per outcome, sorted. The header is only written when
    /// the report does not exist yet or is empty.
    pub async fn append(&self, outcomes: &[OutcomeRecord]) -> Result<usize, ReportError> {
        if outcomes.is_empty() {
            return Ok(0);
        }

        let mut rows: Vec<[String; 2]> = outcomes.iter().map(|o| self.row_for(o)).collect();
        rows.sort();

        let needs_header = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(source) => return Err(self.io_error(source)),
        };

        let bytes = encode(&rows, needs_header.then(|| self.columns.header()))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(&bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        file.flush().await.map_err(|source| self.io_error(source))?;

        tracing::info!(
            path = %self.path.display(),
            rows = rows.len(),
            header_written = needs_header,
            "Report rows appended"
        );

        Ok(rows.len())
    }

    /// Replace the report with one row per artifact found in the directory.
    /// Leaves the report untouched when the directory holds no artifacts.
    pub async fn rebuild(&self, artifacts: &FsArtifactRepository) -> Result<usize, ReportError> {
        let is_dir = tokio::fs::metadata(artifacts.dir())
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ReportError::MissingDirectory(artifacts.dir().to_path_buf()));
        }

        let files = artifacts.list_files().await?;
        if files.is_empty() {
            tracing::warn!(
                dir = %artifacts.dir().display(),
                "No .{} files found, report not written",
                ARTIFACT_EXTENSION
            );
            return Ok(0);
        }

        let rows: Vec<[String; 2]> = files
            .iter()
            .map(|file| {
                let name = file
                    .strip_suffix(&format!(".{}", ARTIFACT_EXTENSION))
                    .unwrap_or(file);
                self.row_for(&OutcomeRecord::saved(name, artifacts.dir().join(file)))
            })
            .collect();

        let bytes = encode(&rows, Some(self.columns.header()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| self.io_error(source))?;

        tracing::info!(
            path = %self.path.display(),
            rows = rows.len(),
            "Report rebuilt from artifact directory"
        );

        Ok(rows.len())
    }

    fn io_error(&self, source: std::io::Error) -> ReportError {
        ReportError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn encode(rows: &[[String; 2]], header: Option<[&str; 2]>) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if let Some(header) = header {
        writer.write_record(header)?;
    }
    for row in rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(csv::Error::from(e.into_error())))
}
