use std::sync::Arc;

use crate::{
    error::AppResult,
    infrastructure::{
        config::OutputConfig,
        repositories::{CsvReportRepository, FsArtifactRepository},
    },
};

/// Regenerates the report from the artifacts on disk
pub struct ReportController {
    artifact_repo: Arc<FsArtifactRepository>,
    report_repo: Arc<CsvReportRepository>,
}

impl ReportController {
    pub fn new(artifact_repo: Arc<FsArtifactRepository>, report_repo: Arc<CsvReportRepository>) -> Self {
        Self {
            artifact_repo,
            report_repo,
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(
            Arc::new(FsArtifactRepository::new(&output.artifact_dir)),
            Arc::new(CsvReportRepository::new(
                &output.report_path,
                output.report_columns,
            )),
        )
    }

    /// Returns the number of rows written
    pub async fn rebuild(&self) -> AppResult<usize> {
        tracing::info!(
            dir = %self.artifact_repo.dir().display(),
            "Scanning for audio files"
        );

        let rows = self.report_repo.rebuild(&self.artifact_repo).await?;
        if rows > 0 {
            tracing::info!(
                rows = rows,
                path = %self.report_repo.path().display(),
                "Report created"
            );
        }

        Ok(rows)
    }
}
