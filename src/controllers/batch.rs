use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::batch::{BatchService, BatchSummary},
    error::{AppError, AppResult},
    infrastructure::{
        config::{Config, ConfirmMode, SynthesisBackend},
        prompt::{EvictionConfirmation, FixedConfirmation, StdinConfirmation},
        repositories::{
            ArtifactRepository, CatalogRepository, CsvReportRepository,
            ElevenLabsSynthesisRepository, FsArtifactRepository, LocalSynthesisRepository,
            SynthesisRepository,
        },
    },
};

/// Runs one synthesis batch end to end: load voices, skip rendered ones,
/// synthesize, append the report.
pub struct BatchController {
    catalog_repo: Arc<CatalogRepository>,
    artifact_repo: Arc<FsArtifactRepository>,
    report_repo: Arc<CsvReportRepository>,
    batch_service: Arc<BatchService>,
}

impl BatchController {
    pub fn new(
        catalog_repo: Arc<CatalogRepository>,
        artifact_repo: Arc<FsArtifactRepository>,
        report_repo: Arc<CsvReportRepository>,
        batch_service: Arc<BatchService>,
    ) -> Self {
        Self {
            catalog_repo,
            artifact_repo,
            report_repo,
            batch_service,
        }
    }

    /// Wire every collaborator from configuration
    pub fn from_config(config: &Config, cancel_token: CancellationToken) -> AppResult<Self> {
        let synthesis_repo: Arc<dyn SynthesisRepository> = match config.backend {
            SynthesisBackend::ElevenLabs => Arc::new(ElevenLabsSynthesisRepository::new(
                config.api_key.clone(),
                &config.endpoint_base,
                config.model_id.clone(),
                config.voice_settings.clone(),
                config.request_timeout,
            )?),
            SynthesisBackend::Local => Arc::new(LocalSynthesisRepository::new(
                &config.endpoint_base,
                config.request_timeout,
            )?),
        };

        let confirmation: Arc<dyn EvictionConfirmation> = match config.confirm_eviction {
            ConfirmMode::Prompt => Arc::new(StdinConfirmation::new(cancel_token.clone())),
            ConfirmMode::Yes => Arc::new(FixedConfirmation(true)),
            ConfirmMode::No => Arc::new(FixedConfirmation(false)),
        };

        let artifact_repo = Arc::new(FsArtifactRepository::new(&config.output.artifact_dir));
        let report_repo = Arc::new(CsvReportRepository::new(
            &config.output.report_path,
            config.output.report_columns,
        ));
        let catalog_repo = Arc::new(CatalogRepository::new(
            &config.favorites_path,
            &config.catalog_path,
        ));

        let batch_service = Arc::new(
            BatchService::new(
                synthesis_repo,
                artifact_repo.clone(),
                confirmation,
                config.retry_policy,
                config.tts_text.clone(),
            )
            .with_record_failures(config.record_failures)
            .with_cancel_token(cancel_token),
        );

        Ok(Self::new(catalog_repo, artifact_repo, report_repo, batch_service))
    }

    pub async fn run(&self) -> AppResult<BatchSummary> {
        let tasks = self.catalog_repo.load_tasks().await?;

        self.artifact_repo.ensure_dir().await?;
        let existing = self.artifact_repo.existing_names().await?;
        tracing::info!(
            existing = existing.len(),
            dir = %self.artifact_repo.dir().display(),
            "Existing audio files found"
        );
        let already_done: HashSet<String> = existing.into_iter().collect();

        let summary = self.batch_service.run(tasks, &already_done).await;

        // Outcomes are persisted even when the run stopped early
        if summary.outcomes.is_empty() {
            tracing::info!("No new audio files were generated in this session");
        } else {
            let written = self.report_repo.append(&summary.outcomes).await?;
            tracing::info!(
                rows = written,
                path = %self.report_repo.path().display(),
                "Report updated"
            );
        }

        if let Some(reason) = &summary.stopped {
            if reason.is_fatal() {
                return Err(AppError::Aborted(reason.clone()));
            }
        }

        Ok(summary)
    }
}
