use crate::domain::batch::{ArtifactError, StopReason};
use crate::domain::voice::VoiceSourceError;
use crate::infrastructure::config::ConfigError;
use crate::infrastructure::repositories::ReportError;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load voices: {0}")]
    VoiceSource(#[from] VoiceSourceError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Batch aborted: {0}")]
    Aborted(StopReason),
}

impl AppError {
    /// Whether the error happened before any synthesis request was sent
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::VoiceSource(_) | Self::HttpClient(_)
        )
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
