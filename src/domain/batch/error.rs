use std::path::PathBuf;

/// Failures reported by a synthesis backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    /// Transport failure or timeout
    #[error("network error: {0}")]
    Network(String),
    #[error("voice library is full: {0}")]
    LibraryFull(String),
    #[error("monthly voice add/edit limit reached: {0}")]
    MonthlyEditLimitReached(String),
    #[error("unrecognized service response (status {status}): {body}")]
    Unrecognized { status: u16, body: String },
}

impl SynthesisError {
    /// Nothing else can succeed this run once this is returned
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MonthlyEditLimitReached(_))
    }
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        SynthesisError::Network(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// The display name cannot be used as a file name
    #[error("invalid artifact name: '{0}'")]
    InvalidName(String),
    #[error("artifact I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
