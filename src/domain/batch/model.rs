use std::fmt;
use std::path::PathBuf;

/// One voice to render: the key used for the artifact and report, plus the
/// opaque identifier the synthesis backend understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTask {
    pub display_name: String,
    pub voice_reference: String,
}

impl VoiceTask {
    pub fn new(display_name: impl Into<String>, voice_reference: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            voice_reference: voice_reference.into(),
        }
    }
}

/// One slot in the remote voice library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub voice_reference: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutcomeStatus {
    Saved(PathBuf),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutcomeRecord {
    pub display_name: String,
    pub status: OutcomeStatus,
}

impl OutcomeRecord {
    pub fn saved(display_name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            display_name: display_name.into(),
            status: OutcomeStatus::Saved(path),
        }
    }

    pub fn failed(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            status: OutcomeStatus::Failed,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.status, OutcomeStatus::Saved(_))
    }
}

/// Why a run ended before the end of its queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The library was full and the operator declined the eviction cycle
    Declined,
    MonthlyEditLimitReached,
    /// No library entry could be listed for eviction
    EvictionAborted(String),
    /// Synthesis still failed after an entry was evicted
    EvictionRetryFailed(String),
    Cancelled,
    ArtifactWrite(String),
}

impl StopReason {
    /// Local I/O failures mean the output of the run cannot be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ArtifactWrite(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined => write!(f, "eviction cycle declined"),
            Self::MonthlyEditLimitReached => write!(f, "monthly voice add/edit limit reached"),
            Self::EvictionAborted(reason) => write!(f, "eviction aborted: {}", reason),
            Self::EvictionRetryFailed(name) => {
                write!(f, "synthesis of '{}' failed after eviction", name)
            }
            Self::Cancelled => write!(f, "cancelled"),
            Self::ArtifactWrite(reason) => write!(f, "could not write artifact: {}", reason),
        }
    }
}

/// Result of one batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<OutcomeRecord>,
    /// Tasks dropped up front because their artifact already existed
    pub skipped_existing: usize,
    pub stopped: Option<StopReason>,
}

impl BatchSummary {
    pub fn new(skipped_existing: usize) -> Self {
        Self {
            skipped_existing,
            ..Self::default()
        }
    }

    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_saved()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.saved_count()
    }
}
