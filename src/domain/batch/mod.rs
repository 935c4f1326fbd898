pub mod error;
pub mod model;
pub mod policy;
pub mod service;

pub use error::{ArtifactError, SynthesisError};
pub use model::{BatchSummary, LibraryEntry, OutcomeRecord, OutcomeStatus, StopReason, VoiceTask};
pub use policy::RetryPolicy;
pub use service::BatchService;
