pub mod artifact_repository;
pub mod catalog_repository;
pub mod elevenlabs_synthesis_repository;
pub mod local_synthesis_repository;
pub mod report_repository;
pub mod synthesis_repository;

pub use artifact_repository::{ArtifactRepository, FsArtifactRepository};
pub use catalog_repository::CatalogRepository;
pub use elevenlabs_synthesis_repository::{ElevenLabsSynthesisRepository, VoiceSettings};
pub use local_synthesis_repository::LocalSynthesisRepository;
pub use report_repository::{CsvReportRepository, ReportColumns, ReportError};
pub use synthesis_repository::SynthesisRepository;
