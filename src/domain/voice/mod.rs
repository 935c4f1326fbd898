pub mod error;
pub mod model;
pub mod service;

pub use error::VoiceSourceError;
pub use model::{CatalogVoice, VoiceCatalog};
pub use service::{build_task_queue, parse_favorites};
