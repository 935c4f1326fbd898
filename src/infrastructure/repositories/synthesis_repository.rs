use crate::domain::batch::{LibraryEntry, SynthesisError};
use async_trait::async_trait;

/// Repository for TTS synthesis and voice library operations.
/// Abstracts the underlying TTS provider (ElevenLabs, a local server, etc.)
///
/// Implementations are responsible for:
/// - Holding provider-specific settings (model, voice settings)
/// - Classifying provider error responses into `SynthesisError` kinds
/// - Managing the provider's voice library, if it has one
#[async_trait]
pub trait SynthesisRepository: Send + Sync {
    /// Synthesize `text` with the voice identified by `voice_reference`
    ///
    /// Returns the raw audio bytes (MP3 format)
    ///
    /// # Errors
    /// `LibraryFull` and `MonthlyEditLimitReached` for quota responses,
    /// `Network` for transport failures and timeouts, `Unrecognized` otherwise
    async fn synthesize(&self, voice_reference: &str, text: &str)
        -> Result<Vec<u8>, SynthesisError>;

    /// List the entries currently occupying the account's voice library
    async fn list_library_entries(&self) -> Result<Vec<LibraryEntry>, SynthesisError>;

    /// Remove one entry from the voice library
    async fn delete_library_entry(&self, voice_reference: &str) -> Result<(), SynthesisError>;
}
