use super::synthesis_repository::SynthesisRepository;
use crate::domain::batch::{LibraryEntry, SynthesisError};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_LOCAL_BASE_URL: &str = "http://127.0.0.1:8020";

#[derive(Debug, Serialize)]
struct LocalSpeechRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

/// Self-hosted TTS server. It has no voice library, so listing is always
/// empty and deletion does nothing.
pub struct LocalSynthesisRepository {
    http_client: reqwest::Client,
    base_url: String,
}

impl LocalSynthesisRepository {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SynthesisRepository for LocalSynthesisRepository {
    async fn synthesize(
        &self,
        voice_reference: &str,
        text: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        tracing::debug!(
            voice_reference = voice_reference,
            text_length = text.len(),
            "Calling local TTS server"
        );

        let response = self
            .http_client
            .post(format!("{}/tts", self.base_url))
            .json(&LocalSpeechRequest {
                text,
                voice: voice_reference,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SynthesisError::Unrecognized {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn list_library_entries(&self) -> Result<Vec<LibraryEntry>, SynthesisError> {
        Ok(Vec::new())
    }

    async fn delete_library_entry(&self, voice_reference: &str) -> Result<(), SynthesisError> {
        tracing::debug!(
            voice_reference = voice_reference,
            "Local TTS server has no voice library, nothing to delete"
        );
        Ok(())
    }
}
