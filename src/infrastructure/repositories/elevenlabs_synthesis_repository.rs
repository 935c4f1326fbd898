use super::synthesis_repository::SynthesisRepository;
use crate::domain::batch::{LibraryEntry, SynthesisError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// `detail.status` values ElevenLabs uses for quota errors
const LIBRARY_FULL_STATUS: &str = "add_limit_reached";
const MONTHLY_LIMIT_STATUS: &str = "voice_add_edit_limit_reached";

/// Voice settings sent with every synthesis request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.7,
            similarity_boost: 0.75,
            style: 0.3,
            use_speaker_boost: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<LibraryVoice>,
}

#[derive(Debug, Deserialize)]
struct LibraryVoice {
    voice_id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    status: Option<String>,
    message: Option<String>,
}

/// ElevenLabs implementation of the synthesis repository
pub struct ElevenLabsSynthesisRepository {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

impl ElevenLabsSynthesisRepository {
    pub fn new(
        api_key: String,
        base_url: &str,
        model_id: String,
        voice_settings: VoiceSettings,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model_id,
            voice_settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn error_from_response(response: reqwest::Response) -> SynthesisError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        classify_error(status, &body)
    }
}

/// Map an ElevenLabs error response onto a `SynthesisError` kind
pub fn classify_error(status: u16, body: &str) -> SynthesisError {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) => {
            return SynthesisError::Unrecognized {
                status,
                body: body.to_string(),
            }
        }
    };

    let message = detail.message.unwrap_or_default();
    match detail.status.as_deref() {
        Some(LIBRARY_FULL_STATUS) => SynthesisError::LibraryFull(message),
        Some(MONTHLY_LIMIT_STATUS) => SynthesisError::MonthlyEditLimitReached(message),
        _ => SynthesisError::Unrecognized {
            status,
            body: body.to_string(),
        },
    }
}

#[async_trait]
impl SynthesisRepository for ElevenLabsSynthesisRepository {
    async fn synthesize(
        &self,
        voice_reference: &str,
        text: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let url = self.url(&format!(
            "/v1/text-to-speech/{}",
            urlencoding::encode(voice_reference)
        ));

        tracing::debug!(
            voice_reference = voice_reference,
            model = %self.model_id,
            text_length = text.len(),
            "Calling ElevenLabs text-to-speech"
        );

        let request = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: &self.voice_settings,
        };

        let response = self
            .http_client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    voice_reference = voice_reference,
                    "ElevenLabs text-to-speech request failed"
                );
                SynthesisError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let audio = response.bytes().await?.to_vec();
        tracing::debug!(audio_size = audio.len(), "ElevenLabs audio received");

        Ok(audio)
    }

    async fn list_library_entries(&self) -> Result<Vec<LibraryEntry>, SynthesisError> {
        let response = self
            .http_client
            .get(self.url("/v1/voices"))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let listing: VoicesResponse = response.json().await?;
        tracing::debug!(entries = listing.voices.len(), "Voice library listed");

        Ok(listing
            .voices
            .into_iter()
            .map(|voice| LibraryEntry {
                voice_reference: voice.voice_id,
                name: voice.name,
            })
            .collect())
    }

    async fn delete_library_entry(&self, voice_reference: &str) -> Result<(), SynthesisError> {
        let url = self.url(&format!(
            "/v1/voices/{}",
            urlencoding::encode(voice_reference)
        ));

        let response = self
            .http_client
            .delete(&url)
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(())
    }
}
