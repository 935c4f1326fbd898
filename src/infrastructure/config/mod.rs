use crate::domain::batch::RetryPolicy;
use crate::infrastructure::repositories::elevenlabs_synthesis_repository::{
    DEFAULT_ELEVENLABS_BASE_URL, DEFAULT_MODEL_ID,
};
use crate::infrastructure::repositories::local_synthesis_repository::DEFAULT_LOCAL_BASE_URL;
use crate::infrastructure::repositories::{ReportColumns, VoiceSettings};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("could not read {key} file {}: {source}", path.display())]
    Io {
        key: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: SynthesisBackend,
    pub api_key: String,
    pub endpoint_base: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
    pub tts_text: String,
    pub favorites_path: PathBuf,
    pub catalog_path: PathBuf,
    pub output: OutputConfig,
    pub retry_policy: RetryPolicy,
    pub request_timeout: Duration,
    pub confirm_eviction: ConfirmMode,
    pub record_failures: bool,
    pub log_format: LogFormat,
}

/// Where artifacts and the report go. Shared by both binaries.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub artifact_dir: PathBuf,
    pub report_path: PathBuf,
    pub report_columns: ReportColumns,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthesisBackend {
    ElevenLabs,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmMode {
    Prompt,
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup("SYNTHESIS_BACKEND").as_deref() {
            None | Some("elevenlabs") => SynthesisBackend::ElevenLabs,
            Some("local") => SynthesisBackend::Local,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "SYNTHESIS_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let api_key = match (backend, lookup("API_KEY")) {
            (_, Some(key)) => key,
            (SynthesisBackend::ElevenLabs, None) => return Err(ConfigError::Missing("API_KEY")),
            (SynthesisBackend::Local, None) => String::new(),
        };

        let endpoint_base = lookup("ENDPOINT_BASE").unwrap_or_else(|| {
            match backend {
                SynthesisBackend::ElevenLabs => DEFAULT_ELEVENLABS_BASE_URL,
                SynthesisBackend::Local => DEFAULT_LOCAL_BASE_URL,
            }
            .to_string()
        });

        let defaults = VoiceSettings::default();
        let voice_settings = VoiceSettings {
            stability: parse_or(&lookup, "VOICE_STABILITY", defaults.stability)?,
            similarity_boost: parse_or(&lookup, "VOICE_SIMILARITY_BOOST", defaults.similarity_boost)?,
            style: parse_or(&lookup, "VOICE_STYLE", defaults.style)?,
            use_speaker_boost: parse_bool_or(
                &lookup,
                "VOICE_SPEAKER_BOOST",
                defaults.use_speaker_boost,
            )?,
        };

        let tts_text = match (lookup("TTS_TEXT"), lookup("TTS_TEXT_FILE")) {
            (Some(text), _) => text,
            (None, Some(path)) => {
                std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    key: "TTS_TEXT_FILE",
                    path: PathBuf::from(path),
                    source,
                })?
            }
            (None, None) => return Err(ConfigError::Missing("TTS_TEXT")),
        };
        if tts_text.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "TTS_TEXT",
                value: tts_text,
            });
        }

        let retry_policy = match lookup("RETRY_POLICY").as_deref() {
            None => match backend {
                SynthesisBackend::ElevenLabs => RetryPolicy::EvictAndRetryOnce,
                SynthesisBackend::Local => RetryPolicy::RetryWithDelay {
                    delay: retry_delay(&lookup)?,
                },
            },
            Some("skip") => RetryPolicy::SkipOnError,
            Some("evict") => RetryPolicy::EvictAndRetryOnce,
            Some("delay") => RetryPolicy::RetryWithDelay {
                delay: retry_delay(&lookup)?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RETRY_POLICY",
                    value: other.to_string(),
                })
            }
        };

        let confirm_eviction = match lookup("CONFIRM_EVICTION").as_deref() {
            None | Some("prompt") => ConfirmMode::Prompt,
            Some("yes") => ConfirmMode::Yes,
            Some("no") => ConfirmMode::No,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "CONFIRM_EVICTION",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            backend,
            api_key,
            endpoint_base,
            model_id: lookup("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            voice_settings,
            tts_text,
            favorites_path: lookup("FAVORITES_FILE")
                .unwrap_or_else(|| "favorite-voices.txt".to_string())
                .into(),
            catalog_path: lookup("VOICES_JSON_FILE")
                .unwrap_or_else(|| "all_shared_voices.json".to_string())
                .into(),
            output: OutputConfig::from_lookup(&lookup)?,
            retry_policy,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 120)?),
            confirm_eviction,
            record_failures: parse_bool_or(&lookup, "RECORD_FAILURES", false)?,
            log_format: LogFormat::from_lookup(&lookup),
        })
    }
}

impl OutputConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let report_columns = match lookup("REPORT_COLUMNS").as_deref() {
            None | Some("id_filename") => ReportColumns::IdFilename,
            Some("name_local_path") => ReportColumns::NameLocalPath,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "REPORT_COLUMNS",
                    value: other.to_string(),
                })
            }
        };

        Ok(OutputConfig {
            artifact_dir: lookup("OUTPUT_AUDIO_DIR")
                .unwrap_or_else(|| "audios".to_string())
                .into(),
            report_path: lookup("OUTPUT_CSV_FILE")
                .unwrap_or_else(|| "voice_map.csv".to_string())
                .into(),
            report_columns,
        })
    }
}

impl LogFormat {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

fn retry_delay(lookup: &impl Fn(&str) -> Option<String>) -> Result<Duration, ConfigError> {
    let secs: f64 = parse_or(lookup, "RETRY_DELAY_SECS", 5.0_f64)?;
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Invalid {
        key: "RETRY_DELAY_SECS",
        value: secs.to_string(),
    })
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_bool_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => {
            let normalized = value.trim().to_lowercase();
            match normalized.as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::Invalid { key, value }),
            }
        }
    }
}
