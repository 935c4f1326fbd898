use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;
use voice_batch::infrastructure::config::Config;
use wiremock::MockServer;

pub mod elevenlabs_mocks;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_TEXT: &str = "Hello from the test suite.";

pub struct TestContext {
    pub server: MockServer,
    pub dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            server: MockServer::start().await,
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.path("audios")
    }

    pub fn report_path(&self) -> PathBuf {
        self.path("voice_map.csv")
    }

    /// Write the favorites list and the catalog the batch reads its voices from
    pub fn write_voices(&self, favorites: &[&str], catalog: &[(&str, &str)]) -> Result<()> {
        let mut content = String::from("Favorites Selection\n");
        for name in favorites {
            content.push_str(name);
            content.push('\n');
        }
        std::fs::write(self.path("favorites.txt"), content)?;

        let voices: Vec<serde_json::Value> = catalog
            .iter()
            .map(|(name, id)| serde_json::json!({ "name": name, "voice_id": id, "language": "en" }))
            .collect();
        std::fs::write(
            self.path("voices.json"),
            serde_json::to_string(&serde_json::json!({ "voices": voices }))?,
        )?;

        Ok(())
    }

    /// Pretend a previous run already rendered these voices
    pub fn write_existing_audio(&self, names: &[&str]) -> Result<()> {
        std::fs::create_dir_all(self.audio_dir())?;
        for name in names {
            std::fs::write(self.audio_dir().join(format!("{}.mp3", name)), b"old audio")?;
        }
        Ok(())
    }

    /// Configuration pointing at the mock server and the temp directory
    pub fn config(&self, overrides: &[(&str, &str)]) -> Result<Config> {
        let mut vars: HashMap<String, String> = HashMap::new();
        let defaults = [
            ("API_KEY", TEST_API_KEY.to_string()),
            ("TTS_TEXT", TEST_TEXT.to_string()),
            ("ENDPOINT_BASE", self.server.uri()),
            ("FAVORITES_FILE", self.path("favorites.txt").display().to_string()),
            ("VOICES_JSON_FILE", self.path("voices.json").display().to_string()),
            ("OUTPUT_AUDIO_DIR", self.audio_dir().display().to_string()),
            ("OUTPUT_CSV_FILE", self.report_path().display().to_string()),
            ("CONFIRM_EVICTION", "no".to_string()),
            ("REQUEST_TIMEOUT_SECS", "5".to_string()),
        ];
        for (key, value) in defaults {
            vars.insert(key.to_string(), value);
        }
        for (key, value) in overrides {
            vars.insert(key.to_string(), value.to_string());
        }

        Ok(Config::from_lookup(move |key: &str| vars.get(key).cloned())?)
    }

    pub fn report(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.report_path())?)
    }

    pub fn audio_files(&self) -> Result<Vec<String>> {
        let mut files: Vec<String> = std::fs::read_dir(self.audio_dir())?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        files.sort();
        Ok(files)
    }
}
