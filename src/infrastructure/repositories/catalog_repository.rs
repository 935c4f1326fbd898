use crate::domain::batch::VoiceTask;
use crate::domain::voice::{build_task_queue, parse_favorites, VoiceCatalog, VoiceSourceError};
use std::path::{Path, PathBuf};

/// Reads the favorites list and the voice catalog from disk
pub struct CatalogRepository {
    favorites_path: PathBuf,
    catalog_path: PathBuf,
}

impl CatalogRepository {
    pub fn new(favorites_path: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            favorites_path: favorites_path.into(),
            catalog_path: catalog_path.into(),
        }
    }

    /// Build the ordered task queue. Any read or parse failure is fatal.
    pub async fn load_tasks(&self) -> Result<Vec<VoiceTask>, VoiceSourceError> {
        let favorites = parse_favorites(&read(&self.favorites_path).await?);

        let raw_catalog = read(&self.catalog_path).await?;
        let catalog: VoiceCatalog =
            serde_json::from_str(&raw_catalog).map_err(|source| VoiceSourceError::Parse {
                path: self.catalog_path.clone(),
                source,
            })?;

        let tasks = build_task_queue(&favorites, &catalog);
        tracing::info!(
            favorites = favorites.len(),
            catalog_voices = catalog.voices.len(),
            tasks = tasks.len(),
            "Voice list loaded"
        );

        if tasks.len() < favorites.len() {
            tracing::warn!(
                missing = favorites.len() - tasks.len(),
                "Some favorite voices are not in the catalog"
            );
        }

        Ok(tasks)
    }
}

async fn read(path: &Path) -> Result<String, VoiceSourceError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| VoiceSourceError::Read {
            path: path.to_path_buf(),
            source,
        })
}
