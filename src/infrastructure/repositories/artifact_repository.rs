use crate::domain::batch::ArtifactError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub const ARTIFACT_EXTENSION: &str = "mp3";

/// Destination for synthesized audio
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Persist the audio for `display_name` and return where it was written.
    /// Never replaces an existing artifact and never leaves a partial one.
    async fn save(&self, display_name: &str, audio: &[u8]) -> Result<PathBuf, ArtifactError>;

    /// Display names that already have an artifact
    async fn existing_names(&self) -> Result<BTreeSet<String>, ArtifactError>;
}

/// Stores artifacts as `{display_name}.mp3` inside one directory
pub struct FsArtifactRepository {
    dir: PathBuf,
}

impl FsArtifactRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, display_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", display_name, ARTIFACT_EXTENSION))
    }

    pub async fn ensure_dir(&self) -> Result<(), ArtifactError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ArtifactError::Io {
                path: self.dir.clone(),
                source,
            })
    }

    /// File names of every artifact in the directory, sorted
    pub async fn list_files(&self) -> Result<Vec<String>, ArtifactError> {
        let io_err = |source: std::io::Error| ArtifactError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                files.push(name.to_string());
            }
        }
        files.sort();

        Ok(files)
    }
}

#[async_trait]
impl ArtifactRepository for FsArtifactRepository {
    async fn save(&self, display_name: &str, audio: &[u8]) -> Result<PathBuf, ArtifactError> {
        if !is_valid_name(display_name) {
            return Err(ArtifactError::InvalidName(display_name.to_string()));
        }
        let path = self.path_for(display_name);

        let dir = self.dir.clone();
        let target = path.clone();
        let bytes = audio.to_vec();
        tokio::task::spawn_blocking(move || write_new(&dir, &target, bytes.as_slice()))
            .await
            .map_err(|e| ArtifactError::Io {
                path: path.clone(),
                source: std::io::Error::new(ErrorKind::Other, e),
            })??;

        tracing::debug!(path = %path.display(), bytes = audio.len(), "Artifact written");
        Ok(path)
    }

    async fn existing_names(&self) -> Result<BTreeSet<String>, ArtifactError> {
        let files = match self.list_files().await {
            Ok(files) => files,
            Err(ArtifactError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(e),
        };

        Ok(files
            .iter()
            .filter_map(|file| {
                Path::new(file)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect())
    }
}

/// Rejects names that are empty or would leave the artifact directory
fn is_valid_name(display_name: &str) -> bool {
    !display_name.trim().is_empty() && !display_name.contains(&['/', '\\', '\0'][..])
}

/// Stage `source` in a hidden `.part` file inside `dir`, then link it to
/// `path` without replacing anything. The staging file is removed on failure.
fn write_new(dir: &Path, path: &Path, mut source: impl Read) -> Result<(), ArtifactError> {
    let io_err = |source: std::io::Error| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(io_err)?;
    std::io::copy(&mut source, &mut staged).map_err(io_err)?;
    staged.flush().map_err(io_err)?;

    staged.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            ArtifactError::AlreadyExists(path.to_path_buf())
        } else {
            io_err(e.error)
        }
    })?;

    Ok(())
}
