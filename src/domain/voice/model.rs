use serde::Deserialize;

/// Shared voice catalog export
#[derive(Debug, Default, Deserialize)]
pub struct VoiceCatalog {
    #[serde(default)]
    pub voices: Vec<CatalogVoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVoice {
    pub name: String,
    pub voice_id: String,
}
