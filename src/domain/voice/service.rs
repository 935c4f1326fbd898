use super::model::VoiceCatalog;
use crate::domain::batch::VoiceTask;
use std::collections::{BTreeMap, BTreeSet};

/// Marker found on the header line of favorites exports
const SELECTION_MARKER: &str = "Selection";

/// Names listed in a favorites export, one per line
pub fn parse_favorites(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains(SELECTION_MARKER))
        .map(str::to_string)
        .collect()
}

/// Favorites that exist in the catalog, sorted by name.
/// When the catalog lists a name twice the later entry wins.
pub fn build_task_queue(favorites: &BTreeSet<String>, catalog: &VoiceCatalog) -> Vec<VoiceTask> {
    let voice_map: BTreeMap<&str, &str> = catalog
        .voices
        .iter()
        .filter(|voice| favorites.contains(&voice.name))
        .map(|voice| (voice.name.as_str(), voice.voice_id.as_str()))
        .collect();

    voice_map
        .into_iter()
        .map(|(name, voice_id)| VoiceTask::new(name, voice_id))
        .collect()
}
