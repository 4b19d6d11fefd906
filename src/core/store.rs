/// Narrative store: loads the scene list once and serves read-only lookups.
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::scene::{DialogueLine, NarrativeDocument, Scene};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("narrative file not found: {0}")]
    Missing(PathBuf),
    #[error("unsupported narrative format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML deserialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Load a narrative document, choosing the parser from the file extension.
pub fn load(path: &Path) -> Result<NarrativeDocument, StoreError> {
    if !path.is_file() {
        return Err(StoreError::Missing(path.to_path_buf()));
    }
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("yml") | Some("yaml") => parse_yaml(&std::fs::read_to_string(path)?),
        Some("ron") => parse_ron(&std::fs::read_to_string(path)?),
        _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Parse a narrative document from YAML.
///
/// An empty document, or one without a `scenes` key, yields no scenes.
pub fn parse_yaml(input: &str) -> Result<NarrativeDocument, StoreError> {
    if input.trim().is_empty() {
        return Ok(NarrativeDocument::default());
    }
    let value: Option<NarrativeDocument> = serde_yaml::from_str(input)?;
    Ok(value.unwrap_or_default())
}

/// Parse a narrative document from RON. Optional fields may be written
/// without `Some(...)`.
pub fn parse_ron(input: &str) -> Result<NarrativeDocument, StoreError> {
    let options = ron::Options::default()
        .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME);
    Ok(options.from_str(input)?)
}

/// The loaded story. Immutable once built; sessions share it through `Arc`.
#[derive(Debug, Clone, Default)]
pub struct NarrativeStore {
    document: NarrativeDocument,
}

impl NarrativeStore {
    pub fn from_document(document: NarrativeDocument) -> Self {
        Self { document }
    }

    /// Load a story, degrading to an empty store when the file is missing
    /// or malformed. An empty store plays as an already finished story.
    pub fn open(path: &Path) -> Self {
        match load(path) {
            Ok(document) => {
                log::info!(
                    "loaded {} scenes from {}",
                    document.scenes.len(),
                    path.display()
                );
                Self::from_document(document)
            }
            Err(e) => {
                log::warn!("story unavailable, continuing with no scenes: {}", e);
                Self::default()
            }
        }
    }

    pub fn scene_at(&self, index: usize) -> Option<&Scene> {
        self.document.scenes.get(index)
    }

    pub fn line_at(&self, scene_index: usize, line_index: usize) -> Option<&DialogueLine> {
        self.scene_at(scene_index)?.dialogues.get(line_index)
    }

    pub fn scene_count(&self) -> usize {
        self.document.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.document.scenes
    }

    /// Total number of dialogue lines across every scene.
    pub fn line_count(&self) -> usize {
        self.document.scenes.iter().map(Scene::line_count).sum()
    }
}
