use serde::{Deserialize, Deserializer, Serialize};

/// Label used when a scene or a dialogue line omits its name.
pub const UNKNOWN_LABEL: &str = "Unknown";

fn unknown_label() -> String {
    UNKNOWN_LABEL.to_string()
}

/// One line of dialogue, attributed to a speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    #[serde(default = "unknown_label", deserialize_with = "string_or_default_label")]
    pub character: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl DialogueLine {
    pub fn new(character: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            text: text.into(),
        }
    }
}

/// A background plus an ordered block of dialogue lines.
///
/// The identifier is a display label only; nothing enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(
        rename = "scene",
        default = "unknown_label",
        deserialize_with = "string_or_default_label"
    )]
    pub identifier: String,
    /// Asset reference relative to the story's base directory.
    #[serde(default, deserialize_with = "non_empty_reference")]
    pub background: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dialogues: Vec<DialogueLine>,
}

impl Scene {
    pub fn line_count(&self) -> usize {
        self.dialogues.len()
    }
}

/// The ordered scenes of one story. An empty document is valid and
/// describes a story that is already over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub scenes: Vec<Scene>,
}

impl NarrativeDocument {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

// Story files are hand-written, so `key:` with no value shows up as null.
// These helpers resolve such holes to defaults once, at load time.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_default_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_label))
}

fn non_empty_reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogue_line_defaults() {
        let line: DialogueLine = serde_yaml::from_str("text: Hello").unwrap();
        assert_eq!(line.character, "Unknown");
        assert_eq!(line.text, "Hello");

        let line: DialogueLine = serde_yaml::from_str("character: Deb").unwrap();
        assert_eq!(line.character, "Deb");
        assert_eq!(line.text, "");
    }

    #[test]
    fn scene_defaults() {
        let scene: Scene = serde_yaml::from_str("background: ''").unwrap();
        assert_eq!(scene.identifier, "Unknown");
        assert_eq!(scene.background, None);
        assert!(scene.dialogues.is_empty());
    }

    #[test]
    fn scene_null_dialogues() {
        let scene: Scene = serde_yaml::from_str("scene: Lab\ndialogues:\n").unwrap();
        assert_eq!(scene.identifier, "Lab");
        assert_eq!(scene.line_count(), 0);
    }

    #[test]
    fn scene_keeps_background_reference() {
        let scene: Scene =
            serde_yaml::from_str("scene: Docks\nbackground: backgrounds/docks.jpg").unwrap();
        assert_eq!(scene.background.as_deref(), Some("backgrounds/docks.jpg"));
    }

    #[test]
    fn document_default_is_empty() {
        assert!(NarrativeDocument::default().is_empty());
    }
}
