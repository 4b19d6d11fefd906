/// Engine configuration: screen, dialogue box, fonts, pacing and keys.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A logical key the engine reacts to. Platform layers translate their
/// own key codes into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Enter,
    Escape,
    Char(char),
}

/// Which keys drive the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub advance: Key,
    pub quit: Key,
    pub toggle_auto: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            advance: Key::Space,
            quit: Key::Escape,
            toggle_auto: Key::Char('a'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Geometry of the dialogue box, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueBoxConfig {
    pub height: u32,
    /// Horizontal margin for the name and the text; also bounds the wrap width.
    pub margin: u32,
    /// Offset of the speaker name from the top of the box.
    pub name_offset: u32,
    /// Offset of the first text line from the top of the box.
    pub text_offset: u32,
    pub line_height: u32,
    /// Lines beyond this count are not drawn.
    pub max_lines: usize,
    pub border: u32,
    pub hint: String,
    /// Distance of the continue hint's baseline from the bottom of the screen.
    pub hint_bottom: u32,
}

impl Default for DialogueBoxConfig {
    fn default() -> Self {
        Self {
            height: 280,
            margin: 40,
            name_offset: 20,
            text_offset: 80,
            line_height: 50,
            max_lines: 3,
            border: 3,
            hint: "Click to continue...".to_string(),
            hint_bottom: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font file relative to the asset directory. `None` selects the
    /// built-in fallback metrics.
    pub main: Option<String>,
    pub name_size: f32,
    pub dialog_size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            main: None,
            name_size: 56.0,
            dialog_size: 36.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoAdvanceConfig {
    pub enabled: bool,
    pub delay_ms: u64,
}

impl Default for AutoAdvanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: 3000,
        }
    }
}

/// Top-level engine configuration. Every field has a default, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub screen: ScreenConfig,
    pub dialogue_box: DialogueBoxConfig,
    pub fonts: FontConfig,
    pub frame_rate: u32,
    pub auto_advance: AutoAdvanceConfig,
    pub keys: KeyBindings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            dialogue_box: DialogueBoxConfig::default(),
            fonts: FontConfig::default(),
            frame_rate: 60,
            auto_advance: AutoAdvanceConfig::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string.
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let options = ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME);
        Ok(options.from_str(input)?)
    }

    /// Load a configuration, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> EngineConfig {
        match Self::load_from_ron(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "using default configuration, could not load {}: {}",
                    path.display(),
                    e
                );
                EngineConfig::default()
            }
        }
    }

    /// Duration of one frame at the configured frame rate.
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(1) / self.frame_rate.max(1)
    }
}
