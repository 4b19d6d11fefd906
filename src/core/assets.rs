/// Asset resolution: background images and fonts for scenes and the menu.
///
/// Every lookup is tolerant: a missing or corrupt file is logged and
/// resolves to "no asset", which the renderer draws as a plain fill.
use image::imageops::FilterType;
use image::RgbaImage;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::core::font::{FontMetrics, StoryFonts};
use crate::schema::config::{EngineConfig, FontConfig};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("font data is not a valid TrueType/OpenType font")]
    InvalidFont,
}

/// A decoded image, ready to draw. Clones share the pixel buffer.
#[derive(Debug, Clone)]
pub struct Background {
    source: PathBuf,
    pixels: Arc<RgbaImage>,
}

impl Background {
    pub fn new(source: PathBuf, pixels: RgbaImage) -> Self {
        Self {
            source,
            pixels: Arc::new(pixels),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Supplies scene backgrounds to a dialogue session.
pub trait BackgroundProvider {
    /// Resolve a background reference. `None` means "draw the fallback fill".
    fn background(&mut self, reference: &str) -> Option<Background>;
}

/// Decode an image file and scale it to exactly `width` x `height`.
pub fn load_scaled(path: &Path, width: u32, height: u32) -> Result<Background, AssetError> {
    if !path.is_file() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    let decoded = image::open(path)?;
    let scaled = decoded.resize_exact(width, height, FilterType::Triangle);
    Ok(Background::new(path.to_path_buf(), scaled.to_rgba8()))
}

/// Decode an image file at its native size (menu button art).
pub fn load_native(path: &Path) -> Result<Background, AssetError> {
    if !path.is_file() {
        return Err(AssetError::Missing(path.to_path_buf()));
    }
    let decoded = image::open(path)?;
    Ok(Background::new(path.to_path_buf(), decoded.to_rgba8()))
}

/// Resolves asset references relative to a base directory.
///
/// Backgrounds are scaled to the viewport and cached by resolved path, so
/// revisiting a scene does not decode its image again.
pub struct AssetResolver {
    base_dir: PathBuf,
    viewport: (u32, u32),
    backgrounds: FxHashMap<PathBuf, Background>,
}

impl AssetResolver {
    pub fn new(base_dir: impl Into<PathBuf>, viewport: (u32, u32)) -> Self {
        Self {
            base_dir: base_dir.into(),
            viewport,
            backgrounds: FxHashMap::default(),
        }
    }

    pub fn from_config(base_dir: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self::new(base_dir, (config.screen.width, config.screen.height))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        self.base_dir.join(reference)
    }

    /// Load a background, scaled to the viewport.
    pub fn load_background(&mut self, reference: &str) -> Result<Background, AssetError> {
        let path = self.resolve_path(reference);
        if let Some(cached) = self.backgrounds.get(&path) {
            return Ok(cached.clone());
        }
        let (width, height) = self.viewport;
        let background = load_scaled(&path, width, height)?;
        self.backgrounds.insert(path, background.clone());
        Ok(background)
    }

    /// The story font file: the configured reference, resolved against the
    /// base directory, or else the font discovered alongside the menu art.
    pub fn font_path(&self, configured: Option<&str>, discovered: Option<&Path>) -> Option<PathBuf> {
        configured
            .map(|reference| self.resolve_path(reference))
            .or_else(|| discovered.map(Path::to_path_buf))
    }

    /// Name and body metrics for the story font, or the fallback metrics
    /// when no font file is configured, discovered or loadable.
    pub fn fonts(&self, config: &FontConfig, discovered: Option<&Path>) -> StoryFonts {
        let path = self.font_path(config.main.as_deref(), discovered);
        let body = FontMetrics::load_or_fallback(path.as_deref(), config.dialog_size);
        StoryFonts {
            name: body.with_size(config.name_size),
            body,
        }
    }

    pub fn cached_backgrounds(&self) -> usize {
        self.backgrounds.len()
    }
}

impl BackgroundProvider for AssetResolver {
    fn background(&mut self, reference: &str) -> Option<Background> {
        match self.load_background(reference) {
            Ok(background) => Some(background),
            Err(e) => {
                log::warn!("background '{}' unavailable: {}", reference, e);
                None
            }
        }
    }
}
