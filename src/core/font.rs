/// Font metrics: glyph advances from a font file, or a fixed-width fallback.
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use std::path::Path;

use crate::core::assets::AssetError;
use crate::core::layout::{MonospaceMetrics, TextMeasure};

/// Horizontal metrics of a TrueType/OpenType font at one pixel size.
#[derive(Clone)]
pub struct GlyphMetrics {
    font: FontArc,
    scale: PxScale,
}

impl std::fmt::Debug for GlyphMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphMetrics")
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl GlyphMetrics {
    pub fn from_bytes(bytes: Vec<u8>, size: f32) -> Result<Self, AssetError> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| AssetError::InvalidFont)?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }

    pub fn load(path: &Path, size: f32) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes, size)
    }

    /// A copy of these metrics at another pixel size.
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            font: self.font.clone(),
            scale: PxScale::from(size),
        }
    }
}

impl TextMeasure for GlyphMetrics {
    fn measure(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

/// The metrics used for one text role (speaker name or dialogue body).
#[derive(Debug, Clone)]
pub enum FontMetrics {
    Glyph(GlyphMetrics),
    Fallback(MonospaceMetrics),
}

impl FontMetrics {
    /// Load a font file at `size`, falling back to fixed-width metrics when
    /// the file is absent or unreadable.
    pub fn load_or_fallback(path: Option<&Path>, size: f32) -> Self {
        let Some(path) = path else {
            return Self::Fallback(MonospaceMetrics::for_size(size));
        };
        match GlyphMetrics::load(path, size) {
            Ok(metrics) => Self::Glyph(metrics),
            Err(e) => {
                log::warn!(
                    "using fallback font metrics, could not load {}: {}",
                    path.display(),
                    e
                );
                Self::Fallback(MonospaceMetrics::for_size(size))
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The same face at another pixel size.
    pub fn with_size(&self, size: f32) -> Self {
        match self {
            Self::Glyph(metrics) => Self::Glyph(metrics.with_size(size)),
            Self::Fallback(_) => Self::Fallback(MonospaceMetrics::for_size(size)),
        }
    }
}

/// Metrics for the two text roles of the dialogue box.
#[derive(Debug, Clone)]
pub struct StoryFonts {
    pub name: FontMetrics,
    pub body: FontMetrics,
}

impl TextMeasure for FontMetrics {
    fn measure(&self, text: &str) -> f32 {
        match self {
            Self::Glyph(metrics) => metrics.measure(text),
            Self::Fallback(metrics) => metrics.measure(text),
        }
    }
}
