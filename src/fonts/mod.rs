//! Font face and glyph resolution.
//!
//! Faces are cached by `family[:bold|:italic|:bolditalic]:size`.
//! Misses resolve the family through the system font collection, load
//! the face bytes, and derive pixel metrics.  A face that cannot be
//! resolved becomes a synthetic entry with heuristic metrics so layout
//! always proceeds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fontique::{Collection, CollectionOptions, GenericFamily, SourceCache, SourceCacheOptions};
use fontique::{FontStyle, FontWeight, FontWidth};

use crate::style::Px;

/// Handle to a sized face in the cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// Pixel metrics of a sized face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceMetrics {
    pub ascent: Px,
    pub descent: Px,
    pub line_height: Px,
}

/// The measurement interface layout consumes.  The production
/// implementation is [`FontCache`]; tests use [`FixedMeasure`].
pub trait TextMeasure {
    /// Resolve a face for the family/style/size, creating it on first
    /// use.
    fn resolve_font(&mut self, family: &str, bold: bool, italic: bool, size: Px) -> FontId;

    /// Horizontal advance of one codepoint, in device pixels.
    fn advance(&mut self, font: FontId, c: char) -> Px;

    fn metrics(&mut self, font: FontId) -> FaceMetrics;

    /// The face and glyph index to draw for a codepoint, following the
    /// fallback chain.  `None` means every face missed; the caller
    /// renders a placeholder box.
    fn glyph(&mut self, font: FontId, c: char) -> Option<(FontId, u16)>;
}

struct LoadedFace {
    blob: Option<fontique::Blob<u8>>,
    index: u32,
    size: Px,
    bold: bool,
    italic: bool,
    metrics: FaceMetrics,
}

fn synthetic_metrics(size: Px) -> FaceMetrics {
    FaceMetrics {
        ascent: size * 4 / 5,
        descent: size / 5,
        line_height: size * 6 / 5,
    }
}

/// The face cache.  Writes are serialised by wrapping the cache in
/// [`SharedFontCache`] when shared between documents.
pub struct FontCache {
    collection: Collection,
    sources: SourceCache,
    faces: Vec<LoadedFace>,
    by_key: HashMap<String, FontId>,
    /// Families tried, in order, when the primary face has no glyph
    /// for a codepoint.
    pub fallbacks: Vec<String>,
}

impl FontCache {
    pub fn new() -> FontCache {
        FontCache::with_fallbacks(vec![
            "DejaVu Sans".to_string(),
            "Noto Sans".to_string(),
            "Noto Color Emoji".to_string(),
        ])
    }

    pub fn with_fallbacks(fallbacks: Vec<String>) -> FontCache {
        FontCache {
            collection: Collection::new(CollectionOptions {
                shared: false,
                system_fonts: true,
            }),
            sources: SourceCache::new(SourceCacheOptions::default()),
            faces: vec![],
            by_key: HashMap::new(),
            fallbacks,
        }
    }

    fn cache_key(family: &str, bold: bool, italic: bool, size: Px) -> String {
        let style = match (bold, italic) {
            (false, false) => "",
            (true, false) => ":bold",
            (false, true) => ":italic",
            (true, true) => ":bolditalic",
        };
        format!("{}{}:{}", family, style, size)
    }

    fn load_face(&mut self, family: &str, bold: bool, italic: bool, size: Px) -> Option<LoadedFace> {
        let family_info = match GenericFamily::parse(family) {
            Some(generic) => {
                let id = self.collection.generic_families(generic).next()?;
                self.collection.family(id)?
            }
            None => self.collection.family_by_name(family)?,
        };
        let style = if italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };
        let weight = if bold {
            FontWeight::BOLD
        } else {
            FontWeight::NORMAL
        };
        let font = family_info
            .match_font(FontWidth::default(), style, weight, true)?
            .clone();
        let blob = font.load(Some(&mut self.sources))?;
        let index = font.index();

        let face = swash::FontRef::from_index(blob.data(), index as usize)?;
        let m = face.metrics(&[]).scale(size as f32);
        let metrics = FaceMetrics {
            ascent: m.ascent.round() as Px,
            descent: m.descent.round() as Px,
            line_height: (m.ascent + m.descent + m.leading).round() as Px,
        };
        Some(LoadedFace {
            blob: Some(blob),
            index,
            size,
            bold,
            italic,
            metrics,
        })
    }

    fn glyph_in_face(&self, id: FontId, c: char) -> Option<u16> {
        let face = &self.faces[id.0 as usize];
        let blob = face.blob.as_ref()?;
        let font = swash::FontRef::from_index(blob.data(), face.index as usize)?;
        let gid = font.charmap().map(c);
        if gid == 0 {
            None
        } else {
            Some(gid)
        }
    }

    fn advance_in_face(&self, id: FontId, gid: u16) -> Option<Px> {
        let face = &self.faces[id.0 as usize];
        let blob = face.blob.as_ref()?;
        let font = swash::FontRef::from_index(blob.data(), face.index as usize)?;
        let gm = font.glyph_metrics(&[]).scale(face.size as f32);
        Some(gm.advance_width(gid).round() as Px)
    }

    /// Drop every cached face.  Entries otherwise live for the process
    /// lifetime.
    pub fn flush(&mut self) {
        self.faces.clear();
        self.by_key.clear();
    }
}

impl Default for FontCache {
    fn default() -> FontCache {
        FontCache::new()
    }
}

impl TextMeasure for FontCache {
    fn resolve_font(&mut self, family: &str, bold: bool, italic: bool, size: Px) -> FontId {
        let key = Self::cache_key(family, bold, italic, size);
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let face = self.load_face(family, bold, italic, size).unwrap_or_else(|| {
            log::warn!("no face for {:?}; using synthetic metrics", key);
            LoadedFace {
                blob: None,
                index: 0,
                size,
                bold,
                italic,
                metrics: synthetic_metrics(size),
            }
        });
        let id = FontId(self.faces.len() as u32);
        self.faces.push(face);
        self.by_key.insert(key, id);
        id
    }

    fn advance(&mut self, font: FontId, c: char) -> Px {
        match self.glyph(font, c) {
            Some((face, gid)) => self
                .advance_in_face(face, gid)
                .unwrap_or_else(|| self.faces[face.0 as usize].size / 2),
            None => self.faces[font.0 as usize].size / 2,
        }
    }

    fn metrics(&mut self, font: FontId) -> FaceMetrics {
        self.faces[font.0 as usize].metrics
    }

    fn glyph(&mut self, font: FontId, c: char) -> Option<(FontId, u16)> {
        if let Some(gid) = self.glyph_in_face(font, c) {
            return Some((font, gid));
        }
        let (size, bold, italic) = {
            let face = &self.faces[font.0 as usize];
            (face.size, face.bold, face.italic)
        };
        // Style each fallback family with the same weight and slant.
        for family in self.fallbacks.clone() {
            let id = self.resolve_font(&family, bold, italic, size);
            if id == font {
                continue;
            }
            if let Some(gid) = self.glyph_in_face(id, c) {
                return Some((id, gid));
            }
        }
        None
    }
}

/// A font cache shared across documents; writes are serialised by a
/// mutex, and entries are immutable once inserted.
#[derive(Clone)]
pub struct SharedFontCache(Arc<Mutex<FontCache>>);

impl SharedFontCache {
    pub fn new(cache: FontCache) -> SharedFontCache {
        SharedFontCache(Arc::new(Mutex::new(cache)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FontCache> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TextMeasure for SharedFontCache {
    fn resolve_font(&mut self, family: &str, bold: bool, italic: bool, size: Px) -> FontId {
        self.lock().resolve_font(family, bold, italic, size)
    }

    fn advance(&mut self, font: FontId, c: char) -> Px {
        self.lock().advance(font, c)
    }

    fn metrics(&mut self, font: FontId) -> FaceMetrics {
        self.lock().metrics(font)
    }

    fn glyph(&mut self, font: FontId, c: char) -> Option<(FontId, u16)> {
        self.lock().glyph(font, c)
    }
}

/// Deterministic measurement for layout tests and headless runs:
/// every glyph advances half the font size.
pub struct FixedMeasure {
    sizes: Vec<Px>,
    by_key: HashMap<String, FontId>,
}

impl FixedMeasure {
    pub fn new() -> FixedMeasure {
        FixedMeasure {
            sizes: vec![],
            by_key: HashMap::new(),
        }
    }
}

impl Default for FixedMeasure {
    fn default() -> FixedMeasure {
        FixedMeasure::new()
    }
}

impl TextMeasure for FixedMeasure {
    fn resolve_font(&mut self, family: &str, bold: bool, italic: bool, size: Px) -> FontId {
        let key = FontCache::cache_key(family, bold, italic, size);
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = FontId(self.sizes.len() as u32);
        self.sizes.push(size);
        self.by_key.insert(key, id);
        id
    }

    fn advance(&mut self, font: FontId, _c: char) -> Px {
        self.sizes[font.0 as usize] / 2
    }

    fn metrics(&mut self, font: FontId) -> FaceMetrics {
        synthetic_metrics(self.sizes[font.0 as usize])
    }

    fn glyph(&mut self, font: FontId, c: char) -> Option<(FontId, u16)> {
        // Pretend the basic multilingual plane is covered.
        if (c as u32) < 0xFFFF {
            Some((font, c as u16))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::{FixedMeasure, FontCache, TextMeasure};

    #[test]
    fn cache_key_carries_style_suffix() {
        assert_eq!(FontCache::cache_key("Arial", false, false, 16), "Arial:16");
        assert_eq!(FontCache::cache_key("Arial", true, false, 16), "Arial:bold:16");
        assert_eq!(
            FontCache::cache_key("Arial", true, true, 20),
            "Arial:bolditalic:20"
        );
    }

    #[test]
    fn fixed_measure_is_deterministic() {
        let mut m = FixedMeasure::new();
        let f = m.resolve_font("serif", false, false, 16);
        assert_eq!(m.advance(f, 'x'), 8);
        assert_eq!(m.metrics(f).ascent, 12);
        let again = m.resolve_font("serif", false, false, 16);
        assert_eq!(f, again);
    }
}
