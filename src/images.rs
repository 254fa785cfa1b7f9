//! The image cache: URL-keyed, decoded once, shared for the process
//! lifetime.
//!
//! PNG and JPEG bytes decode to RGBA8888 pixels.  SVG bytes are kept
//! as an opaque scalable picture with an intrinsic size probed from
//! the root element; rasterisation happens in the painter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::driver::{ResourceError, ResourceProvider};
use crate::style::Px;

/// Width SVG pictures are rasterised at when nothing constrains them.
pub const SVG_MAX_RENDER_WIDTH: Px = 1200;

/// A decoded cache entry.
pub enum ImageData {
    /// RGBA8888 pixels, row-major.
    Raster {
        width: Px,
        height: Px,
        pixels: Vec<u8>,
    },
    /// An opaque scalable picture; `data` is the SVG source.
    Picture {
        width: Px,
        height: Px,
        data: Vec<u8>,
        max_render_width: Px,
    },
}

impl ImageData {
    pub fn size(&self) -> (Px, Px) {
        match self {
            ImageData::Raster { width, height, .. } => (*width, *height),
            ImageData::Picture { width, height, .. } => (*width, *height),
        }
    }
}

/// URL-keyed image cache.  Entries are immutable once inserted; the
/// map itself is guarded so the cache can be shared across documents.
#[derive(Clone, Default)]
pub struct ImageCache {
    entries: Arc<Mutex<HashMap<String, Arc<ImageData>>>>,
}

impl ImageCache {
    pub fn new() -> ImageCache {
        ImageCache::default()
    }

    /// Fetch, decode, and cache the image at `url`.  A hit never
    /// touches the provider.
    pub fn get(
        &self,
        url: &str,
        provider: &mut dyn ResourceProvider,
    ) -> Result<Arc<ImageData>, ResourceError> {
        if let Some(entry) = self.lookup(url) {
            return Ok(entry);
        }
        let bytes = provider.fetch(url)?;
        let data = decode(url, &bytes)?;
        let entry = Arc::new(data);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string(), entry.clone());
        Ok(entry)
    }

    pub fn lookup(&self, url: &str) -> Option<Arc<ImageData>> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
    }
}

fn decode(url: &str, bytes: &[u8]) -> Result<ImageData, ResourceError> {
    if looks_like_svg(url, bytes) {
        let (width, height) = svg_intrinsic_size(bytes).unwrap_or((SVG_MAX_RENDER_WIDTH, SVG_MAX_RENDER_WIDTH));
        return Ok(ImageData::Picture {
            width,
            height,
            data: bytes.to_vec(),
            max_render_width: SVG_MAX_RENDER_WIDTH,
        });
    }
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| {
            log::warn!("image decode failed for {}: {}", url, e);
            ResourceError::Decode(url.to_string())
        })?
        .to_rgba8();
    Ok(ImageData::Raster {
        width: decoded.width() as Px,
        height: decoded.height() as Px,
        pixels: decoded.into_raw(),
    })
}

fn looks_like_svg(url: &str, bytes: &[u8]) -> bool {
    if url.rsplit('.').next().map_or(false, |ext| ext.eq_ignore_ascii_case("svg")) {
        return true;
    }
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Read width/height (or the viewBox) off the root `<svg>` element.
fn svg_intrinsic_size(bytes: &[u8]) -> Option<(Px, Px)> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"svg" {
                    return None;
                }
                let mut width = None;
                let mut height = None;
                let mut view_box = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).into_owned();
                    match attr.key.as_ref() {
                        b"width" => width = parse_svg_length(&value),
                        b"height" => height = parse_svg_length(&value),
                        b"viewBox" => view_box = parse_view_box(&value),
                        _ => (),
                    }
                }
                return match (width, height, view_box) {
                    (Some(w), Some(h), _) => Some((w, h)),
                    (_, _, Some((w, h))) => Some((w, h)),
                    _ => None,
                };
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => (),
        }
        buf.clear();
    }
}

fn parse_svg_length(value: &str) -> Option<Px> {
    let digits = value.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic());
    digits.trim().parse::<f32>().ok().map(|v| v as Px)
}

fn parse_view_box(value: &str) -> Option<(Px, Px)> {
    let parts: Vec<f32> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    if parts.len() == 4 {
        Some((parts[2] as Px, parts[3] as Px))
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::{ResourceError, ResourceProvider};

    struct OneShot(Vec<u8>, usize);

    impl ResourceProvider for OneShot {
        fn fetch(&mut self, _url: &str) -> Result<Vec<u8>, ResourceError> {
            self.1 += 1;
            Ok(self.0.clone())
        }
    }

    #[test]
    fn svg_size_from_attributes() {
        let svg = b"<svg width=\"120px\" height=\"80\"></svg>";
        assert_eq!(svg_intrinsic_size(svg), Some((120, 80)));
    }

    #[test]
    fn svg_size_from_view_box() {
        let svg = b"<?xml version=\"1.0\"?><svg viewBox=\"0 0 300 150\"></svg>";
        assert_eq!(svg_intrinsic_size(svg), Some((300, 150)));
    }

    #[test]
    fn cache_hits_skip_the_provider() {
        let svg = b"<svg width=\"10\" height=\"10\"></svg>".to_vec();
        let mut provider = OneShot(svg, 0);
        let cache = ImageCache::new();
        let a = cache.get("a.svg", &mut provider).unwrap();
        let b = cache.get("a.svg", &mut provider).unwrap();
        assert_eq!(provider.1, 1);
        assert_eq!(a.size(), (10, 10));
        assert_eq!(b.size(), (10, 10));
    }

    #[test]
    fn bad_raster_bytes_are_a_decode_error()
    {
        let mut provider = OneShot(vec![1, 2, 3], 0);
        let cache = ImageCache::new();
        assert!(matches!(
            cache.get("x.png", &mut provider),
            Err(ResourceError::Decode(_))
        ));
    }
}
