//! Resource loading: the filesystem provider, the image cache, and
//! replaced-element layout fed from it.

use vellum::driver::{FsProvider, ResourceError, ResourceProvider};
use vellum::fonts::FixedMeasure;
use vellum::images::{ImageCache, ImageData};
use vellum::layout::{layout_document, LayoutContext, ViewData};
use vellum::parse_html;
use vellum::render::{render, DrawCommand, RecordingPainter};
use vellum::style::UaStyles;

const SVG: &str = "<svg width=\"20\" height=\"10\"></svg>";

#[test]
fn fs_provider_resolves_relative_to_its_base() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pic.svg"), SVG).unwrap();

    let mut provider = FsProvider::with_base(dir.path());
    let bytes = provider.fetch("pic.svg").unwrap();
    assert!(bytes.starts_with(b"<svg"));
}

#[test]
fn missing_files_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = FsProvider::with_base(dir.path());
    assert!(matches!(
        provider.fetch("absent.png"),
        Err(ResourceError::NotFound(_))
    ));
}

#[test]
fn svg_is_cached_as_a_picture_with_probed_size() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pic.svg"), SVG).unwrap();
    let mut provider = FsProvider::with_base(dir.path());

    let cache = ImageCache::new();
    let entry = cache.get("pic.svg", &mut provider).unwrap();
    assert!(matches!(&*entry, ImageData::Picture { .. }));
    assert_eq!(entry.size(), (20, 10));
    // The second get is a cache hit.
    assert!(cache.lookup("pic.svg").is_some());
}

#[test]
fn cached_images_size_their_boxes_and_paint_as_pictures() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pic.svg"), SVG).unwrap();
    let mut provider = FsProvider::with_base(dir.path());
    let cache = ImageCache::new();
    cache.get("pic.svg", &mut provider).unwrap();

    let doc = parse_html("<img src=\"pic.svg\">");
    let styles = UaStyles;
    let mut measure = FixedMeasure::new();
    let vt = {
        let mut ctx = LayoutContext {
            doc: &doc,
            styles: &styles,
            measure: &mut measure,
            images: Some(&cache),
            viewport_width: 800,
            viewport_height: 600,
        };
        layout_document(&mut ctx)
    };

    let root = vt.root.unwrap();
    let img = vt.child_ids(root)[0];
    match &vt.view(img).data {
        ViewData::Image(i) => {
            assert!(i.is_picture);
            assert_eq!((i.intrinsic_width, i.intrinsic_height), (20, 10));
            assert_eq!((i.width, i.height), (20, 10));
        }
        _ => panic!("expected an image box"),
    }

    let mut painter = RecordingPainter::new();
    render(&doc, &vt, &mut measure, &mut painter);
    assert!(painter
        .commands
        .iter()
        .any(|c| matches!(c, DrawCommand::Picture { src, .. } if src == "pic.svg")));
}
