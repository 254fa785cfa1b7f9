//! Headless harness: parse an HTML or Markdown document, lay it out,
//! and print the DOM dump.  Exit codes: 0 on success, 1 when the input
//! cannot be read, 2 on a malformed command line (from the argument
//! parser).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use vellum::dom::serialize;
use vellum::fonts::{FixedMeasure, TextMeasure};
use vellum::layout::{self, LayoutContext};
use vellum::render::{render, RecordingPainter};
use vellum::style::UaStyles;

#[derive(Parser)]
#[command(name = "vellum", about = "Parse and lay out an HTML or Markdown document")]
struct Cli {
    /// Path to the document.
    input: PathBuf,

    /// Viewport width in device pixels.
    #[arg(long, default_value_t = 800)]
    width: i32,

    /// Viewport height in device pixels.
    #[arg(long, default_value_t = 600)]
    height: i32,

    /// Device pixel ratio applied to the viewport.
    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let bytes = match std::fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("vellum: cannot read {}: {}", cli.input.display(), e);
            return ExitCode::from(1);
        }
    };
    let text = String::from_utf8_lossy(&bytes);

    let is_markdown = cli
        .input
        .extension()
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown")
        });
    let doc = if is_markdown {
        vellum::parse_markdown(&text)
    } else {
        vellum::parse_html(&text)
    };

    let styles = UaStyles;
    let mut measure: Box<dyn TextMeasure> = Box::new(FixedMeasure::new());
    let vt = {
        let mut ctx = LayoutContext {
            doc: &doc,
            styles: &styles,
            measure: &mut *measure,
            images: None,
            viewport_width: (cli.width as f32 * cli.pixel_ratio) as i32,
            viewport_height: (cli.height as f32 * cli.pixel_ratio) as i32,
        };
        layout::layout_document(&mut ctx)
    };

    let mut painter = RecordingPainter::new();
    render(&doc, &vt, &mut *measure, &mut painter);

    print!("{}", serialize::dump(&doc));
    eprintln!(
        "vellum: {} views, {} draw commands, {} parse errors",
        vt.len(),
        painter.commands.len(),
        doc.errors.len()
    );
    ExitCode::SUCCESS
}
