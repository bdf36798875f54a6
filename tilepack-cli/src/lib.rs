pub mod png_sink;
pub mod source;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tilepack::sink::{FcbSink, RawSink};
use tilepack::{BitDepth, EmitOptions, EmitSummary, Emitter, Geometry};

use crate::png_sink::PngTileSink;
use crate::source::IndexedImage;

/// Where packed tiles go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Assembler `FCB` statements in a text file.
    Fcb(PathBuf),
    /// Packed bytes back to back in a binary file.
    Raw(PathBuf),
    /// One PNG per tile, named after the given path without its extension.
    Png(PathBuf),
}

impl Output {
    /// Whether this output can store mask sections.
    pub fn supports_masks(&self) -> bool {
        !matches!(self, Output::Png(_))
    }
}

/// Descriptive lines for the run, used for console output and the `FCB`
/// file header.
///
/// The lines carry no generation timestamp, so converting the same sheet
/// twice gives byte-identical output.
pub fn info_lines(source: &str, image: &IndexedImage, geometry: &Geometry, depth: BitDepth) -> Vec<String> {
    let mut lines = vec![
        format!("Generated by tilepack {}", env!("CARGO_PKG_VERSION")),
        format!("Source image {} ({}x{})", source, image.width(), image.height()),
    ];
    if geometry.has_big_tiles() {
        lines.push(format!(
            "Big tile size {}x{}",
            geometry.big_width, geometry.big_height
        ));
    }
    lines.push(format!("Output size {}x{}", geometry.width, geometry.height));
    lines.push(format!("Output bit depth {}", depth.bits()));
    lines
}

/// Strip the extension from a PNG output path to get the per-tile stem.
pub fn png_stem(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Slice `image` and write every tile to `output`.
pub fn convert(
    image: &IndexedImage,
    options: &EmitOptions,
    output: &Output,
    header: &[String],
) -> Result<EmitSummary> {
    let geometry = Geometry::resolve(&options.tiles, image.width(), image.height())?;

    match output {
        Output::Fcb(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut sink = FcbSink::new(BufWriter::new(file));
            sink.write_header(header)
                .with_context(|| format!("writing {}", path.display()))?;
            let mut emitter = Emitter::new(sink, options.depth, options.mask);
            let summary = emitter
                .emit_grid(&image.grid, &geometry)
                .with_context(|| format!("writing {}", path.display()))?;
            emitter
                .into_sink()
                .into_inner()
                .with_context(|| format!("flushing {}", path.display()))?;
            Ok(summary)
        }
        Output::Raw(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut emitter = Emitter::new(RawSink::new(BufWriter::new(file)), options.depth, options.mask);
            let summary = emitter
                .emit_grid(&image.grid, &geometry)
                .with_context(|| format!("writing {}", path.display()))?;
            emitter
                .into_sink()
                .into_inner()
                .with_context(|| format!("flushing {}", path.display()))?;
            Ok(summary)
        }
        Output::Png(path) => {
            let sink = PngTileSink::new(
                png_stem(path),
                options.depth,
                &image.palette,
                image.trns.as_deref(),
            );
            let mut emitter = Emitter::new(sink, options.depth, options.mask);
            let summary = emitter
                .emit_grid(&image.grid, &geometry)
                .context("writing tile png files")?;
            Ok(summary)
        }
    }
}
