//! One indexed PNG file per tile.

use std::io;
use std::path::{Path, PathBuf};

use tilepack::{BitDepth, PackedRows, Section, Sink, TileInfo};

/// Writes the image section of every tile as `<stem>_<index>.png`.
///
/// Packed rows are already valid PNG scanlines at the output bit depth, so
/// they are written as-is with the first `2^depth` source palette entries.
/// Masks have no place in this output and are rejected.
#[derive(Debug)]
pub struct PngTileSink {
    stem: PathBuf,
    depth: BitDepth,
    palette: Vec<u8>,
    trns: Option<Vec<u8>>,
    current: Option<TileInfo>,
}

impl PngTileSink {
    /// `palette` holds RGB triplets; it is truncated or padded with black to
    /// exactly `2^depth` entries, and `trns` is truncated to match.
    pub fn new(stem: impl Into<PathBuf>, depth: BitDepth, palette: &[u8], trns: Option<&[u8]>) -> Self {
        let entries = 1usize << depth.bits();
        let mut palette: Vec<u8> = palette.iter().copied().take(entries * 3).collect();
        palette.resize(entries * 3, 0);
        let trns = trns
            .map(|t| t.iter().copied().take(entries).collect::<Vec<u8>>())
            .filter(|t| !t.is_empty());
        Self {
            stem: stem.into(),
            depth,
            palette,
            trns,
            current: None,
        }
    }

    /// Path of the file for tile `index`.
    pub fn tile_path(&self, index: usize) -> PathBuf {
        let mut name = self.stem.as_os_str().to_owned();
        name.push(format!("_{index}.png"));
        PathBuf::from(name)
    }

    fn write_png(&self, path: &Path, tile: &TileInfo, rows: &PackedRows) -> io::Result<()> {
        let file = std::fs::File::create(path)?;
        let w = io::BufWriter::new(file);

        let mut encoder = png::Encoder::new(w, tile.width as u32, tile.height as u32);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png_depth(self.depth));
        encoder.set_palette(self.palette.clone());
        if let Some(trns) = &self.trns {
            encoder.set_trns(trns.clone());
        }

        let mut writer = encoder.write_header().map_err(io::Error::other)?;
        writer
            .write_image_data(rows.as_bytes())
            .map_err(io::Error::other)?;
        writer.finish().map_err(io::Error::other)
    }
}

fn png_depth(depth: BitDepth) -> png::BitDepth {
    match depth.bits() {
        1 => png::BitDepth::One,
        2 => png::BitDepth::Two,
        4 => png::BitDepth::Four,
        _ => png::BitDepth::Eight,
    }
}

impl Sink for PngTileSink {
    fn accepts(&self, section: Section) -> bool {
        section == Section::Image
    }

    fn begin_tile(&mut self, tile: &TileInfo) -> io::Result<()> {
        self.current = Some(*tile);
        Ok(())
    }

    fn write_rows(&mut self, section: Section, rows: &PackedRows) -> io::Result<()> {
        if section != Section::Image {
            return Ok(());
        }
        let tile = self
            .current
            .ok_or_else(|| io::Error::other("rows written outside of a tile"))?;
        let path = self.tile_path(tile.index);
        self.write_png(&path, &tile, rows)
    }

    fn end_tile(&mut self) -> io::Result<()> {
        self.current = None;
        Ok(())
    }
}
