use std::io;

use log::{debug, info};

use crate::error::EmitError;
use crate::grid::PixelGrid;
use crate::packing::{BitDepth, PackingScheme};
use crate::partition::{Geometry, Tile, TileOptions};
use crate::range::Section;

/// Position and size of the tile currently being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInfo {
    /// Zero-based emission index.
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub fragment: bool,
}

impl TileInfo {
    fn of(index: usize, tile: &Tile<'_>) -> Self {
        Self {
            index,
            x: tile.x,
            y: tile.y,
            width: tile.width,
            height: tile.height,
            fragment: tile.is_fragment(),
        }
    }
}

/// Packed rows of one section of one tile.
///
/// All rows share the same length; the storage is reused from tile to tile.
#[derive(Debug, Default, Clone)]
pub struct PackedRows {
    row_len: usize,
    data: Vec<u8>,
}

impl PackedRows {
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        if self.row_len == 0 {
            0
        } else {
            self.data.len() / self.row_len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Rows in top to bottom order.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.row_len.max(1))
    }

    /// All rows back to back.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn fill(&mut self, tile: &Tile<'_>, section: Section, scheme: &PackingScheme) {
        let max_colour = scheme.depth().max_colour();
        self.row_len = scheme.packed_len(tile.width);
        self.data.clear();
        for row in tile.rows() {
            scheme.pack_into(section.remap_row(row, max_colour), &mut self.data);
        }
    }
}

/// Destination for packed tile data.
///
/// The driver calls, per tile: `begin_tile`, then for each section it emits
/// `write_rows` followed by `end_section`, then `end_tile`.
pub trait Sink {
    /// Whether this sink stores the given section. The driver does not compute
    /// sections that a sink rejects.
    fn accepts(&self, section: Section) -> bool {
        let _ = section;
        true
    }

    fn begin_tile(&mut self, tile: &TileInfo) -> io::Result<()> {
        let _ = tile;
        Ok(())
    }

    fn write_rows(&mut self, section: Section, rows: &PackedRows) -> io::Result<()>;

    fn end_section(&mut self, section: Section) -> io::Result<()> {
        let _ = section;
        Ok(())
    }

    fn end_tile(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn accepts(&self, section: Section) -> bool {
        (**self).accepts(section)
    }

    fn begin_tile(&mut self, tile: &TileInfo) -> io::Result<()> {
        (**self).begin_tile(tile)
    }

    fn write_rows(&mut self, section: Section, rows: &PackedRows) -> io::Result<()> {
        (**self).write_rows(section, rows)
    }

    fn end_section(&mut self, section: Section) -> io::Result<()> {
        (**self).end_section(section)
    }

    fn end_tile(&mut self) -> io::Result<()> {
        (**self).end_tile()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn accepts(&self, section: Section) -> bool {
        (**self).accepts(section)
    }

    fn begin_tile(&mut self, tile: &TileInfo) -> io::Result<()> {
        (**self).begin_tile(tile)
    }

    fn write_rows(&mut self, section: Section, rows: &PackedRows) -> io::Result<()> {
        (**self).write_rows(section, rows)
    }

    fn end_section(&mut self, section: Section) -> io::Result<()> {
        (**self).end_section(section)
    }

    fn end_tile(&mut self) -> io::Result<()> {
        (**self).end_tile()
    }
}

/// Options for a full emission run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOptions {
    pub depth: BitDepth,
    /// Emit a mask section ahead of each image section.
    pub mask: bool,
    pub tiles: TileOptions,
}

/// Outcome of an emission run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    /// Tiles handed to the sink.
    pub tiles: usize,
    /// Fragments skipped by the fragment policy.
    pub dropped: usize,
    /// Whether mask sections were written.
    pub masked: bool,
}

/// Drives tiles from a grid through range mapping and packing into a sink.
#[derive(Debug)]
pub struct Emitter<S> {
    sink: S,
    scheme: PackingScheme,
    mask: bool,
    next_index: usize,
    rows: PackedRows,
}

impl<S: Sink> Emitter<S> {
    pub fn new(sink: S, depth: BitDepth, mask: bool) -> Self {
        Self {
            sink,
            scheme: PackingScheme::new(depth),
            mask,
            next_index: 0,
            rows: PackedRows::default(),
        }
    }

    /// Number of tiles emitted so far.
    pub fn emitted(&self) -> usize {
        self.next_index
    }

    /// True when mask sections are both requested and accepted by the sink.
    pub fn writes_masks(&self) -> bool {
        self.mask && self.sink.accepts(Section::Mask)
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Emit a single tile.
    pub fn emit_tile(&mut self, tile: &Tile<'_>) -> io::Result<()> {
        let info = TileInfo::of(self.next_index, tile);
        debug!(
            "tile {}: {}x{} at ({}, {})",
            info.index, info.width, info.height, info.x, info.y
        );
        self.sink.begin_tile(&info)?;
        if self.writes_masks() {
            self.write_section(tile, Section::Mask)?;
        }
        self.write_section(tile, Section::Image)?;
        self.sink.end_tile()?;
        self.next_index += 1;
        Ok(())
    }

    fn write_section(&mut self, tile: &Tile<'_>, section: Section) -> io::Result<()> {
        self.rows.fill(tile, section, &self.scheme);
        self.sink.write_rows(section, &self.rows)?;
        self.sink.end_section(section)
    }

    /// Emit every tile of `grid` in partition order.
    pub fn emit_grid(&mut self, grid: &PixelGrid, geometry: &Geometry) -> Result<EmitSummary, EmitError> {
        let first = self.next_index;
        let mut tiles = geometry.tiles(grid);
        for tile in tiles.by_ref() {
            self.emit_tile(&tile)?;
        }
        let summary = EmitSummary {
            tiles: self.next_index - first,
            dropped: tiles.dropped(),
            masked: self.writes_masks(),
        };
        info!(
            "emitted {} tiles ({} fragments dropped)",
            summary.tiles, summary.dropped
        );
        Ok(summary)
    }
}

/// Partition `grid`, pack every tile and forward it to `sink`.
///
/// Geometry errors are reported before anything reaches the sink.
pub fn emit<S: Sink>(grid: &PixelGrid, sink: S, options: &EmitOptions) -> Result<EmitSummary, EmitError> {
    let geometry = Geometry::resolve(&options.tiles, grid.width(), grid.height())?;
    Emitter::new(sink, options.depth, options.mask).emit_grid(grid, &geometry)
}
