//! Two-level tiling of a pixel grid.
//!
//! The grid is first cut into big tiles, each big tile is then cut into the
//! final output tiles. Both levels walk in raster order, and the trailing
//! row/column of either level may be short. Tiles are borrowed views into the
//! grid and are produced one at a time.

use log::debug;

use crate::error::{Dimension, GeometryError, TileError};
use crate::grid::PixelGrid;

/// Requested tile sizes. `None` means "derive from the enclosing size".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileOptions {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub big_width: Option<usize>,
    pub big_height: Option<usize>,
    /// Emit undersized edge fragments instead of dropping them.
    pub keep_fragments: bool,
}

/// Fully resolved tile sizes, all positive, with each tile no larger than its
/// big tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub big_width: usize,
    pub big_height: usize,
    pub keep_fragments: bool,
}

impl Geometry {
    /// Resolve options against the image size.
    ///
    /// Unset tile sizes default to the image size, unset big tile sizes to the
    /// tile size, and the tile size is then clamped to the big tile size.
    pub fn resolve(
        options: &TileOptions,
        image_width: usize,
        image_height: usize,
    ) -> Result<Geometry, TileError> {
        let width = options.width.unwrap_or(image_width);
        let height = options.height.unwrap_or(image_height);
        let big_width = options.big_width.unwrap_or(width);
        let big_height = options.big_height.unwrap_or(height);

        let geometry = Geometry {
            width: width.min(big_width),
            height: height.min(big_height),
            big_width,
            big_height,
            keep_fragments: options.keep_fragments,
        };

        for (value, dim) in [
            (geometry.width, Dimension::Width),
            (geometry.height, Dimension::Height),
            (geometry.big_width, Dimension::BigWidth),
            (geometry.big_height, Dimension::BigHeight),
        ] {
            if value == 0 {
                return Err(GeometryError::ZeroSize(dim).into());
            }
        }
        Ok(geometry)
    }

    /// True when big tiles are distinct from the output tiles.
    pub fn has_big_tiles(&self) -> bool {
        self.width != self.big_width || self.height != self.big_height
    }

    /// Tiles of `grid` in emission order.
    pub fn tiles<'a>(&self, grid: &'a PixelGrid) -> Tiles<'a> {
        Tiles::new(grid, *self)
    }
}

/// A rectangular view into a pixel grid.
#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    grid: &'a PixelGrid,
    /// Left column in the source grid.
    pub x: usize,
    /// Top row in the source grid.
    pub y: usize,
    pub width: usize,
    pub height: usize,
    fragment: bool,
}

impl<'a> Tile<'a> {
    /// True when the tile is smaller than the nominal tile size.
    pub fn is_fragment(&self) -> bool {
        self.fragment
    }

    /// Row `r` of the tile.
    pub fn row(&self, r: usize) -> &'a [u8] {
        &self.grid.row(self.y + r)[self.x..self.x + self.width]
    }

    /// Tile rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.height).map(move |r| self.row(r))
    }

    /// Copy the tile out into its own grid.
    pub fn to_grid(&self) -> PixelGrid {
        let mut buf = Vec::with_capacity(self.width * self.height);
        for row in self.rows() {
            buf.extend_from_slice(row);
        }
        PixelGrid::from_buf(self.width, self.height, buf)
            .unwrap_or_else(|_| unreachable!("tile rows are always rectangular"))
    }
}

/// Cursor over the tiles of a grid.
///
/// Walks big tile origins in raster order and, inside each big tile, tile
/// origins in raster order. Fragments are skipped unless the geometry keeps
/// them.
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    grid: &'a PixelGrid,
    geometry: Geometry,
    big_x: usize,
    big_y: usize,
    tile_x: usize,
    tile_y: usize,
    dropped: usize,
}

impl<'a> Tiles<'a> {
    pub fn new(grid: &'a PixelGrid, geometry: Geometry) -> Self {
        Self {
            grid,
            geometry,
            big_x: 0,
            big_y: 0,
            tile_x: 0,
            tile_y: 0,
            dropped: 0,
        }
    }

    /// Number of fragments skipped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn next_big_tile(&mut self) {
        self.big_x += self.geometry.big_width;
        if self.big_x >= self.grid.width() {
            self.big_x = 0;
            self.big_y += self.geometry.big_height;
        }
        self.tile_x = self.big_x;
        self.tile_y = self.big_y;
    }
}

impl<'a> Iterator for Tiles<'a> {
    type Item = Tile<'a>;

    fn next(&mut self) -> Option<Tile<'a>> {
        let (grid_w, grid_h) = (self.grid.width(), self.grid.height());
        let g = self.geometry;

        loop {
            if grid_w == 0 || self.big_y >= grid_h {
                return None;
            }

            // Extent of the current big tile, clipped to the grid
            let big_right = (self.big_x + g.big_width).min(grid_w);
            let big_bottom = (self.big_y + g.big_height).min(grid_h);

            if self.tile_y >= big_bottom {
                self.next_big_tile();
                continue;
            }

            let width = g.width.min(big_right - self.tile_x);
            let height = g.height.min(big_bottom - self.tile_y);
            let tile = Tile {
                grid: self.grid,
                x: self.tile_x,
                y: self.tile_y,
                width,
                height,
                fragment: width != g.width || height != g.height,
            };

            self.tile_x += g.width;
            if self.tile_x >= big_right {
                self.tile_x = self.big_x;
                self.tile_y += g.height;
            }

            if tile.fragment && !g.keep_fragments {
                debug!(
                    "dropping {}x{} fragment at ({}, {})",
                    tile.width, tile.height, tile.x, tile.y
                );
                self.dropped += 1;
                continue;
            }
            return Some(tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_grid(width: usize, height: usize) -> PixelGrid {
        let buf = (0..width * height).map(|v| v as u8).collect();
        PixelGrid::from_buf(width, height, buf).unwrap()
    }

    fn options(width: usize, height: usize) -> TileOptions {
        TileOptions {
            width: Some(width),
            height: Some(height),
            ..TileOptions::default()
        }
    }

    fn shapes(tiles: Tiles<'_>) -> Vec<(usize, usize, usize, usize)> {
        tiles.map(|t| (t.x, t.y, t.width, t.height)).collect()
    }

    #[test]
    fn resolve_defaults_to_image_size() {
        let g = Geometry::resolve(&TileOptions::default(), 16, 8).unwrap();
        assert_eq!((g.width, g.height, g.big_width, g.big_height), (16, 8, 16, 8));
        assert!(!g.has_big_tiles());
    }

    #[test]
    fn resolve_big_defaults_to_tile_size() {
        let g = Geometry::resolve(&options(4, 2), 16, 8).unwrap();
        assert_eq!((g.big_width, g.big_height), (4, 2));
    }

    #[test]
    fn resolve_clamps_tile_to_big_tile() {
        let opts = TileOptions {
            width: Some(8),
            height: Some(8),
            big_width: Some(4),
            big_height: Some(16),
            keep_fragments: false,
        };
        let g = Geometry::resolve(&opts, 32, 32).unwrap();
        assert_eq!((g.width, g.height, g.big_width, g.big_height), (4, 8, 4, 16));
        assert!(g.has_big_tiles());
    }

    #[test]
    fn resolve_rejects_zero_sizes() {
        assert_eq!(
            Geometry::resolve(&options(0, 2), 4, 4),
            Err(TileError::InvalidGeometry(GeometryError::ZeroSize(Dimension::Width)))
        );
        let opts = TileOptions {
            big_height: Some(0),
            ..options(2, 2)
        };
        // height is clamped to the zero big height first
        assert_eq!(
            Geometry::resolve(&opts, 4, 4),
            Err(TileError::InvalidGeometry(GeometryError::ZeroSize(Dimension::Height)))
        );
        assert_eq!(
            Geometry::resolve(&TileOptions::default(), 0, 4),
            Err(TileError::InvalidGeometry(GeometryError::ZeroSize(Dimension::Width)))
        );
    }

    #[test]
    fn four_by_four_into_two_by_two() {
        let grid = sequential_grid(4, 4);
        let g = Geometry::resolve(&options(2, 2), 4, 4).unwrap();
        let tiles: Vec<Tile<'_>> = g.tiles(&grid).collect();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|t| !t.is_fragment()));
        let first: Vec<&[u8]> = tiles[0].rows().collect();
        assert_eq!(first, vec![&[0u8, 1][..], &[4, 5][..]]);
        let last: Vec<&[u8]> = tiles[3].rows().collect();
        assert_eq!(last, vec![&[10u8, 11][..], &[14, 15][..]]);
    }

    #[test]
    fn three_by_three_keeps_fragments() {
        let grid = sequential_grid(3, 3);
        let opts = TileOptions {
            keep_fragments: true,
            ..options(2, 2)
        };
        let g = Geometry::resolve(&opts, 3, 3).unwrap();
        assert_eq!(
            shapes(g.tiles(&grid)),
            vec![(0, 0, 2, 2), (2, 0, 1, 2), (0, 2, 2, 1), (2, 2, 1, 1)]
        );
    }

    #[test]
    fn three_by_three_drops_fragments() {
        let grid = sequential_grid(3, 3);
        let g = Geometry::resolve(&options(2, 2), 3, 3).unwrap();
        let mut tiles = g.tiles(&grid);
        assert_eq!(shapes(tiles.clone()), vec![(0, 0, 2, 2)]);
        for _ in tiles.by_ref() {}
        assert_eq!(tiles.dropped(), 3);
    }

    #[test]
    fn image_smaller_than_tile_is_one_fragment() {
        let grid = sequential_grid(3, 2);
        let g = Geometry::resolve(&options(8, 8), 3, 2).unwrap();
        assert_eq!(g.tiles(&grid).count(), 0);

        let opts = TileOptions {
            keep_fragments: true,
            ..options(8, 8)
        };
        let g = Geometry::resolve(&opts, 3, 2).unwrap();
        let tiles: Vec<Tile<'_>> = g.tiles(&grid).collect();
        assert_eq!(tiles.len(), 1);
        assert!(tiles[0].is_fragment());
        assert_eq!(tiles[0].to_grid(), grid);
    }

    #[test]
    fn big_tiles_are_walked_before_neighbours() {
        // 4x2 image, 2x2 big tiles, 1x1 tiles: the whole left big tile comes
        // before the right one.
        let grid = sequential_grid(4, 2);
        let opts = TileOptions {
            big_width: Some(2),
            big_height: Some(2),
            ..options(1, 1)
        };
        let g = Geometry::resolve(&opts, 4, 2).unwrap();
        let values: Vec<u8> = g.tiles(&grid).map(|t| t.row(0)[0]).collect();
        assert_eq!(values, vec![0, 1, 4, 5, 2, 3, 6, 7]);
    }

    #[test]
    fn fragments_at_big_tile_edges() {
        // Big tiles of width 4 over a 6 wide image, tiles of width 3: each big
        // tile ends in a fragment.
        let grid = sequential_grid(6, 1);
        let opts = TileOptions {
            width: Some(3),
            height: Some(1),
            big_width: Some(4),
            big_height: None,
            keep_fragments: true,
        };
        let g = Geometry::resolve(&opts, 6, 1).unwrap();
        let tiles: Vec<Tile<'_>> = g.tiles(&grid).collect();
        assert_eq!(
            tiles.iter().map(|t| (t.x, t.width)).collect::<Vec<_>>(),
            vec![(0, 3), (3, 1), (4, 2)]
        );
        assert_eq!(
            tiles.iter().map(|t| t.is_fragment()).collect::<Vec<_>>(),
            vec![false, true, true]
        );
    }

    #[test]
    fn exact_multiples_reconstruct_grid() {
        let grid = sequential_grid(12, 6);
        let opts = TileOptions {
            big_width: Some(6),
            big_height: Some(6),
            ..options(3, 2)
        };
        let g = Geometry::resolve(&opts, 12, 6).unwrap();
        let mut rebuilt = PixelGrid::new(12, 6);
        let mut count = 0;
        for tile in g.tiles(&grid) {
            assert!(!tile.is_fragment());
            assert_eq!((tile.width, tile.height), (3, 2));
            for (r, row) in tile.rows().enumerate() {
                for (c, &v) in row.iter().enumerate() {
                    rebuilt.set(tile.x + c, tile.y + r, v);
                }
            }
            count += 1;
        }
        assert_eq!(count, (12 / 3) * (6 / 2));
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn dropping_never_yields_odd_sizes() {
        for (w, h) in [(5, 7), (9, 4), (1, 1), (16, 3)] {
            let grid = sequential_grid(w, h);
            let opts = TileOptions {
                big_width: Some(3),
                big_height: Some(5),
                ..options(2, 2)
            };
            let g = Geometry::resolve(&opts, w, h).unwrap();
            for tile in g.tiles(&grid) {
                assert_eq!((tile.width, tile.height), (2, 2));
            }
        }
    }
}
