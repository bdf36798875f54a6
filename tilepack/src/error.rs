use thiserror::Error;

/// Which dimension of the tiling geometry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
    BigWidth,
    BigHeight,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Width => "tile width",
            Dimension::Height => "tile height",
            Dimension::BigWidth => "big tile width",
            Dimension::BigHeight => "big tile height",
        };
        f.write_str(name)
    }
}

/// Tile sizes or bit depth that cannot be tiled or packed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("{0} must be positive")]
    ZeroSize(Dimension),

    #[error("bit depth {0} does not evenly divide 8")]
    BitDepth(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("row {row} has {found} pixels, expected {expected}")]
    IrregularGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("pixel buffer holds {found} values, expected {expected} for {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },
}

/// Failure while driving tiles into a sink.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Tile(#[from] TileError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
