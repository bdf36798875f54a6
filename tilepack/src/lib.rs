pub mod error;
pub mod grid;
pub mod packing;
pub mod range;
pub mod partition;
pub mod emit;
pub mod sink;
#[cfg(feature = "serde")]
pub mod config;

pub use emit::{emit, EmitOptions, EmitSummary, Emitter, PackedRows, Sink, TileInfo};
pub use error::{Dimension, EmitError, GeometryError, TileError};
pub use grid::PixelGrid;
pub use packing::{pack, BitDepth, PackingScheme};
pub use partition::{Geometry, Tile, TileOptions, Tiles};
pub use range::{to_image, to_mask, Section};
