use smallvec::SmallVec;

use crate::error::{GeometryError, TileError};

/// Bits used per packed output pixel. Always a divisor of 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitDepth(u8);

impl BitDepth {
    pub const ONE: BitDepth = BitDepth(1);
    pub const TWO: BitDepth = BitDepth(2);
    pub const FOUR: BitDepth = BitDepth(4);
    pub const EIGHT: BitDepth = BitDepth(8);

    pub fn new(bits: u8) -> Result<Self, TileError> {
        if bits == 0 || bits > 8 || 8 % bits != 0 {
            return Err(GeometryError::BitDepth(bits).into());
        }
        Ok(BitDepth(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Pixels that fit in one output byte.
    pub fn pixels_per_byte(self) -> usize {
        (8 / self.0) as usize
    }

    /// Highest palette index representable at this depth.
    pub fn max_colour(self) -> u8 {
        ((1u16 << self.0) - 1) as u8
    }
}

impl Default for BitDepth {
    fn default() -> Self {
        BitDepth::TWO
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = TileError;

    fn try_from(bits: u8) -> Result<Self, TileError> {
        BitDepth::new(bits)
    }
}

/// Positional weights that combine `8 / depth` pixels into one byte.
///
/// The first pixel of a group lands in the most significant bits:
/// `weight[i] = 2^(8 - d - i*d)`, so depth 2 gives `[64, 16, 4, 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackingScheme {
    depth: BitDepth,
    weights: SmallVec<[u8; 8]>,
}

impl PackingScheme {
    pub fn new(depth: BitDepth) -> Self {
        let d = depth.bits() as u32;
        let weights = (0..depth.pixels_per_byte() as u32)
            .map(|i| (1u16 << (8 - d - i * d)) as u8)
            .collect();
        Self { depth, weights }
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn weights(&self) -> &[u8] {
        &self.weights
    }

    /// Pixels per group (one group per output byte).
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Packed length of a row of `pixels` values.
    pub fn packed_len(&self, pixels: usize) -> usize {
        pixels.div_ceil(self.len())
    }

    /// Pack a row of palette indices into bytes.
    pub fn pack(&self, row: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.packed_len(row.len()));
        self.pack_into(row.iter().copied(), &mut out);
        out
    }

    /// Pack a stream of palette indices, appending the bytes to `out`.
    ///
    /// Values must already be clamped to `0..=max_colour`. A trailing short
    /// group is packed as if the missing pixels were zero.
    pub fn pack_into<I>(&self, row: I, out: &mut Vec<u8>)
    where
        I: IntoIterator<Item = u8>,
    {
        let mut acc = 0u16;
        let mut slot = 0;
        for value in row {
            debug_assert!(
                value <= self.depth.max_colour(),
                "palette index {value} exceeds max colour {} at depth {}",
                self.depth.max_colour(),
                self.depth.bits()
            );
            acc += value as u16 * self.weights[slot] as u16;
            slot += 1;
            if slot == self.weights.len() {
                out.push(acc as u8);
                acc = 0;
                slot = 0;
            }
        }
        if slot != 0 {
            out.push(acc as u8);
        }
    }
}

/// Pack a row with the given scheme.
pub fn pack(row: &[u8], scheme: &PackingScheme) -> Vec<u8> {
    scheme.pack(row)
}
