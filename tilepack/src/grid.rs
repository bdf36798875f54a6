use crate::error::TileError;

/// Palette-indexed image with row-major pixel data.
///
/// Every row has exactly `width` entries; the constructors reject anything
/// that is not rectangular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    buf: Vec<u8>,
}

impl PixelGrid {
    /// Create a grid filled with palette index 0.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buf: vec![0u8; width * height],
        }
    }

    /// Create a grid from a flat row-major buffer.
    pub fn from_buf(width: usize, height: usize, buf: Vec<u8>) -> Result<Self, TileError> {
        let expected = width * height;
        if buf.len() != expected {
            return Err(TileError::BufferSize {
                width,
                height,
                expected,
                found: buf.len(),
            });
        }
        Ok(Self { width, height, buf })
    }

    /// Create a grid from individual rows, which must all have the same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, TileError> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut buf = Vec::with_capacity(width * rows.len());
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(TileError::IrregularGrid {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            buf.extend_from_slice(values);
        }
        Ok(Self {
            width,
            height: rows.len(),
            buf,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the palette index at (x, y).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.buf[y * self.width + x]
    }

    /// Set the palette index at (x, y).
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, val: u8) {
        self.buf[y * self.width + x] = val;
    }

    /// Row `y` as a slice.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.buf[y * self.width..(y + 1) * self.width]
    }

    /// Iterate over all rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        // chunks_exact(0) panics, and a zero-width grid has no pixels anyway
        let width = self.width.max(1);
        self.buf.chunks_exact(width).take(self.height)
    }

    /// The underlying row-major buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}
