//! Indexed PNG decoding.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tilepack::PixelGrid;

/// A decoded palette image: one palette index per pixel plus the palette
/// chunks needed to write tiles back out.
#[derive(Debug, Clone)]
pub struct IndexedImage {
    pub grid: PixelGrid,
    /// RGB triplets from the PLTE chunk.
    pub palette: Vec<u8>,
    /// Alpha values from the tRNS chunk, if any.
    pub trns: Option<Vec<u8>>,
    /// Bits per index in the source file.
    pub bit_depth: u8,
}

impl IndexedImage {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Number of palette entries.
    pub fn palette_len(&self) -> usize {
        self.palette.len() / 3
    }
}

/// Open and decode an indexed PNG file.
pub fn load_indexed_png(path: &Path) -> Result<IndexedImage> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    decode_indexed_png(std::io::BufReader::new(file))
        .with_context(|| format!("decoding {}", path.display()))
}

/// Decode an indexed PNG stream. Any other colour type is rejected.
pub fn decode_indexed_png<R: Read>(r: R) -> Result<IndexedImage> {
    let mut decoder = png::Decoder::new(r);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info().context("reading PNG header")?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).context("reading PNG data")?;

    if frame.color_type != png::ColorType::Indexed {
        bail!("can only process png files with indexed palettes");
    }
    let bit_depth = frame.bit_depth as u8;
    if !matches!(bit_depth, 1 | 2 | 4 | 8) {
        bail!("unsupported indexed bit depth {bit_depth}");
    }

    let info = reader.info();
    let palette = info
        .palette
        .as_ref()
        .map(|p| p.to_vec())
        .context("indexed PNG has no palette")?;
    let trns = info.trns.as_ref().map(|t| t.to_vec());

    let width = frame.width as usize;
    let height = frame.height as usize;
    let mut pixels = Vec::with_capacity(width * height);
    for line in buf.chunks_exact(frame.line_size).take(height) {
        unpack_indices(line, bit_depth, width, &mut pixels);
    }

    Ok(IndexedImage {
        grid: PixelGrid::from_buf(width, height, pixels)?,
        palette,
        trns,
        bit_depth,
    })
}

/// Expand one packed scanline into `width` palette indices, most significant
/// bits first.
pub fn unpack_indices(line: &[u8], bit_depth: u8, width: usize, out: &mut Vec<u8>) {
    if bit_depth == 8 {
        out.extend_from_slice(&line[..width]);
        return;
    }
    let per_byte = (8 / bit_depth) as usize;
    let mask = (1u8 << bit_depth) - 1;
    for x in 0..width {
        let shift = 8 - bit_depth as usize * (x % per_byte + 1);
        out.push((line[x / per_byte] >> shift) & mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            if color == png::ColorType::Indexed {
                encoder.set_palette(vec![0u8; 3 * 16]);
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn unpack_two_bit_line() {
        let mut out = Vec::new();
        unpack_indices(&[0b11_10_01_00, 0b01_00_00_00], 2, 5, &mut out);
        assert_eq!(out, vec![3, 2, 1, 0, 1]);
    }

    #[test]
    fn unpack_one_and_four_bit_lines() {
        let mut out = Vec::new();
        unpack_indices(&[0b1010_0000], 1, 3, &mut out);
        assert_eq!(out, vec![1, 0, 1]);
        out.clear();
        unpack_indices(&[0xAB, 0xC0], 4, 3, &mut out);
        assert_eq!(out, vec![0xA, 0xB, 0xC]);
    }

    #[test]
    fn decodes_four_bit_indexed() {
        // 3x2 image: [1, 2, 3] / [15, 0, 7]
        let data = [0x12, 0x30, 0xF0, 0x70];
        let bytes = encode(3, 2, png::ColorType::Indexed, png::BitDepth::Four, &data);
        let image = decode_indexed_png(&bytes[..]).unwrap();
        assert_eq!(image.bit_depth, 4);
        assert_eq!(image.palette_len(), 16);
        assert_eq!(image.grid.row(0), &[1, 2, 3]);
        assert_eq!(image.grid.row(1), &[15, 0, 7]);
        assert!(image.trns.is_none());
    }

    #[test]
    fn rejects_grayscale() {
        let bytes = encode(2, 2, png::ColorType::Grayscale, png::BitDepth::Eight, &[0; 4]);
        let err = decode_indexed_png(&bytes[..]).unwrap_err();
        assert!(err.to_string().contains("indexed palettes"), "{err}");
    }
}
