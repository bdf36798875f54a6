//! Remapping of palette indices that do not fit the output bit depth.
//!
//! The image variant replaces out-of-range indices with 0; the mask variant
//! marks exactly those pixels with the max colour and clears everything else.

/// Which layer of a tile is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Mask,
    Image,
}

impl Section {
    /// Remap a single palette index for this section.
    #[inline]
    pub fn remap(self, value: u8, max_colour: u8) -> u8 {
        match self {
            Section::Image => image_value(value, max_colour),
            Section::Mask => mask_value(value, max_colour),
        }
    }

    /// Lazily remap a row for this section.
    pub fn remap_row(self, row: &[u8], max_colour: u8) -> impl Iterator<Item = u8> + '_ {
        row.iter().map(move |&v| self.remap(v, max_colour))
    }
}

#[inline]
fn image_value(value: u8, max_colour: u8) -> u8 {
    if value <= max_colour {
        value
    } else {
        0
    }
}

#[inline]
fn mask_value(value: u8, max_colour: u8) -> u8 {
    if value <= max_colour {
        0
    } else {
        max_colour
    }
}

/// Image variant of a row: out-of-range indices become 0.
pub fn to_image(row: &[u8], max_colour: u8) -> Vec<u8> {
    Section::Image.remap_row(row, max_colour).collect()
}

/// Mask variant of a row: out-of-range indices become `max_colour`, the rest 0.
pub fn to_mask(row: &[u8], max_colour: u8) -> Vec<u8> {
    Section::Mask.remap_row(row, max_colour).collect()
}
