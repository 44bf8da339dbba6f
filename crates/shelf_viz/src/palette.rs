//! Color assignment for site types and cell types.
//!
//! Colors are assigned by sorted name, so the same input always renders
//! with the same colors regardless of declaration order.

use image::Rgba;

/// Fill colors for site types in the floorplan rendering.
pub const SITE_PALETTE: [[u8; 3]; 15] = [
    [0x4c, 0xaf, 0x50],
    [0x21, 0x96, 0xf3],
    [0xff, 0x98, 0x00],
    [0x9c, 0x27, 0xb0],
    [0xf4, 0x43, 0x36],
    [0x00, 0xbc, 0xd4],
    [0xff, 0xeb, 0x3b],
    [0x79, 0x55, 0x48],
    [0x60, 0x7d, 0x8b],
    [0xe9, 0x1e, 0x63],
    [0x3f, 0x51, 0xb5],
    [0x8b, 0xc3, 0x4a],
    [0xff, 0x57, 0x22],
    [0x9e, 0x9e, 0x9e],
    [0x67, 0x3a, 0xb7],
];

/// Marker colors for cell types in the fixed-instance overlay.
pub const MARKER_PALETTE: [[u8; 3]; 14] = [
    [0xff, 0x6b, 0x6b],
    [0x4e, 0xcd, 0xc4],
    [0x45, 0xb7, 0xd1],
    [0x96, 0xce, 0xb4],
    [0xff, 0xea, 0xa7],
    [0xdd, 0xa0, 0xdd],
    [0x98, 0xd8, 0xc8],
    [0xf7, 0xdc, 0x6f],
    [0xbb, 0x8f, 0xce],
    [0x85, 0xc1, 0xe9],
    [0xf8, 0xc4, 0x71],
    [0x82, 0xe0, 0xaa],
    [0xf1, 0x94, 0x8a],
    [0xd7, 0xbd, 0xe2],
];

/// Background color.
pub const BACKGROUND: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Grid-line color.
pub const GRID_LINE: Rgba<u8> = Rgba([0x30, 0x30, 0x30, 0xff]);

/// Picks the `index`-th color from a palette, cycling past the end.
pub fn pick(palette: &[[u8; 3]], index: usize) -> Rgba<u8> {
    let [r, g, b] = palette[index % palette.len()];
    Rgba([r, g, b, 0xff])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_cycles() {
        assert_eq!(pick(&SITE_PALETTE, 0), pick(&SITE_PALETTE, SITE_PALETTE.len()));
        assert_ne!(pick(&SITE_PALETTE, 0), pick(&SITE_PALETTE, 1));
    }

    #[test]
    fn opaque_colors() {
        for i in 0..SITE_PALETTE.len() {
            assert_eq!(pick(&SITE_PALETTE, i).0[3], 0xff);
        }
    }
}
