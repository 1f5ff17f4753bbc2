//! Fixed 256-slot color palette

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;

/// Number of color slots in a palette
pub const PALETTE_SIZE: usize = 256;

/// RGBA color with 8-bit channels - exactly 4 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a packed `0xRRGGBBAA` value
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 24) & 0xFF) as u8,
            g: ((packed >> 16) & 0xFF) as u8,
            b: ((packed >> 8) & 0xFF) as u8,
            a: (packed & 0xFF) as u8,
        }
    }
}

/// 256-slot RGBA color table.
///
/// Voxel value `v` (1..=255) selects slot `v - 1`; value 0 marks an empty
/// cell and has no color. Slots are never reordered; overrides replace a
/// slot's color in place.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgba; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [Rgba::default(); PALETTE_SIZE];
        for (slot, &packed) in DEFAULT_PALETTE.iter().enumerate() {
            colors[slot] = Rgba::from_packed(packed);
        }
        Self { colors }
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette").field("colors", &"<256 slots>").finish()
    }
}

impl Palette {
    /// Create a palette from a full slot array
    pub fn from_colors(colors: [Rgba; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Build a palette from an RGBA image, typically 16x16.
    ///
    /// Pixels are read row-major from the top-left; images with fewer than
    /// 256 pixels have the remaining slots filled from the default palette.
    /// Extra pixels are ignored.
    pub fn from_image(image: &RgbaImage) -> Self {
        let mut palette = Self::default();
        for (slot, pixel) in image.pixels().take(PALETTE_SIZE).enumerate() {
            let [r, g, b, a] = pixel.0;
            palette.colors[slot] = Rgba::new(r, g, b, a);
        }
        palette
    }

    /// Color stored in a slot (0..=255)
    pub fn color(&self, slot: usize) -> Rgba {
        self.colors[slot]
    }

    /// Color for a voxel value, applying the `v - 1` slot convention.
    /// Returns `None` for the empty value 0.
    pub fn color_for_voxel(&self, value: u8) -> Option<Rgba> {
        if value == 0 {
            None
        } else {
            Some(self.colors[value as usize - 1])
        }
    }

    /// Replace a single slot's color; out-of-range slots are ignored
    pub fn set_color(&mut self, slot: usize, color: Rgba) {
        if slot < PALETTE_SIZE {
            self.colors[slot] = color;
        }
    }

    /// Copy of this palette with per-slot color overrides applied
    pub fn with_overrides(&self, overrides: &[(usize, Rgba)]) -> Self {
        let mut palette = self.clone();
        for &(slot, color) in overrides {
            palette.set_color(slot, color);
        }
        palette
    }
}

/// Default MagicaVoxel palette, packed `0xRRGGBBAA`.
const DEFAULT_PALETTE: [u32; 256] = [
    0x00000000, 0xffffffff, 0xffccffff, 0xff99ffff, 0xff66ffff, 0xff33ffff, 0xff00ffff, 0xffffccff,
    0xffccccff, 0xff99ccff, 0xff66ccff, 0xff33ccff, 0xff00ccff, 0xffff99ff, 0xffcc99ff, 0xff9999ff,
    0xff6699ff, 0xff3399ff, 0xff0099ff, 0xffff66ff, 0xffcc66ff, 0xff9966ff, 0xff6666ff, 0xff3366ff,
    0xff0066ff, 0xffff33ff, 0xffcc33ff, 0xff9933ff, 0xff6633ff, 0xff3333ff, 0xff0033ff, 0xffff00ff,
    0xffcc00ff, 0xff9900ff, 0xff6600ff, 0xff3300ff, 0xff0000ff, 0xffffffcc, 0xffccffcc, 0xff99ffcc,
    0xff66ffcc, 0xff33ffcc, 0xff00ffcc, 0xffffcccc, 0xffcccccc, 0xff99cccc, 0xff66cccc, 0xff33cccc,
    0xff00cccc, 0xffff99cc, 0xffcc99cc, 0xff9999cc, 0xff6699cc, 0xff3399cc, 0xff0099cc, 0xffff66cc,
    0xffcc66cc, 0xff9966cc, 0xff6666cc, 0xff3366cc, 0xff0066cc, 0xffff33cc, 0xffcc33cc, 0xff9933cc,
    0xff6633cc, 0xff3333cc, 0xff0033cc, 0xffff00cc, 0xffcc00cc, 0xff9900cc, 0xff6600cc, 0xff3300cc,
    0xff0000cc, 0xffffff99, 0xffccff99, 0xff99ff99, 0xff66ff99, 0xff33ff99, 0xff00ff99, 0xffffcc99,
    0xffcccc99, 0xff99cc99, 0xff66cc99, 0xff33cc99, 0xff00cc99, 0xffff9999, 0xffcc9999, 0xff999999,
    0xff669999, 0xff339999, 0xff009999, 0xffff6699, 0xffcc6699, 0xff996699, 0xff666699, 0xff336699,
    0xff006699, 0xffff3399, 0xffcc3399, 0xff993399, 0xff663399, 0xff333399, 0xff003399, 0xffff0099,
    0xffcc0099, 0xff990099, 0xff660099, 0xff330099, 0xff000099, 0xffffff66, 0xffccff66, 0xff99ff66,
    0xff66ff66, 0xff33ff66, 0xff00ff66, 0xffffcc66, 0xffcccc66, 0xff99cc66, 0xff66cc66, 0xff33cc66,
    0xff00cc66, 0xffff9966, 0xffcc9966, 0xff999966, 0xff669966, 0xff339966, 0xff009966, 0xffff6666,
    0xffcc6666, 0xff996666, 0xff666666, 0xff336666, 0xff006666, 0xffff3366, 0xffcc3366, 0xff993366,
    0xff663366, 0xff333366, 0xff003366, 0xffff0066, 0xffcc0066, 0xff990066, 0xff660066, 0xff330066,
    0xff000066, 0xffffff33, 0xffccff33, 0xff99ff33, 0xff66ff33, 0xff33ff33, 0xff00ff33, 0xffffcc33,
    0xffcccc33, 0xff99cc33, 0xff66cc33, 0xff33cc33, 0xff00cc33, 0xffff9933, 0xffcc9933, 0xff999933,
    0xff669933, 0xff339933, 0xff009933, 0xffff6633, 0xffcc6633, 0xff996633, 0xff666633, 0xff336633,
    0xff006633, 0xffff3333, 0xffcc3333, 0xff993333, 0xff663333, 0xff333333, 0xff003333, 0xffff0033,
    0xffcc0033, 0xff990033, 0xff660033, 0xff330033, 0xff000033, 0xffffff00, 0xffccff00, 0xff99ff00,
    0xff66ff00, 0xff33ff00, 0xff00ff00, 0xffffcc00, 0xffcccc00, 0xff99cc00, 0xff66cc00, 0xff33cc00,
    0xff00cc00, 0xffff9900, 0xffcc9900, 0xff999900, 0xff669900, 0xff339900, 0xff009900, 0xffff6600,
    0xffcc6600, 0xff996600, 0xff666600, 0xff336600, 0xff006600, 0xffff3300, 0xffcc3300, 0xff993300,
    0xff663300, 0xff333300, 0xff003300, 0xffff0000, 0xffcc0000, 0xff990000, 0xff660000, 0xff330000,
    0xff0000ee, 0xff0000dd, 0xff0000bb, 0xff0000aa, 0xff000088, 0xff000077, 0xff000055, 0xff000044,
    0xff000022, 0xff000011, 0xff00ee00, 0xff00dd00, 0xff00bb00, 0xff00aa00, 0xff008800, 0xff007700,
    0xff005500, 0xff004400, 0xff002200, 0xff001100, 0xffee0000, 0xffdd0000, 0xffbb0000, 0xffaa0000,
    0xff880000, 0xff770000, 0xff550000, 0xff440000, 0xff220000, 0xff110000, 0xffeeeeee, 0xffdddddd,
    0xffbbbbbb, 0xffaaaaaa, 0xff888888, 0xff777777, 0xff555555, 0xff444444, 0xff222222, 0xff111111,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_slot_convention() {
        let palette = Palette::default();
        assert_eq!(palette.color_for_voxel(0), None);
        assert_eq!(palette.color_for_voxel(1), Some(palette.color(0)));
        assert_eq!(palette.color_for_voxel(255), Some(palette.color(254)));
    }

    #[test]
    fn test_default_table_decodes_rgba() {
        let palette = Palette::default();
        // Slot 1 is 0xffffffff: opaque white.
        assert_eq!(palette.color(1), Rgba::new(0xff, 0xff, 0xff, 0xff));
        // Slot 2 is 0xffccffff.
        assert_eq!(palette.color(2), Rgba::new(0xff, 0xcc, 0xff, 0xff));
    }

    #[test]
    fn test_set_color_and_overrides() {
        let mut palette = Palette::default();
        let red = Rgba::new(255, 0, 0, 255);
        palette.set_color(3, red);
        assert_eq!(palette.color(3), red);
        // Out-of-range slot is ignored.
        palette.set_color(300, red);

        let green = Rgba::new(0, 255, 0, 255);
        let derived = palette.with_overrides(&[(7, green)]);
        assert_eq!(derived.color(7), green);
        assert_eq!(derived.color(3), red);
        assert_ne!(palette.color(7), green);
    }

    #[test]
    fn test_from_image_row_major() {
        let mut image = RgbaImage::new(16, 16);
        image.put_pixel(0, 0, image::Rgba([1, 2, 3, 4]));
        image.put_pixel(15, 0, image::Rgba([5, 6, 7, 8]));
        image.put_pixel(0, 1, image::Rgba([9, 10, 11, 12]));
        let palette = Palette::from_image(&image);
        assert_eq!(palette.color(0), Rgba::new(1, 2, 3, 4));
        assert_eq!(palette.color(15), Rgba::new(5, 6, 7, 8));
        assert_eq!(palette.color(16), Rgba::new(9, 10, 11, 12));
    }

    #[test]
    fn test_from_image_pads_with_defaults() {
        // 4x4 image covers only the first 16 slots.
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 40]));
        let palette = Palette::from_image(&image);
        let defaults = Palette::default();
        assert_eq!(palette.color(15), Rgba::new(10, 20, 30, 40));
        assert_eq!(palette.color(16), defaults.color(16));
        assert_eq!(palette.color(255), defaults.color(255));
    }

    #[test]
    fn test_color_bytes_layout() {
        let color = Rgba::new(1, 2, 3, 4);
        let bytes: [u8; 4] = bytemuck::cast(color);
        assert_eq!(bytes, [1, 2, 3, 4]);
    }
}
