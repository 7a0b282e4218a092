//! RGBA colors at output (8-bit) and accumulation (16-bit) precision.
//!
//! Shading works in [`Color16`] so intermediate results may exceed the 8-bit
//! range without clamping; only the final pixel is narrowed to [`Color8`].

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Light intensities below this are treated as no light at all.
const MIN_BRIGHTNESS: f64 = 0.001;

/// An 8-bit-per-channel RGBA color, laid out as four consecutive bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A 16-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Color8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color8 = Color8::new(0x00, 0x00, 0x00, 0xff);

    /// Channel-wise average using integer division. Black for an empty slice.
    pub fn mix(colors: &[Color8]) -> Color8 {
        let Some(n) = divisor(colors.len()) else {
            return Self::BLACK;
        };
        let [r, g, b, a] = colors.iter().fold([0u64; 4], |acc, c| {
            [
                acc[0] + u64::from(c.r),
                acc[1] + u64::from(c.g),
                acc[2] + u64::from(c.b),
                acc[3] + u64::from(c.a),
            ]
        });
        // An average of u8 values always fits in u8
        Color8::new((r / n) as u8, (g / n) as u8, (b / n) as u8, (a / n) as u8)
    }
}

impl Color16 {
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Returned for rays that escape the scene or run out of depth.
    pub const BACKGROUND: Color16 = Color16::new(0x33, 0xb2, 0xcc, 0xff);
    pub const WHITE: Color16 = Color16::new(0xff, 0xff, 0xff, 0xff);
    pub const BLACK: Color16 = Color16::new(0x00, 0x00, 0x00, 0xff);

    /// Build a color from a packed `0xRRGGBBAA` value.
    pub fn from_rgba_hex(hex: u32) -> Self {
        let [r, g, b, a] = hex.to_be_bytes();
        Self::new(r.into(), g.into(), b.into(), a.into())
    }

    /// Narrow to 8 bits, clamping every channel to 255.
    pub fn to_color8(self) -> Color8 {
        let clamp = |c: u16| c.min(u16::from(u8::MAX)) as u8;
        Color8::new(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }

    /// Scale the rgb channels by `intensity`, keeping alpha.
    ///
    /// Intensities below 0.001 give opaque black. If the brightest channel
    /// would overflow 16 bits the whole triple is rescaled so hue survives.
    pub fn with_brightness(self, intensity: f64) -> Color16 {
        if intensity.is_nan() || intensity < MIN_BRIGHTNESS {
            return Self::BLACK;
        }

        let max_channel = f64::from(u16::MAX);
        let mut rgb = [
            f64::from(self.r) * intensity,
            f64::from(self.g) * intensity,
            f64::from(self.b) * intensity,
        ];
        let brightest = rgb[0].max(rgb[1]).max(rgb[2]);
        if brightest > max_channel {
            let k = max_channel / brightest;
            rgb.iter_mut().for_each(|c| *c *= k);
        }

        let narrow = |c: f64| c.clamp(0.0, max_channel) as u16;
        Color16::new(narrow(rgb[0]), narrow(rgb[1]), narrow(rgb[2]), self.a)
    }

    /// Channel-wise average using integer division. Black for an empty slice.
    ///
    /// The result depends only on the multiset of inputs, not their order.
    pub fn mix(colors: &[Color16]) -> Color16 {
        let Some(n) = divisor(colors.len()) else {
            return Self::BLACK;
        };
        let [r, g, b, a] = colors.iter().fold([0u64; 4], |acc, c| {
            [
                acc[0] + u64::from(c.r),
                acc[1] + u64::from(c.g),
                acc[2] + u64::from(c.b),
                acc[3] + u64::from(c.a),
            ]
        });
        Color16::new((r / n) as u16, (g / n) as u16, (b / n) as u16, (a / n) as u16)
    }
}

impl From<Color8> for Color16 {
    fn from(c: Color8) -> Self {
        Color16::new(c.r.into(), c.g.into(), c.b.into(), c.a.into())
    }
}

fn divisor(len: usize) -> Option<u64> {
    (len > 0).then_some(len as u64)
}
