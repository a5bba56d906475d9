// Core pixel containers shared by the renderer, HUD and surfaces.

use image::{Rgb, RgbImage, Rgba};

/// What the window shows: one `u32` per pixel, packed as 0x00RRGGBB for minifb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,     // how wide the frame is on screen (pixels)
    pub height: usize,    // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB
}

impl FrameBuffer {
    /// Pack an RGB image into the window format.
    /// Visual: the composited glasses view, ready for HUD text on top.
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let pixels = img.pixels().map(|p| pack_rgb(p[0], p[1], p[2])).collect();
        Self {
            width: w as usize,
            height: h as usize,
            pixels,
        }
    }

    /// Pixel at (x,y) as an RGB triple, or None outside the frame.
    pub fn rgb_at(&self, x: usize, y: usize) -> Option<Rgb<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let px = self.pixels[y * self.width + x];
        Some(Rgb(unpack_rgb(px)))
    }
}

/// Pack r,g,b into 0x00RRGGBB.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split 0x00RRGGBB back into [r,g,b].
#[inline]
pub fn unpack_rgb(px: u32) -> [u8; 3] {
    [((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8]
}

/// Source-over mix of `color` onto an opaque pixel, using the colour's own alpha.
#[inline]
pub fn mix_over(dst: [u8; 3], color: Rgba<u8>) -> [u8; 3] {
    let a = color[3] as u32;
    let inv = 255 - a;
    let mut out = [0u8; 3];
    for c in 0..3 {
        out[c] = ((color[c] as u32 * a + dst[c] as u32 * inv + 127) / 255) as u8;
    }
    out
}
