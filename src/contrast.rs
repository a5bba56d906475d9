//! Contrast-limited adaptive histogram equalisation (CLAHE).
//!
//! The image is split into a grid of tiles; each tile gets its own clipped
//! histogram-equalisation lookup table, and every pixel is mapped through a
//! bilinear mix of the four nearest tile tables so tile seams do not show.

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Equalise `gray` with `tiles.0 × tiles.1` tiles. `clip_limit` is relative to
/// a flat histogram (2.0 lets a bin hold twice the average count).
pub fn clahe(gray: &GrayImage, clip_limit: f32, tiles: (u32, u32)) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }

    let tile_w = w.div_ceil(tiles.0.clamp(1, w));
    let tile_h = h.div_ceil(tiles.1.clamp(1, h));
    // Recount so no tile is empty when the size does not divide evenly.
    let nx = w.div_ceil(tile_w);
    let ny = h.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((nx * ny) as usize);
    for ty in 0..ny {
        for tx in 0..nx {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);
            luts.push(tile_lut(gray, (x0, y0, x1, y1), clip_limit));
        }
    }

    let lut_at = |tx: i64, ty: i64, v: u8| -> f32 {
        let tx = tx.clamp(0, nx as i64 - 1) as usize;
        let ty = ty.clamp(0, ny as i64 - 1) as usize;
        luts[ty * nx as usize + tx][v as usize] as f32
    };

    let mut out = GrayImage::new(w, h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let v = gray.get_pixel(x, y)[0];

        // Position in tile-centre coordinates.
        let gx = (x as f32 + 0.5) / tile_w as f32 - 0.5;
        let gy = (y as f32 + 0.5) / tile_h as f32 - 0.5;
        let tx0 = gx.floor() as i64;
        let ty0 = gy.floor() as i64;
        let fx = gx - tx0 as f32;
        let fy = gy - ty0 as f32;

        let top = lut_at(tx0, ty0, v) * (1.0 - fx) + lut_at(tx0 + 1, ty0, v) * fx;
        let bottom = lut_at(tx0, ty0 + 1, v) * (1.0 - fx) + lut_at(tx0 + 1, ty0 + 1, v) * fx;
        let mixed = top * (1.0 - fy) + bottom * fy;
        *px = Luma([mixed.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Clipped equalisation table for the tile `[x0, x1) × [y0, y1)`.
fn tile_lut(gray: &GrayImage, (x0, y0, x1, y1): (u32, u32, u32, u32), clip_limit: f32) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[gray.get_pixel(x, y)[0] as usize] += 1;
        }
    }
    let area = (x1 - x0) * (y1 - y0);

    // Clip every bin and hand the excess back evenly.
    let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
    let mut excess = 0;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }
    let bonus = excess / BINS as u32;
    let residual = excess % BINS as u32;
    for bin in hist.iter_mut() {
        *bin += bonus;
    }
    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        for bin in hist.iter_mut().step_by(step).take(residual as usize) {
            *bin += 1;
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cdf = 0u32;
    for (v, bin) in hist.iter().enumerate() {
        cdf += bin;
        lut[v] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
