// Pixel mixing: putting the glasses layer over the photo, and tinting
// selected pixels towards a highlight colour.
// Visual: the composited view, and the green edge glow on damage captures.

use image::{GrayImage, Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::Error;

fn check_dims(what: &'static str, left: (u32, u32), right: (u32, u32)) -> Result<(), Error> {
    if left != right {
        return Err(Error::Dimensions { what, left, right });
    }
    Ok(())
}

#[inline]
fn lerp_u8(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 * (1.0 - t) + to as f32 * t).round().clamp(0.0, 255.0) as u8
}

/// Source-over composite of `layer` onto an opaque background.
/// Visual: where the layer is transparent you see the photo, where it is
/// opaque you see the glasses, and translucent glass tints the photo.
pub fn composite_over(background: &RgbImage, layer: &RgbaImage) -> Result<RgbImage, Error> {
    check_dims("composite", background.dimensions(), layer.dimensions())?;

    let mut out = background.clone();
    for (dst, src) in out.pixels_mut().zip(layer.pixels()) {
        let a = src[3];
        if a == 0 {
            continue; // visual: photo only
        }
        if a == 255 {
            *dst = Rgb([src[0], src[1], src[2]]);
            continue;
        }
        *dst = Rgb(crate::types::mix_over(dst.0, *src));
    }
    Ok(out)
}

/// Where `mask` is set, mix `image` towards `color` by `weight` (0..1);
/// everything else stays bit-identical.
pub fn tint_masked(image: &RgbImage, mask: &GrayImage, color: Rgba<u8>, weight: f32) -> Result<RgbImage, Error> {
    check_dims("tint mask", image.dimensions(), mask.dimensions())?;

    let mut out = image.clone();
    for (px, m) in out.pixels_mut().zip(mask.pixels()) {
        if m[0] == 0 {
            continue;
        }
        for c in 0..3 {
            px[c] = lerp_u8(px[c], color[c], weight);
        }
    }
    Ok(out)
}

/// Use `strength` as a per-pixel alpha map (0 = transparent, 255 = `color`)
/// and lay it over `image` at `opacity`.
pub fn tint_by_strength(image: &RgbImage, strength: &GrayImage, color: Rgba<u8>, opacity: f32) -> Result<RgbImage, Error> {
    check_dims("tint strength", image.dimensions(), strength.dimensions())?;

    let mut out = image.clone();
    for (px, s) in out.pixels_mut().zip(strength.pixels()) {
        if s[0] == 0 {
            continue;
        }
        let t = opacity * s[0] as f32 / 255.0;
        for c in 0..3 {
            px[c] = lerp_u8(px[c], color[c], t);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn composite_respects_layer_alpha() {
        let bg = RgbImage::from_pixel(3, 1, Rgb([100, 100, 100]));
        let mut layer = RgbaImage::new(3, 1);
        layer.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        layer.put_pixel(2, 0, Rgba([200, 0, 0, 51])); // 20 %
        let out = composite_over(&bg, &layer).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([100, 100, 100]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([0, 255, 0]));
        assert_eq!(*out.get_pixel(2, 0), Rgb([120, 80, 80]));
    }

    #[test]
    fn composite_rejects_mismatched_sizes() {
        let err = composite_over(&RgbImage::new(4, 4), &RgbaImage::new(4, 5)).unwrap_err();
        assert!(matches!(err, Error::Dimensions { what: "composite", .. }));
    }

    #[test]
    fn masked_tint_is_a_seventy_thirty_mix_on_mask_only() {
        let img = RgbImage::from_pixel(2, 1, Rgb([100, 200, 50]));
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(0, 0, Luma([255]));
        let out = tint_masked(&img, &mask, Rgba([0, 255, 0, 255]), 0.3).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([70, 217, 35]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([100, 200, 50]));
    }

    #[test]
    fn strength_scales_the_tint() {
        let img = RgbImage::from_pixel(3, 1, Rgb([0, 0, 0]));
        let mut s = GrayImage::new(3, 1);
        s.put_pixel(1, 0, Luma([255]));
        s.put_pixel(2, 0, Luma([128]));
        let out = tint_by_strength(&img, &s, Rgba([0, 255, 0, 255]), 0.35).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([0, 89, 0]));
        assert_eq!(*out.get_pixel(2, 0), Rgb([0, 45, 0]));
    }
}
