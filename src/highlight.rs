// Damage highlighting for captures: find edges in the composited frame and
// paint them in the highlight colour.
// Visual: scratches, panel gaps and outlines glow green on the `_det` image.
//
// Two interchangeable pipelines:
// - Full: CLAHE -> Canny -> dilate -> 70/30 mix at edge pixels only.
// - Fallback: 3x3 find-edges kernel, edge strength as alpha, laid over at 35 %.
// Which one runs is decided once when the highlighter is built.

use image::{GrayImage, RgbImage, Rgba};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::compose::tint_by_strength;
#[cfg(feature = "edges")]
use crate::compose::tint_masked;
use crate::error::Error;

#[cfg(feature = "edges")]
const CLAHE_CLIP_LIMIT: f32 = 2.0;
#[cfg(feature = "edges")]
const CLAHE_TILES: (u32, u32) = (8, 8);
#[cfg(feature = "edges")]
const CANNY_LOW: f32 = 60.0;
#[cfg(feature = "edges")]
const CANNY_HIGH: f32 = 150.0;
/// Weight of the highlight colour at edge pixels in the full pipeline.
#[cfg(feature = "edges")]
const EDGE_MIX: f32 = 0.3;
/// Opacity of the colourised edge map in the fallback pipeline.
const FALLBACK_OPACITY: f32 = 0.35;

/// Laplacian-style "find edges" kernel: 8 in the centre, -1 around.
const FIND_EDGES: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightPipeline {
    Full,
    Fallback,
}

impl HighlightPipeline {
    /// Whether the full pipeline's image-processing backend was built in.
    pub const fn full_available() -> bool {
        cfg!(feature = "edges")
    }

    /// Best pipeline this build can run.
    pub const fn detect() -> Self {
        if Self::full_available() {
            HighlightPipeline::Full
        } else {
            HighlightPipeline::Fallback
        }
    }

    /// Settle a (possibly absent) request against what is available.
    pub fn resolve(requested: Option<Self>) -> Self {
        match requested {
            Some(HighlightPipeline::Fallback) => HighlightPipeline::Fallback,
            Some(HighlightPipeline::Full) | None if !Self::full_available() => {
                warn!("full damage-highlight pipeline not built in, using fallback");
                HighlightPipeline::Fallback
            }
            _ => HighlightPipeline::Full,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DamageHighlighter {
    pipeline: HighlightPipeline,
    color: Rgba<u8>,
}

impl DamageHighlighter {
    pub fn new(pipeline: HighlightPipeline, color: Rgba<u8>) -> Self {
        Self {
            pipeline: HighlightPipeline::resolve(Some(pipeline)),
            color,
        }
    }

    pub fn pipeline(&self) -> HighlightPipeline {
        self.pipeline
    }

    /// Edge-highlighted copy of `image`, same size.
    pub fn highlight(&self, image: &RgbImage) -> Result<RgbImage, Error> {
        match self.pipeline {
            #[cfg(feature = "edges")]
            HighlightPipeline::Full => highlight_full(image, self.color),
            _ => highlight_fallback(image, self.color),
        }
    }
}

#[cfg(feature = "edges")]
fn highlight_full(image: &RgbImage, color: Rgba<u8>) -> Result<RgbImage, Error> {
    use imageproc::distance_transform::Norm;

    let gray = image::imageops::grayscale(image);
    let equalized = crate::contrast::clahe(&gray, CLAHE_CLIP_LIMIT, CLAHE_TILES);
    let edges = imageproc::edges::canny(&equalized, CANNY_LOW, CANNY_HIGH);
    // One pass with a 3x3 cross.
    let mask = imageproc::morphology::dilate(&edges, Norm::L1, 1);
    tint_masked(image, &mask, color, EDGE_MIX)
}

fn highlight_fallback(image: &RgbImage, color: Rgba<u8>) -> Result<RgbImage, Error> {
    let gray = image::imageops::grayscale(image);
    let (w, h) = gray.dimensions();
    let strength: GrayImage = if w < 3 || h < 3 {
        GrayImage::new(w, h) // no interior pixels to filter
    } else {
        image::imageops::filter3x3(&gray, &FIND_EDGES)
    };
    tint_by_strength(image, &strength, color, FALLBACK_OPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const LIME: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn all_pipelines() -> Vec<DamageHighlighter> {
        let mut v = vec![DamageHighlighter::new(HighlightPipeline::Fallback, LIME)];
        if HighlightPipeline::full_available() {
            v.push(DamageHighlighter::new(HighlightPipeline::Full, LIME));
        }
        v
    }

    /// Black canvas with a white square covering [20, 60).
    fn square() -> RgbImage {
        RgbImage::from_fn(80, 80, |x, y| {
            if (20..60).contains(&x) && (20..60).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn distance_to_square_edge(x: u32, y: u32) -> u32 {
        let d = |v: u32| v.abs_diff(20).min(v.abs_diff(59));
        let inside = |v: u32| (20..60).contains(&v);
        match (inside(x), inside(y)) {
            (true, true) => d(x).min(d(y)),
            (true, false) => d(y),
            (false, true) => d(x),
            (false, false) => d(x).max(d(y)),
        }
    }

    #[test]
    fn black_frame_is_left_alone() {
        let img = RgbImage::new(64, 40);
        for h in all_pipelines() {
            assert_eq!(h.highlight(&img).unwrap(), img, "{:?}", h.pipeline());
        }
    }

    #[test]
    fn output_keeps_input_size() {
        let img = RgbImage::from_fn(37, 23, |x, y| Rgb([(x * 7) as u8, (y * 11) as u8, 90]));
        for h in all_pipelines() {
            assert_eq!(h.highlight(&img).unwrap().dimensions(), (37, 23));
        }
        let tiny = RgbImage::from_pixel(2, 2, Rgb([200, 10, 10]));
        for h in all_pipelines() {
            assert_eq!(h.highlight(&tiny).unwrap().dimensions(), (2, 2));
        }
    }

    #[test]
    fn both_pipelines_mark_only_the_square_outline() {
        let img = square();
        for h in all_pipelines() {
            let out = h.highlight(&img).unwrap();
            let mut changed = 0;
            for (x, y, px) in out.enumerate_pixels() {
                let before = img.get_pixel(x, y);
                if px == before {
                    continue;
                }
                changed += 1;
                assert!(distance_to_square_edge(x, y) <= 3, "{:?} touched ({x},{y})", h.pipeline());
                // tinted towards lime: green never drops, red/blue never rise
                assert!(px[1] >= before[1] && px[0] <= before[0] && px[2] <= before[2]);
            }
            assert!(changed > 0, "{:?} found no edges", h.pipeline());
        }
    }

    #[test]
    fn fallback_uses_thirty_five_percent() {
        let out = DamageHighlighter::new(HighlightPipeline::Fallback, LIME)
            .highlight(&square())
            .unwrap();
        // inner corner of the square: full-strength edge
        assert_eq!(*out.get_pixel(20, 20), Rgb([166, 255, 166]));
        // deep inside: untouched
        assert_eq!(*out.get_pixel(40, 40), Rgb([255, 255, 255]));
    }

    #[test]
    fn requests_resolve_against_the_build() {
        assert_eq!(HighlightPipeline::resolve(Some(HighlightPipeline::Fallback)), HighlightPipeline::Fallback);
        assert_eq!(HighlightPipeline::resolve(None), HighlightPipeline::detect());
        let expected_default = if HighlightPipeline::full_available() {
            HighlightPipeline::Full
        } else {
            HighlightPipeline::Fallback
        };
        assert_eq!(HighlightPipeline::resolve(None), expected_default);
        let full = DamageHighlighter::new(HighlightPipeline::Full, LIME);
        if HighlightPipeline::full_available() {
            assert_eq!(full.pipeline(), HighlightPipeline::Full);
        } else {
            assert_eq!(full.pipeline(), HighlightPipeline::Fallback);
        }
    }
}
