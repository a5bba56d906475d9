// Background photo the glasses are shown over.
// Visual: the street/car scene behind the lenses, or a grey placeholder card
// naming the file it could not find.

use std::path::Path;

use image::imageops::FilterType;
use image::{Rgb, RgbImage, Rgba};
use log::{info, warn};

use crate::draw::draw_text;
use crate::geometry::CanvasSize;

const PLACEHOLDER_SIZE: (u32, u32) = (1200, 600);
const PLACEHOLDER_FILL: Rgb<u8> = Rgb([100, 120, 130]);

#[derive(Clone, Debug)]
pub struct Background {
    /// Already scaled to the canvas.
    pub image: RgbImage,
    /// True when the configured file could not be used.
    pub placeholder: bool,
}

/// Load `path` and scale it to `canvas`. Never fails: a missing or unreadable
/// file becomes a placeholder with the path written on it.
pub fn load_background(path: &Path, canvas: CanvasSize) -> Background {
    let (source, placeholder) = if !path.exists() {
        warn!("background image not found at {}", path.display());
        (placeholder_image(&format!("Background image not found at: {}", path.display())), true)
    } else {
        match image::open(path) {
            Ok(img) => {
                info!("background {} ({}x{})", path.display(), img.width(), img.height());
                (img.to_rgb8(), false)
            }
            Err(e) => {
                warn!("background image {} unreadable: {e}", path.display());
                (placeholder_image(&format!("Background image unreadable: {}", path.display())), true)
            }
        }
    };

    let image = image::imageops::resize(&source, canvas.width, canvas.height, FilterType::Lanczos3);
    Background { image, placeholder }
}

/// Solid card with `message` in the top-left corner.
fn placeholder_image(message: &str) -> RgbImage {
    let mut img = RgbImage::from_pixel(PLACEHOLDER_SIZE.0, PLACEHOLDER_SIZE.1, PLACEHOLDER_FILL);
    draw_text(&mut img, 20, 20, message, 2, Rgba([255, 255, 255, 255]));
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: CanvasSize = CanvasSize {
        width: 200,
        height: 104,
    };

    #[test]
    fn missing_file_gives_annotated_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let bg = load_background(&dir.path().join("missing.jpg"), CANVAS);
        assert!(bg.placeholder);
        assert_eq!(bg.image.dimensions(), (200, 104));
        let near_fill = |p: &Rgb<u8>| p.0.iter().zip(PLACEHOLDER_FILL.0).all(|(a, b)| a.abs_diff(b) <= 2);
        // far corner is plain placeholder colour
        assert!(near_fill(bg.image.get_pixel(199, 103)));
        // the annotation marks the top-left corner
        let marked = (0..20)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .any(|(x, y)| !near_fill(bg.image.get_pixel(x, y)));
        assert!(marked);
    }

    #[test]
    fn garbage_file_also_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let bg = load_background(&path, CANVAS);
        assert!(bg.placeholder);
        assert_eq!(bg.image.dimensions(), (200, 104));
    }

    #[test]
    fn real_image_is_resized_to_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbImage::from_pixel(40, 30, Rgb([10, 200, 30])).save(&path).unwrap();
        let bg = load_background(&path, CANVAS);
        assert!(!bg.placeholder);
        assert_eq!(bg.image.dimensions(), (200, 104));
        let px = bg.image.get_pixel(100, 50);
        assert!(px.0.iter().zip([10u8, 200, 30]).all(|(a, b)| a.abs_diff(b) <= 2), "{px:?}");
    }
}
