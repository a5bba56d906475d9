// Glasses overlay: a transparent RGBA layer with the frame drawn on it.
// Visual: lenses, bridge, arms, crown, frame and bottom bar, ready to be
// composited over the background photo.

use image::{Rgba, RgbaImage};

use crate::config::{Color, Palette};
use crate::draw::{draw_circle, draw_ellipse, draw_line, draw_rounded_rect, fill_rect, Paint};
use crate::geometry::{Bridge, LensGeometry};

/// Pixel offsets of the stacked lens shadows.
const SHADOW_OFFSETS: [i32; 3] = [2, 4, 6];
const RIM_WIDTH: i32 = 10;
const FRAME_OUTLINE_WIDTH: i32 = 8;
const CROWN_EDGE_WIDTH: i32 = 3;
const CROWN_RING_INSET: i32 = 6;
const CROWN_RING_WIDTH: i32 = 2;

/// Stateless: the palette is fixed at construction, the geometry is passed in
/// every time.
#[derive(Clone, Debug)]
pub struct OverlayRenderer {
    palette: Palette,
}

impl OverlayRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Draw the whole glasses layer for `g`.
    /// The order matters: later steps cover earlier ones (tint sits on top of
    /// the frame fill, rims on top of the tint).
    pub fn render(&self, g: &LensGeometry) -> RgbaImage {
        let mut layer = RgbaImage::new(g.canvas.width, g.canvas.height);
        self.draw_shadow(&mut layer, g);
        self.draw_bridge(&mut layer, g);
        self.draw_arms(&mut layer, g);
        self.draw_frame(&mut layer, g);
        self.draw_tint(&mut layer, g);
        self.draw_rims(&mut layer, g);
        self.draw_bottom_bar(&mut layer, g);
        layer
    }

    fn color(c: Color) -> Rgba<u8> {
        c.0
    }

    /// Thin outlines stepped diagonally under each lens.
    /// Visual: a soft drop shadow down and to the right.
    fn draw_shadow(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        let shadow = Self::color(self.palette.accents.shadow);
        for off in SHADOW_OFFSETS {
            for lens in [g.left, g.right] {
                draw_ellipse(layer, &lens.offset(off, off), Paint::stroke(shadow, 1));
            }
        }
    }

    fn draw_bridge(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        let color = Self::color(self.palette.accents.bridge);
        match g.bridge {
            Bridge::Span(b) => fill_rect(layer, &b, color),
            Bridge::Line { from, to, width } => draw_line(layer, from, to, width, color),
        }
    }

    /// Temple arms plus the digital crown on the right arm.
    fn draw_arms(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        let a = &self.palette.accents;
        let arm = Paint::fill(Self::color(a.arm));
        draw_rounded_rect(layer, &g.left_arm, g.arm_radius, arm);
        draw_rounded_rect(layer, &g.right_arm, g.arm_radius, arm);

        let crown = g.crown;
        draw_circle(
            layer,
            crown.center,
            crown.radius,
            Paint::fill(Self::color(a.crown)).with_outline(Self::color(a.crown_edge), CROWN_EDGE_WIDTH),
        );
        let ring_r = crown.radius - CROWN_RING_INSET;
        if ring_r > 0 {
            draw_circle(
                layer,
                crown.center,
                ring_r,
                Paint::stroke(Self::color(a.crown_ring), CROWN_RING_WIDTH),
            );
        }
    }

    fn draw_frame(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        let a = &self.palette.accents;
        draw_rounded_rect(
            layer,
            &g.frame,
            g.frame_radius,
            Paint::fill(Self::color(a.frame_fill)).with_outline(Self::color(a.frame_outline), FRAME_OUTLINE_WIDTH),
        );
    }

    /// Visual: the "glass" look, a flat translucent colour inside each lens.
    fn draw_tint(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        let tint = Paint::fill(Self::color(self.palette.glass_tint));
        for lens in [g.left, g.right] {
            draw_ellipse(layer, &lens, tint);
        }
    }

    fn draw_rims(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        let rim = Paint::stroke(Self::color(self.palette.rim), RIM_WIDTH);
        for lens in [g.left, g.right] {
            draw_ellipse(layer, &lens, rim);
        }
    }

    fn draw_bottom_bar(&self, layer: &mut RgbaImage, g: &LensGeometry) {
        fill_rect(layer, &g.bottom_bar, Self::color(self.palette.accents.bar));
    }
}
