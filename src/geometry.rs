//! Lens layout: where both lenses, the bridge, the temple arms, the digital
//! crown and the bottom bar sit on the canvas for a given set of lens
//! parameters.
//!
//! [`compute_geometry`] is a pure function. The HUD, the mode overlays and the
//! crown hit-test all read the same [`LensGeometry`] the renderer draws from,
//! so they stay lined up whenever a slider moves.

use serde::{Deserialize, Serialize};

/// UI bounds for the interpupillary distance slider (pixels).
pub const IPD_RANGE: (f64, f64) = (160.0, 320.0);
/// UI bounds for the lens width slider (fraction of canvas width).
pub const LENS_WIDTH_RANGE: (f64, f64) = (0.22, 0.36);
/// UI bounds for the lens height slider (fraction of canvas height).
pub const LENS_HEIGHT_RANGE: (f64, f64) = (0.45, 0.65);
/// Slider resolution for both ratios.
pub const RATIO_STEP: f64 = 0.01;
/// Accepted bridge minimum from config (pixels).
pub const BRIDGE_MIN_RANGE: (f64, f64) = (0.0, 200.0);
/// Accepted lower bar height from config (fraction of canvas height).
pub const BAR_HEIGHT_RANGE: (f64, f64) = (0.0, 0.9);

/// Lens row sits slightly below the canvas middle.
const CENTER_Y_RATIO: f64 = 0.53;
const ARM_HEIGHT_RATIO: f64 = 0.18;
const FRAME_MARGIN: i32 = 20;
const FRAME_RADIUS: i32 = 40;
const ARM_OVERLAP: i32 = 10;
const CROWN_PAD: i32 = 8;
const CROWN_INSET: i32 = 6;
const BRIDGE_LINE_WIDTH: i32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// The knobs a wearer can turn. Immutable; a change produces a new value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensParameters {
    /// Interpupillary distance in pixels.
    pub ipd: f64,
    pub lens_width_ratio: f64,
    pub lens_height_ratio: f64,
    /// Smallest allowed gap between the lenses, in pixels.
    pub bridge_min: f64,
    pub lower_bar_height_ratio: f64,
}

impl Default for LensParameters {
    fn default() -> Self {
        Self {
            ipd: 240.0,
            lens_width_ratio: 0.30,
            lens_height_ratio: 0.56,
            bridge_min: 18.0,
            lower_bar_height_ratio: 0.12,
        }
    }
}

impl LensParameters {
    /// Clamp the three live parameters to their slider bounds and snap them to
    /// the slider resolution (whole pixels, hundredths). The config-only
    /// fields are clamped to their accepted ranges.
    pub fn clamped(self) -> Self {
        let snap = |v: f64, (lo, hi): (f64, f64)| ((v / RATIO_STEP).round() / RATIO_STEP.recip()).clamp(lo, hi);
        Self {
            ipd: self.ipd.round().clamp(IPD_RANGE.0, IPD_RANGE.1),
            lens_width_ratio: snap(self.lens_width_ratio, LENS_WIDTH_RANGE),
            lens_height_ratio: snap(self.lens_height_ratio, LENS_HEIGHT_RANGE),
            bridge_min: self.bridge_min.round().clamp(BRIDGE_MIN_RANGE.0, BRIDGE_MIN_RANGE.1),
            lower_bar_height_ratio: self.lower_bar_height_ratio.clamp(BAR_HEIGHT_RANGE.0, BAR_HEIGHT_RANGE.1),
        }
    }
}

/// Pixel position. Serialises as `[x, y]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[i32; 2]", from = "[i32; 2]")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

/// Inclusive pixel box `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AxisAlignedBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl AxisAlignedBox {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box spanning `half_w`/`half_h` either side of `center`.
    pub const fn around(center: Point, half_w: i32, half_h: i32) -> Self {
        Self::new(center.x - half_w, center.y - half_h, center.x + half_w, center.y + half_h)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Nothing to draw when the corners are not strictly ordered.
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    pub fn within(&self, canvas: CanvasSize) -> bool {
        self.x1 >= 0 && self.y1 >= 0 && self.x2 < canvas.width as i32 && self.y2 < canvas.height as i32
    }
}

/// Connector between the lenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bridge {
    /// Filled bar across the gap.
    Span(AxisAlignedBox),
    /// Lenses touch or overlap: a thin line joins the inner edges instead.
    Line { from: Point, to: Point, width: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crown {
    pub center: Point,
    pub radius: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LensGeometry {
    pub canvas: CanvasSize,
    pub left: AxisAlignedBox,
    pub right: AxisAlignedBox,
    /// Crown hit-test box.
    pub knob: AxisAlignedBox,
    pub ipd_effective: i32,
    pub bridge: Bridge,
    pub left_arm: AxisAlignedBox,
    pub right_arm: AxisAlignedBox,
    pub arm_radius: i32,
    pub crown: Crown,
    pub frame: AxisAlignedBox,
    pub frame_radius: i32,
    pub bottom_bar: AxisAlignedBox,
}

impl LensGeometry {
    /// Shared vertical centre of both lenses.
    pub fn lens_center_y(&self) -> i32 {
        self.left.center().y
    }

    /// Horizontal middle of the gap between the lenses.
    pub fn gap_center_x(&self) -> i32 {
        (self.left.x2 + self.right.x1) / 2
    }

    /// Overall width from the outer edge of the left lens to the outer edge of the right one.
    pub fn frame_span(&self) -> i32 {
        self.right.x2 - self.left.x1
    }
}

/// `floor(len * ratio)`, tolerant of ratios like 0.29 that sit a hair under
/// their decimal value in binary.
pub(crate) fn frac(len: i32, ratio: f64) -> i32 {
    (len as f64 * ratio + 1e-9).floor() as i32
}

/// Lay out every glasses component for `params` on `canvas`.
pub fn compute_geometry(canvas: CanvasSize, params: &LensParameters) -> LensGeometry {
    let w = canvas.width as i32;
    let h = canvas.height as i32;

    // Out-of-range inputs are pulled back to the canvas so the integer layout
    // below cannot overflow.
    let span = w as f64;
    let lens_w_ratio = params.lens_width_ratio.clamp(0.0, 1.0);
    let lens_h_ratio = params.lens_height_ratio.clamp(0.0, 1.0);
    let bar_ratio = params.lower_bar_height_ratio.clamp(BAR_HEIGHT_RANGE.0, BAR_HEIGHT_RANGE.1);
    let bridge_min = params.bridge_min.round().clamp(-span, span) as i32;
    let ipd = params.ipd.round().clamp(0.0, 2.0 * span) as i32;

    let cx = w / 2;
    let cy = frac(h, CENTER_Y_RATIO);
    let lw = frac(w, lens_w_ratio).max(2);
    let lh = frac(h, lens_h_ratio).max(2);

    // Never let the lenses overlap: the bridge keeps at least `bridge_min`.
    let ipd_effective = ipd.max(lw + bridge_min);
    let half = ipd_effective / 2;

    let left = AxisAlignedBox::around(Point::new(cx - half, cy), lw / 2, lh / 2);
    let right = AxisAlignedBox::around(Point::new(cx + half, cy), lw / 2, lh / 2);

    let bx1 = left.x2;
    let bx2 = right.x1;
    let bridge = if bx2 > bx1 {
        let by = cy - lh / 8;
        Bridge::Span(AxisAlignedBox::new(bx1, by, bx2, by + (bridge_min / 2).max(4)))
    } else {
        Bridge::Line {
            from: Point::new(bx1, cy),
            to: Point::new(bx2, cy),
            width: BRIDGE_LINE_WIDTH,
        }
    };

    let arm_h = frac(lh, ARM_HEIGHT_RATIO).max(2);
    let left_arm = AxisAlignedBox::new(frac(w, 0.03), cy - arm_h / 2, left.x1 + ARM_OVERLAP, cy + arm_h / 2);
    let right_arm = AxisAlignedBox::new(right.x2 - ARM_OVERLAP, cy - arm_h / 2, frac(w, 0.97), cy + arm_h / 2);

    // Crown sits near the outer end of the right arm, pulled back inside the
    // canvas and kept right of the right lens centre on cramped canvases.
    let radius = (arm_h / 2 + CROWN_PAD).min((h - 1) / 2).max(1);
    let crown_x = (right_arm.x2 - radius - CROWN_INSET)
        .max(right.center().x + radius + 1)
        .min(w - 1 - radius);
    // `radius` can exceed the half height on very short canvases.
    let crown_y = cy.min(h - 1 - radius).max(radius);
    let crown = Crown {
        center: Point::new(crown_x, crown_y),
        radius,
    };
    let knob = AxisAlignedBox::around(crown.center, radius, radius);

    let frame = AxisAlignedBox::new(
        left.x1 - FRAME_MARGIN,
        left.y1 - FRAME_MARGIN,
        right.x2 + FRAME_MARGIN,
        right.y2 + FRAME_MARGIN,
    );

    let bottom = frac(h, 0.90);
    let bar_top = bottom - frac(h, bar_ratio);
    let bottom_bar = AxisAlignedBox::new(frac(w, 0.18), bar_top, frac(w, 0.82), bottom + 8);

    LensGeometry {
        canvas,
        left,
        right,
        knob,
        ipd_effective,
        bridge,
        left_arm,
        right_arm,
        arm_radius: arm_h / 2,
        crown,
        frame,
        frame_radius: FRAME_RADIUS,
        bottom_bar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: CanvasSize = CanvasSize {
        width: 1000,
        height: 520,
    };

    fn params(ipd: f64, lw: f64, lh: f64) -> LensParameters {
        LensParameters {
            ipd,
            lens_width_ratio: lw,
            lens_height_ratio: lh,
            ..LensParameters::default()
        }
    }

    /// Every slider position the settings panel can produce (ipd sampled every 8 px).
    fn slider_grid() -> impl Iterator<Item = LensParameters> {
        (0..=20).flat_map(|i| {
            let ipd = 160.0 + 8.0 * i as f64;
            (22..=36).flat_map(move |w| (45..=65).map(move |h| params(ipd, w as f64 / 100.0, h as f64 / 100.0)))
        })
    }

    #[test]
    fn default_session_layout() {
        let g = compute_geometry(CANVAS, &params(240.0, 0.30, 0.56));
        assert_eq!(g.left.width(), 300);
        assert_eq!(g.lens_center_y(), 275);
        assert_eq!(g.ipd_effective, 318);
        assert_eq!(g.left.center().x, 341);
        assert_eq!(g.right.center().x, 659);
        assert_eq!(g.left, AxisAlignedBox::new(191, 130, 491, 420));
        assert_eq!(g.right, AxisAlignedBox::new(509, 130, 809, 420));
        assert_eq!(g.bridge, Bridge::Span(AxisAlignedBox::new(491, 239, 509, 248)));
        assert_eq!(g.crown, Crown { center: Point::new(930, 275), radius: 34 });
        assert_eq!(g.knob, AxisAlignedBox::new(896, 241, 964, 309));
        assert_eq!(g.bottom_bar, AxisAlignedBox::new(180, 406, 820, 476));
    }

    #[test]
    fn bridge_minimum_pushes_lenses_apart() {
        let g = compute_geometry(CANVAS, &params(160.0, 0.34, 0.56));
        assert_eq!(g.left.width(), 340);
        assert_eq!(g.ipd_effective, 358);
        assert!(g.right.x1 - g.left.x2 >= 18);
    }

    #[test]
    fn negative_bridge_minimum_falls_back_to_a_line() {
        let p = LensParameters {
            bridge_min: -30.0,
            ..params(160.0, 0.30, 0.56)
        };
        let g = compute_geometry(CANVAS, &p);
        match g.bridge {
            Bridge::Line { from, to, width } => {
                assert_eq!(from, Point::new(g.left.x2, 275));
                assert_eq!(to, Point::new(g.right.x1, 275));
                assert_eq!(width, 4);
            }
            other => panic!("expected line fallback, got {other:?}"),
        }
    }

    #[test]
    fn lenses_mirror_about_the_centerline() {
        for p in slider_grid() {
            let g = compute_geometry(CANVAS, &p);
            let mid2 = CANVAS.width as i32; // 2 * (width / 2)
            assert!((g.left.x1 + g.right.x2 - mid2).abs() <= 1, "{p:?}");
            assert!((g.left.x2 + g.right.x1 - mid2).abs() <= 1, "{p:?}");
            assert_eq!(g.left.y1, g.right.y1);
            assert_eq!(g.left.y2, g.right.y2);
            assert!(g.left.x1 < g.left.x2 && g.left.y1 < g.left.y2);
        }
    }

    #[test]
    fn odd_canvas_still_mirrors_within_a_pixel() {
        let canvas = CanvasSize { width: 999, height: 521 };
        let g = compute_geometry(canvas, &LensParameters::default());
        let left_gap = g.left.x1 as f64;
        let right_gap = canvas.width as f64 - 1.0 - g.right.x2 as f64;
        assert!((left_gap - right_gap).abs() <= 1.0);
    }

    #[test]
    fn knob_stays_on_canvas_right_of_the_right_lens() {
        for p in slider_grid() {
            let g = compute_geometry(CANVAS, &p);
            assert!(g.knob.within(CANVAS), "{p:?} -> {:?}", g.knob);
            assert!(g.knob.x1 > g.right.center().x, "{p:?}");
        }
    }

    #[test]
    fn knob_guard_holds_on_a_cramped_canvas() {
        let canvas = CanvasSize { width: 420, height: 120 };
        let g = compute_geometry(canvas, &params(320.0, 0.36, 0.65));
        assert!(g.knob.within(canvas), "{:?}", g.knob);
    }

    #[test]
    fn geometry_is_idempotent() {
        let p = params(233.0, 0.27, 0.61);
        assert_eq!(compute_geometry(CANVAS, &p), compute_geometry(CANVAS, &p));
    }

    #[test]
    fn wider_lenses_widen_the_frame_until_the_bridge_clamps() {
        let mut last = None;
        for w in 22..=30 {
            let g = compute_geometry(CANVAS, &params(320.0, w as f64 / 100.0, 0.56));
            assert_eq!(g.ipd_effective, 320, "bridge clamp should be inactive at w={w}");
            if let Some(prev) = last {
                assert!(g.frame_span() > prev, "w={w}");
            }
            last = Some(g.frame_span());
        }
    }

    #[test]
    fn clamped_snaps_to_slider_bounds() {
        let p = params(400.7, 0.1, 0.634).clamped();
        assert_eq!(p.ipd, 320.0);
        assert_eq!(p.lens_width_ratio, 0.22);
        assert!((p.lens_height_ratio - 0.63).abs() < 1e-9);
        assert_eq!(p.bridge_min, 18.0);
    }

    #[test]
    fn clamped_bounds_config_only_fields() {
        let p = LensParameters {
            bridge_min: 1e12,
            lower_bar_height_ratio: 7.0,
            ..LensParameters::default()
        }
        .clamped();
        assert_eq!(p.bridge_min, BRIDGE_MIN_RANGE.1);
        assert_eq!(p.lower_bar_height_ratio, BAR_HEIGHT_RANGE.1);
        assert_eq!(LensParameters { bridge_min: -5.0, ..p }.clamped().bridge_min, 0.0);
    }

    #[test]
    fn extreme_parameters_do_not_overflow() {
        let wild = [
            LensParameters { bridge_min: 1e12, ..LensParameters::default() },
            LensParameters { bridge_min: -1e12, ..LensParameters::default() },
            LensParameters { ipd: 1e15, lens_width_ratio: 1e9, ..LensParameters::default() },
            LensParameters { lens_height_ratio: f64::NAN, lower_bar_height_ratio: -3.0, ..LensParameters::default() },
        ];
        for p in wild {
            let g = compute_geometry(CANVAS, &p);
            assert!(g.ipd_effective <= 2 * CANVAS.width as i32, "{p:?}");
            assert!(g.left.width() >= 2, "{p:?}");
        }
    }

    #[test]
    fn very_short_canvases_still_lay_out() {
        for (w, h) in [(1000, 2), (1000, 1), (1, 1), (3, 520)] {
            let canvas = CanvasSize { width: w, height: h };
            let g = compute_geometry(canvas, &LensParameters::default());
            assert!(g.crown.radius >= 1);
            assert!(g.crown.center.y >= 0 && g.crown.center.y < h.max(2) as i32, "{w}x{h}: {:?}", g.crown);
        }
        let g = compute_geometry(CanvasSize { width: 1000, height: 2 }, &LensParameters::default());
        assert_eq!(g.left.center().y, g.right.center().y);
    }

    #[test]
    fn point_serialises_as_pair() {
        let json = serde_json::to_string(&Point::new(500, 300)).unwrap();
        assert_eq!(json, "[500,300]");
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Point::new(500, 300));
    }
}
