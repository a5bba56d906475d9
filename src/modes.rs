// Interactive HUD modes layered over the glasses view.
// Visual: a turn-by-turn card between the lenses, or a ring pointing at the
// next spot to photograph on a car.

use image::Rgba;

use crate::draw::{draw_circle, draw_rounded_rect, draw_text_centered, fill_triangle, Canvas, Paint};
use crate::geometry::{frac, AxisAlignedBox, CanvasSize, LensGeometry, Point};

const CARD_SIZE: (i32, i32) = (320, 140);
const CARD_OUTLINE: i32 = 2;
const CARD_RADIUS: i32 = 12;
const ARROW_SCALE: i32 = 6;
const CARD_TEXT_SCALE: i32 = 2;

const TARGET_RADIUS: i32 = 40;
const TARGET_WIDTH: i32 = 3;

/// Guide positions for a walk-around inspection, as fractions of the canvas.
pub const GUIDE_STEPS: [(f64, f64); 8] = [
    (0.35, 0.35),
    (0.65, 0.35),
    (0.20, 0.60),
    (0.50, 0.60),
    (0.80, 0.60),
    (0.35, 0.80),
    (0.65, 0.80),
    (0.50, 0.50),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Straight,
}

impl Direction {
    pub fn arrow(self) -> char {
        match self {
            Direction::Left => '←',
            Direction::Right => '→',
            Direction::Straight => '↑',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationMode {
    pub direction: Direction,
    pub distance: String,
    pub eta: String,
    active: bool,
}

impl Default for NavigationMode {
    fn default() -> Self {
        Self {
            direction: Direction::Right,
            distance: "600 ft".to_string(),
            eta: "23 mins".to_string(),
            active: false,
        }
    }
}

impl NavigationMode {
    /// Short form for the HUD corner, e.g. `23 mins →`.
    pub fn hint(&self) -> String {
        format!("{} {}", self.eta, self.direction.arrow())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarScanMode {
    canvas: CanvasSize,
    step: usize,
    active: bool,
}

impl CarScanMode {
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            step: 0,
            active: false,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Advance to the next guide position, wrapping after the last one.
    pub fn next_step(&mut self) {
        self.step = (self.step + 1) % GUIDE_STEPS.len();
    }

    /// Pixel position of the current guide step.
    pub fn target(&self) -> Point {
        let (xr, yr) = GUIDE_STEPS[self.step];
        Point::new(frac(self.canvas.width as i32, xr), frac(self.canvas.height as i32, yr))
    }
}

/// Something a mode wants drawn on top of the HUD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoration {
    Card { bounds: AxisAlignedBox, radius: i32, width: i32 },
    Ring { center: Point, radius: i32, width: i32 },
    Pointer([Point; 3]),
    Label { anchor: Point, text: String, scale: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Navigation(NavigationMode),
    CarScan(CarScanMode),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Navigation(_) => "navigation",
            Mode::CarScan(_) => "carscan",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mode::Navigation(_) => "Navigation",
            Mode::CarScan(_) => "Carscan",
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Mode::Navigation(m) => m.active,
            Mode::CarScan(m) => m.active,
        }
    }

    /// Carscan always restarts its walk-around from the first position.
    pub fn activate(&mut self) {
        match self {
            Mode::Navigation(m) => m.active = true,
            Mode::CarScan(m) => {
                m.active = true;
                m.step = 0;
            }
        }
    }

    pub fn deactivate(&mut self) {
        match self {
            Mode::Navigation(m) => m.active = false,
            Mode::CarScan(m) => m.active = false,
        }
    }

    /// Where the wearer should look next; only carscan has a target.
    pub fn current_target_position(&self) -> Option<Point> {
        match self {
            Mode::CarScan(m) if m.active => Some(m.target()),
            _ => None,
        }
    }

    /// Guide step for capture metadata.
    pub fn guide_step(&self) -> Option<usize> {
        match self {
            Mode::CarScan(m) if m.active => Some(m.step),
            _ => None,
        }
    }

    /// Text the HUD navigation slot should show while this mode runs.
    pub fn navigation_hint(&self) -> Option<String> {
        match self {
            Mode::Navigation(m) => Some(m.hint()),
            Mode::CarScan(_) => None,
        }
    }

    /// Shapes for this frame, laid out from the current lens geometry.
    pub fn decorations(&self, g: &LensGeometry) -> Vec<Decoration> {
        if !self.is_active() {
            return Vec::new();
        }
        match self {
            Mode::Navigation(m) => {
                let cx = g.gap_center_x();
                let cy = g.lens_center_y();
                let bounds = AxisAlignedBox::new(
                    cx - CARD_SIZE.0 / 2,
                    cy - CARD_SIZE.1 / 2,
                    cx + CARD_SIZE.0 / 2,
                    cy + CARD_SIZE.1 / 2,
                );
                vec![
                    Decoration::Card {
                        bounds,
                        radius: CARD_RADIUS,
                        width: CARD_OUTLINE,
                    },
                    Decoration::Label {
                        anchor: Point::new(cx - 80, cy),
                        text: m.direction.arrow().to_string(),
                        scale: ARROW_SCALE,
                    },
                    Decoration::Label {
                        anchor: Point::new(cx + 40, cy - 18),
                        text: m.distance.clone(),
                        scale: CARD_TEXT_SCALE,
                    },
                    Decoration::Label {
                        anchor: Point::new(cx + 40, cy + 18),
                        text: m.eta.clone(),
                        scale: CARD_TEXT_SCALE,
                    },
                ]
            }
            Mode::CarScan(m) => {
                let Point { x, y } = m.target();
                vec![
                    Decoration::Ring {
                        center: Point::new(x, y),
                        radius: TARGET_RADIUS,
                        width: TARGET_WIDTH,
                    },
                    Decoration::Pointer([Point::new(x, y - 70), Point::new(x - 10, y - 35), Point::new(x + 10, y - 35)]),
                    Decoration::Label {
                        anchor: Point::new(x, y + 60),
                        text: format!("Target {}", m.step + 1),
                        scale: CARD_TEXT_SCALE,
                    },
                ]
            }
        }
    }
}

pub fn draw_decorations<C: Canvas + ?Sized>(c: &mut C, decorations: &[Decoration], color: Rgba<u8>) {
    for d in decorations {
        match d {
            Decoration::Card { bounds, radius, width } => {
                draw_rounded_rect(c, bounds, *radius, Paint::stroke(color, *width));
            }
            Decoration::Ring { center, radius, width } => {
                draw_circle(c, *center, *radius, Paint::stroke(color, *width));
            }
            Decoration::Pointer(pts) => fill_triangle(c, *pts, color),
            Decoration::Label { anchor, text, scale } => draw_text_centered(c, *anchor, text, *scale, color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{compute_geometry, LensParameters};

    const CANVAS: CanvasSize = CanvasSize {
        width: 1000,
        height: 520,
    };

    fn carscan() -> Mode {
        let mut m = Mode::CarScan(CarScanMode::new(CANVAS));
        m.activate();
        m
    }

    #[test]
    fn carscan_walks_all_steps_and_wraps() {
        let mut m = carscan();
        assert_eq!(m.current_target_position(), Some(Point::new(350, 182)));
        let Mode::CarScan(scan) = &mut m else { unreachable!() };
        for _ in 0..3 {
            scan.next_step();
        }
        assert_eq!(scan.target(), Point::new(500, 312));
        for _ in 0..5 {
            scan.next_step();
        }
        assert_eq!(scan.step(), 0);
    }

    #[test]
    fn activation_restarts_the_walk() {
        let mut m = carscan();
        if let Mode::CarScan(scan) = &mut m {
            scan.next_step();
            scan.next_step();
        }
        assert_eq!(m.guide_step(), Some(2));
        m.deactivate();
        assert_eq!(m.current_target_position(), None);
        m.activate();
        assert_eq!(m.guide_step(), Some(0));
    }

    #[test]
    fn navigation_has_no_target_but_a_hint() {
        let mut m = Mode::Navigation(NavigationMode::default());
        m.activate();
        assert_eq!(m.current_target_position(), None);
        assert_eq!(m.navigation_hint().as_deref(), Some("23 mins →"));
        assert_eq!(m.name(), "navigation");
    }

    #[test]
    fn navigation_card_sits_between_the_lenses() {
        let g = compute_geometry(CANVAS, &LensParameters::default());
        let mut m = Mode::Navigation(NavigationMode::default());
        m.activate();
        let deco = m.decorations(&g);
        let Decoration::Card { bounds, .. } = deco[0] else {
            panic!("first decoration should be the card");
        };
        assert_eq!(bounds.center(), Point::new(g.gap_center_x(), g.lens_center_y()));
        assert_eq!(bounds.width(), 320);
        assert!(deco.contains(&Decoration::Label {
            anchor: Point::new(g.gap_center_x() + 40, g.lens_center_y() + 18),
            text: "23 mins".into(),
            scale: CARD_TEXT_SCALE,
        }));
    }

    #[test]
    fn inactive_modes_draw_nothing() {
        let g = compute_geometry(CANVAS, &LensParameters::default());
        assert!(Mode::CarScan(CarScanMode::new(CANVAS)).decorations(&g).is_empty());
    }

    #[test]
    fn carscan_ring_is_drawn_at_the_target() {
        let g = compute_geometry(CANVAS, &LensParameters::default());
        let m = carscan();
        let mut img = image::RgbaImage::new(1000, 520);
        draw_decorations(&mut img, &m.decorations(&g), Rgba([0, 255, 0, 255]));
        // on the ring, straight right of the target
        assert_eq!(*img.get_pixel(350 + 39, 182), Rgba([0, 255, 0, 255]));
        // ring centre stays clear
        assert_eq!(img.get_pixel(350, 182)[3], 0);
    }
}
