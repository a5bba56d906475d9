// Heads-up text pinned to the lenses: clock, battery, navigation hint.
// Visual: small lime labels that follow the lenses when the sliders move.

use image::Rgba;

use crate::draw::{draw_text_centered, Canvas};
use crate::geometry::{frac, LensGeometry, Point};

const TIME_SCALE: i32 = 3;
const LABEL_SCALE: i32 = 2;

/// Where each label is centred, derived from the lens boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudLayout {
    pub time: Point,
    pub battery: Point,
    pub navigation: Point,
}

impl HudLayout {
    /// Clock top-left and battery top-right of the left lens, navigation hint
    /// top-right of the right lens.
    pub fn from_geometry(g: &LensGeometry) -> Self {
        let (l, r) = (g.left, g.right);
        let row = |b: &crate::geometry::AxisAlignedBox| b.y1 + frac(b.height(), 0.12);
        Self {
            time: Point::new(l.x1 + frac(l.width(), 0.08), row(&l)),
            battery: Point::new(l.x2 - frac(l.width(), 0.10), row(&l)),
            navigation: Point::new(r.x2 - frac(r.width(), 0.08), row(&r)),
        }
    }
}

/// Current label texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudState {
    pub time: String,
    pub battery: String,
    pub navigation: String,
}

impl HudState {
    pub fn new(battery_percent: u8) -> Self {
        Self {
            time: clock_text(),
            battery: format!("{battery_percent}%"),
            navigation: "23 mins →".to_string(),
        }
    }
}

/// Wall-clock time as shown on the HUD.
pub fn clock_text() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

pub fn draw_hud<C: Canvas + ?Sized>(c: &mut C, layout: &HudLayout, state: &HudState, color: Rgba<u8>) {
    draw_text_centered(c, layout.time, &state.time, TIME_SCALE, color);
    draw_text_centered(c, layout.battery, &state.battery, LABEL_SCALE, color);
    draw_text_centered(c, layout.navigation, &state.navigation, LABEL_SCALE, color);
}
