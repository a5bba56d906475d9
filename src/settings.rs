// Fit settings opened from the digital crown.
// Visual: a dark card in the middle of the view with three rows
// (IPD, lens width, lens height); the selected row is marked with ">".

use image::Rgba;

use crate::config::Palette;
use crate::draw::{draw_rounded_rect, draw_text, Canvas, Paint, GLYPH_H};
use crate::geometry::{frac, AxisAlignedBox, CanvasSize, LensParameters, RATIO_STEP};

const PANEL_SIZE: (i32, i32) = (360, 200);
const PANEL_RADIUS: i32 = 10;
const TEXT_SCALE: i32 = 2;
const ROW_PITCH: i32 = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingField {
    Ipd,
    LensWidth,
    LensHeight,
}

impl SettingField {
    pub const ALL: [SettingField; 3] = [SettingField::Ipd, SettingField::LensWidth, SettingField::LensHeight];

    pub fn label(self) -> &'static str {
        match self {
            SettingField::Ipd => "IPD",
            SettingField::LensWidth => "Lens W",
            SettingField::LensHeight => "Lens H",
        }
    }

    fn index(self) -> usize {
        match self {
            SettingField::Ipd => 0,
            SettingField::LensWidth => 1,
            SettingField::LensHeight => 2,
        }
    }

    /// Current value as the panel prints it.
    pub fn value_text(self, p: &LensParameters) -> String {
        match self {
            SettingField::Ipd => format!("{:.0} px", p.ipd),
            SettingField::LensWidth => format!("{:.2}", p.lens_width_ratio),
            SettingField::LensHeight => format!("{:.2}", p.lens_height_ratio),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsPanel {
    open: bool,
    selected: SettingField,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self {
            open: false,
            selected: SettingField::Ipd,
        }
    }
}

impl SettingsPanel {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn selected(&self) -> SettingField {
        self.selected
    }

    pub fn select_next(&mut self) {
        let i = (self.selected.index() + 1) % SettingField::ALL.len();
        self.selected = SettingField::ALL[i];
    }

    pub fn select_prev(&mut self) {
        let n = SettingField::ALL.len();
        let i = (self.selected.index() + n - 1) % n;
        self.selected = SettingField::ALL[i];
    }

    /// Move the selected slider by `steps` notches (1 px or 0.01) and return
    /// the clamped result.
    pub fn adjust(&self, params: &LensParameters, steps: i32) -> LensParameters {
        let d = steps as f64;
        let mut next = *params;
        match self.selected {
            SettingField::Ipd => next.ipd += d,
            SettingField::LensWidth => next.lens_width_ratio += d * RATIO_STEP,
            SettingField::LensHeight => next.lens_height_ratio += d * RATIO_STEP,
        }
        next.clamped()
    }

    /// Centred horizontally, middle at half the canvas height.
    pub fn bounds(canvas: CanvasSize) -> AxisAlignedBox {
        let x1 = (canvas.width as i32 - PANEL_SIZE.0) / 2;
        let y1 = frac(canvas.height as i32, 0.5) - PANEL_SIZE.1 / 2;
        AxisAlignedBox::new(x1, y1, x1 + PANEL_SIZE.0 - 1, y1 + PANEL_SIZE.1 - 1)
    }

    pub fn draw<C: Canvas + ?Sized>(&self, c: &mut C, canvas: CanvasSize, params: &LensParameters, palette: &Palette) {
        if !self.open {
            return;
        }
        let b = Self::bounds(canvas);
        let text: Rgba<u8> = palette.panel_text.0;
        draw_rounded_rect(
            c,
            &b,
            PANEL_RADIUS,
            Paint::fill(palette.panel_background.0).with_outline(text, 2),
        );

        let x = b.x1 + 20;
        draw_text(c, x, b.y1 + 16, "Settings", TEXT_SCALE, text);
        for (row, field) in SettingField::ALL.iter().enumerate() {
            let y = b.y1 + 60 + row as i32 * ROW_PITCH;
            let marker = if *field == self.selected { ">" } else { " " };
            let line = format!("{marker} {:<7}{}", field.label(), field.value_text(params));
            draw_text(c, x, y, &line, TEXT_SCALE, text);
        }
        let hint_y = b.y2 - 12 - GLYPH_H * TEXT_SCALE / 2;
        draw_text(c, x, hint_y, "Up/Down select  Left/Right adjust", 1, text);
    }
}
