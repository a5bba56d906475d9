// Application state and the frame loop.
// Visual: the photo with the glasses over it, HUD labels on the lenses, the
// active mode's card or target ring, and the settings panel / notices on top.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::{RgbImage, Rgba, RgbaImage};
use log::{error, info};

use crate::capture::{write_capture, CapturePaths, CaptureRecord};
use crate::compose::composite_over;
use crate::config::{Config, Palette};
use crate::draw::{draw_rounded_rect, draw_text, draw_text_centered, text_width, Paint, GLYPH_H};
use crate::error::Error;
use crate::geometry::{compute_geometry, CanvasSize, LensGeometry, LensParameters, Point};
use crate::highlight::{DamageHighlighter, HighlightPipeline};
use crate::hud::{clock_text, draw_hud, HudLayout, HudState};
use crate::modes::{draw_decorations, CarScanMode, Mode, NavigationMode};
use crate::overlay::OverlayRenderer;
use crate::settings::SettingsPanel;
use crate::surface::{InputEvent, RenderSurface, Ticker};
use crate::types::FrameBuffer;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CONTROLS_HINT: &str = "M menu  N nav  S scan  G next  C capture  K settings  Esc quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Modal message; swallows input until dismissed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    fn draw(&self, fb: &mut FrameBuffer, canvas: CanvasSize, palette: &Palette) {
        let (w, h) = (canvas.width as i32, canvas.height as i32);
        let text_w = text_width(&self.title, 2).max(text_width(&self.body, 1)).max(text_width("Enter: OK", 1));
        let half_w = (text_w / 2 + 24).min(w / 2 - 4);
        let center = Point::new(w / 2, h / 2);
        let b = crate::geometry::AxisAlignedBox::around(center, half_w, 50);
        let text = palette.panel_text.0;
        draw_rounded_rect(fb, &b, 8, Paint::fill(palette.panel_background.0).with_outline(text, 2));
        draw_text_centered(fb, Point::new(center.x, center.y - 24), &self.title, 2, text);
        draw_text_centered(fb, center, &self.body, 1, text);
        draw_text_centered(fb, Point::new(center.x, center.y + 30), "Enter: OK", 1, text);
    }
}

pub struct App {
    canvas: CanvasSize,
    palette: Palette,
    capture_dir: PathBuf,
    status_battery_percent: u8,
    background: RgbImage,
    params: LensParameters,
    geometry: LensGeometry,
    renderer: OverlayRenderer,
    overlay: RgbaImage,
    composite: RgbImage,
    highlighter: DamageHighlighter,
    hud_layout: HudLayout,
    hud: HudState,
    mode: Option<Mode>,
    settings: SettingsPanel,
    notice: Option<Notice>,
}

impl App {
    /// `background` must already be scaled to the configured canvas.
    pub fn new(config: &Config, background: RgbImage, pipeline: HighlightPipeline) -> Result<Self, Error> {
        let canvas = config.canvas;
        let params = config.lens.clamped();
        let geometry = compute_geometry(canvas, &params);
        let renderer = OverlayRenderer::new(config.palette);
        let overlay = renderer.render(&geometry);
        let composite = composite_over(&background, &overlay)?;
        let highlighter = DamageHighlighter::new(pipeline, config.palette.highlight.0);
        info!("damage highlight pipeline: {:?}", highlighter.pipeline());

        Ok(Self {
            canvas,
            palette: config.palette,
            capture_dir: config.capture_dir.clone(),
            status_battery_percent: config.status_battery_percent,
            background,
            params,
            hud_layout: HudLayout::from_geometry(&geometry),
            geometry,
            renderer,
            overlay,
            composite,
            highlighter,
            hud: HudState::new(config.hud_battery_percent),
            mode: None,
            settings: SettingsPanel::default(),
            notice: None,
        })
    }

    pub fn params(&self) -> &LensParameters {
        &self.params
    }

    pub fn geometry(&self) -> &LensGeometry {
        &self.geometry
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    pub fn composite(&self) -> &RgbImage {
        &self.composite
    }

    pub fn hud_layout(&self) -> &HudLayout {
        &self.hud_layout
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn mode(&self) -> Option<&Mode> {
        self.mode.as_ref()
    }

    pub fn settings(&self) -> &SettingsPanel {
        &self.settings
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn highlighter(&self) -> &DamageHighlighter {
        &self.highlighter
    }

    /// `menu`, `navigation` or `carscan`, as written to capture metadata.
    pub fn mode_name(&self) -> &'static str {
        self.mode.as_ref().map_or("menu", Mode::name)
    }

    pub fn status_line(&self) -> String {
        let title = self.mode.as_ref().map_or("Menu", Mode::title);
        format!("Battery: {}% | Mode: {title}", self.status_battery_percent)
    }

    /// New fit: recompute geometry, redraw the glasses and move the HUD.
    pub fn set_lens_params(&mut self, params: LensParameters) -> Result<(), Error> {
        let params = params.clamped();
        let geometry = compute_geometry(self.canvas, &params);
        let overlay = self.renderer.render(&geometry);
        let composite = composite_over(&self.background, &overlay)?;

        self.params = params;
        self.hud_layout = HudLayout::from_geometry(&geometry);
        self.geometry = geometry;
        self.overlay = overlay;
        self.composite = composite;
        Ok(())
    }

    /// Leave the current mode (if any) and start `next`; `None` is the menu.
    pub fn switch_mode(&mut self, next: Option<Mode>) {
        if let Some(current) = self.mode.as_mut() {
            current.deactivate();
        }
        self.mode = next.map(|mut m| {
            m.activate();
            m
        });
        if let Some(hint) = self.mode.as_ref().and_then(Mode::navigation_hint) {
            self.hud.navigation = hint;
        }
    }

    pub fn tick_clock(&mut self) {
        self.hud.time = clock_text();
    }

    /// Capture now, stamped with the current unix time.
    pub fn capture(&mut self) -> Option<CapturePaths> {
        let ts = chrono::Utc::now().timestamp().max(0) as u64;
        self.capture_at(ts)
    }

    /// Write the capture files for `timestamp`. The outcome is shown as a
    /// notice; a failure leaves everything else as it was.
    pub fn capture_at(&mut self, timestamp: u64) -> Option<CapturePaths> {
        let record = CaptureRecord::new(timestamp, &self.params, self.mode.as_ref());
        match write_capture(
            &self.capture_dir,
            &self.composite,
            &record,
            &self.highlighter,
            self.palette.highlight.0,
        ) {
            Ok(paths) => {
                let name = |p: &std::path::Path| p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                self.notice = Some(Notice {
                    title: "Capture saved".into(),
                    body: format!("{} + {}", name(&paths.image), name(&paths.detection)),
                });
                Some(paths)
            }
            Err(e) => {
                error!("{e}");
                self.notice = Some(Notice {
                    title: "Capture failed".into(),
                    body: e.to_string(),
                });
                None
            }
        }
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<Flow, Error> {
        if self.notice.is_some() {
            match event {
                InputEvent::Quit => return Ok(Flow::Quit),
                InputEvent::Confirm | InputEvent::Back | InputEvent::Click(_) => self.notice = None,
                _ => {}
            }
            return Ok(Flow::Continue);
        }

        match event {
            InputEvent::ShowMenu => self.switch_mode(None),
            InputEvent::OpenNavigation => self.switch_mode(Some(Mode::Navigation(NavigationMode::default()))),
            InputEvent::OpenCarScan => self.switch_mode(Some(Mode::CarScan(CarScanMode::new(self.canvas)))),
            InputEvent::NextGuideStep => {
                if let Some(Mode::CarScan(scan)) = self.mode.as_mut() {
                    scan.next_step();
                }
            }
            InputEvent::Capture => {
                self.capture();
            }
            InputEvent::ToggleSettings => self.settings.toggle(),
            InputEvent::SelectPrev if self.settings.is_open() => self.settings.select_prev(),
            InputEvent::SelectNext if self.settings.is_open() => self.settings.select_next(),
            InputEvent::Adjust(steps) if self.settings.is_open() => {
                let next = self.settings.adjust(&self.params, steps);
                if next != self.params {
                    self.set_lens_params(next)?;
                }
            }
            InputEvent::Click(p) if self.geometry.knob.contains(p) => self.settings.toggle(),
            InputEvent::Back if self.settings.is_open() => self.settings.close(),
            InputEvent::Back | InputEvent::Quit => return Ok(Flow::Quit),
            _ => {}
        }
        Ok(Flow::Continue)
    }

    /// The full view for the surface: composite, HUD, mode, panel, notice.
    pub fn render_frame(&self) -> FrameBuffer {
        let mut fb = FrameBuffer::from_rgb(&self.composite);
        let hud = self.palette.hud_text.0;

        draw_hud(&mut fb, &self.hud_layout, &self.hud, hud);
        if let Some(mode) = &self.mode {
            draw_decorations(&mut fb, &mode.decorations(&self.geometry), hud);
        }
        draw_text(&mut fb, 8, 8, &self.status_line(), 2, WHITE);
        draw_text(&mut fb, 8, self.canvas.height as i32 - GLYPH_H - 6, CONTROLS_HINT, 1, WHITE);

        self.settings.draw(&mut fb, self.canvas, &self.params, &self.palette);
        if let Some(notice) = &self.notice {
            notice.draw(&mut fb, self.canvas, &self.palette);
        }
        fb
    }
}

/// Drive `app` until the surface closes or the user quits.
pub fn run(app: &mut App, surface: &mut dyn RenderSurface, clock_interval: Duration) -> Result<(), Error> {
    let mut clock = Ticker::new(clock_interval, Instant::now());
    while surface.is_open() {
        for event in surface.poll_input() {
            if app.handle(event)? == Flow::Quit {
                info!("quit");
                return Ok(());
            }
        }
        if clock.due(Instant::now()) {
            app.tick_clock();
        }
        surface.present(&app.render_frame())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn app_with(dir: &std::path::Path) -> App {
        let config = Config {
            capture_dir: dir.to_path_buf(),
            ..Config::default()
        };
        let bg = RgbImage::from_pixel(config.canvas.width, config.canvas.height, Rgb([90, 90, 90]));
        App::new(&config, bg, HighlightPipeline::Fallback).unwrap()
    }

    #[test]
    fn starts_in_the_menu() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path());
        assert_eq!(app.mode_name(), "menu");
        assert_eq!(app.status_line(), "Battery: 86% | Mode: Menu");
        assert_eq!(app.hud().battery, "56%");
    }

    #[test]
    fn switching_modes_updates_status_and_hint() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path());
        app.handle(InputEvent::OpenNavigation).unwrap();
        assert_eq!(app.status_line(), "Battery: 86% | Mode: Navigation");
        assert_eq!(app.hud().navigation, "23 mins →");

        app.handle(InputEvent::OpenCarScan).unwrap();
        assert_eq!(app.mode_name(), "carscan");
        app.handle(InputEvent::NextGuideStep).unwrap();
        assert_eq!(app.mode().and_then(Mode::guide_step), Some(1));

        app.handle(InputEvent::ShowMenu).unwrap();
        assert!(app.mode().is_none());
    }

    #[test]
    fn crown_click_opens_settings_and_arrows_refit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path());
        let knob = app.geometry().knob.center();
        // arrows do nothing while the panel is closed
        app.handle(InputEvent::Adjust(5)).unwrap();
        assert_eq!(app.params().ipd, 240.0);

        app.handle(InputEvent::Click(knob)).unwrap();
        assert!(app.settings().is_open());
        let before = *app.geometry();
        app.handle(InputEvent::Adjust(40)).unwrap();
        assert_eq!(app.params().ipd, 280.0);
        // lens width row: wider lenses push the outer edges out
        app.handle(InputEvent::SelectNext).unwrap();
        app.handle(InputEvent::Adjust(3)).unwrap();
        assert!(app.geometry().left.x1 < before.left.x1);
        assert_ne!(app.hud_layout().time, HudLayout::from_geometry(&before).time);

        app.handle(InputEvent::Back).unwrap();
        assert!(!app.settings().is_open());
        assert_eq!(app.handle(InputEvent::Back).unwrap(), Flow::Quit);
    }

    #[test]
    fn notice_blocks_input_until_dismissed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(dir.path());
        assert!(app.capture_at(10).is_some());
        assert_eq!(app.notice().map(|n| n.title.as_str()), Some("Capture saved"));

        app.handle(InputEvent::OpenCarScan).unwrap();
        assert_eq!(app.mode_name(), "menu");
        app.handle(InputEvent::Confirm).unwrap();
        assert!(app.notice().is_none());
        app.handle(InputEvent::OpenCarScan).unwrap();
        assert_eq!(app.mode_name(), "carscan");
    }

    #[test]
    fn failed_capture_leaves_state_alone() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let mut app = app_with(&blocker);
        app.handle(InputEvent::OpenNavigation).unwrap();
        let params = *app.params();

        assert!(app.capture_at(11).is_none());
        assert_eq!(app.notice().map(|n| n.title.as_str()), Some("Capture failed"));
        assert_eq!(app.mode_name(), "navigation");
        assert_eq!(*app.params(), params);
    }

    #[test]
    fn frame_has_canvas_size_and_status_text() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path());
        assert_eq!(app.overlay().dimensions(), (1000, 520));
        assert_eq!(app.highlighter().pipeline(), HighlightPipeline::Fallback);
        let fb = app.render_frame();
        assert_eq!((fb.width, fb.height), (1000, 520));
        // status line: some white pixels in the top-left strip
        let white = (0..30).any(|y| (0..200).any(|x| fb.rgb_at(x, y) == Some(Rgb([255, 255, 255]))));
        assert!(white);
    }
}
