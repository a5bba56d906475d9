// Where frames go and where input comes from.
// Visual: either a desktop window showing the glasses view, or nothing at all
// (headless) with input played back from a script.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{info, warn};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::geometry::{CanvasSize, Point};
use crate::types::FrameBuffer;

/// Everything the app reacts to, independent of the surface it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    ShowMenu,
    OpenNavigation,
    OpenCarScan,
    NextGuideStep,
    Capture,
    /// The crown button: opens or closes the settings panel.
    ToggleSettings,
    SelectPrev,
    SelectNext,
    /// Move the selected slider by this many notches.
    Adjust(i32),
    /// Enter: dismiss a notice.
    Confirm,
    /// Escape: dismiss, close, or quit, whichever applies first.
    Back,
    Click(Point),
    Quit,
}

pub trait RenderSurface {
    fn name(&self) -> &'static str;

    /// False once the user closed the window or the script ran out.
    fn is_open(&self) -> bool;

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error>;

    /// Input gathered since the last call.
    fn poll_input(&mut self) -> Vec<InputEvent>;
}

/* ---------- Window ---------- */

/// Keys that map one-to-one onto an event, fired on press.
const KEY_EVENTS: [(Key, InputEvent); 11] = [
    (Key::M, InputEvent::ShowMenu),
    (Key::N, InputEvent::OpenNavigation),
    (Key::S, InputEvent::OpenCarScan),
    (Key::G, InputEvent::NextGuideStep),
    (Key::Space, InputEvent::NextGuideStep),
    (Key::C, InputEvent::Capture),
    (Key::K, InputEvent::ToggleSettings),
    (Key::Tab, InputEvent::ToggleSettings),
    (Key::Up, InputEvent::SelectPrev),
    (Key::Down, InputEvent::SelectNext),
    (Key::Enter, InputEvent::Confirm),
];

pub struct WindowSurface {
    window: Window, // the on-screen window you see
    mouse_was_down: bool,
}

impl WindowSurface {
    /// Open a window of exactly the canvas size.
    pub fn new(title: &str, canvas: CanvasSize) -> Result<Self, Error> {
        let mut window = Window::new(title, canvas.width as usize, canvas.height as usize, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(30);
        Ok(Self {
            window,
            mouse_was_down: false,
        })
    }
}

impl RenderSurface for WindowSurface {
    fn name(&self) -> &'static str {
        "window"
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    fn poll_input(&mut self) -> Vec<InputEvent> {
        let mut events: Vec<InputEvent> = KEY_EVENTS
            .iter()
            .filter(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .map(|(_, ev)| *ev)
            .collect();

        // Sliders repeat while held.
        if self.window.is_key_pressed(Key::Left, KeyRepeat::Yes) {
            events.push(InputEvent::Adjust(-1));
        }
        if self.window.is_key_pressed(Key::Right, KeyRepeat::Yes) {
            events.push(InputEvent::Adjust(1));
        }
        if self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            events.push(InputEvent::Back);
        }

        // Click = the frame the left button goes down.
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.mouse_was_down {
            if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Discard) {
                events.push(InputEvent::Click(Point::new(x as i32, y as i32)));
            }
        }
        self.mouse_was_down = down;
        events
    }
}

/* ---------- Headless ---------- */

/// No display: plays back one scripted event per frame, then closes.
pub struct HeadlessSurface {
    script: VecDeque<InputEvent>,
    frames: usize,
    last_frame: Option<FrameBuffer>,
    closed: bool,
}

impl HeadlessSurface {
    pub fn new(script: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            script: script.into_iter().collect(),
            frames: 0,
            last_frame: None,
            closed: false,
        }
    }

    /// Default unattended run: show one frame, capture it, stop.
    pub fn single_capture() -> Self {
        Self::new([InputEvent::Capture])
    }

    pub fn frames_presented(&self) -> usize {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last_frame.as_ref()
    }
}

impl RenderSurface for HeadlessSurface {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn is_open(&self) -> bool {
        !self.closed
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        self.frames += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn poll_input(&mut self) -> Vec<InputEvent> {
        match self.script.pop_front() {
            Some(ev) => vec![ev],
            None => {
                self.closed = true;
                Vec::new()
            }
        }
    }
}

/* ---------- Factory ---------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SurfaceKind {
    /// Window if one can be opened, headless otherwise.
    Auto,
    Window,
    Headless,
}

/// Pick the surface once at startup.
pub fn open_surface(kind: SurfaceKind, title: &str, canvas: CanvasSize) -> Result<Box<dyn RenderSurface>, Error> {
    let surface: Box<dyn RenderSurface> = match kind {
        SurfaceKind::Headless => Box::new(HeadlessSurface::single_capture()),
        SurfaceKind::Window => Box::new(WindowSurface::new(title, canvas)?),
        SurfaceKind::Auto => match WindowSurface::new(title, canvas) {
            Ok(w) => Box::new(w),
            Err(e) => {
                warn!("{e}; running headless");
                Box::new(HeadlessSurface::single_capture())
            }
        },
    };
    info!("surface: {}", surface.name());
    Ok(surface)
}

/* ---------- Clock ---------- */

/// Fires at most once per `interval`, checked from the frame loop.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last: now }
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_plays_script_then_closes() {
        let mut s = HeadlessSurface::new([InputEvent::OpenCarScan, InputEvent::Capture]);
        assert!(s.is_open());
        assert_eq!(s.poll_input(), vec![InputEvent::OpenCarScan]);
        assert_eq!(s.poll_input(), vec![InputEvent::Capture]);
        assert!(s.is_open());
        assert!(s.poll_input().is_empty());
        assert!(!s.is_open());
    }

    #[test]
    fn headless_keeps_the_last_frame() {
        let mut s = HeadlessSurface::single_capture();
        let fb = FrameBuffer::from_rgb(&image::RgbImage::new(4, 3));
        s.present(&fb).unwrap();
        s.present(&fb).unwrap();
        assert_eq!(s.frames_presented(), 2);
        assert_eq!(s.last_frame().map(|f| (f.width, f.height)), Some((4, 3)));
    }

    #[test]
    fn forced_headless_never_touches_a_display() {
        let s = open_surface(SurfaceKind::Headless, "t", CanvasSize { width: 10, height: 10 }).unwrap();
        assert_eq!(s.name(), "headless");
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let t0 = Instant::now();
        let mut t = Ticker::new(Duration::from_millis(1000), t0);
        assert!(!t.due(t0 + Duration::from_millis(999)));
        assert!(t.due(t0 + Duration::from_millis(1000)));
        assert!(!t.due(t0 + Duration::from_millis(1500)));
        assert!(t.due(t0 + Duration::from_millis(2100)));
    }
}
