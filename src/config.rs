// Immutable session configuration: canvas, asset paths, lens defaults, palette.
// Loaded once at startup and handed to the components that need it.

use std::path::{Path, PathBuf};

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{CanvasSize, LensParameters};
use crate::highlight::HighlightPipeline;

/// Where `load_config(None)` looks, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ivision.toml";

/// An RGBA colour that reads/writes as `#RRGGBB`, `#RRGGBBAA` or a short name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba<u8>);

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(Rgba([r, g, b, a]))
    }

    pub fn parse(raw: &str) -> Result<Self, Error> {
        let s = raw.trim();
        let named = match s.to_ascii_lowercase().as_str() {
            "lime" => Some(Self::rgba(0, 255, 0, 255)),
            "white" => Some(Self::rgba(255, 255, 255, 255)),
            "black" => Some(Self::rgba(0, 0, 0, 255)),
            "amber" => Some(Self::rgba(255, 191, 0, 255)),
            "transparent" => Some(Self::rgba(0, 0, 0, 0)),
            _ => None,
        };
        if let Some(c) = named {
            return Ok(c);
        }

        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| Error::InvalidColor(raw.to_string()))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(raw.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(raw.to_string()))
        };
        let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, alpha))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        let [r, g, b, a] = c.0.0;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Colours of the glasses body itself (everything that is not rim or glass).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameAccents {
    pub shadow: Color,
    pub bridge: Color,
    pub arm: Color,
    pub crown: Color,
    pub crown_edge: Color,
    pub crown_ring: Color,
    pub frame_outline: Color,
    pub frame_fill: Color,
    pub bar: Color,
}

impl Default for FrameAccents {
    fn default() -> Self {
        PalettePreset::ArGreen.palette().accents
    }
}

/// Every colour the overlay, HUD and highlighter use. Swapping the palette
/// re-tints the whole view without touching geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub rim: Color,
    pub glass_tint: Color,
    pub hud_text: Color,
    pub background: Color,
    pub panel_background: Color,
    pub panel_text: Color,
    /// Damage edges and the capture guide marker.
    pub highlight: Color,
    pub accents: FrameAccents,
}

impl Default for Palette {
    fn default() -> Self {
        PalettePreset::ArGreen.palette()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PalettePreset {
    ArGreen,
    Amber,
}

impl PalettePreset {
    pub fn palette(self) -> Palette {
        match self {
            PalettePreset::ArGreen => Palette {
                rim: Color::rgba(250, 250, 250, 255),
                glass_tint: Color::rgba(0, 255, 0, 64),
                hud_text: Color::rgba(0, 255, 0, 255),
                background: Color::rgba(0x11, 0x11, 0x11, 255),
                panel_background: Color::rgba(0x0e, 0x24, 0x10, 255),
                panel_text: Color::rgba(0x9a, 0xff, 0x9a, 255),
                highlight: Color::rgba(0, 255, 0, 255),
                accents: FrameAccents {
                    shadow: Color::rgba(0, 0, 0, 50),
                    bridge: Color::rgba(18, 18, 18, 255),
                    arm: Color::rgba(22, 22, 22, 255),
                    crown: Color::rgba(30, 30, 30, 255),
                    crown_edge: Color::rgba(12, 12, 12, 255),
                    crown_ring: Color::rgba(80, 80, 80, 255),
                    frame_outline: Color::rgba(220, 220, 220, 255),
                    frame_fill: Color::rgba(40, 40, 40, 80),
                    bar: Color::rgba(20, 20, 20, 255),
                },
            },
            // Sunglasses look: warm glass, tortoiseshell body.
            PalettePreset::Amber => Palette {
                rim: Color::rgba(60, 36, 12, 255),
                glass_tint: Color::rgba(255, 170, 0, 96),
                hud_text: Color::rgba(255, 191, 0, 255),
                background: Color::rgba(0x14, 0x0c, 0x02, 255),
                panel_background: Color::rgba(0x2a, 0x1a, 0x06, 255),
                panel_text: Color::rgba(0xff, 0xd2, 0x7a, 255),
                highlight: Color::rgba(255, 170, 0, 255),
                accents: FrameAccents {
                    shadow: Color::rgba(0, 0, 0, 50),
                    bridge: Color::rgba(40, 26, 10, 255),
                    arm: Color::rgba(48, 30, 12, 255),
                    crown: Color::rgba(56, 36, 14, 255),
                    crown_edge: Color::rgba(20, 12, 4, 255),
                    crown_ring: Color::rgba(120, 84, 40, 255),
                    frame_outline: Color::rgba(200, 150, 90, 255),
                    frame_fill: Color::rgba(50, 30, 10, 90),
                    bar: Color::rgba(30, 20, 8, 255),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasSize,
    pub background_path: PathBuf,
    pub capture_dir: PathBuf,
    pub lens: LensParameters,
    pub palette: Palette,
    /// Force a damage-highlight pipeline; `None` picks the best one built in.
    pub highlight_pipeline: Option<HighlightPipeline>,
    pub clock_interval_ms: u64,
    pub hud_battery_percent: u8,
    pub status_battery_percent: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas: CanvasSize {
                width: 1000,
                height: 520,
            },
            background_path: PathBuf::from("./background/anastasius-8DkDA67JAIs-unsplash.jpg"),
            capture_dir: PathBuf::from("./captures"),
            lens: LensParameters::default(),
            palette: Palette::default(),
            highlight_pipeline: None,
            clock_interval_ms: 1000,
            hud_battery_percent: 56,
            status_battery_percent: 86,
        }
    }
}

/// Largest canvas side accepted from config.
pub const MAX_CANVAS_SIDE: u32 = 8192;

impl Config {
    /// Reject settings nothing downstream can work with.
    pub fn validate(&self) -> Result<(), Error> {
        let CanvasSize { width, height } = self.canvas;
        let side_ok = |v: u32| (1..=MAX_CANVAS_SIDE).contains(&v);
        if !side_ok(width) || !side_ok(height) {
            return Err(Error::InvalidCanvas {
                width,
                height,
                max: MAX_CANVAS_SIDE,
            });
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = parse_config(&raw).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn parse_config(raw: &str) -> Result<Config, toml::de::Error> {
    let cfg: Config = toml::from_str(raw)?;
    Ok(cfg)
}
