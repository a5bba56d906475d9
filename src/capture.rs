// Saving what the wearer sees: the composited frame, a damage-highlighted
// copy and a JSON sidecar describing the fit and the mode.
// Visual: three files per capture in the capture directory,
// `capture_T.png`, `capture_T_det.png`, `capture_T.json`.

use std::fs;
use std::path::{Path, PathBuf};

use image::{RgbImage, Rgba};
use log::info;
use serde::{Deserialize, Serialize};

use crate::draw::{draw_circle, Paint};
use crate::error::Error;
use crate::geometry::{LensParameters, Point};
use crate::highlight::DamageHighlighter;
use crate::modes::Mode;

const MARKER_RADIUS: i32 = 30;
const MARKER_WIDTH: i32 = 6;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LensParamsRecord {
    pub ipd: i64,
    pub lens_w_ratio: f64,
    pub lens_h_ratio: f64,
}

impl From<&LensParameters> for LensParamsRecord {
    fn from(p: &LensParameters) -> Self {
        Self {
            ipd: p.ipd.round() as i64,
            lens_w_ratio: p.lens_width_ratio,
            lens_h_ratio: p.lens_height_ratio,
        }
    }
}

/// Contents of `capture_T.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Unix seconds.
    pub timestamp: u64,
    /// `menu`, `navigation` or `carscan`.
    pub mode: String,
    pub lens_params: LensParamsRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_center: Option<Point>,
}

impl CaptureRecord {
    pub fn new(timestamp: u64, params: &LensParameters, mode: Option<&Mode>) -> Self {
        Self {
            timestamp,
            mode: mode.map_or("menu", Mode::name).to_string(),
            lens_params: params.into(),
            guide_step: mode.and_then(Mode::guide_step),
            guide_center: mode.and_then(Mode::current_target_position),
        }
    }
}

/// The three files one capture produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturePaths {
    pub image: PathBuf,
    pub detection: PathBuf,
    pub metadata: PathBuf,
}

impl CapturePaths {
    pub fn for_timestamp(dir: &Path, timestamp: u64) -> Self {
        Self {
            image: dir.join(format!("capture_{timestamp}.png")),
            detection: dir.join(format!("capture_{timestamp}_det.png")),
            metadata: dir.join(format!("capture_{timestamp}.json")),
        }
    }
}

fn write_failed(path: &Path, reason: impl ToString) -> Error {
    Error::CaptureWrite {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Ring around the guide target so the saved frame shows what was aimed at.
pub fn mark_target(image: &mut RgbImage, center: Point, color: Rgba<u8>) {
    draw_circle(image, center, MARKER_RADIUS, Paint::stroke(color, MARKER_WIDTH));
}

/// Write the capture for `record` into `dir` (created if missing).
/// When the record carries a guide centre the ring is burned into both images.
pub fn write_capture(
    dir: &Path,
    composite: &RgbImage,
    record: &CaptureRecord,
    highlighter: &DamageHighlighter,
    marker_color: Rgba<u8>,
) -> Result<CapturePaths, Error> {
    fs::create_dir_all(dir).map_err(|e| write_failed(dir, e))?;
    let paths = CapturePaths::for_timestamp(dir, record.timestamp);

    let mut frame = composite.clone();
    if let Some(center) = record.guide_center {
        mark_target(&mut frame, center, marker_color);
    }
    frame.save(&paths.image).map_err(|e| write_failed(&paths.image, e))?;

    let detected = highlighter.highlight(&frame)?;
    detected
        .save(&paths.detection)
        .map_err(|e| write_failed(&paths.detection, e))?;

    let json = serde_json::to_string_pretty(record)?;
    fs::write(&paths.metadata, json).map_err(|e| write_failed(&paths.metadata, e))?;

    info!("capture saved: {}", paths.image.display());
    Ok(paths)
}
