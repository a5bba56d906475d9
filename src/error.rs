// One error type for the whole crate.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the window failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    #[error("reading config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Canvas size outside what can be laid out and displayed.
    #[error("invalid canvas size {width}x{height} (each side must be 1..={max})")]
    InvalidCanvas { width: u32, height: u32, max: u32 },

    /// A colour string in the palette could not be understood.
    #[error("invalid colour {0:?} (expected #RRGGBB, #RRGGBBAA or a colour name)")]
    InvalidColor(String),

    /// Two rasters that must line up pixel-for-pixel do not.
    #[error("{what}: dimension mismatch ({left:?} vs {right:?})")]
    Dimensions {
        what: &'static str,
        left: (u32, u32),
        right: (u32, u32),
    },

    /// Writing one of the capture files failed (permissions, disk full, ...).
    #[error("capture write failed for {path}: {reason}")]
    CaptureWrite { path: PathBuf, reason: String },

    #[error("capture metadata encode error: {0}")]
    Metadata(#[from] serde_json::Error),
}
