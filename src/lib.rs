//! AR glasses HUD prototype: lays out a pair of smart-glasses lenses over a
//! photo, draws a HUD on them, and saves captures with damage edges
//! highlighted.

pub mod app;
pub mod background;
pub mod capture;
pub mod compose;
pub mod config;
pub mod contrast;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod highlight;
pub mod hud;
pub mod modes;
pub mod overlay;
pub mod settings;
pub mod surface;
pub mod types;

pub use app::App;
pub use config::{load_config, Config};
pub use error::Error;
pub use geometry::{compute_geometry, CanvasSize, LensGeometry, LensParameters};
pub use highlight::{DamageHighlighter, HighlightPipeline};
pub use overlay::OverlayRenderer;
