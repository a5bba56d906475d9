// What you SEE:
// • A street photo with AR glasses drawn over it; clock, battery and a
//   navigation hint float on the lenses.
// • N: navigation card. S: car-scan target ring (G steps to the next one).
// • C captures the view (+ a damage-highlighted copy and JSON).
// • K or a click on the crown opens the fit settings (arrows adjust).
// • M back to the menu. ESC closes whatever is open, then quits.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ivision::config::PalettePreset;
use ivision::surface::{open_surface, SurfaceKind};
use ivision::{app, background, load_config, App, Error, HighlightPipeline};
use log::info;

#[derive(Parser)]
#[command(name = "ivision")]
#[command(version, about = "AR glasses HUD prototype")]
struct Cli {
    /// Config file (defaults to ./ivision.toml, missing file = defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Colour scheme, replaces the configured palette
    #[arg(long, value_enum)]
    palette: Option<PalettePreset>,

    /// Damage-highlight pipeline, overrides the config
    #[arg(long, value_enum)]
    pipeline: Option<HighlightPipeline>,

    /// Where frames go: a window if possible (auto), a window or fail, or none
    #[arg(long, value_enum, default_value = "auto")]
    surface: SurfaceKind,

    /// No window: render one frame, capture it and exit (same as --surface headless)
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn surface_kind(&self) -> SurfaceKind {
        if self.headless { SurfaceKind::Headless } else { self.surface }
    }
}

fn main() -> Result<(), Error> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(preset) = cli.palette {
        info!("palette: {preset:?}");
        cfg.palette = preset.palette();
    }
    let pipeline = HighlightPipeline::resolve(cli.pipeline.or(cfg.highlight_pipeline));

    /* --- Background + glasses ---
       Visual: the photo (or a grey placeholder) with the frame composited on. */
    let bg = background::load_background(&cfg.background_path, cfg.canvas);
    let mut app = App::new(&cfg, bg.image, pipeline)?;

    /* --- Surface ---
       Visual: a window of canvas size, or nothing when headless. */
    let mut surface = open_surface(cli.surface_kind(), "iVision", cfg.canvas)?;

    app::run(&mut app, surface.as_mut(), Duration::from_millis(cfg.clock_interval_ms))
}
