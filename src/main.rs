mod cancel;
mod engine;
mod error;
mod fitness;
mod geom;
mod persist;
mod propose;
mod raster;
mod render;
mod settings;
mod shape;

use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::cancel::CancelToken;
use crate::engine::Engine;
use crate::settings::{ScoreRegion, Settings, TieBreak};

/// Approximate an image with randomly placed filled circles.
///
/// Runs until `q` + enter, then writes the best canvas to out_<source>.
/// Run again on the same source to continue from that output.
#[derive(Parser, Debug)]
#[command(name = "dotter", version, about)]
struct Cli {
    /// image to approximate (png, jpeg or gif)
    source: PathBuf,

    /// where to write (and resume from); defaults to out_<source file name>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// json settings file
    #[arg(short, long, default_value = "dotter.json")]
    config: PathBuf,

    /// write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// largest circle radius
    #[arg(long)]
    max_radius: Option<u32>,

    /// palette size for gif output
    #[arg(long)]
    palette_size: Option<u16>,

    /// print progress every N iterations
    #[arg(long)]
    progress_every: Option<u64>,

    #[arg(long, value_enum)]
    score_region: Option<ScoreRegion>,

    /// tie handling when a candidate scores the same as the canvas
    #[arg(long, value_enum)]
    ties: Option<TieBreak>,
}

impl Cli {
    /// file settings with command-line overrides applied
    fn settings(&self) -> Settings {
        let mut s = Settings::load(&self.config);
        if self.seed.is_some() {
            s.seed = self.seed;
        }
        if let Some(r) = self.max_radius {
            s.max_radius = r;
        }
        if let Some(p) = self.palette_size {
            s.palette_size = p;
        }
        if let Some(n) = self.progress_every {
            s.progress_interval = n;
        }
        if let Some(r) = self.score_region {
            s.score_region = r;
        }
        if let Some(t) = self.ties {
            s.tie_break = t;
        }
        s
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.settings();
    settings.validate()?;
    if cli.save_config {
        settings
            .save(&cli.config)
            .with_context(|| format!("saving settings to {}", cli.config.display()))?;
        log::info!("settings saved to {}", cli.config.display());
    }

    let (target, kind) = persist::load_target(&cli.source)
        .with_context(|| format!("loading source image {}", cli.source.display()))?;
    let out_path = cli
        .output
        .clone()
        .unwrap_or_else(|| persist::output_path_for(&cli.source));
    let canvas = persist::load_resume(&out_path, target.bounds());
    log::info!(
        "{}x{} {:?} image, writing to {}",
        target.width(),
        target.height(),
        kind,
        out_path.display()
    );

    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::debug!("rng seed {seed}");
    let mut engine = Engine::new(target, canvas, &settings, Pcg32::seed_from_u64(seed))?;
    log::info!("starting distance {}", engine.canvas_distance()?);

    let cancel = CancelToken::new();
    cancel::spawn_stdin_listener(cancel.clone()).context("starting stop listener")?;

    engine.run(&cancel, |p| {
        print!(
            "\rq + enter to write image to disk. Current iteration: {}. Accepted: {}.",
            p.iteration, p.accepted
        );
        let _ = std::io::stdout().flush();
    })?;
    println!();

    log::info!(
        "stopped after {} iterations ({} accepted), distance {}",
        engine.iteration,
        engine.accepted,
        engine.canvas_distance()?
    );
    log::info!("writing image to {}", out_path.display());
    engine
        .finish(|canvas| {
            let bytes = persist::encode(kind, canvas, &settings)?;
            persist::write_output(&out_path, &bytes)
        })
        .with_context(|| format!("could not write destination image {}", out_path.display()))?;
    if kind == persist::ImageKind::Jpeg {
        log::info!("jpeg output is lossy; a resumed run will score slightly differently");
    }
    Ok(())
}
