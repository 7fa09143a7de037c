// run settings for dotter.
// loaded from an optional json file, then overridden by command-line flags.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// largest accepted `max_radius`. keeps circle extents well inside i32.
pub const RADIUS_LIMIT: u32 = 1 << 16;

/// which pixels an accept/reject comparison is scored over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRegion {
    /// only the proposal's bounding box (cheap; same decision as full image
    /// because pixels outside the box are identical on both canvases)
    DirtyRect,
    /// the whole canvas
    FullImage,
}

/// what to do when the candidate scores exactly the same as the current canvas
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// keep the current canvas (no neutral drift)
    KeepCurrent,
    /// take the candidate
    TakeCandidate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// largest circle radius a proposal may draw (brush granularity)
    pub max_radius: u32,
    /// colors in the indexed palette used for gif output (2-256)
    pub palette_size: u16,
    /// print a status line every N iterations
    pub progress_interval: u64,
    pub score_region: ScoreRegion,
    pub tie_break: TieBreak,
    /// fixed rng seed; None seeds from the clock
    pub seed: Option<u64>,
    /// jpeg output quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_radius: 15,
            palette_size: 256,
            progress_interval: 5_000,
            score_region: ScoreRegion::DirtyRect,
            tie_break: TieBreak::KeepCurrent,
            seed: None,
            jpeg_quality: 90,
        }
    }
}

impl Settings {
    /// load settings from a json file, or return defaults if it doesn't exist
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("failed to parse {}: {}. using defaults.", path.display(), e);
                    Self::default()
                }
            },
            // file doesn't exist or can't be read - use defaults
            Err(_) => Self::default(),
        }
    }

    /// save settings as pretty json
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, json).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=RADIUS_LIMIT).contains(&self.max_radius) {
            return Err(Error::Config(format!(
                "max_radius must be within 1..={RADIUS_LIMIT}, got {}",
                self.max_radius
            )));
        }
        if !(2..=256).contains(&self.palette_size) {
            return Err(Error::Config(format!(
                "palette_size must be within 2..=256, got {}",
                self.palette_size
            )));
        }
        if self.progress_interval == 0 {
            return Err(Error::Config("progress_interval must be at least 1".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}
