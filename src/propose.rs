use rand::Rng;

use crate::error::{Error, Result};
use crate::raster::{RasterImage, Rgba};
use crate::shape::{Circle, Proposal};

/// draws random circle proposals whose colors come from the target's own
/// pixel population, so no proposal wastes a color absent from the image
#[derive(Clone, Debug)]
pub struct Proposer {
    palette: Vec<Rgba>,
    width: u32,
    height: u32,
    max_radius: u32,
}

impl Proposer {
    pub fn from_target(target: &RasterImage, max_radius: u32) -> Result<Self> {
        profiling::scope!("Proposer::from_target");
        if target.width() == 0 || target.height() == 0 {
            return Err(Error::EmptyImage);
        }
        Ok(Self {
            palette: target.pixels().collect(),
            width: target.width(),
            height: target.height(),
            max_radius: max_radius.max(1),
        })
    }

    pub fn propose<R: Rng>(&self, rng: &mut R) -> Proposal<Circle> {
        profiling::scope!("propose");
        let x = rng.random_range(0..self.width) as i32;
        let y = rng.random_range(0..self.height) as i32;
        let radius = rng.random_range(1..=self.max_radius);
        let color = self.palette[rng.random_range(0..self.palette.len())];

        Proposal {
            mask: Circle::new((x, y), radius),
            color,
        }
    }
}
