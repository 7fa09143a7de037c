// Greedy accept/reject loop
// propose -> composite -> score -> keep if strictly better -> poll for stop

pub mod progress;

use rand::Rng;
use rand_pcg::Pcg32;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::fitness::distance;
use crate::geom::Rect;
use crate::propose::Proposer;
use crate::raster::RasterImage;
use crate::render::composite;
use crate::settings::{ScoreRegion, Settings, TieBreak};
use crate::shape::{Mask, Proposal};

pub use progress::Progress;
use progress::ProgressThrottle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// stop observed; canvas waiting to be persisted
    Stopping,
    /// canvas handed to persistence
    Done,
}

/// result of scoring one proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub accepted: bool,
    /// current canvas vs target over `region`
    pub before: u64,
    /// candidate canvas vs target over `region`
    pub after: u64,
    pub region: Rect,
}

pub struct Engine<R: Rng = Pcg32> {
    target: RasterImage,
    // only ever replaced wholesale by an accepted candidate
    canvas: RasterImage,
    proposer: Proposer,
    rng: R,
    score_region: ScoreRegion,
    tie_break: TieBreak,
    throttle: ProgressThrottle,
    state: RunState,
    pub iteration: u64,
    pub accepted: u64,
}

impl<R: Rng> Engine<R> {
    /// target and canvas must share bounds; anything else is fatal before the
    /// first iteration
    pub fn new(target: RasterImage, canvas: RasterImage, settings: &Settings, rng: R) -> Result<Self> {
        profiling::scope!("Engine::new");
        if target.bounds() != canvas.bounds() {
            return Err(Error::SizeMismatch {
                a: target.bounds(),
                b: canvas.bounds(),
            });
        }
        let proposer = Proposer::from_target(&target, settings.max_radius)?;

        Ok(Self {
            target,
            canvas,
            proposer,
            rng,
            score_region: settings.score_region,
            tie_break: settings.tie_break,
            throttle: ProgressThrottle::new(settings.progress_interval),
            state: RunState::Running,
            iteration: 0,
            accepted: 0,
        })
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn canvas(&self) -> &RasterImage {
        &self.canvas
    }

    pub fn progress(&self) -> Progress {
        Progress {
            iteration: self.iteration,
            accepted: self.accepted,
        }
    }

    /// whole-canvas distance to the target
    pub fn canvas_distance(&self) -> Result<u64> {
        distance(&self.canvas, &self.target, self.target.bounds())
    }

    /// score `proposal` against the current canvas and adopt it if it wins.
    /// both canvases are scored over the same region, so the decision is
    /// unbiased whichever region policy is active.
    pub fn evaluate<M: Mask>(&mut self, proposal: &Proposal<M>) -> Result<StepOutcome> {
        profiling::scope!("evaluate");
        let region = match self.score_region {
            ScoreRegion::DirtyRect => proposal.mask.bounding_box().intersect(self.target.bounds()),
            ScoreRegion::FullImage => self.target.bounds(),
        };

        let candidate = composite(&self.canvas, proposal);
        let before = distance(&self.canvas, &self.target, region)?;
        let after = distance(&candidate, &self.target, region)?;

        let accepted = match self.tie_break {
            TieBreak::KeepCurrent => after < before,
            TieBreak::TakeCandidate => after <= before,
        };
        if accepted {
            self.canvas = candidate;
            self.accepted += 1;
        }

        Ok(StepOutcome { accepted, before, after, region })
    }

    /// generate one random proposal and evaluate it
    pub fn step(&mut self) -> Result<StepOutcome> {
        let proposal = self.proposer.propose(&mut self.rng);
        self.evaluate(&proposal)
    }

    /// iterate until `cancel` fires. the flag is polled once per iteration,
    /// after the accept/reject decision, so a stop never interrupts a step.
    /// there is no iteration cap.
    pub fn run<F>(&mut self, cancel: &CancelToken, mut report: F) -> Result<()>
    where
        F: FnMut(&Progress),
    {
        profiling::scope!("Engine::run");
        if self.state != RunState::Running {
            return Ok(());
        }

        loop {
            if self.throttle.should_report(self.iteration) {
                report(&self.progress());
            }

            let outcome = self.step()?;
            if outcome.accepted {
                log::trace!(
                    "iteration {}: accepted {:?}, {} -> {}",
                    self.iteration,
                    outcome.region,
                    outcome.before,
                    outcome.after
                );
            }
            self.iteration += 1;

            if cancel.is_cancelled() {
                log::debug!("stopping after {} iterations", self.iteration);
                self.state = RunState::Stopping;
                return Ok(());
            }
        }
    }

    /// hand the canvas to `persist` and move to Done. later calls are no-ops,
    /// so the canvas is written at most once.
    pub fn finish<F>(&mut self, persist: F) -> Result<()>
    where
        F: FnOnce(&RasterImage) -> Result<()>,
    {
        if self.state == RunState::Done {
            return Ok(());
        }
        self.state = RunState::Done;
        persist(&self.canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Circle;
    use rand::SeedableRng;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RasterImage {
        let mut img = RasterImage::blank(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, px);
            }
        }
        img
    }

    fn scene(w: u32, h: u32) -> RasterImage {
        let mut img = RasterImage::blank(w, h);
        for y in 0..h {
            for x in 0..w {
                let px = match (x * 3 / w, y * 2 / h) {
                    (0, 0) => [230, 40, 40, 255],
                    (1, 0) => [40, 230, 40, 255],
                    (2, 0) => [40, 40, 230, 255],
                    (_, _) => [((x * 7) % 256) as u8, ((y * 11) % 256) as u8, 128, 255],
                };
                img.set(x, y, px);
            }
        }
        img
    }

    fn engine(target: RasterImage, settings: &Settings) -> Engine {
        let canvas = RasterImage::blank(target.width(), target.height());
        Engine::new(target, canvas, settings, Pcg32::seed_from_u64(1234)).unwrap()
    }

    #[test]
    fn test_mismatched_canvas_rejected() {
        let target = solid(4, 4, RED);
        let canvas = RasterImage::blank(4, 3);
        let err = Engine::new(target, canvas, &Settings::default(), Pcg32::seed_from_u64(0)).err();
        assert!(matches!(err, Some(Error::SizeMismatch { .. })));
    }

    #[test]
    fn test_red_accepted_blue_rejected() {
        let mut e = engine(solid(2, 2, RED), &Settings::default());
        let cover = Circle::new((1, 1), 2);
        let baseline = e.canvas_distance().unwrap();
        assert_eq!(baseline, 721);

        let blue = e.evaluate(&Proposal { mask: cover, color: BLUE }).unwrap();
        assert!(!blue.accepted);
        assert!(blue.after >= blue.before);
        assert_eq!(e.canvas(), &RasterImage::blank(2, 2));

        let red = e.evaluate(&Proposal { mask: cover, color: RED }).unwrap();
        assert!(red.accepted);
        assert_eq!(red.after, 0);
        assert_eq!(e.canvas_distance().unwrap(), 0);
        assert_eq!(e.accepted, 1);
    }

    #[test]
    fn test_tie_keeps_current_by_default() {
        let mut e = engine(solid(2, 2, RED), &Settings::default());
        // fully transparent paint changes nothing, so scores tie
        let p = Proposal { mask: Circle::new((1, 1), 2), color: [0, 0, 0, 0] };
        let out = e.evaluate(&p).unwrap();
        assert_eq!(out.before, out.after);
        assert!(!out.accepted);
        assert_eq!(e.accepted, 0);
    }

    #[test]
    fn test_tie_policy_can_take_candidate() {
        let settings = Settings { tie_break: TieBreak::TakeCandidate, ..Settings::default() };
        let mut e = engine(solid(2, 2, RED), &settings);
        let p = Proposal { mask: Circle::new((1, 1), 2), color: BLUE };
        let out = e.evaluate(&p).unwrap();
        assert_eq!(out.before, out.after);
        assert!(out.accepted);
    }

    #[test]
    fn test_dirty_rect_is_clipped_mask_box() {
        let mut e = engine(solid(8, 8, RED), &Settings::default());
        let out = e.evaluate(&Proposal { mask: Circle::new((0, 7), 3), color: RED }).unwrap();
        assert_eq!(out.region, Rect::new(0, 4, 3, 8));
    }

    #[test]
    fn test_full_image_policy_scores_whole_canvas() {
        let settings = Settings { score_region: ScoreRegion::FullImage, ..Settings::default() };
        let mut e = engine(solid(8, 8, RED), &settings);
        let out = e.evaluate(&Proposal { mask: Circle::new((2, 2), 1), color: RED }).unwrap();
        assert_eq!(out.region, Rect::from_size(8, 8));
        assert!(out.accepted);
    }

    #[test]
    fn test_monotonic_and_rejection_purity() {
        let mut e = engine(scene(40, 30), &Settings::default());
        let mut last_full = e.canvas_distance().unwrap();

        for _ in 0..3_000 {
            let before_canvas = e.canvas().clone();
            let out = e.step().unwrap();
            assert!(out.after <= out.before || !out.accepted);
            if out.accepted {
                assert!(out.after < out.before);
            } else {
                assert_eq!(e.canvas().as_raw(), before_canvas.as_raw());
            }
            // outside the dirty rect nothing changed, so the whole-canvas
            // distance cannot grow either
            let full = e.canvas_distance().unwrap();
            assert!(full <= last_full, "{full} > {last_full}");
            last_full = full;
        }
        assert!(e.accepted > 0);
    }

    #[test]
    fn test_same_seed_same_canvas() {
        let mut a = engine(scene(24, 24), &Settings::default());
        let mut b = engine(scene(24, 24), &Settings::default());
        for _ in 0..500 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
        assert_eq!(a.canvas(), b.canvas());
    }

    #[test]
    fn test_run_stops_on_cancel_and_reports() {
        let settings = Settings { progress_interval: 10, ..Settings::default() };
        let mut e = engine(scene(16, 16), &settings);
        let cancel = CancelToken::new();

        let mut reports = Vec::new();
        let watcher = cancel.clone();
        e.run(&cancel, |p| {
            reports.push(*p);
            if p.iteration >= 50 {
                watcher.cancel();
            }
        })
        .unwrap();

        assert_eq!(e.state(), RunState::Stopping);
        // cancelled during the iteration-50 report; that step still completes
        assert_eq!(e.iteration, 51);
        let iters: Vec<u64> = reports.iter().map(|p| p.iteration).collect();
        assert_eq!(iters, vec![0, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_pre_cancelled_run_completes_one_step() {
        let mut e = engine(scene(16, 16), &Settings::default());
        let cancel = CancelToken::new();
        cancel.cancel();
        e.run(&cancel, |_| {}).unwrap();
        assert_eq!(e.iteration, 1);
        assert_eq!(e.state(), RunState::Stopping);
    }

    #[test]
    fn test_finish_persists_once() {
        let mut e = engine(solid(2, 2, RED), &Settings::default());
        let cancel = CancelToken::new();
        cancel.cancel();
        e.run(&cancel, |_| {}).unwrap();

        let mut writes = 0;
        e.finish(|canvas| {
            writes += 1;
            assert_eq!(canvas.width(), 2);
            Ok(())
        })
        .unwrap();
        e.finish(|_| {
            writes += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(writes, 1);
        assert_eq!(e.state(), RunState::Done);

        // a finished engine does not iterate again
        e.run(&CancelToken::new(), |_| {}).unwrap();
        assert_eq!(e.iteration, 1);
    }

    #[test]
    fn test_finish_propagates_write_error() {
        let mut e = engine(solid(2, 2, RED), &Settings::default());
        let err = e.finish(|_| Err(Error::Config("disk full".into()))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(e.state(), RunState::Done);
    }
}
