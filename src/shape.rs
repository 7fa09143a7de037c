use crate::geom::Rect;
use crate::raster::Rgba;

/// coverage predicate over a bounding box. `bounding_box` must enclose every
/// pixel for which `covers` returns true.
pub trait Mask {
    fn bounding_box(&self) -> Rect;

    /// pure function of integer pixel coordinates
    fn covers(&self, x: i32, y: i32) -> bool;
}

/// filled circle sampled at pixel centers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Circle {
    pub center: (i32, i32),
    radius: u32,
}

impl Circle {
    /// a zero radius would cover nothing, so it is bumped to 1
    pub fn new(center: (i32, i32), radius: u32) -> Self {
        Self { center, radius: radius.max(1) }
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }
}

impl Mask for Circle {
    fn bounding_box(&self) -> Rect {
        let (cx, cy) = self.center;
        let r = i32::try_from(self.radius).unwrap_or(i32::MAX);
        Rect::new(
            cx.saturating_sub(r),
            cy.saturating_sub(r),
            cx.saturating_add(r),
            cy.saturating_add(r),
        )
    }

    #[inline]
    fn covers(&self, x: i32, y: i32) -> bool {
        // +0.5 samples the pixel center rather than its top-left corner
        let xx = (x - self.center.0) as f64 + 0.5;
        let yy = (y - self.center.1) as f64 + 0.5;
        let rr = self.radius as f64;
        xx * xx + yy * yy < rr * rr
    }
}

/// one candidate overlay: where to paint and with what color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proposal<M: Mask = Circle> {
    pub mask: M,
    pub color: Rgba,
}
