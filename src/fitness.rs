//! L2 (euclidean) distance over raw rgba bytes. lower is more similar.
//!
//! scoring only the dirty rect of a proposal keeps per-iteration cost
//! proportional to the brush size instead of the image size. both sides of an
//! accept/reject comparison must be scored over the same rect.

use crate::error::{Error, Result};
use crate::geom::Rect;
use crate::raster::RasterImage;

/// sum of squared byte differences over two equal-length buffers
#[inline]
pub fn sum_sq_diff(a: &[u8], b: &[u8]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x.abs_diff(y) as u64;
            d * d
        })
        .sum()
}

/// floor(sqrt(n)) without trusting f64 rounding near perfect squares
#[inline]
pub fn isqrt(n: u64) -> u64 {
    let n = n as u128;
    let mut r = (n as f64).sqrt() as u128;
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r as u64
}

/// distance between `a` and `b` restricted to `rect` (clipped to the image).
/// the full bounds of both images must match.
pub fn distance(a: &RasterImage, b: &RasterImage, rect: Rect) -> Result<u64> {
    profiling::scope!("distance");
    if a.bounds() != b.bounds() {
        return Err(Error::SizeMismatch { a: a.bounds(), b: b.bounds() });
    }
    let sa = a.subimage(rect);
    let sb = b.subimage(rect);
    Ok(isqrt(sum_sq_diff(sa.as_raw(), sb.as_raw())))
}
