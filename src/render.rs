use crate::raster::RasterImage;
use crate::shape::{Mask, Proposal};

/// source-over of one straight channel value: s*sa + d*(1-sa), rounded
#[inline(always)]
fn over(s: u8, d: u8, sa: u32) -> u8 {
    // (x + 127) / 255 is a rounded divide-by-255
    ((s as u32 * sa + d as u32 * (255 - sa) + 127) / 255) as u8
}

/// candidate canvas: a copy of `canvas` with the proposal painted on.
/// `canvas` itself is never touched, so a rejected proposal leaves no trace.
pub fn composite<M: Mask>(canvas: &RasterImage, proposal: &Proposal<M>) -> RasterImage {
    profiling::scope!("composite");
    let mut out = canvas.clone();
    blend_over(&mut out, proposal);
    out
}

/// paint the proposal color through its mask onto `canvas` in place.
/// only the mask's bounding box clipped to the canvas is visited.
pub fn blend_over<M: Mask>(canvas: &mut RasterImage, proposal: &Proposal<M>) {
    profiling::scope!("blend_over");
    let area = proposal.mask.bounding_box().intersect(canvas.bounds());
    if area.is_empty() {
        return;
    }
    let [sr, sg, sb, sa] = proposal.color;
    let sa = sa as u32;

    for y in area.min_y..area.max_y {
        for x in area.min_x..area.max_x {
            if !proposal.mask.covers(x, y) {
                continue;
            }
            let (px, py) = (x as u32, y as u32);
            let [dr, dg, db, da] = canvas.get(px, py);
            canvas.set(
                px,
                py,
                [
                    over(sr, dr, sa),
                    over(sg, dg, sa),
                    over(sb, db, sa),
                    // alpha accumulates the same way with a source value of 255
                    over(255, da, sa),
                ],
            );
        }
    }
}
