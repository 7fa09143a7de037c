// integer rectangles for image bounds and dirty regions
//
// all rects are half-open on the max edge: a pixel (x, y) is inside when
// min_x <= x < max_x and min_y <= y < max_y.

/// axis-aligned integer rectangle. doubles as image bounds and as the dirty
/// region a proposal touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    #[inline]
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Rect { min_x, min_y, max_x, max_y }
    }

    /// bounds of a width x height image anchored at the origin
    #[inline]
    pub fn from_size(width: u32, height: u32) -> Self {
        Rect::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x).max(0) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y).max(0) as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    #[cfg(test)]
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// overlap of two rects. disjoint inputs collapse to a zero-sized rect at
    /// the clamped corner so width()/height() read 0.
    pub fn intersect(self, other: Rect) -> Rect {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x).max(min_x);
        let max_y = self.max_y.min(other.max_y).max(min_y);
        Rect { min_x, min_y, max_x, max_y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_size() {
        let r = Rect::from_size(4, 3);
        assert_eq!(r, Rect::new(0, 0, 4, 3));
        assert_eq!((r.width(), r.height()), (4, 3));
        assert!(!r.is_empty());
    }

    #[test]
    fn test_half_open_contains() {
        let r = Rect::new(5, 5, 15, 15);
        assert!(r.contains(5, 5));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 10));
        assert!(!r.contains(10, 15));
        assert!(!r.contains(4, 10));
    }

    #[test]
    fn test_intersect_clips_partial_overlap() {
        let bounds = Rect::from_size(10, 10);
        let brush = Rect::new(-3, 7, 4, 14);
        assert_eq!(brush.intersect(bounds), Rect::new(0, 7, 4, 10));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(5, 5, 8, 8);
        let i = a.intersect(b);
        assert!(i.is_empty());
        assert_eq!(i.width(), 0);
        assert_eq!(i.height(), 0);
    }
}
