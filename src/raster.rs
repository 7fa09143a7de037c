use image::RgbaImage;

use crate::error::{Error, Result};
use crate::geom::Rect;

/// one pixel as interleaved r, g, b, a bytes
pub type Rgba = [u8; 4];

/// row-major rgba8 pixel buffer with its origin at the top-left.
/// invariant: pix.len() == width * height * 4
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pix: Vec<u8>,
}

impl RasterImage {
    /// fully transparent black image
    pub fn blank(width: u32, height: u32) -> Self {
        profiling::scope!("RasterImage::blank");
        Self {
            width,
            height,
            pix: vec![0u8; width as usize * height as usize * 4],
        }
    }

    pub fn from_raw(width: u32, height: u32, pix: Vec<u8>) -> Result<Self> {
        if pix.len() != width as usize * height as usize * 4 {
            return Err(Error::BufferSize { width, height, len: pix.len() });
        }
        Ok(Self { width, height, pix })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.pix
    }

    /// iterate pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.pix.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    // byte offset of (x, y). out-of-range access is a caller bug, so panic.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * 4
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        let i = self.offset(x, y);
        [self.pix[i], self.pix[i + 1], self.pix[i + 2], self.pix[i + 3]]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, px: Rgba) {
        let i = self.offset(x, y);
        self.pix[i..i + 4].copy_from_slice(&px);
    }

    /// independent copy of the pixels inside `rect`, clipped to our bounds.
    /// a rect entirely outside yields a 0x0 image.
    pub fn subimage(&self, rect: Rect) -> RasterImage {
        profiling::scope!("RasterImage::subimage");
        let clip = rect.intersect(self.bounds());
        let (w, h) = (clip.width(), clip.height());
        let mut pix = Vec::with_capacity(w as usize * h as usize * 4);

        let stride = self.width as usize * 4;
        let x0 = clip.min_x as usize * 4;
        let x1 = clip.max_x as usize * 4;
        for y in clip.min_y..clip.max_y {
            let row = y as usize * stride;
            pix.extend_from_slice(&self.pix[row + x0..row + x1]);
        }

        RasterImage { width: w, height: h, pix }
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        // length invariant makes this infallible
        RgbaImage::from_raw(self.width, self.height, self.pix)
            .unwrap_or_else(|| unreachable!("raster buffer length invariant broken"))
    }
}
