use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};

use crate::error::{Error, Result};
use crate::geom::Rect;
use crate::raster::RasterImage;
use crate::settings::Settings;

/// supported source formats; output is written in the same family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    /// lossy: a resumed canvas scores close to, not exactly, what was saved
    Jpeg,
    /// indexed: quantized to the configured palette size
    Gif,
}

impl ImageKind {
    pub fn from_format(format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Png => Ok(ImageKind::Png),
            ImageFormat::Jpeg => Ok(ImageKind::Jpeg),
            ImageFormat::Gif => Ok(ImageKind::Gif),
            other => Err(Error::UnsupportedFormat(format!("{other:?}"))),
        }
    }
}

/// `out_<file name>` in the working directory
pub fn output_path_for(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    PathBuf::from(format!("out_{name}"))
}

/// sniff the format from the bytes and decode to rgba8
pub fn decode(path: &Path, bytes: &[u8]) -> Result<(RasterImage, ImageKind)> {
    profiling::scope!("decode");
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    let format = reader
        .format()
        .ok_or_else(|| Error::UnsupportedFormat(format!("unrecognised data in {}", path.display())))?;
    let kind = ImageKind::from_format(format)?;

    let img = reader
        .decode()
        .map_err(|source| Error::Decode { path: path.to_path_buf(), source })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((RasterImage::from_raw(width, height, rgba.into_raw())?, kind))
}

/// read and decode the image to approximate. every failure here is fatal.
pub fn load_target(path: &Path) -> Result<(RasterImage, ImageKind)> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    let (img, kind) = decode(path, &bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::EmptyImage);
    }
    Ok((img, kind))
}

/// previous output to continue from, or a blank canvas when there is none
/// usable. a missing, corrupt or wrong-sized resume file is expected and
/// never fatal.
pub fn load_resume(path: &Path, bounds: Rect) -> RasterImage {
    let blank = || RasterImage::blank(bounds.width(), bounds.height());

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::info!("no previous output at {} ({e}), starting blank", path.display());
            return blank();
        }
    };
    match decode(path, &bytes) {
        Ok((img, _)) if img.bounds() == bounds => {
            log::info!("resuming from {}", path.display());
            img
        }
        Ok((img, _)) => {
            log::warn!(
                "{} is {}x{}, expected {}x{}; starting blank",
                path.display(),
                img.width(),
                img.height(),
                bounds.width(),
                bounds.height()
            );
            blank()
        }
        Err(e) => {
            log::warn!("ignoring previous output: {e}; starting blank");
            blank()
        }
    }
}

/// encode the canvas in the given format family
pub fn encode(kind: ImageKind, canvas: &RasterImage, settings: &Settings) -> Result<Vec<u8>> {
    profiling::scope!("encode");
    let (w, h) = (canvas.width(), canvas.height());
    let mut out = Vec::new();

    match kind {
        ImageKind::Png => {
            PngEncoder::new(&mut out)
                .write_image(canvas.as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(Error::Encode)?;
        }
        ImageKind::Jpeg => {
            // jpeg has no alpha channel
            let rgb = DynamicImage::ImageRgba8(canvas.clone().into_rgba_image()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, settings.jpeg_quality)
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(Error::Encode)?;
        }
        ImageKind::Gif => {
            let pix = quantize(canvas.as_raw(), settings.palette_size);
            let mut encoder = GifEncoder::new(&mut out);
            encoder
                .encode(&pix, w, h, ExtendedColorType::Rgba8)
                .map_err(Error::Encode)?;
        }
    }
    Ok(out)
}

/// snap every pixel to a palette of at most `colors` entries. the gif encoder
/// builds its own 256-color palette, so smaller palettes are applied here.
fn quantize(rgba: &[u8], colors: u16) -> Vec<u8> {
    profiling::scope!("quantize");
    let mut pix = rgba.to_vec();
    if colors >= 256 || pix.is_empty() {
        return pix;
    }
    let nq = color_quant::NeuQuant::new(10, colors as usize, &pix);
    for px in pix.chunks_exact_mut(4) {
        nq.map_pixel(px);
    }
    pix
}

/// overwrite `path` with `bytes`
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|source| Error::Write { path: path.to_path_buf(), source })
}
