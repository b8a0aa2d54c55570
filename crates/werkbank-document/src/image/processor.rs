// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, scale-to-fit, square icon canvas, and encoding
// to PNG, JPEG and WebP. Operates on in-memory images using the `image`
// crate.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use werkbank_core::error::WerkbankError;
use werkbank_core::types::OutputFormat;

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain:
///
/// ```no_run
/// use werkbank_document::ImageProcessor;
///
/// fn shrink(data: &[u8]) -> werkbank_core::error::Result<Vec<u8>> {
///     ImageProcessor::from_bytes(data)?
///         .fit_within(1920, 1080)
///         .to_jpeg_bytes(80)
/// }
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, WebP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, WerkbankError> {
        let img = image::load_from_memory(data)
            .map_err(|err| WerkbankError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Scale down to fit within `max_width` x `max_height`, preserving aspect
    /// ratio. Images already inside the box are returned untouched.
    ///
    /// Width is clamped first, then height, each step rescaling the other
    /// side proportionally; fractional results are truncated.
    #[instrument(skip(self), fields(max_width, max_height))]
    pub fn fit_within(self, max_width: u32, max_height: u32) -> Self {
        let (width, height) = fit_dimensions(self.width(), self.height(), max_width, max_height);
        if (width, height) == (self.width(), self.height()) {
            return self;
        }
        info!(
            from_w = self.width(),
            from_h = self.height(),
            width,
            height,
            "Scaling image down"
        );
        Self {
            image: self.image.resize_exact(width, height, FilterType::Lanczos3),
        }
    }

    /// Scale to fit a transparent `size` x `size` canvas and centre it there.
    ///
    /// Smaller images are scaled up; the shorter side is padded with fully
    /// transparent pixels.
    #[instrument(skip(self), fields(size))]
    pub fn fit_square(self, size: u32) -> Self {
        let size = size.max(1);
        let (src_w, src_h) = (self.width().max(1), self.height().max(1));
        let scale = (size as f64 / src_w as f64).min(size as f64 / src_h as f64);
        let draw_w = ((src_w as f64 * scale).round() as u32).clamp(1, size);
        let draw_h = ((src_h as f64 * scale).round() as u32).clamp(1, size);

        let scaled = self
            .image
            .resize_exact(draw_w, draw_h, FilterType::Lanczos3)
            .to_rgba8();

        let mut canvas = RgbaImage::new(size, size);
        let x = i64::from((size - draw_w) / 2);
        let y = i64::from((size - draw_h) / 2);
        image::imageops::overlay(&mut canvas, &scaled, x, y);

        debug!(draw_w, draw_h, x, y, "Image placed on square canvas");
        Self {
            image: DynamicImage::ImageRgba8(canvas),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, WerkbankError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as lossless WebP bytes.
    pub fn to_webp_bytes(&self) -> Result<Vec<u8>, WerkbankError> {
        // The WebP encoder only takes 8-bit RGB(A).
        let rgba = DynamicImage::ImageRgba8(self.image.to_rgba8());
        encode_to_format(&rgba, ImageFormat::WebP)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG has no alpha channel, so the image is flattened onto black first:
    /// fully transparent pixels come out black whatever colour they hide.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, WerkbankError> {
        let quality = quality.clamp(1, 100);
        let mut buffer = Vec::new();
        let rgb = if self.image.color().has_alpha() {
            flatten_onto_black(&self.image.to_rgba8())
        } else {
            self.image.to_rgb8()
        };
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| WerkbankError::ImageError(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode into a raster output format. ICO output is not a plain
    /// re-encode and is handled by [`crate::ico::IcoImage`].
    pub fn to_format(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>, WerkbankError> {
        match format {
            OutputFormat::Png => self.to_png_bytes(),
            OutputFormat::Jpeg => self.to_jpeg_bytes(quality),
            OutputFormat::Webp => self.to_webp_bytes(),
            OutputFormat::Ico => Err(WerkbankError::ImageError(
                "ICO output requires the icon pipeline".into(),
            )),
        }
    }

}

/// Dimensions after fitting `width` x `height` inside the given box.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width as f64, height as f64);
    if w > max_width as f64 {
        h = h * max_width as f64 / w;
        w = max_width as f64;
    }
    if h > max_height as f64 {
        w = w * max_height as f64 / h;
        h = max_height as f64;
    }
    ((w as u32).max(1), (h as u32).max(1))
}

/// Composite straight-alpha RGBA over an opaque black background.
fn flatten_onto_black(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, WerkbankError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| WerkbankError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32) -> ImageProcessor {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([10, 200, 30]),
        )))
    }

    #[test]
    fn fit_dimensions_clamps_width_then_height() {
        assert_eq!(fit_dimensions(3840, 2160, 1920, 1080), (1920, 1080));
        assert_eq!(fit_dimensions(4000, 1000, 1920, 1080), (1920, 480));
        assert_eq!(fit_dimensions(1000, 4000, 1920, 1080), (270, 1080));
        assert_eq!(fit_dimensions(800, 600, 1920, 1080), (800, 600));
    }

    #[test]
    fn fit_dimensions_never_returns_zero() {
        assert_eq!(fit_dimensions(10_000, 1, 100, 100), (100, 1));
    }

    #[test]
    fn fit_within_leaves_small_images_alone() {
        let processor = solid(64, 48).fit_within(1920, 1080);
        assert_eq!((processor.width(), processor.height()), (64, 48));
    }

    #[test]
    fn fit_within_downscales_large_images() {
        let processor = solid(400, 100).fit_within(200, 200);
        assert_eq!((processor.width(), processor.height()), (200, 50));
    }

    #[test]
    fn fit_square_pads_tall_image() {
        let processor = solid(50, 100).fit_square(64);
        assert_eq!((processor.width(), processor.height()), (64, 64));
        let rgba = processor.as_dynamic().to_rgba8();
        assert_eq!(rgba.get_pixel(0, 32)[3], 0);
        assert_eq!(rgba.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn encoders_produce_decodable_output() {
        let processor = solid(16, 16);
        let png = processor.to_png_bytes().unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);

        let jpeg = processor.to_jpeg_bytes(90).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);

        let webp = processor.to_format(OutputFormat::Webp, 90).unwrap();
        assert_eq!(image::guess_format(&webp).unwrap(), ImageFormat::WebP);
        let decoded = ImageProcessor::from_bytes(&webp).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn jpeg_turns_transparent_pixels_black() {
        // Left half: invisible red. Right half: opaque white.
        let rgba = RgbaImage::from_fn(32, 16, |x, _| {
            if x < 16 {
                Rgba([255, 0, 0, 0])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let jpeg = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(rgba))
            .to_jpeg_bytes(95)
            .unwrap();

        let decoded = ImageProcessor::from_bytes(&jpeg).unwrap().into_dynamic().to_rgb8();
        let hidden = decoded.get_pixel(4, 8);
        assert!(hidden.0.iter().all(|&c| c < 16), "got {hidden:?}");
        let opaque = decoded.get_pixel(28, 8);
        assert!(opaque.0.iter().all(|&c| c > 240), "got {opaque:?}");
    }

    #[test]
    fn half_transparent_pixels_are_darkened() {
        let flat = flatten_onto_black(&RgbaImage::from_pixel(1, 1, Rgba([200, 100, 0, 128])));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([100, 50, 0]));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"definitely not an image"),
            Err(WerkbankError::ImageError(_))
        ));
    }
}
