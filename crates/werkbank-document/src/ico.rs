// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ICO container builder: wraps one PNG image in a single-entry .ico file.
//
// Layout (little-endian):
//
//   offset  size  field
//   0       2     reserved = 0
//   2       2     type = 1 (icon)
//   4       2     image count = 1
//   6       1     width (0 means 256)
//   7       1     height (0 means 256)
//   8       1     color count = 0
//   9       1     reserved = 0
//   10      2     color planes = 1
//   12      2     bits per pixel = 32
//   14      4     image data size
//   18      4     image data offset = 22
//   22      N     PNG bytes

use image::DynamicImage;
use tracing::{debug, instrument};
use werkbank_core::error::{Result, WerkbankError};

use crate::image::processor::ImageProcessor;

/// Size of the ICONDIR header.
pub const ICONDIR_LEN: usize = 6;
/// Size of one ICONDIRENTRY.
pub const ICONDIRENTRY_LEN: usize = 16;
/// Offset of the embedded image data in a single-entry file.
pub const IMAGE_OFFSET: u32 = (ICONDIR_LEN + ICONDIRENTRY_LEN) as u32;

/// Wrap PNG-encoded bytes in a single-image ICO container.
///
/// `width` and `height` are the pixel dimensions of the PNG; values of 256
/// or more are stored as 0, which the format reads as 256. The PNG stream is
/// not inspected.
pub fn build_ico(png: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if png.is_empty() {
        return Err(WerkbankError::IcoBuild("image data is empty".into()));
    }
    let data_len = u32::try_from(png.len()).map_err(|_| {
        WerkbankError::IcoBuild(format!("image data too large: {} bytes", png.len()))
    })?;

    let mut out = Vec::with_capacity(IMAGE_OFFSET as usize + png.len());

    // ICONDIR
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());

    // ICONDIRENTRY
    out.push(dimension_byte(width));
    out.push(dimension_byte(height));
    out.push(0);
    out.push(0);
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(&IMAGE_OFFSET.to_le_bytes());

    out.extend_from_slice(png);
    Ok(out)
}

fn dimension_byte(value: u32) -> u8 {
    if value >= 256 { 0 } else { value as u8 }
}

/// A PNG image ready to be packed into an ICO file.
#[derive(Debug, Clone)]
pub struct IcoImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl IcoImage {
    /// Composite `image` onto a transparent `size` x `size` canvas (scaled to
    /// fit, centred) and encode the canvas as PNG.
    #[instrument(skip(image), fields(src_w = image.width(), src_h = image.height()))]
    pub fn from_image(image: DynamicImage, size: u32) -> Result<Self> {
        let canvas = ImageProcessor::from_dynamic(image).fit_square(size);
        let png = canvas.to_png_bytes()?;
        debug!(size, png_len = png.len(), "Icon canvas encoded");
        Ok(Self {
            png,
            width: canvas.width(),
            height: canvas.height(),
        })
    }

    /// Decode `data` and composite it as in [`IcoImage::from_image`].
    pub fn from_bytes(data: &[u8], size: u32) -> Result<Self> {
        let image = ImageProcessor::from_bytes(data)?.into_dynamic();
        Self::from_image(image, size)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Produce the ICO file bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        build_ico(&self.png, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

    #[test]
    fn header_and_entry_layout() {
        let ico = build_ico(FAKE_PNG, 48, 32).unwrap();
        assert_eq!(&ico[0..6], &[0, 0, 1, 0, 1, 0]);
        assert_eq!(ico[6], 48);
        assert_eq!(ico[7], 32);
        assert_eq!(ico[8], 0);
        assert_eq!(ico[9], 0);
        assert_eq!(&ico[10..12], &[1, 0]);
        assert_eq!(&ico[12..14], &[32, 0]);
        assert_eq!(
            u32::from_le_bytes(ico[14..18].try_into().unwrap()),
            FAKE_PNG.len() as u32
        );
        assert_eq!(u32::from_le_bytes(ico[18..22].try_into().unwrap()), 22);
    }

    #[test]
    fn payload_is_appended_verbatim() {
        let png: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let ico = build_ico(&png, 255, 1).unwrap();
        assert_eq!(ico.len(), 22 + png.len());
        assert_eq!(&ico[22..], png.as_slice());
    }

    #[test]
    fn dimensions_of_256_or_more_store_zero() {
        let ico = build_ico(FAKE_PNG, 256, 256).unwrap();
        assert_eq!((ico[6], ico[7]), (0, 0));

        let ico = build_ico(FAKE_PNG, 1024, 16).unwrap();
        assert_eq!((ico[6], ico[7]), (0, 16));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(build_ico(&[], 16, 16), Err(WerkbankError::IcoBuild(_))));
    }

    #[test]
    fn wide_image_is_centred_on_square_canvas() {
        let source = RgbaImage::from_pixel(400, 200, Rgba([255, 0, 0, 255]));
        let icon = IcoImage::from_image(DynamicImage::ImageRgba8(source), 256).unwrap();
        assert_eq!((icon.width(), icon.height()), (256, 256));

        let canvas = image::load_from_memory_with_format(icon.png(), ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        // 400x200 scales to 256x128, leaving 64 transparent rows above and below.
        assert_eq!(canvas.get_pixel(128, 10)[3], 0);
        assert_eq!(canvas.get_pixel(128, 245)[3], 0);
        let centre = canvas.get_pixel(128, 128);
        assert_eq!(centre[3], 255);
        assert!(centre[0] > 250 && centre[1] < 5);
    }

    #[test]
    fn built_icon_decodes_as_ico() {
        let source = RgbaImage::from_pixel(32, 32, Rgba([0, 128, 255, 255]));
        let ico = IcoImage::from_image(DynamicImage::ImageRgba8(source), 64)
            .unwrap()
            .build()
            .unwrap();
        let decoded = image::load_from_memory_with_format(&ico, ImageFormat::Ico).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }
}
