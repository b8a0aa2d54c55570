// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image format conversion: PNG/JPEG/WebP in, PNG/JPEG/WebP/ICO out.
//
// A batch converts every input independently; a failed file is recorded and
// the rest carry on. One output is delivered as-is, several are packed into
// a ZIP archive.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, instrument, warn};
use werkbank_core::error::{Result, WerkbankError};
use werkbank_core::types::OutputFormat;

use crate::archive;
use crate::ico::IcoImage;
use crate::image::processor::ImageProcessor;

static CONVERTIBLE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(webp|png|jpe?g)$").expect("extension pattern is valid")
});

/// Options shared by every file in a conversion batch.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Target format.
    pub format: OutputFormat,
    /// JPEG quality (1-100); ignored for other formats.
    pub jpeg_quality: u8,
    /// Canvas edge for ICO output.
    pub icon_size: u32,
}

impl ConvertOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            jpeg_quality: 92,
            icon_size: 256,
        }
    }
}

/// One successfully converted file.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    /// Output file name (original stem plus the new extension).
    pub name: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// A file that could not be converted.
#[derive(Debug)]
pub struct ConversionFailure {
    pub name: String,
    pub error: WerkbankError,
}

/// Outcome of converting several files.
#[derive(Debug, Default)]
pub struct ConversionBatch {
    pub outputs: Vec<ConvertedImage>,
    pub failures: Vec<ConversionFailure>,
}

/// What the caller should write after a batch.
#[derive(Debug, Clone)]
pub enum ConversionDelivery {
    /// Exactly one image: write it under its own name.
    Single(ConvertedImage),
    /// Several images packed into one archive.
    Archive { name: String, bytes: Vec<u8> },
}

impl ConversionBatch {
    /// Package the outputs for delivery.
    ///
    /// Fails with [`WerkbankError::NothingConverted`] when every input failed.
    pub fn into_delivery(self, zip_name: &str) -> Result<ConversionDelivery> {
        let mut outputs = self.outputs;
        match outputs.len() {
            0 => Err(WerkbankError::NothingConverted),
            1 => Ok(ConversionDelivery::Single(outputs.remove(0))),
            count => {
                info!(count, zip_name, "Packing converted images");
                let entries: Vec<(String, Vec<u8>)> =
                    outputs.into_iter().map(|o| (o.name, o.bytes)).collect();
                let bytes = archive::pack_zip(&entries)?;
                Ok(ConversionDelivery::Archive {
                    name: zip_name.to_string(),
                    bytes,
                })
            }
        }
    }
}

/// Output name for a converted file: strip one `.webp`, `.png`, `.jpg` or
/// `.jpeg` suffix (any case) and append the target extension.
pub fn converted_file_name(original: &str, format: OutputFormat) -> String {
    let stem = CONVERTIBLE_EXTENSION.replace(original, "");
    format!("{}.{}", stem, format.extension())
}

/// Re-encode one image into the requested format.
#[instrument(skip(data), fields(data_len = data.len(), format = %options.format))]
pub fn convert_image(data: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Ico => IcoImage::from_bytes(data, options.icon_size)?.build(),
        format => ImageProcessor::from_bytes(data)?.to_format(format, options.jpeg_quality),
    }
}

/// Convert a list of `(name, bytes)` inputs.
#[instrument(skip(inputs), fields(count = inputs.len(), format = %options.format))]
pub fn convert_batch(inputs: &[(String, Vec<u8>)], options: &ConvertOptions) -> ConversionBatch {
    let mut batch = ConversionBatch::default();
    for (name, data) in inputs {
        match convert_image(data, options) {
            Ok(bytes) => batch.outputs.push(ConvertedImage {
                name: converted_file_name(name, options.format),
                bytes,
            }),
            Err(error) => {
                warn!(%name, %error, "Conversion failed");
                batch.failures.push(ConversionFailure {
                    name: name.clone(),
                    error,
                });
            }
        }
    }
    info!(
        converted = batch.outputs.len(),
        failed = batch.failures.len(),
        "Conversion batch finished"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png_fixture() -> Vec<u8> {
        let img = RgbaImage::from_pixel(20, 10, Rgba([200, 100, 50, 255]));
        ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(img))
            .to_png_bytes()
            .unwrap()
    }

    #[test]
    fn output_names() {
        assert_eq!(converted_file_name("cat.png", OutputFormat::Jpeg), "cat.jpg");
        assert_eq!(converted_file_name("Dog.JPEG", OutputFormat::Webp), "Dog.webp");
        assert_eq!(converted_file_name("a.jpg.webp", OutputFormat::Png), "a.jpg.png");
        assert_eq!(converted_file_name("scan.tiff", OutputFormat::Ico), "scan.tiff.ico");
    }

    #[test]
    fn png_to_jpeg() {
        let jpeg = convert_image(&png_fixture(), &ConvertOptions::new(OutputFormat::Jpeg)).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn png_to_ico_uses_icon_canvas() {
        let options = ConvertOptions {
            icon_size: 48,
            ..ConvertOptions::new(OutputFormat::Ico)
        };
        let ico = convert_image(&png_fixture(), &options).unwrap();
        assert_eq!(&ico[0..6], &[0, 0, 1, 0, 1, 0]);
        assert_eq!((ico[6], ico[7]), (48, 48));
    }

    #[test]
    fn batch_keeps_going_after_failure() {
        let inputs = vec![
            ("good.png".to_string(), png_fixture()),
            ("broken.png".to_string(), b"garbage".to_vec()),
        ];
        let batch = convert_batch(&inputs, &ConvertOptions::new(OutputFormat::Webp));
        assert_eq!(batch.outputs.len(), 1);
        assert_eq!(batch.outputs[0].name, "good.webp");
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].name, "broken.png");

        match batch.into_delivery("converted_images.zip").unwrap() {
            ConversionDelivery::Single(image) => assert_eq!(image.name, "good.webp"),
            other => panic!("expected a single file, got {other:?}"),
        }
    }

    #[test]
    fn several_outputs_are_zipped() {
        let inputs = vec![
            ("a.png".to_string(), png_fixture()),
            ("b.png".to_string(), png_fixture()),
        ];
        let batch = convert_batch(&inputs, &ConvertOptions::new(OutputFormat::Png));
        match batch.into_delivery("converted_images.zip").unwrap() {
            ConversionDelivery::Archive { name, bytes } => {
                assert_eq!(name, "converted_images.zip");
                assert_eq!(&bytes[0..4], b"PK\x03\x04");
            }
            other => panic!("expected an archive, got {other:?}"),
        }
    }

    #[test]
    fn all_failures_means_nothing_converted() {
        let inputs = vec![("x.png".to_string(), Vec::new())];
        let batch = convert_batch(&inputs, &ConvertOptions::new(OutputFormat::Png));
        assert!(matches!(
            batch.into_delivery("converted_images.zip"),
            Err(WerkbankError::NothingConverted)
        ));
    }
}
