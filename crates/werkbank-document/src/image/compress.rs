// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image compression: scale into a bounding box and re-encode as JPEG,
// reporting how much space was saved.

use serde::Serialize;
use tracing::{info, instrument};
use werkbank_core::error::Result;
use werkbank_core::types::SavingsTier;

use crate::image::processor::ImageProcessor;

/// Result of compressing one image.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionReport {
    /// Compressed JPEG bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Input size in bytes.
    pub original_size: u64,
    /// Output size in bytes.
    pub compressed_size: u64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl CompressionReport {
    /// Percentage of the original size removed. Negative when the output grew.
    pub fn savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (self.original_size as f64 - self.compressed_size as f64) / self.original_size as f64
            * 100.0
    }

    /// Savings formatted with one decimal, e.g. `"63.4%"`.
    pub fn savings_label(&self) -> String {
        format!("{:.1}%", self.savings_percent())
    }

    pub fn tier(&self) -> SavingsTier {
        SavingsTier::from_percent(self.savings_percent())
    }
}

/// Decode `data`, scale it into `max_width` x `max_height`, and encode it
/// as JPEG at `quality` percent.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn compress_image(
    data: &[u8],
    quality: u8,
    max_width: u32,
    max_height: u32,
) -> Result<CompressionReport> {
    let processor = ImageProcessor::from_bytes(data)?.fit_within(max_width, max_height);
    let bytes = processor.to_jpeg_bytes(quality)?;

    let report = CompressionReport {
        original_size: data.len() as u64,
        compressed_size: bytes.len() as u64,
        width: processor.width(),
        height: processor.height(),
        bytes,
    };
    info!(
        original = report.original_size,
        compressed = report.compressed_size,
        savings = %report.savings_label(),
        "Image compressed"
    );
    Ok(report)
}

/// Output name for a compressed file: drop the last extension and append
/// `_compressed.jpg`.
pub fn compressed_file_name(original: &str) -> String {
    let stem = match original.rfind('.') {
        Some(dot) if dot > 0 => &original[..dot],
        _ => original,
    };
    format!("{stem}_compressed.jpg")
}

/// Human-readable size in binary units: `"0 Bytes"`, `"512 Bytes"`,
/// `"1.5 KB"`, `"2.25 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
