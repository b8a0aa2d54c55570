// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Werkbank.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Input file kinds recognised by the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Pdf,
    Png,
    Jpeg,
    Webp,
    Gif,
    Bmp,
    Tiff,
    Ico,
    Avif,
}

impl FileKind {
    /// MIME type string, as a browser would report it for a dropped file.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Ico => "image/x-icon",
            Self::Avif => "image/avif",
        }
    }

    /// Infer the file kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "ico" => Some(Self::Ico),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Infer the file kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether this kind is a raster image (`image/*`).
    pub fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }
}

/// Which files a tool accepts from a drop or a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptPolicy {
    /// WebP, PNG and JPEG only (the converter).
    ConvertibleImage,
    /// Any `image/*` type (the compressor).
    AnyImage,
    /// `application/pdf` only (merger and extractor).
    Pdf,
}

impl AcceptPolicy {
    /// Whether a file of the given kind passes this policy.
    pub fn accepts(&self, kind: FileKind) -> bool {
        match self {
            Self::ConvertibleImage => {
                matches!(kind, FileKind::Webp | FileKind::Png | FileKind::Jpeg)
            }
            Self::AnyImage => kind.is_image(),
            Self::Pdf => kind == FileKind::Pdf,
        }
    }
}

/// Target formats offered by the image converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
    Ico,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Ico => "ico",
        }
    }

    /// MIME type of the encoded output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Ico => "image/x-icon",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// How much a compression run saved, bucketed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsTier {
    /// More than half the original size removed.
    Excellent,
    /// More than a fifth removed.
    Moderate,
    /// Little or no saving (or the output grew).
    Poor,
}

impl SavingsTier {
    /// Bucket a savings percentage.
    pub fn from_percent(percent: f64) -> Self {
        if percent > 50.0 {
            Self::Excellent
        } else if percent > 20.0 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for SavingsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Excellent => "excellent",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
        })
    }
}
