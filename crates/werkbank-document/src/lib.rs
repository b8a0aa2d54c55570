// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// werkbank-document: Document processing for Werkbank.
//
// Provides image conversion (PNG/JPEG/WebP/ICO) and compression, the
// single-image ICO container writer, PDF page extraction and merging with
// page range parsing, and ZIP packaging of multi-file results.

pub mod archive;
pub mod ico;
pub mod image;
pub mod pdf;

// Re-export the primary items so callers can use `werkbank_document::PdfReader` etc.
pub use archive::pack_zip;
pub use ico::{IcoImage, build_ico};
pub use crate::image::compress::{CompressionReport, compress_image, format_file_size};
pub use crate::image::convert::{ConversionBatch, ConversionDelivery, ConvertOptions, convert_batch};
pub use crate::image::processor::ImageProcessor;
pub use pdf::pages::{PageSet, parse_page_range};
pub use pdf::reader::{PdfReader, merge_documents};
