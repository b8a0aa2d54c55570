// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Werkbank.

use thiserror::Error;

/// Top-level error type for all Werkbank operations.
#[derive(Debug, Error)]
pub enum WerkbankError {
    // -- Input selection --
    #[error("unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("no files selected")]
    NoFilesSelected,

    #[error("at least {required} files are required, got {found}")]
    NotEnoughFiles { required: usize, found: usize },

    // -- Image / icon errors --
    #[error("ICO build failed: {0}")]
    IcoBuild(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("no images were converted")]
    NothingConverted,

    // -- PDF errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("no pages given")]
    EmptyPageRange,

    #[error("invalid page range: {0}")]
    InvalidPageRange(String),

    // -- Packaging --
    #[error("archive error: {0}")]
    Archive(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WerkbankError>;
