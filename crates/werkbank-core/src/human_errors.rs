// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to a short plain-language message with a
// suggestion. The severity tells the front end whether the user can fix it.

use crate::error::WerkbankError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must change their input (add files, fix the range).
    ActionRequired,
    /// The input itself cannot be processed.
    Permanent,
    /// Environment problem (disk, permissions) that may go away.
    Transient,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown first).
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n  {}", self.message, self.suggestion)
    }
}

/// Convert a `WerkbankError` into a `HumanError`.
pub fn humanize_error(err: &WerkbankError) -> HumanError {
    match err {
        WerkbankError::UnsupportedFile(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Use a PNG, JPEG or WebP image, or a PDF. ({detail})"),
            severity: Severity::Permanent,
        },

        WerkbankError::NoFilesSelected => HumanError {
            message: "Please add files first.".into(),
            suggestion: "Pass one or more files of a supported type.".into(),
            severity: Severity::ActionRequired,
        },

        WerkbankError::NotEnoughFiles { required, found } => HumanError {
            message: if *required == 2 {
                "Please select at least two PDF files.".into()
            } else {
                format!("Please select at least {required} files.")
            },
            suggestion: format!("Only {found} usable file(s) were given."),
            severity: Severity::ActionRequired,
        },

        WerkbankError::IcoBuild(detail) => HumanError {
            message: "The icon could not be created.".into(),
            suggestion: format!("Try a different source image. ({detail})"),
            severity: Severity::Permanent,
        },

        WerkbankError::ImageError(detail) => HumanError {
            message: "Invalid image.".into(),
            suggestion: format!("The file may be damaged or in an unexpected format. ({detail})"),
            severity: Severity::Permanent,
        },

        WerkbankError::NothingConverted => HumanError {
            message: "No images converted.".into(),
            suggestion: "None of the selected images could be read. Check the files and try again."
                .into(),
            severity: Severity::Permanent,
        },

        WerkbankError::PdfError(detail) => HumanError {
            message: "Error reading PDF.".into(),
            suggestion: format!("The PDF may be damaged or password protected. ({detail})"),
            severity: Severity::Permanent,
        },

        WerkbankError::EmptyPageRange => HumanError {
            message: "Please enter the pages to extract.".into(),
            suggestion: "Use page numbers and ranges such as 1-3,5,7.".into(),
            severity: Severity::ActionRequired,
        },

        WerkbankError::InvalidPageRange(detail) => HumanError {
            message: "Invalid page range.".into(),
            suggestion: format!("Pages must lie within the document, e.g. 1-3,5. ({detail})"),
            severity: Severity::ActionRequired,
        },

        WerkbankError::Archive(detail) => HumanError {
            message: "The ZIP archive could not be written.".into(),
            suggestion: format!("Try converting fewer files at once. ({detail})"),
            severity: Severity::Transient,
        },

        WerkbankError::Config(detail) => HumanError {
            message: "The settings file has a problem.".into(),
            suggestion: format!("Fix or delete the config file to restore defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },

        WerkbankError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file could not be found.".into(),
                suggestion: format!("Check the path and try again. ({io_err})"),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied.".into(),
                suggestion: format!("Choose a location you can read and write. ({io_err})"),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "A file operation failed.".into(),
                suggestion: format!("Check free disk space and try again. ({io_err})"),
                severity: Severity::Transient,
            },
        },

        WerkbankError::Serialization(detail) => HumanError {
            message: "Output could not be formatted.".into(),
            suggestion: format!("{detail}"),
            severity: Severity::Permanent,
        },
    }
}
