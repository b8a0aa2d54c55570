// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: page range parsing, page extraction, and merging.

pub mod pages;
pub mod reader;

pub use pages::{PageRangeReport, PageSet, parse_page_range, parse_page_range_report};
pub use reader::{PdfReader, merge_documents};
