// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decode/scale/encode pipeline, format conversion, and JPEG
// compression.

pub mod compress;
pub mod convert;
pub mod processor;

pub use processor::ImageProcessor;
