// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Werkbank: Core types, errors, configuration and file selection shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod selection;
pub mod types;

pub use config::WerkbankConfig;
pub use error::WerkbankError;
pub use selection::{FileSelection, SelectedFile};
pub use types::*;
