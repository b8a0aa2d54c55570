// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application state for one tool run: settings, selected files, progress.

use tracing::info;
use werkbank_core::types::AcceptPolicy;
use werkbank_core::{FileSelection, WerkbankConfig};

/// Progress stages of a tool run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    /// Nothing started yet.
    Idle,
    /// Reading inputs and producing output.
    Working,
    /// Output written.
    Complete,
    /// Some inputs failed but output was still produced.
    Partial,
}

/// State handed by reference to every tool service.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Effective settings.
    pub config: WerkbankConfig,
    /// Files the current tool will operate on.
    pub selection: FileSelection,
    /// Current stage.
    pub stage: ToolStage,
    /// Last status message for user feedback.
    pub status_message: Option<String>,
}

impl AppState {
    /// Fresh state for a tool that admits files matching `policy`.
    pub fn new(config: WerkbankConfig, policy: AcceptPolicy) -> Self {
        Self {
            config,
            selection: FileSelection::new(policy),
            stage: ToolStage::Idle,
            status_message: None,
        }
    }

    /// Move to `stage` and record a status message.
    pub fn set_status(&mut self, stage: ToolStage, message: impl Into<String>) {
        let message = message.into();
        info!(?stage, "{message}");
        self.stage = stage;
        self.status_message = Some(message);
    }
}
