// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Loads settings once and runs each tool against the
// files held in an `AppState`, writing results to disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument, warn};
use werkbank_core::error::{Result, WerkbankError};
use werkbank_core::types::{OutputFormat, SavingsTier};
use werkbank_core::WerkbankConfig;
use werkbank_document::image::compress::compressed_file_name;
use werkbank_document::pdf::{PageSet, parse_page_range_report};
use werkbank_document::{
    CompressionReport, ConversionDelivery, ConvertOptions, PdfReader, compress_image,
    convert_batch, merge_documents,
};

use crate::state::{AppState, ToolStage};

/// Settings plus the file they came from.
#[derive(Debug, Clone)]
pub struct AppServices {
    config: WerkbankConfig,
    config_path: PathBuf,
}

/// Result of a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// Written file: a single image or the ZIP archive.
    pub path: PathBuf,
    pub converted: usize,
    /// Names of the inputs that could not be converted.
    pub failed: Vec<String>,
}

/// One compressed file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct CompressedOutput {
    pub source: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: CompressionReport,
    pub savings: String,
    pub tier: SavingsTier,
}

/// Result of a page extraction.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub path: PathBuf,
    pub pages: PageSet,
    /// Tokens of the expression that selected nothing.
    pub rejected: Vec<String>,
}

impl AppServices {
    /// Load settings from `config_path`. A missing file means defaults.
    pub fn init(config_path: PathBuf) -> Result<Self> {
        info!(path = %config_path.display(), "initialising app services");
        let config = WerkbankConfig::load(&config_path)?;
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Services over explicit settings, not backed by any file.
    pub fn with_config(config: WerkbankConfig, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &WerkbankConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write the default settings to the config path. Refuses to replace an
    /// existing file unless `force` is set.
    pub fn init_config(&mut self, force: bool) -> Result<&Path> {
        if self.config_path.exists() && !force {
            return Err(WerkbankError::Config(format!(
                "{} already exists (use --force to overwrite)",
                self.config_path.display()
            )));
        }
        self.config = WerkbankConfig::default();
        self.config.save(&self.config_path)?;
        Ok(&self.config_path)
    }

    // -- Image tools ---------------------------------------------------------

    /// Convert every selected image to `format` and write the result into
    /// `out_dir`: the image itself when one succeeded, a ZIP archive
    /// otherwise.
    #[instrument(skip(self, state), fields(files = state.selection.len()))]
    pub fn convert(
        &self,
        state: &mut AppState,
        format: OutputFormat,
        out_dir: &Path,
    ) -> Result<ConvertOutcome> {
        let inputs = read_selection(state)?;
        state.set_status(ToolStage::Working, format!("Converting {} file(s)", inputs.len()));

        let options = ConvertOptions {
            format,
            jpeg_quality: state.config.jpeg_quality,
            icon_size: state.config.icon_size,
        };
        let batch = convert_batch(&inputs, &options);
        let failed: Vec<String> = batch.failures.iter().map(|f| f.name.clone()).collect();
        let converted = batch.outputs.len();

        let path = match batch.into_delivery(&state.config.zip_name)? {
            ConversionDelivery::Single(image) => {
                write_output(&out_dir.join(&image.name), &image.bytes)?
            }
            ConversionDelivery::Archive { name, bytes } => {
                write_output(&out_dir.join(name), &bytes)?
            }
        };

        let stage = if failed.is_empty() {
            ToolStage::Complete
        } else {
            ToolStage::Partial
        };
        state.set_status(
            stage,
            format!("Converted {converted} image(s) to {}", format.mime_type()),
        );
        Ok(ConvertOutcome {
            path,
            converted,
            failed,
        })
    }

    /// Compress every selected image to JPEG, one output per input.
    ///
    /// `quality` overrides the configured default. Files that fail are
    /// skipped; the run fails only when nothing could be compressed.
    #[instrument(skip(self, state), fields(files = state.selection.len()))]
    pub fn compress(
        &self,
        state: &mut AppState,
        quality: Option<u8>,
        out_dir: &Path,
    ) -> Result<Vec<CompressedOutput>> {
        let inputs = read_selection(state)?;
        let quality = quality.unwrap_or(state.config.compress_quality);
        state.set_status(
            ToolStage::Working,
            format!("Compressing {} file(s) at {quality}%", inputs.len()),
        );

        let mut outputs = Vec::with_capacity(inputs.len());
        let mut failures = 0;
        for (name, data) in &inputs {
            let report = match compress_image(
                data,
                quality,
                state.config.compress_max_width,
                state.config.compress_max_height,
            ) {
                Ok(report) => report,
                Err(e) => {
                    warn!(%name, error = %e, "Compression failed");
                    failures += 1;
                    continue;
                }
            };
            let path = write_output(&out_dir.join(compressed_file_name(name)), &report.bytes)?;
            outputs.push(CompressedOutput {
                source: name.clone(),
                path,
                savings: report.savings_label(),
                tier: report.tier(),
                report,
            });
        }

        if outputs.is_empty() {
            return Err(WerkbankError::NothingConverted);
        }
        let stage = if failures == 0 {
            ToolStage::Complete
        } else {
            ToolStage::Partial
        };
        state.set_status(stage, format!("Compressed {} image(s)", outputs.len()));
        Ok(outputs)
    }

    // -- PDF tools -----------------------------------------------------------

    /// Merge the selected PDFs in selection order.
    #[instrument(skip(self, state), fields(files = state.selection.len()))]
    pub fn merge(&self, state: &mut AppState, output: Option<PathBuf>) -> Result<PathBuf> {
        if state.selection.len() < 2 {
            return Err(WerkbankError::NotEnoughFiles {
                required: 2,
                found: state.selection.len(),
            });
        }
        let inputs = read_selection(state)?;
        state.set_status(ToolStage::Working, format!("Merging {} PDFs", inputs.len()));

        let slices: Vec<&[u8]> = inputs.iter().map(|(_, data)| data.as_slice()).collect();
        let merged = merge_documents(&slices)?;

        let target = output.unwrap_or_else(|| PathBuf::from(&state.config.merged_name));
        let path = write_output(&target, &merged)?;
        state.set_status(ToolStage::Complete, format!("Merged into {}", path.display()));
        Ok(path)
    }

    /// Copy the pages named by `expr` from the first selected PDF into a new
    /// document.
    #[instrument(skip(self, state))]
    pub fn extract(
        &self,
        state: &mut AppState,
        expr: &str,
        output: Option<PathBuf>,
    ) -> Result<ExtractOutcome> {
        let Some((path, name)) = state
            .selection
            .first()
            .map(|file| (file.path.clone(), file.name.clone()))
        else {
            return Err(WerkbankError::NoFilesSelected);
        };
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(WerkbankError::EmptyPageRange);
        }

        let reader = PdfReader::open(&path)?;
        let report = parse_page_range_report(expr, reader.page_count());
        for token in &report.rejected {
            warn!(%token, max_page = reader.page_count(), "Ignoring page range token");
        }
        if report.pages.is_empty() {
            return Err(WerkbankError::InvalidPageRange(expr.to_string()));
        }

        state.set_status(
            ToolStage::Working,
            format!("Extracting {} page(s) from {}", report.pages.len(), name),
        );
        let bytes = reader.extract_pages(&report.pages)?;
        let target = output.unwrap_or_else(|| PathBuf::from(&state.config.extracted_name));
        let path = write_output(&target, &bytes)?;
        state.set_status(ToolStage::Complete, format!("Extracted to {}", path.display()));

        Ok(ExtractOutcome {
            path,
            pages: report.pages,
            rejected: report.rejected,
        })
    }
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> Result<u32> {
    Ok(PdfReader::open(path)?.page_count())
}

// -- Helpers -----------------------------------------------------------------

fn read_selection(state: &AppState) -> Result<Vec<(String, Vec<u8>)>> {
    if state.selection.is_empty() {
        return Err(WerkbankError::NoFilesSelected);
    }
    state
        .selection
        .iter()
        .map(|file| Ok((file.name.clone(), file.read()?)))
        .collect()
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), size = bytes.len(), "Output written");
    Ok(path.to_path_buf())
}
