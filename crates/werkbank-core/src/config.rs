// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, WerkbankError};

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WerkbankConfig {
    /// JPEG quality (1-100) used by the converter.
    pub jpeg_quality: u8,
    /// Default JPEG quality (1-100) used by the compressor.
    pub compress_quality: u8,
    /// Compressed images are scaled down to fit this width.
    pub compress_max_width: u32,
    /// Compressed images are scaled down to fit this height.
    pub compress_max_height: u32,
    /// Edge length of the square canvas used for ICO output.
    pub icon_size: u32,
    /// Archive name used when the converter produces several files.
    pub zip_name: String,
    /// Default output name for merged PDFs.
    pub merged_name: String,
    /// Default output name for extracted pages.
    pub extracted_name: String,
}

impl Default for WerkbankConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 92,
            compress_quality: 80,
            compress_max_width: 1920,
            compress_max_height: 1080,
            icon_size: 256,
            zip_name: "converted_images.zip".into(),
            merged_name: "merged.pdf".into(),
            extracted_name: "extracted.pdf".into(),
        }
    }
}

impl WerkbankConfig {
    /// Load settings from a JSON file.
    ///
    /// A missing file yields the defaults; a file that exists but cannot be
    /// parsed is an error so that typos are not silently ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            WerkbankError::Config(format!("failed to parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Write settings as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Reject values the tools cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(WerkbankError::Config(format!(
                "jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            )));
        }
        if !(1..=100).contains(&self.compress_quality) {
            return Err(WerkbankError::Config(format!(
                "compress_quality must be 1-100, got {}",
                self.compress_quality
            )));
        }
        if self.compress_max_width == 0 || self.compress_max_height == 0 {
            return Err(WerkbankError::Config(
                "compression bounds must be non-zero".into(),
            ));
        }
        if self.icon_size == 0 || self.icon_size > 256 {
            return Err(WerkbankError::Config(format!(
                "icon_size must be 1-256, got {}",
                self.icon_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tool_behaviour() {
        let config = WerkbankConfig::default();
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.compress_max_width, 1920);
        assert_eq!(config.compress_max_height, 1080);
        assert_eq!(config.icon_size, 256);
        assert_eq!(config.zip_name, "converted_images.zip");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WerkbankConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, WerkbankConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = WerkbankConfig {
            compress_quality: 55,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(WerkbankConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "merged_name": "all.pdf" }"#).unwrap();
        let config = WerkbankConfig::load(&path).unwrap();
        assert_eq!(config.merged_name, "all.pdf");
        assert_eq!(config.jpeg_quality, 92);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            WerkbankConfig::load(&path),
            Err(WerkbankError::Config(_))
        ));
    }

    #[test]
    fn out_of_range_quality_rejected() {
        let config = WerkbankConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
