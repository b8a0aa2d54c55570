// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File selection: the ordered list of inputs a tool will operate on.
//
// Each tool owns one `FileSelection` with a fixed accept policy. Files that
// fail the policy are skipped rather than reported as errors.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{AcceptPolicy, FileKind};

/// A file accepted into a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Display name (the final path component).
    pub name: String,
    /// Kind inferred from the extension.
    pub kind: FileKind,
}

impl SelectedFile {
    /// Read the whole file into memory.
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Ordered, policy-filtered list of input files.
#[derive(Debug, Clone)]
pub struct FileSelection {
    policy: AcceptPolicy,
    files: Vec<SelectedFile>,
}

impl FileSelection {
    /// Create an empty selection that admits files matching `policy`.
    pub fn new(policy: AcceptPolicy) -> Self {
        Self {
            policy,
            files: Vec::new(),
        }
    }

    /// Add a file. Returns `false` (and leaves the selection unchanged) when
    /// the file's type is not accepted.
    pub fn add(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let Some(kind) = FileKind::from_path(path).filter(|kind| self.policy.accepts(*kind))
        else {
            warn!(path = %path.display(), policy = ?self.policy, "Skipping unsupported file");
            return false;
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(%name, mime = kind.mime_type(), "File selected");
        self.files.push(SelectedFile {
            path: path.to_path_buf(),
            name,
            kind,
        });
        true
    }

    /// Add several files in order; returns how many were accepted.
    pub fn extend<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().filter(|p| self.add(p)).count()
    }

    /// Remove the file at `index`, returning it if the index was valid.
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    /// Drop every selected file.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn first(&self) -> Option<&SelectedFile> {
        self.files.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_selection_filters_other_types() {
        let mut selection = FileSelection::new(AcceptPolicy::Pdf);
        let accepted = selection.extend(["a.pdf", "b.png", "c.PDF", "notes.txt"]);
        assert_eq!(accepted, 2);
        let names: Vec<&str> = selection.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "c.PDF"]);
    }

    #[test]
    fn order_is_preserved_and_remove_shifts() {
        let mut selection = FileSelection::new(AcceptPolicy::ConvertibleImage);
        selection.extend(["one.png", "two.jpg", "three.webp"]);
        let removed = selection.remove(1).unwrap();
        assert_eq!(removed.name, "two.jpg");
        assert_eq!(removed.kind, FileKind::Jpeg);
        let names: Vec<&str> = selection.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["one.png", "three.webp"]);
        assert!(selection.remove(5).is_none());
    }

    #[test]
    fn clear_empties_selection() {
        let mut selection = FileSelection::new(AcceptPolicy::AnyImage);
        assert!(selection.add("x.gif"));
        assert!(!selection.is_empty());
        selection.clear();
        assert_eq!(selection.len(), 0);
        assert!(selection.first().is_none());
    }

    #[test]
    fn read_returns_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.5").unwrap();

        let mut selection = FileSelection::new(AcceptPolicy::Pdf);
        assert!(selection.add(&path));
        assert_eq!(selection.first().unwrap().read().unwrap(), b"%PDF-1.5");
    }
}
