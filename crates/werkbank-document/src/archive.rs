// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ZIP packaging for multi-file results, using the `zip` crate.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::{debug, instrument};
use werkbank_core::error::{Result, WerkbankError};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Pack `(name, bytes)` entries into an in-memory, deflate-compressed ZIP.
///
/// Entry order is preserved. Repeated names get a `-2`, `-3`, ... suffix
/// before the extension so no entry is lost.
#[instrument(skip(entries), fields(count = entries.len()))]
pub fn pack_zip(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut used = HashSet::new();

        for (name, bytes) in entries {
            let entry_name = unique_name(name, &mut used);
            zip.start_file(entry_name.as_str(), options).map_err(|err| {
                WerkbankError::Archive(format!("failed to add {}: {}", entry_name, err))
            })?;
            zip.write_all(bytes).map_err(|err| {
                WerkbankError::Archive(format!("failed to write {}: {}", entry_name, err))
            })?;
            debug!(entry = %entry_name, len = bytes.len(), "ZIP entry written");
        }

        zip.finish()
            .map_err(|err| WerkbankError::Archive(format!("failed to finalise ZIP: {}", err)))?;
    }
    Ok(buffer)
}

/// First unused variant of `name`, recording it in `used`.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
