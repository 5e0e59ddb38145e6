//! Output directory handling.
//!
//! One `<stem>.txt` per input plus `<stem>_<seq>.<ext>` images. Stems
//! are assigned up front so two inputs of the same run never share
//! an output file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DocsiftError, Result};

const PROBE_FILE: &str = ".docsift-write-probe";

/// A prepared, writable output directory
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    /// Create the directory if needed and check that it is writable
    ///
    /// # Errors
    ///
    /// `IoFatal` when the directory cannot be created or written.
    pub fn prepare(path: &Path) -> Result<Self> {
        fs::create_dir_all(path).map_err(|e| DocsiftError::io_fatal(path, e))?;

        let probe = path.join(PROBE_FILE);
        fs::write(&probe, b"").map_err(|e| DocsiftError::io_fatal(path, e))?;
        if let Err(e) = fs::remove_file(&probe) {
            tracing::debug!("Could not remove write probe {:?}: {}", probe, e);
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `<stem>.txt`, replacing a file left by an earlier run
    pub fn write_text(&self, stem: &str, text: &str) -> Result<PathBuf> {
        let target = self.path.join(format!("{stem}.txt"));
        fs::write(&target, text).map_err(|e| DocsiftError::io_fatal(&target, e))?;
        tracing::debug!("Wrote {:?}", target);
        Ok(target)
    }
}

/// Output stem for every input, in input order
///
/// The stem is the file name without its extension. Later inputs
/// whose stem is already taken get `_2`, `_3` and so on. Comparison
/// ignores case so results stay apart on case-insensitive file
/// systems.
pub fn assign_stems(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken = HashSet::new();

    inputs
        .iter()
        .map(|input| {
            let base = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "document".to_string());

            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.to_lowercase()) {
                stem = format!("{base}_{n}");
                n += 1;
            }
            stem
        })
        .collect()
}
