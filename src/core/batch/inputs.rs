//! Input selection.
//!
//! Expands the paths given on the command line into the ordered list
//! of documents a batch processes. A file is taken as-is; a folder
//! contributes the files inside it that match the include patterns.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{DocsiftError, Result};

/// Expands files and folders into a sorted document list
pub struct InputCollector {
    /// Patterns a file name must match (e.g., "*.pdf")
    include_patterns: Vec<Pattern>,

    /// Descend into subfolders
    recursive: bool,

    /// Maximum file size in bytes (skip larger files)
    max_file_size_bytes: u64,
}

impl InputCollector {
    /// Create a collector
    ///
    /// # Arguments
    ///
    /// * `include_patterns` - Glob patterns for files picked from folders
    /// * `recursive` - Whether folders are walked recursively
    /// * `max_file_size_mb` - Maximum file size in megabytes
    pub fn new(
        include_patterns: Vec<String>,
        recursive: bool,
        max_file_size_mb: usize,
    ) -> Result<Self> {
        let include = include_patterns
            .into_iter()
            .map(|p| {
                Pattern::new(&p).map_err(|e| {
                    DocsiftError::ConfigError(format!("Invalid include pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            include_patterns: include,
            recursive,
            max_file_size_bytes: (max_file_size_mb as u64).saturating_mul(1024 * 1024),
        })
    }

    /// Resolve every input into document paths
    ///
    /// Explicit files are kept even when they do not match the
    /// include patterns; the reader decides whether it can open
    /// them. Folder contents are sorted, and the overall order
    /// follows the order of `inputs`.
    ///
    /// # Errors
    ///
    /// `Validation` when an input does not exist or nothing was
    /// selected at all.
    pub fn collect(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                let found = self.collect_folder(input);
                tracing::info!("Found {} document(s) in {:?}", found.len(), input);
                files.extend(found);
            } else if input.is_file() {
                files.push(input.clone());
            } else {
                return Err(DocsiftError::Validation(format!(
                    "input not found: {}",
                    input.display()
                )));
            }
        }

        if files.is_empty() {
            return Err(DocsiftError::Validation("no input selected".to_string()));
        }

        Ok(files)
    }

    /// Matching files of one folder, sorted by path
    fn collect_folder(&self, root: &Path) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|e| should_process_entry(e, root))
        {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();

                    if !self.matches_patterns(path) {
                        continue;
                    }

                    if let Ok(metadata) = entry.metadata() {
                        if metadata.len() > self.max_file_size_bytes {
                            tracing::warn!(
                                "Skipping large file: {:?} ({} bytes)",
                                path,
                                metadata.len()
                            );
                            continue;
                        }
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        files.sort();
        files
    }

    /// Case-insensitive match of the file name against the patterns
    fn matches_patterns(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
            return false;
        };

        let options = glob::MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };

        self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|p| p.matches_with(name, options))
    }
}

/// Skip hidden directories below the root
fn should_process_entry(entry: &DirEntry, root: &Path) -> bool {
    let path = entry.path();
    if path == root {
        return true;
    }

    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => !(name.starts_with('.') && entry.file_type().is_dir()),
        None => true,
    }
}
