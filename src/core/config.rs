//! Configuration management for docsift.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with defaults for all settings. Command
//! line flags override whatever is loaded here.

use crate::core::error::{DocsiftError, Result};
use crate::core::types::Direction;
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Local config file checked when no XDG config exists
const LOCAL_CONFIG_FILE: &str = "docsift.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Defaults for extraction requests
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Sentences per context window
    #[serde(default = "default_count")]
    pub default_count: usize,

    #[serde(default)]
    pub default_direction: Direction,

    /// Extract every match; false keeps only the first one
    #[serde(default = "default_all_matches")]
    pub all_matches: bool,
}

/// Input folder expansion
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// File name patterns picked from folders (glob syntax)
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Descend into subfolders
    #[serde(default)]
    pub recursive: bool,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Images written per document before the rest are skipped
    #[serde(default = "default_max_images")]
    pub max_images_per_document: usize,
}

/// Limits configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Per-document processing timeout in seconds
    #[serde(default = "default_document_timeout")]
    pub document_timeout_sec: u64,

    /// Documents processed at the same time
    #[serde(default = "default_max_concurrent_documents")]
    pub max_concurrent_documents: usize,
}

// Default value functions
fn default_count() -> usize {
    5
}

fn default_all_matches() -> bool {
    true
}

fn default_include_patterns() -> Vec<String> {
    vec!["*.pdf".to_string(), "*.epub".to_string()]
}

fn default_max_file_size() -> usize {
    200
}

fn default_max_images() -> usize {
    500
}

fn default_document_timeout() -> u64 {
    120
}

fn default_max_concurrent_documents() -> usize {
    1
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            default_direction: Direction::default(),
            all_matches: default_all_matches(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            include_patterns: default_include_patterns(),
            recursive: false,
            max_file_size_mb: default_max_file_size(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_images_per_document: default_max_images(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            document_timeout_sec: default_document_timeout(),
            max_concurrent_documents: default_max_concurrent_documents(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DocsiftError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. DOCSIFT_CONFIG env var
    /// 2. XDG config file (~/.config/docsift/config.toml)
    /// 3. ./docsift.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = match Self::config_source(xdg) {
            Some(path) => {
                tracing::debug!("Reading configuration from {:?}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// The file `load_with_xdg` reads, if any
    pub fn config_source(xdg: &XdgDirs) -> Option<PathBuf> {
        if let Ok(config_path) = env::var("DOCSIFT_CONFIG") {
            return Some(PathBuf::from(config_path));
        }

        let xdg_config = xdg.config_file();
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Merge configuration with environment variables
    ///
    /// Values that fail to parse are ignored.
    pub fn merge_env(&mut self) {
        // Extraction configuration
        if let Ok(count) = env::var("DOCSIFT_DEFAULT_COUNT") {
            if let Ok(n) = count.parse() {
                self.extraction.default_count = n;
            }
        }
        if let Ok(direction) = env::var("DOCSIFT_DIRECTION") {
            if let Ok(d) = direction.parse() {
                self.extraction.default_direction = d;
            }
        }
        if let Ok(all) = env::var("DOCSIFT_ALL_MATCHES") {
            if let Ok(b) = all.parse() {
                self.extraction.all_matches = b;
            }
        }

        // Input configuration
        if let Ok(recursive) = env::var("DOCSIFT_RECURSIVE") {
            if let Ok(b) = recursive.parse() {
                self.input.recursive = b;
            }
        }
        if let Ok(max_size) = env::var("DOCSIFT_MAX_FILE_SIZE_MB") {
            if let Ok(size) = max_size.parse() {
                self.input.max_file_size_mb = size;
            }
        }

        // Images configuration
        if let Ok(max_images) = env::var("DOCSIFT_MAX_IMAGES") {
            if let Ok(n) = max_images.parse() {
                self.images.max_images_per_document = n;
            }
        }

        // Limits configuration
        if let Ok(timeout) = env::var("DOCSIFT_DOCUMENT_TIMEOUT_SEC") {
            if let Ok(t) = timeout.parse() {
                self.limits.document_timeout_sec = t;
            }
        }
        if let Ok(max_concurrent) = env::var("DOCSIFT_MAX_CONCURRENT_DOCUMENTS") {
            if let Ok(max) = max_concurrent.parse() {
                self.limits.max_concurrent_documents = max;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.extraction.default_count == 0 {
            return Err(DocsiftError::ConfigError(
                "Default count must be non-zero".to_string(),
            ));
        }

        if self.input.include_patterns.is_empty() {
            return Err(DocsiftError::ConfigError(
                "At least one include pattern is required".to_string(),
            ));
        }

        if self.input.max_file_size_mb == 0 {
            return Err(DocsiftError::ConfigError(
                "Max file size must be non-zero".to_string(),
            ));
        }

        if self.images.max_images_per_document == 0 {
            return Err(DocsiftError::ConfigError(
                "Max images per document must be non-zero".to_string(),
            ));
        }

        if self.limits.document_timeout_sec == 0 {
            return Err(DocsiftError::ConfigError(
                "Document timeout must be non-zero".to_string(),
            ));
        }

        if self.limits.max_concurrent_documents == 0 {
            return Err(DocsiftError::ConfigError(
                "Max concurrent documents must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Default count: {}", self.extraction.default_count);
        tracing::info!(
            "  Default direction: {}",
            self.extraction.default_direction
        );
        tracing::info!("  All matches: {}", self.extraction.all_matches);
        tracing::info!("  Include patterns: {:?}", self.input.include_patterns);
        tracing::info!("  Recursive: {}", self.input.recursive);
        tracing::info!("  Max file size: {} MB", self.input.max_file_size_mb);
        tracing::info!(
            "  Max images per document: {}",
            self.images.max_images_per_document
        );
        tracing::info!(
            "  Document timeout: {}s",
            self.limits.document_timeout_sec
        );
        tracing::info!(
            "  Max concurrent documents: {}",
            self.limits.max_concurrent_documents
        );
    }
}
