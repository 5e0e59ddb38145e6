//! Unified service container for docsift
//!
//! Provides shared access to all core services. Front-ends receive
//! the container instead of locating services themselves.

use crate::core::batch::{BatchRunner, InputCollector};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::reader::{DocumentReader, ReaderRegistry};
use std::sync::Arc;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Document reader (PDF and EPUB by default)
    pub reader: Arc<dyn DocumentReader>,

    /// Batch runner built on `reader`
    pub runner: Arc<BatchRunner>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration with the default readers
    pub fn new(config: Config) -> Self {
        Self::with_reader(config, Arc::new(ReaderRegistry::with_defaults()))
    }

    /// Create services around a specific document reader
    pub fn with_reader(config: Config, reader: Arc<dyn DocumentReader>) -> Self {
        let runner = Arc::new(BatchRunner::new(Arc::clone(&reader), &config));

        Self {
            reader,
            runner,
            config: Arc::new(config),
        }
    }

    /// Create an InputCollector from the configured input settings
    ///
    /// `recursive` overrides the configured value when set.
    pub fn create_collector(&self, recursive: Option<bool>) -> Result<InputCollector> {
        InputCollector::new(
            self.config.input.include_patterns.clone(),
            recursive.unwrap_or(self.config.input.recursive),
            self.config.input.max_file_size_mb,
        )
    }
}
