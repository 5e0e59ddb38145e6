//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a
//! specific CLI command.

pub mod completions;
pub mod config;
pub mod extract;
pub mod search;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use extract::ExtractArgs;
pub use search::SearchArgs;

use clap::Args;

use crate::core::config::Config;
use crate::core::types::{Direction, ExtractionRequestBuilder};

/// Window and input options shared by `extract` and `search`
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Sentences per context window [default: config, 5]
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Direction the window grows from the match (forward, backward)
    #[arg(long, short = 'd')]
    pub direction: Option<Direction>,

    /// Keep only the first match of each document
    #[arg(long)]
    pub first_only: bool,

    /// Walk folders recursively
    #[arg(long, short = 'r')]
    pub recursive: bool,
}

impl WindowArgs {
    /// Fill window settings, falling back to the configuration
    pub fn apply(&self, builder: ExtractionRequestBuilder, config: &Config) -> ExtractionRequestBuilder {
        builder
            .count(self.count.unwrap_or(config.extraction.default_count))
            .direction(self.direction.unwrap_or(config.extraction.default_direction))
            .first_only(self.first_only || !config.extraction.all_matches)
    }

    /// Recursion override for the input collector
    pub fn recursive_override(&self) -> Option<bool> {
        self.recursive.then_some(true)
    }
}
