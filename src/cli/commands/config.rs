//! Config command - show current configuration

use crate::cli::output::{print_header, print_output};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show where configuration is looked up
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    /// File the configuration was read from, if any
    pub config_file: Option<String>,
    pub config_dir: String,
    #[serde(flatten)]
    pub config: Config,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let xdg = XdgDirs::new();

    let response = ConfigResponse {
        config_file: Config::config_source(&xdg).map(|p| p.to_string_lossy().into_owned()),
        config_dir: xdg.config_dir.to_string_lossy().into_owned(),
        config: services.config.as_ref().clone(),
    };

    print_output(&response, format, |r| print_config(r, args.all))?;
    Ok(())
}

fn print_config(response: &ConfigResponse, all: bool) {
    let config = &response.config;

    print_header("Configuration:");
    println!(
        "  source: {}",
        response.config_file.as_deref().unwrap_or("(defaults)")
    );
    if all {
        println!("  config_dir: {}", response.config_dir);
    }
    println!("  extraction:");
    println!("    default_count: {}", config.extraction.default_count);
    println!(
        "    default_direction: {}",
        config.extraction.default_direction
    );
    println!("    all_matches: {}", config.extraction.all_matches);
    println!("  input:");
    println!("    include_patterns: {:?}", config.input.include_patterns);
    println!("    recursive: {}", config.input.recursive);
    println!("    max_file_size_mb: {}", config.input.max_file_size_mb);
    println!("  images:");
    println!(
        "    max_images_per_document: {}",
        config.images.max_images_per_document
    );
    println!("  limits:");
    println!(
        "    document_timeout_sec: {}",
        config.limits.document_timeout_sec
    );
    println!(
        "    max_concurrent_documents: {}",
        config.limits.max_concurrent_documents
    );
}
