//! Search command - show keyword context without writing files

use crate::cli::commands::WindowArgs;
use crate::cli::output::{colors, print_output};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::{Direction, DocumentOutcome, ExtractionRequest, OutcomeStatus};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// PDF/EPUB files or folders containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Keyword to search for (case-insensitive)
    #[arg(long, short = 'k')]
    pub keyword: String,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub keyword: String,
    pub count: usize,
    pub direction: Direction,
    pub results: Vec<DocumentOutcome>,
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = args
        .window
        .apply(ExtractionRequest::builder(), &services.config)
        .keyword(args.keyword.clone())
        .build()?;

    let inputs = services
        .create_collector(args.window.recursive_override())?
        .collect(&args.inputs)?;

    let results = services.runner.search(&inputs, &request).await?;

    let output = SearchOutput {
        keyword: args.keyword,
        count: request.count(),
        direction: request.direction(),
        results,
    };

    print_output(&output, format, print_results)?;
    Ok(())
}

fn print_results(output: &SearchOutput) {
    for outcome in &output.results {
        println!(
            "{}",
            colors::label(&format!("RESULT FOR {}:", outcome.display_name()))
        );
        println!("{}", result_text(outcome, &output.keyword));
        println!();
    }
}

/// Body printed under a document's header
pub fn result_text(outcome: &DocumentOutcome, keyword: &str) -> String {
    match (&outcome.status, &outcome.result.text) {
        (OutcomeStatus::Completed, Some(text)) => text.clone(),
        (OutcomeStatus::Completed, None) | (OutcomeStatus::NoMatchFound, _) => {
            format!("No match found for '{keyword}'")
        }
        (OutcomeStatus::EmptyDocument { .. }, _) => "No extractable text".to_string(),
        (OutcomeStatus::TimedOut { after_secs }, _) => {
            format!("Gave up after {after_secs}s")
        }
    }
}
