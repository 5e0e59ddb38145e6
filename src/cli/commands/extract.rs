//! Extract command - write keyword context and images to a folder

use crate::cli::commands::WindowArgs;
use crate::cli::output::{colors, format_duration, print_output, print_warning, status_label};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::{BatchReport, DocumentOutcome, ExtractionRequest, OutcomeStatus};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// PDF/EPUB files or folders containing them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Folder receiving `<name>.txt` and `<name>_<n>.<ext>` files
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Keyword to search for (required unless --no-text)
    #[arg(long, short = 'k')]
    pub keyword: Option<String>,

    /// Do not extract text
    #[arg(long)]
    pub no_text: bool,

    /// Export embedded images
    #[arg(long, short = 'i')]
    pub images: bool,

    #[command(flatten)]
    pub window: WindowArgs,
}

/// Execute the extract command
pub async fn execute(
    args: ExtractArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    // Everything is validated before the first document is opened
    let request = args
        .window
        .apply(ExtractionRequest::builder(), &services.config)
        .maybe_keyword(args.keyword)
        .want_text(!args.no_text)
        .want_images(args.images)
        .build()?;

    let inputs = services
        .create_collector(args.window.recursive_override())?
        .collect(&args.inputs)?;

    if format == OutputFormat::Human {
        eprintln!(
            "Extracting from {} document(s) into {}...",
            colors::number(&inputs.len().to_string()),
            colors::file_path(&args.output.display().to_string())
        );
    }

    let report = services.runner.run(&inputs, &request, &args.output).await?;

    print_output(&report, format, print_report)?;
    Ok(())
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        println!("  {} {}", status_label(&outcome.status), describe(outcome));
    }

    println!();
    println!(
        "{} {} document(s) in {}: {} ok, {} no match, {} unreadable, {} timed out, {} image(s)",
        colors::success("Extraction complete:"),
        report.documents,
        format_duration(report.duration_ms as f64 / 1000.0),
        report.completed,
        report.no_match,
        report.empty,
        report.timed_out,
        colors::number(&report.images_written.to_string()),
    );

    if report.images_skipped > 0 {
        print_warning(&format!(
            "{} embedded image(s) skipped as corrupt or unsupported",
            report.images_skipped
        ));
    }
}

/// One-line description of an outcome, without its status
fn describe(outcome: &DocumentOutcome) -> String {
    let mut line = outcome.display_name();

    if let Some(file) = outcome.text_file.as_ref().and_then(|f| f.file_name()) {
        line.push_str(&format!(" -> {}", file.to_string_lossy()));
    }

    let mut details = Vec::new();
    if outcome.result.matches > 0 {
        details.push(format!("{} match(es)", outcome.result.matches));
    }
    if outcome.result.images_written > 0 {
        details.push(format!("{} image(s)", outcome.result.images_written));
    }
    match &outcome.status {
        OutcomeStatus::EmptyDocument { reason } => details.push(reason.clone()),
        OutcomeStatus::TimedOut { after_secs } => details.push(format!("after {after_secs}s")),
        OutcomeStatus::Completed | OutcomeStatus::NoMatchFound => {}
    }

    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    line
}
