//! Argument parsing and completions

use clap::Parser;
use docsift::cli::{Cli, Commands, OutputFormat};
use docsift::core::types::Direction;

#[test]
fn test_parse_extract_arguments() {
    let cli = Cli::try_parse_from([
        "docsift",
        "extract",
        "a.pdf",
        "books/",
        "--output",
        "out",
        "--keyword",
        "whale",
        "--count",
        "3",
        "--direction",
        "backward",
        "--images",
        "--first-only",
    ])
    .unwrap();

    let Commands::Extract(args) = cli.command else {
        panic!("expected extract");
    };
    assert_eq!(args.inputs.len(), 2);
    assert_eq!(args.keyword.as_deref(), Some("whale"));
    assert_eq!(args.window.count, Some(3));
    assert_eq!(args.window.direction, Some(Direction::Backward));
    assert!(args.images);
    assert!(!args.no_text);
    assert!(args.window.first_only);
    assert_eq!(cli.format, OutputFormat::Human);
}

#[test]
fn test_extract_requires_output() {
    assert!(Cli::try_parse_from(["docsift", "extract", "a.pdf", "-k", "dog"]).is_err());
}

#[test]
fn test_search_requires_input_and_keyword() {
    assert!(Cli::try_parse_from(["docsift", "search", "-k", "dog"]).is_err());
    assert!(Cli::try_parse_from(["docsift", "search", "a.pdf"]).is_err());
}

#[test]
fn test_invalid_direction_rejected() {
    let result = Cli::try_parse_from([
        "docsift", "search", "a.pdf", "-k", "dog", "--direction", "both",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_completions_parse() {
    let cli = Cli::try_parse_from(["docsift", "completions", "zsh"]).unwrap();
    assert!(matches!(cli.command, Commands::Completions(_)));
}
