//! docsift - command-line keyword-in-context extraction
//!
//! # Examples
//!
//! ```bash
//! # Show the sentences around "whale" in every book of a folder
//! docsift search ~/books --keyword whale --count 3
//!
//! # Write context and embedded images to ./out
//! docsift extract moby-dick.epub --keyword whale --images --output ./out
//!
//! # Export images only
//! docsift extract atlas.pdf --no-text --images --output ./maps
//! ```

use clap::Parser;
use docsift::cli::output::print_error;
use docsift::cli::{init_logging, run, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            print_error(&format!("Failed to start async runtime: {e}"));
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run(cli));

    // Readers that timed out may still hold blocking threads
    runtime.shutdown_background();

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
