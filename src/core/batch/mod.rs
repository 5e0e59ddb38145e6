//! Batch processing.
//!
//! - **inputs**: files and folders -> ordered document list
//! - **output**: output directory preparation and file naming
//! - **runner**: per-document extraction with timeout and pooling

pub mod inputs;
pub mod output;
pub mod runner;

pub use inputs::InputCollector;
pub use output::{assign_stems, OutputDir};
pub use runner::{extract_text, BatchRunner};
