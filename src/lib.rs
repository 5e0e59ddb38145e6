//! docsift - keyword-in-context extraction for PDF and EPUB
//!
//! Finds a keyword in each document of a batch and extracts the
//! sentences around every occurrence, optionally exporting the
//! embedded images alongside.
//!
//! # Architecture
//!
//! - **core**: Domain logic (front-end agnostic)
//!   - config, error, types, xdg
//!   - reader (PDF, EPUB)
//!   - text (linearizer, context windows)
//!   - images, batch (runner, input collection)
//!   - services (unified service container)
//!
//! - **cli**: Command line front-end (depends on core)

pub mod cli;
pub mod core;

// Re-export commonly used types for convenience
pub use core::batch::BatchRunner;
pub use core::config::Config;
pub use core::error::{DocsiftError, Result};
pub use core::reader::{DocumentReader, ReaderRegistry};
pub use core::services::Services;
pub use core::text::{render_windows, ContextWindowExtractor, TextLinearizer};
pub use core::types::*;
