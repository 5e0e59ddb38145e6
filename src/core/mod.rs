//! Core domain logic (front-end agnostic)
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **reader**: PDF and EPUB document readers
//! - **text**: Sentence linearization and keyword context windows
//! - **images**: Embedded image export
//! - **batch**: Input collection and the batch runner
//! - **services**: Unified service container

pub mod batch;
pub mod config;
pub mod error;
pub mod images;
pub mod reader;
pub mod services;
pub mod text;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{DocsiftError, Result};
pub use services::Services;
