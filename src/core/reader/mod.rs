//! Document readers.
//!
//! Convert a document file into ordered raw text blocks and the
//! byte streams of its embedded images. Two formats are supported:
//!
//! - **pdf**: page-oriented binary documents (pdf-extract + lopdf)
//! - **epub**: markup-flow documents (zip + quick-xml)
//!
//! [`ReaderRegistry`] picks a reader by file extension and is what
//! the rest of the crate talks to.

pub mod epub;
pub mod pdf;

pub use epub::EpubReader;
pub use pdf::PdfReader;

use crate::core::error::{DocsiftError, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which parts of a document a caller needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contents {
    pub text: bool,
    pub images: bool,
}

impl Contents {
    pub const ALL: Contents = Contents {
        text: true,
        images: true,
    };
    pub const TEXT: Contents = Contents {
        text: true,
        images: false,
    };
}

/// Format tag of an embedded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Webp,
    Jpeg2000,
    Svg,
    /// Encoding the reader could not turn into a file format
    Unsupported(String),
}

impl ImageFormat {
    /// Map a MIME type such as `image/png`
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
            "image/png" => ImageFormat::Png,
            "image/gif" => ImageFormat::Gif,
            "image/bmp" => ImageFormat::Bmp,
            "image/tiff" => ImageFormat::Tiff,
            "image/webp" => ImageFormat::Webp,
            "image/jp2" | "image/jpx" => ImageFormat::Jpeg2000,
            "image/svg+xml" => ImageFormat::Svg,
            other => ImageFormat::Unsupported(other.to_string()),
        }
    }

    /// File extension used when the image is written out
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ImageFormat::Jpeg => Some("jpg"),
            ImageFormat::Png => Some("png"),
            ImageFormat::Gif => Some("gif"),
            ImageFormat::Bmp => Some("bmp"),
            ImageFormat::Tiff => Some("tiff"),
            ImageFormat::Webp => Some("webp"),
            ImageFormat::Jpeg2000 => Some("jp2"),
            ImageFormat::Svg => Some("svg"),
            ImageFormat::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Unsupported(what) => write!(f, "unsupported ({what})"),
            other => write!(f, "{}", other.extension().unwrap_or("bin")),
        }
    }
}

/// Raw bytes of one embedded image
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,

    /// Where the image came from (page number, archive entry)
    pub origin: String,
}

/// A loaded document; immutable for the rest of the run
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub path: PathBuf,

    /// Raw text blocks (pages or sections) in reading order
    pub blocks: Vec<String>,

    /// Embedded images in document order
    pub images: Vec<EmbeddedImage>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, blocks: Vec<String>) -> Self {
        Self {
            path: path.into(),
            blocks,
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<EmbeddedImage>) -> Self {
        self.images = images;
        self
    }

    /// True when no block carries any non-whitespace text
    pub fn is_blank(&self) -> bool {
        self.blocks.iter().all(|b| b.trim().is_empty())
    }
}

/// A reader for one or more document formats
pub trait DocumentReader: Send + Sync {
    /// Short format name for logs
    fn name(&self) -> &str;

    /// Whether this reader handles the given file
    fn supports(&self, path: &Path) -> bool;

    /// Load the requested contents of `path`
    fn load(&self, path: &Path, contents: Contents) -> Result<Document>;
}

/// Case-insensitive extension check
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Dispatches to the first registered reader that supports a file
pub struct ReaderRegistry {
    readers: Vec<Arc<dyn DocumentReader>>,
}

impl ReaderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Registry with the PDF and EPUB readers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PdfReader::new());
        registry.register(EpubReader::new());
        registry
    }

    pub fn register<R: DocumentReader + 'static>(&mut self, reader: R) {
        self.readers.push(Arc::new(reader));
    }

    pub fn reader_for(&self, path: &Path) -> Option<Arc<dyn DocumentReader>> {
        self.readers.iter().find(|r| r.supports(path)).cloned()
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DocumentReader for ReaderRegistry {
    fn name(&self) -> &str {
        "registry"
    }

    fn supports(&self, path: &Path) -> bool {
        self.reader_for(path).is_some()
    }

    fn load(&self, path: &Path, contents: Contents) -> Result<Document> {
        let reader = self
            .reader_for(path)
            .ok_or_else(|| DocsiftError::UnsupportedFormat(path.display().to_string()))?;

        tracing::debug!("Reading {:?} with {} reader", path, reader.name());
        reader.load(path, contents)
    }
}
