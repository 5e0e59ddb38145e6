//! Embedded image export.
//!
//! Writes the images of a loaded document to the output directory
//! as `<stem>_<seq>.<ext>`, numbering only the images actually
//! written so the sequence has no gaps.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DocsiftError, Result};
use crate::core::reader::{Document, EmbeddedImage, ImageFormat};

/// Outcome of exporting one document's images
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
    pub written: Vec<PathBuf>,
    pub skipped: usize,
}

/// Writes embedded images to disk
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    max_images: usize,
}

impl ImageExtractor {
    pub fn new(max_images: usize) -> Self {
        Self { max_images }
    }

    /// Export every usable image of `document`
    ///
    /// Corrupt or unsupported images are skipped and counted. Failing
    /// to write a file is fatal and returned as `IoFatal`.
    pub fn extract_images(
        &self,
        document: &Document,
        output_dir: &Path,
        stem: &str,
    ) -> Result<ImageReport> {
        let mut report = ImageReport::default();

        for image in &document.images {
            if report.written.len() >= self.max_images {
                tracing::debug!(
                    "Reached image limit ({}) for {:?}",
                    self.max_images,
                    document.path
                );
                report.skipped += 1;
                continue;
            }

            let Some(ext) = check_image(image) else {
                report.skipped += 1;
                continue;
            };

            let target = output_dir.join(format!("{stem}_{}.{ext}", report.written.len() + 1));
            fs::write(&target, &image.data).map_err(|e| DocsiftError::io_fatal(&target, e))?;
            report.written.push(target);
        }

        if report.skipped > 0 {
            tracing::warn!(
                "Skipped {} embedded image(s) in {:?}",
                report.skipped,
                document.path
            );
        }
        Ok(report)
    }
}

/// File extension for a usable image, `None` when it must be skipped
fn check_image(embedded: &EmbeddedImage) -> Option<&'static str> {
    let Some(ext) = embedded.format.extension() else {
        tracing::warn!("Skipping {} image from {}", embedded.format, embedded.origin);
        return None;
    };

    if embedded.data.is_empty() {
        tracing::warn!("Skipping empty image from {}", embedded.origin);
        return None;
    }

    let expected = match embedded.format {
        ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
        ImageFormat::Png => Some(image::ImageFormat::Png),
        ImageFormat::Gif => Some(image::ImageFormat::Gif),
        ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
        ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
        ImageFormat::Webp => Some(image::ImageFormat::WebP),
        // No magic-number check available
        ImageFormat::Jpeg2000 | ImageFormat::Svg | ImageFormat::Unsupported(_) => None,
    };

    if let Some(expected) = expected {
        match image::guess_format(&embedded.data) {
            Ok(found) if found == expected => {}
            Ok(found) => {
                tracing::warn!(
                    "Skipping corrupt image from {}: tagged {} but looks like {:?}",
                    embedded.origin,
                    embedded.format,
                    found
                );
                return None;
            }
            Err(e) => {
                tracing::warn!("Skipping corrupt image from {}: {}", embedded.origin, e);
                return None;
            }
        }
    }

    Some(ext)
}
