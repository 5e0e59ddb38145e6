//! PDF reader.
//!
//! Text comes from pdf-extract, one block per page. Embedded images
//! come from lopdf page XObjects.

use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use lopdf::xobject::PdfImage;
use tracing::{debug, warn};

use super::{has_extension, Contents, Document, DocumentReader, EmbeddedImage, ImageFormat};
use crate::core::error::{DocsiftError, Result};

/// Reader for `.pdf` files
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for PdfReader {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supports(&self, path: &Path) -> bool {
        has_extension(path, "pdf")
    }

    fn load(&self, path: &Path, contents: Contents) -> Result<Document> {
        let bytes = std::fs::read(path)
            .map_err(|e| DocsiftError::ReaderFailed(format!("cannot read {path:?}: {e}")))?;

        let blocks = if contents.text {
            extract_pages(&bytes)?
        } else {
            Vec::new()
        };

        let images = if contents.images {
            extract_images(&bytes)
        } else {
            Vec::new()
        };

        debug!(
            "Loaded PDF {:?}: {} page block(s), {} image(s)",
            path,
            blocks.len(),
            images.len()
        );
        Ok(Document::new(path, blocks).with_images(images))
    }
}

/// Extract the text of every page, in page order
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    // pdf-extract panics on some malformed inputs
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| DocsiftError::ReaderFailed("PDF text extraction panicked".to_string()))?
        .map_err(|e| DocsiftError::ReaderFailed(format!("PDF text extraction failed: {e}")))
}

/// Collect every image XObject, page by page
///
/// A document lopdf cannot open yields no images; a single image
/// that cannot be decoded is returned tagged `Unsupported` so the
/// image extractor can count it as skipped.
fn extract_images(bytes: &[u8]) -> Vec<EmbeddedImage> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(d) => d,
        Err(e) => {
            warn!("Failed to load PDF for image extraction: {}", e);
            return Vec::new();
        }
    };

    let mut images = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        match doc.get_page_images(page_id) {
            Ok(page_images) => {
                for pdf_image in page_images {
                    images.push(decode_image(&pdf_image, page_num));
                }
            }
            Err(e) => debug!("Failed to get images from page {}: {}", page_num, e),
        }
    }
    images
}

fn decode_image(pdf_image: &PdfImage, page_num: u32) -> EmbeddedImage {
    let origin = format!("page {page_num}");
    let filters: &[String] = pdf_image.filters.as_deref().unwrap_or(&[]);
    let has = |name: &str| filters.iter().any(|f| f == name);

    let (format, data) = if has("DCTDecode") {
        (ImageFormat::Jpeg, pdf_image.content.to_vec())
    } else if has("JPXDecode") {
        (ImageFormat::Jpeg2000, pdf_image.content.to_vec())
    } else if has("FlateDecode") {
        match flate_to_png(pdf_image) {
            Ok(png) => (ImageFormat::Png, png),
            Err(e) => {
                debug!("Cannot decode FlateDecode image on {}: {}", origin, e);
                (
                    ImageFormat::Unsupported(format!("FlateDecode: {e}")),
                    pdf_image.content.to_vec(),
                )
            }
        }
    } else {
        (
            ImageFormat::Unsupported(format!("filters {filters:?}")),
            pdf_image.content.to_vec(),
        )
    };

    EmbeddedImage {
        format,
        data,
        origin,
    }
}

/// Inflate raw samples and re-encode them as PNG
fn flate_to_png(pdf_image: &PdfImage) -> std::result::Result<Vec<u8>, String> {
    if pdf_image.bits_per_component.is_some_and(|b| b != 8) {
        return Err("only 8 bits per component are supported".to_string());
    }

    let mut samples = Vec::new();
    ZlibDecoder::new(pdf_image.content)
        .read_to_end(&mut samples)
        .map_err(|e| format!("decompression failed: {e}"))?;

    let width = u32::try_from(pdf_image.width).map_err(|_| "invalid width".to_string())?;
    let height = u32::try_from(pdf_image.height).map_err(|_| "invalid height".to_string())?;

    let img = match pdf_image.color_space.as_deref().unwrap_or("DeviceRGB") {
        "DeviceGray" | "Gray" | "CalGray" => image::GrayImage::from_raw(width, height, samples)
            .map(image::DynamicImage::ImageLuma8),
        "DeviceCMYK" | "CMYK" => image::RgbImage::from_raw(width, height, cmyk_to_rgb(&samples))
            .map(image::DynamicImage::ImageRgb8),
        _ => image::RgbImage::from_raw(width, height, samples).map(image::DynamicImage::ImageRgb8),
    }
    .ok_or_else(|| "sample buffer does not match image dimensions".to_string())?;

    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| format!("PNG encoding failed: {e}"))?;
    Ok(png)
}

#[allow(clippy::many_single_char_names)]
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for px in cmyk.chunks_exact(4) {
        let k = 1.0 - f32::from(px[3]) / 255.0;
        for &channel in &px[..3] {
            let value = 255.0 * (1.0 - f32::from(channel) / 255.0) * k;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let byte = value as u8;
            rgb.push(byte);
        }
    }
    rgb
}
