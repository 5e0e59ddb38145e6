//! EPUB reader.
//!
//! An EPUB is a ZIP container. `META-INF/container.xml` points at
//! the OPF package document, whose spine gives the reading order of
//! the XHTML content documents and whose manifest lists the images.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use tracing::{debug, warn};
use zip::ZipArchive;

use super::{has_extension, Contents, Document, DocumentReader, EmbeddedImage, ImageFormat};
use crate::core::error::{DocsiftError, Result};

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Elements whose text is never part of the reading flow
const SKIPPED_ELEMENTS: &[&[u8]] = &[b"head", b"script", b"style"];

/// Elements that break the text flow
const BLOCK_ELEMENTS: &[&[u8]] = &[
    b"p", b"div", b"br", b"hr", b"li", b"ul", b"ol", b"tr", b"td", b"th", b"table", b"h1",
    b"h2", b"h3", b"h4", b"h5", b"h6", b"section", b"article", b"blockquote", b"pre",
    b"figure", b"figcaption", b"aside", b"body",
];

/// Reader for `.epub` files
#[derive(Debug, Clone, Copy, Default)]
pub struct EpubReader;

impl EpubReader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for EpubReader {
    fn name(&self) -> &str {
        "epub"
    }

    fn supports(&self, path: &Path) -> bool {
        has_extension(path, "epub")
    }

    fn load(&self, path: &Path, contents: Contents) -> Result<Document> {
        let file = File::open(path)
            .map_err(|e| DocsiftError::ReaderFailed(format!("cannot open {path:?}: {e}")))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| DocsiftError::ReaderFailed(format!("invalid EPUB container: {e}")))?;

        let opf_path = rootfile_path(&mut archive)?;
        let package = Package::parse(&read_entry_string(&mut archive, &opf_path)?)?;
        let base = parent_dir(&opf_path);

        let mut blocks = Vec::new();
        if contents.text {
            for idref in &package.spine {
                let Some(item) = package.manifest.get(idref) else {
                    warn!("Spine references unknown manifest item '{}'", idref);
                    continue;
                };
                let entry = resolve_href(base, &item.href);
                match read_entry_string(&mut archive, &entry) {
                    Ok(markup) => blocks.push(xhtml_to_text(&markup)),
                    Err(e) => warn!("Skipping spine item {}: {}", entry, e),
                }
            }
        }

        let mut images = Vec::new();
        if contents.images {
            for item in package.images() {
                let entry = resolve_href(base, &item.href);
                match read_entry(&mut archive, &entry) {
                    Ok(data) => images.push(EmbeddedImage {
                        format: ImageFormat::from_mime(&item.media_type),
                        data,
                        origin: entry,
                    }),
                    Err(e) => warn!("Skipping image {}: {}", entry, e),
                }
            }
        }

        debug!(
            "Loaded EPUB {:?}: {} spine block(s), {} image(s)",
            path,
            blocks.len(),
            images.len()
        );
        Ok(Document::new(path, blocks).with_images(images))
    }
}

/// Manifest entry of the OPF package
#[derive(Debug, Clone, PartialEq, Eq)]
struct ManifestItem {
    href: String,
    media_type: String,
}

/// The parts of the OPF package document we need
#[derive(Debug, Default)]
struct Package {
    manifest: HashMap<String, ManifestItem>,
    /// Manifest ids in declaration order
    manifest_order: Vec<String>,
    /// Manifest ids in reading order
    spine: Vec<String>,
}

impl Package {
    fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut package = Package::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"item" => {
                            let (Some(id), Some(href)) = (attr(e, "id"), attr(e, "href")) else {
                                continue;
                            };
                            let media_type = attr(e, "media-type").unwrap_or_default();
                            package.manifest_order.push(id.clone());
                            package.manifest.insert(id, ManifestItem { href, media_type });
                        }
                        b"itemref" => {
                            if let Some(idref) = attr(e, "idref") {
                                package.spine.push(idref);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocsiftError::ReaderFailed(format!(
                        "OPF parsing error at {}: {e}",
                        reader.buffer_position()
                    )))
                }
                _ => {}
            }
        }

        if package.spine.is_empty() {
            return Err(DocsiftError::ReaderFailed(
                "OPF package has an empty spine".to_string(),
            ));
        }
        Ok(package)
    }

    /// Image items in manifest order
    fn images(&self) -> impl Iterator<Item = &ManifestItem> {
        self.manifest_order
            .iter()
            .filter_map(|id| self.manifest.get(id))
            .filter(|item| item.media_type.starts_with("image/"))
    }
}

/// Locate the OPF package through `META-INF/container.xml`
fn rootfile_path(archive: &mut ZipArchive<File>) -> Result<String> {
    let xml = read_entry_string(archive, CONTAINER_PATH)?;
    let mut reader = Reader::from_str(&xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"rootfile" =>
            {
                if let Some(path) = attr(e, "full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocsiftError::ReaderFailed(format!(
                    "container.xml parsing error: {e}"
                )))
            }
            _ => {}
        }
    }

    Err(DocsiftError::ReaderFailed(
        "container.xml has no rootfile".to_string(),
    ))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| DocsiftError::ReaderFailed(format!("missing archive entry '{name}'")))?;

    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .map_err(|e| DocsiftError::ReaderFailed(format!("cannot read '{name}': {e}")))?;
    Ok(content)
}

fn read_entry_string(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let bytes = read_entry(archive, name)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Value of an attribute, matched on its local name
fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
}

/// Directory part of an archive path, without trailing slash
fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Resolve a manifest href against the OPF directory
fn resolve_href(base: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let decoded = urlencoding::decode_binary(href.as_bytes());
    let href = String::from_utf8_lossy(&decoded);

    let mut parts: Vec<&str> = if base.is_empty() {
        Vec::new()
    } else {
        base.split('/').collect()
    };
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Plain text of an XHTML content document
///
/// Block elements become line breaks, `head`/`script`/`style`
/// content is dropped. Malformed markup ends extraction early and
/// keeps what was read so far.
pub fn xhtml_to_text(markup: &str) -> String {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;

    let mut text = String::new();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                if SKIPPED_ELEMENTS.contains(&name.as_ref()) {
                    skip_depth += 1;
                } else if BLOCK_ELEMENTS.contains(&name.as_ref()) {
                    text.push('\n');
                }
            }
            Ok(Event::Empty(ref e)) => {
                if BLOCK_ELEMENTS.contains(&e.local_name().as_ref()) {
                    text.push('\n');
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                if SKIPPED_ELEMENTS.contains(&name.as_ref()) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if BLOCK_ELEMENTS.contains(&name.as_ref()) {
                    text.push('\n');
                }
            }
            Ok(Event::Text(ref e)) if skip_depth == 0 => text.push_str(&decode_text(e)),
            Ok(Event::CData(ref e)) if skip_depth == 0 => {
                text.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("Malformed XHTML, keeping text read so far: {}", e);
                break;
            }
            _ => {}
        }
    }
    text
}

/// Unescape text, resolving the HTML entities common in EPUBs
fn decode_text(e: &BytesText<'_>) -> String {
    match e.unescape_with(html_entity) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(e).into_owned(),
    }
}

fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{a0}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "copy" => "\u{a9}",
        _ => return quick_xml::escape::resolve_predefined_entity(name),
    })
}
