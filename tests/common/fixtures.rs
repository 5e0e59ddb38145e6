// Test fixtures: an in-memory document reader, EPUB archives and PDF files

use docsift::core::error::{DocsiftError, Result};
use docsift::core::reader::{Contents, Document, DocumentReader, EmbeddedImage, ImageFormat};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, Stream};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Five-sentence story split over two pages
#[allow(dead_code)]
pub const STORY: &[&str] = &["The cat sat. It was happy.", "The dog barked. It ran fast. The end."];

/// Smallest byte strings the image extractor accepts as PNG / JPEG
#[allow(dead_code)]
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
#[allow(dead_code)]
pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

/// Canned content for one file name
#[derive(Debug, Clone, Default)]
pub struct FakeDoc {
    pub blocks: Vec<String>,
    pub images: Vec<EmbeddedImage>,
    pub delay: Option<Duration>,
    pub corrupt: bool,
}

#[allow(dead_code)]
impl FakeDoc {
    pub fn text(blocks: &[&str]) -> Self {
        Self {
            blocks: blocks.iter().map(|b| b.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn corrupt() -> Self {
        Self {
            corrupt: true,
            ..Default::default()
        }
    }

    pub fn with_image(mut self, format: ImageFormat, data: &[u8]) -> Self {
        let origin = format!("fake image {}", self.images.len() + 1);
        self.images.push(EmbeddedImage {
            format,
            data: data.to_vec(),
            origin,
        });
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Document reader serving `FakeDoc`s by file name
///
/// Unknown files fail like a corrupt document would.
#[derive(Debug, Default)]
pub struct FakeReader {
    docs: HashMap<String, FakeDoc>,
}

#[allow(dead_code)]
impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, doc: FakeDoc) -> Self {
        self.docs.insert(name.to_string(), doc);
        self
    }
}

impl DocumentReader for FakeReader {
    fn name(&self) -> &str {
        "fake"
    }

    fn supports(&self, _path: &Path) -> bool {
        true
    }

    fn load(&self, path: &Path, contents: Contents) -> Result<Document> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let doc = self
            .docs
            .get(&name)
            .ok_or_else(|| DocsiftError::ReaderFailed(format!("no fake document {name}")))?;

        if let Some(delay) = doc.delay {
            std::thread::sleep(delay);
        }
        if doc.corrupt {
            return Err(DocsiftError::ReaderFailed(format!("{name} is corrupt")));
        }

        let blocks = if contents.text { doc.blocks.clone() } else { Vec::new() };
        let images = if contents.images { doc.images.clone() } else { Vec::new() };
        Ok(Document::new(path, blocks).with_images(images))
    }
}

/// Temp folder with placeholder files so input collection finds them
#[allow(dead_code)]
pub struct TestLibrary {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestLibrary {
    pub fn with_files(names: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        for name in names {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, b"placeholder").unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Builds a minimal but valid EPUB 3 archive
#[derive(Debug, Default)]
pub struct EpubBuilder {
    chapters: Vec<String>,
    images: Vec<(String, String, Vec<u8>)>,
}

#[allow(dead_code)]
impl EpubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chapter; each paragraph becomes a `<p>`
    pub fn chapter(mut self, paragraphs: &[&str]) -> Self {
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>\n")).collect();
        self.chapters.push(format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
             <head><title>Chapter</title><style>p {{ margin: 0 }}</style></head>\n\
             <body>\n{body}</body>\n</html>"
        ));
        self
    }

    pub fn image(mut self, file_name: &str, media_type: &str, data: &[u8]) -> Self {
        self.images
            .push((file_name.to_string(), media_type.to_string(), data.to_vec()));
        self
    }

    fn package_document(&self) -> String {
        let mut manifest = String::new();
        let mut spine = String::new();
        for i in 0..self.chapters.len() {
            manifest.push_str(&format!(
                "    <item id=\"ch{i}\" href=\"text/ch{i}.xhtml\" media-type=\"application/xhtml+xml\"/>\n"
            ));
            spine.push_str(&format!("    <itemref idref=\"ch{i}\"/>\n"));
        }
        for (i, (name, media_type, _)) in self.images.iter().enumerate() {
            manifest.push_str(&format!(
                "    <item id=\"img{i}\" href=\"images/{name}\" media-type=\"{media_type}\"/>\n"
            ));
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" unique-identifier=\"id\">\n\
             <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\"><dc:title>Test</dc:title></metadata>\n\
             <manifest>\n{manifest}</manifest>\n\
             <spine>\n{spine}</spine>\n\
             </package>"
        )
    }

    /// Write the archive to `path`
    pub fn write(&self, path: &Path) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        zip.start_file("mimetype", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();
        zip.start_file("META-INF/container.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();
        zip.start_file("OEBPS/content.opf", SimpleFileOptions::default()).unwrap();
        zip.write_all(self.package_document().as_bytes()).unwrap();

        for (i, chapter) in self.chapters.iter().enumerate() {
            zip.start_file(format!("OEBPS/text/ch{i}.xhtml"), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(chapter.as_bytes()).unwrap();
        }
        for (name, _, data) in &self.images {
            zip.start_file(format!("OEBPS/images/{name}"), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap();
    }
}

/// One image XObject as it is stored in the PDF
#[derive(Debug, Clone)]
struct PdfImageObject {
    filter: &'static str,
    color_space: &'static str,
    width: i64,
    height: i64,
    data: Vec<u8>,
}

/// Builds a PDF with lopdf: one line of Helvetica text per page,
/// plus image XObjects in the page resources
#[derive(Debug, Default)]
pub struct PdfBuilder {
    pages: Vec<(String, Vec<PdfImageObject>)>,
}

#[allow(dead_code)]
impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, text: &str) -> Self {
        self.pages.push((text.to_string(), Vec::new()));
        self
    }

    /// Attach a DCTDecode image to the last page
    pub fn jpeg(self, width: i64, height: i64, data: &[u8]) -> Self {
        self.image(PdfImageObject {
            filter: "DCTDecode",
            color_space: "DeviceRGB",
            width,
            height,
            data: data.to_vec(),
        })
    }

    /// Attach raw 8-bit RGB samples, FlateDecode-compressed, to the last page
    pub fn rgb(self, width: i64, height: i64, samples: &[u8]) -> Self {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(samples).unwrap();
        self.image(PdfImageObject {
            filter: "FlateDecode",
            color_space: "DeviceRGB",
            width,
            height,
            data: encoder.finish().unwrap(),
        })
    }

    fn image(mut self, image: PdfImageObject) -> Self {
        self.pages
            .last_mut()
            .expect("add a page before its images")
            .1
            .push(image);
        self
    }

    /// Write the document to `path`
    pub fn write(&self, path: &Path) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids: Vec<Object> = Vec::new();
        for (text, images) in &self.pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(text.as_str())]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

            let mut xobjects = Dictionary::new();
            for (i, image) in images.iter().enumerate() {
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => image.width,
                        "Height" => image.height,
                        "ColorSpace" => image.color_space,
                        "BitsPerComponent" => 8,
                        "Filter" => image.filter,
                    },
                    image.data.clone(),
                ));
                xobjects.set(format!("Im{}", i + 1), image_id);
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => xobjects,
                },
                "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}
