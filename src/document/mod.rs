//! Document model: turns source entries into a minimal DOCX and back

mod body;
mod lines;
mod paragraph;

pub use body::Body;
pub use lines::split_lines;
pub use paragraph::Paragraph;

use crate::error::{Error, Result};
use crate::opc::{rel_types, well_known, Package, Part, MAIN_DOCUMENT};
use crate::xml;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{Cursor, Seek, Write};
use std::path::Path;

/// One input to the document: a header line and the text rendered below it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceEntry {
    /// Shown verbatim as the entry's first paragraph, typically a file name
    pub identifier: String,
    /// Raw multi-line text
    pub content: String,
}

impl SourceEntry {
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
        }
    }
}

/// A generated document
#[derive(Debug, Default)]
pub struct Document {
    body: Body,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the document for `entries`, in order.
    ///
    /// Each entry contributes its identifier as one paragraph followed by one
    /// paragraph per line of its content (see [`split_lines`]). Fails with
    /// [`Error::Encoding`] if any text holds characters XML 1.0 cannot carry.
    pub fn from_entries(entries: &[SourceEntry]) -> Result<Self> {
        let mut doc = Self::new();
        for entry in entries {
            doc.add_entry(entry)?;
        }
        Ok(doc)
    }

    /// Append one entry
    pub fn add_entry(&mut self, entry: &SourceEntry) -> Result<()> {
        check_text(&entry.identifier, &entry.identifier)?;
        check_text(&entry.identifier, &entry.content)?;

        self.body.add_paragraph(Paragraph::new(entry.identifier.as_str()));
        for line in split_lines(&entry.content) {
            self.body.add_paragraph(Paragraph::new(line));
        }
        debug!(
            "added '{}' ({} paragraphs total)",
            entry.identifier,
            self.body.paragraphs.len()
        );
        Ok(())
    }

    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(&Package::open(path)?)
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(&Package::from_bytes(bytes)?)
    }

    /// Read the document body out of a package
    pub fn from_package(package: &Package) -> Result<Self> {
        let doc_part = package
            .main_document_part()
            .ok_or_else(|| Error::MissingPart("main document part".into()))?;

        let body = parse_document_xml(doc_part.data_as_str()?)?;
        Ok(Self { body })
    }

    /// Assemble the three-part package for this document
    pub fn to_package(&self) -> Result<Package> {
        let xml = serialize_document_xml(&self.body)?;
        let uri = well_known::document();

        let mut package = Package::new();
        package.add_part(Part::new(uri.clone(), MAIN_DOCUMENT, xml.into_bytes()));
        package.add_relationship(rel_types::OFFICE_DOCUMENT, uri.zip_name());
        Ok(package)
    }

    /// Save the document to a file, atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_package()?.save(path)
    }

    /// Save the document to a new file; fails if `path` already exists
    pub fn save_new<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_package()?.save_new(path)
    }

    /// Save the document to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_package()?.to_bytes()
    }

    /// Write the document archive to any seekable sink
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        self.to_package()?.write_to(writer)
    }

    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs.iter()
    }

    /// Get paragraph count
    pub fn paragraph_count(&self) -> usize {
        self.body.paragraphs.len()
    }

    /// Whether the body carries its section marker
    pub fn has_section_properties(&self) -> bool {
        self.body.section_properties
    }

    /// Get all text in the document, one paragraph per line
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Produce the archive bytes for `entries`
pub fn write(entries: &[SourceEntry]) -> Result<Vec<u8>> {
    Document::from_entries(entries)?.to_bytes()
}

/// Write the archive for `entries` to any seekable sink
pub fn write_to<W: Write + Seek>(entries: &[SourceEntry], writer: W) -> Result<W> {
    Document::from_entries(entries)?.write_to(writer)
}

/// Write the archive for `entries` to `path`; nothing is left at `path` on failure
pub fn save<P: AsRef<Path>>(entries: &[SourceEntry], path: P) -> Result<()> {
    Document::from_entries(entries)?.save(path)
}

/// Like [`save`], but never replaces an existing file at `path`
pub fn save_new<P: AsRef<Path>>(entries: &[SourceEntry], path: P) -> Result<()> {
    Document::from_entries(entries)?.save_new(path)
}

fn check_text(identifier: &str, text: &str) -> Result<()> {
    match xml::find_invalid_char(text) {
        None => Ok(()),
        Some((offset, c)) => Err(Error::Encoding {
            identifier: identifier.to_string(),
            detail: format!("character U+{:04X} at byte {}", c as u32, offset),
        }),
    }
}

/// Parse document.xml content
fn parse_document_xml(xml: &str) -> Result<Body> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.name().local_name().as_ref() == b"body" => {
                return Body::from_reader(&mut reader);
            }
            Event::Empty(e) if e.name().local_name().as_ref() == b"body" => {
                return Ok(Body::default());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Err(Error::InvalidDocument("Missing w:body element".into()))
}

/// Serialize body to document.xml content
fn serialize_document_xml(body: &Body) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut doc_start = BytesStart::new("w:document");
    for (attr, value) in xml::document_namespaces() {
        doc_start.push_attribute((attr, value));
    }
    writer.write_event(Event::Start(doc_start))?;

    body.write_to(&mut writer)?;

    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    let xml_bytes = writer.into_inner().into_inner();
    String::from_utf8(xml_bytes).map_err(|e| Error::InvalidDocument(e.to_string()))
}
