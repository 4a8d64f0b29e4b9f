//! OPC Package implementation
//!
//! Handles writing (and reading back) DOCX files as ZIP packages

use crate::error::{Error, Result};
use crate::opc::relationships::rel_types;
use crate::opc::{well_known, ContentTypes, Part, PartUri, Relationships};
use log::debug;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// An OPC package (ZIP-based container for DOCX)
#[derive(Debug)]
pub struct Package {
    /// Parts in insertion order
    parts: Vec<Part>,
    /// Package-level relationships (/_rels/.rels)
    relationships: Relationships,
    /// Content types ([Content_Types].xml)
    content_types: ContentTypes,
}

impl Package {
    /// Create a new empty package
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            relationships: Relationships::new(),
            content_types: ContentTypes::new(),
        }
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Self::new();

        let content_types = read_entry(&mut archive, well_known::content_types().zip_name())?
            .ok_or_else(|| Error::MissingPart("[Content_Types].xml".into()))?;
        package.content_types = ContentTypes::from_xml(std::str::from_utf8(&content_types)?)?;

        if let Some(rels) = read_entry(&mut archive, well_known::package_rels().zip_name())? {
            package.relationships = Relationships::from_xml(std::str::from_utf8(&rels)?)?;
        }

        let names: Vec<String> = archive.file_names().map(String::from).collect();
        for name in names {
            if name.ends_with('/')
                || name == well_known::content_types().zip_name()
                || name.ends_with(".rels")
            {
                continue;
            }

            let uri = PartUri::new(&name)?;
            let content_type = package
                .content_types
                .get(&uri)
                .unwrap_or("application/octet-stream")
                .to_string();

            let data = read_entry(&mut archive, &name)?.unwrap_or_default();
            package.parts.push(Part::new(uri, content_type, data));
        }

        Ok(package)
    }

    /// Save the package to `path`, replacing any file already there.
    ///
    /// The archive is written to a temporary file next to `path`, synced, and
    /// renamed over it. On any failure the temporary file is removed and
    /// nothing appears at `path`. A replaced file keeps its permissions.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_to(path.as_ref(), true)
    }

    /// Save the package to `path`, failing if a file appears there before the
    /// final rename
    pub fn save_new<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_to(path.as_ref(), false)
    }

    fn save_to(&self, path: &Path, replace: bool) -> Result<()> {
        let destination = |source: std::io::Error| Error::Destination {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // same request as File::create; the umask applies on creation
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut temp = builder.tempfile_in(dir).map_err(destination)?;
        debug!("writing package via {}", temp.path().display());

        let mut out = self
            .write_to(BufWriter::new(temp.as_file_mut()))
            .map_err(|e| e.at_destination(path))?;
        out.flush().map_err(destination)?;
        drop(out);

        if replace {
            if let Ok(existing) = fs::metadata(path) {
                if existing.is_file() {
                    temp.as_file()
                        .set_permissions(existing.permissions())
                        .map_err(destination)?;
                }
            }
        }

        temp.as_file().sync_all().map_err(destination)?;
        let persisted = if replace {
            temp.persist(path)
        } else {
            temp.persist_noclobber(path)
        };
        persisted.map_err(|e| destination(e.error))?;
        Ok(())
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a writer, returning the writer once the archive is finished
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(well_known::content_types().zip_name(), options)?;
        self.content_types.write_to(&mut zip)?;

        if !self.relationships.is_empty() {
            zip.start_file(well_known::package_rels().zip_name(), options)?;
            self.relationships.write_to(&mut zip)?;
        }

        for part in &self.parts {
            zip.start_file(part.uri().zip_name(), options)?;
            zip.write_all(part.data())?;
        }

        Ok(zip.finish()?)
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.iter().find(|p| p.uri() == uri)
    }

    /// Add a part to the package, with a content-type override for it
    pub fn add_part(&mut self, part: Part) {
        self.content_types.add_override(part.uri(), part.content_type());
        self.parts.push(part);
    }

    /// Get all parts in package order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// Get package-level relationships
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Get content types
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Add a package-level relationship
    pub fn add_relationship(&mut self, rel_type: &str, target: &str) -> String {
        self.relationships.add(rel_type, target)
    }

    /// Get the main document part
    pub fn main_document_part(&self) -> Option<&Part> {
        let rel = self.relationships.by_type(rel_types::OFFICE_DOCUMENT)?;
        let uri = PartUri::new(&rel.target).ok()?;
        self.part(&uri)
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one archive entry; `None` when the archive has no such entry
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let Some(index) = archive.index_for_name(name) else {
        return Ok(None);
    };

    let mut file = archive.by_index(index)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| Error::InvalidDocument(format!("{name}: {e}")))?;
    Ok(Some(data))
}
