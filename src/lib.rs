//! # docx-bundler
//!
//! Collects source files from a folder tree into a single minimal DOCX
//! document: one paragraph naming each file, then one paragraph per line.
//!
//! ## Features
//!
//! - Minimal three-part OOXML package that Word and LibreOffice open
//! - Exact text: every character is escaped once and whitespace is preserved
//! - Folder selection by extension, top-level subfolder, folder name and glob
//! - Atomic save: the destination is either the new document or untouched
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_bundler::{select, SelectionOptions, HeaderStyle};
//!
//! let root = std::path::Path::new("Assets");
//! let files = select::resolve(root, &SelectionOptions::default())?;
//! let entries = select::load_entries(root, &files, HeaderStyle::FileName)?;
//! docx_bundler::save(&entries, "ScriptsBundle.docx")?;
//!
//! // Read it back
//! let doc = docx_bundler::Document::open("ScriptsBundle.docx")?;
//! for para in doc.paragraphs() {
//!     println!("{}", para.text());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod opc;
pub mod select;
pub mod xml;

pub use config::BundleConfig;
pub use document::{save, save_new, write, Document, Paragraph, SourceEntry};
pub use error::{Error, ErrorKind, Result};
pub use opc::{Package, Part, PartUri};
pub use select::{load_entries, resolve, HeaderStyle, SelectionOptions};
