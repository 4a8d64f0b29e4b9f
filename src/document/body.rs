//! Document body (w:body)

use crate::document::Paragraph;
use crate::error::Result;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Document body: a flat list of paragraphs closed by a section marker
#[derive(Clone, Debug, Default)]
pub struct Body {
    pub paragraphs: Vec<Paragraph>,
    /// Whether a `w:sectPr` was seen when parsing; always written
    pub section_properties: bool,
}

impl Body {
    /// Parse body from XML reader (after w:body start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut body = Body::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().local_name().as_ref() {
                    b"p" => body.paragraphs.push(Paragraph::from_reader(reader)?),
                    b"sectPr" => body.section_properties = true,
                    _ => {}
                },
                Event::Empty(e) => match e.name().local_name().as_ref() {
                    b"p" => body.paragraphs.push(Paragraph::default()),
                    b"sectPr" => body.section_properties = true,
                    _ => {}
                },
                Event::End(e) if e.name().local_name().as_ref() == b"body" => break,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(body)
    }

    /// Write body to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:body")))?;

        for para in &self.paragraphs {
            para.write_to(writer)?;
        }

        writer.write_event(Event::Empty(BytesStart::new("w:sectPr")))?;
        writer.write_event(Event::End(BytesEnd::new("w:body")))?;
        Ok(())
    }

    /// Add a paragraph
    pub fn add_paragraph(&mut self, para: Paragraph) {
        self.paragraphs.push(para);
    }
}
