//! Paragraph element (w:p)

use crate::error::Result;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::BufRead;

/// A single-run plain-text paragraph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    text: String,
}

impl Paragraph {
    /// Create a paragraph holding `text` verbatim
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Get the paragraph text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse paragraph from reader (after w:p start tag)
    ///
    /// Text of every `w:t` inside the paragraph is concatenated.
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<Self> {
        let mut para = Paragraph::default();
        let mut in_text = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().local_name().as_ref() == b"t" => in_text = true,
                Event::End(e) => match e.name().local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" => break,
                    _ => {}
                },
                Event::Text(t) if in_text => para.text.push_str(&t.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(para)
    }

    /// Write as `<w:p><w:r><w:t xml:space="preserve">…</w:t></w:r></w:p>`
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        writer.write_event(Event::Start(BytesStart::new("w:r")))?;

        let mut t = BytesStart::new("w:t");
        t.push_attribute(("xml:space", "preserve"));
        writer.write_event(Event::Start(t))?;
        writer.write_event(Event::Text(BytesText::from_escaped(escape_text(&self.text))))?;
        writer.write_event(Event::End(BytesEnd::new("w:t")))?;

        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }
}

/// Escape all five special characters, quotes included, and write `\r` as
/// `&#13;`: a raw CR would be turned into LF by XML end-of-line handling
fn escape_text(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if escaped.contains('\r') {
        Cow::Owned(escaped.replace('\r', "&#13;"))
    } else {
        escaped
    }
}
