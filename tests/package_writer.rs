//! Integration test: archive layout and text fidelity of generated documents

use docx_bundler::{save, save_new, write, Document, ErrorKind, SourceEntry};
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::io::{Cursor, Read};

const PARTS: [&str; 3] = ["[Content_Types].xml", "_rels/.rels", "word/document.xml"];

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    data
}

/// Text of every `w:p`, read with a plain XML reader rather than the crate's own parser
fn paragraph_texts(bytes: &[u8]) -> Vec<String> {
    let xml = String::from_utf8(read_entry(bytes, "word/document.xml")).unwrap();
    texts_in(&xml)
}

/// Same as [`paragraph_texts`], after the end-of-line handling XML 1.0
/// requires of conforming readers (CRLF and lone CR become LF)
fn normalized_paragraph_texts(bytes: &[u8]) -> Vec<String> {
    let xml = String::from_utf8(read_entry(bytes, "word/document.xml")).unwrap();
    texts_in(&xml.replace("\r\n", "\n").replace('\r', "\n"))
}

fn texts_in(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Text(t) if in_text => {
                let text = t.unescape().unwrap();
                paragraphs.last_mut().unwrap().push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    paragraphs
}

fn assert_well_formed(xml: &[u8]) {
    let xml = std::str::from_utf8(xml).unwrap();
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("malformed XML: {e}\n{xml}"),
        }
    }
}

#[test]
fn test_single_entry() {
    let bytes = write(&[SourceEntry::new("A.txt", "hello")]).unwrap();

    assert_eq!(entry_names(&bytes), PARTS);
    assert_eq!(paragraph_texts(&bytes), vec!["A.txt", "hello"]);
}

#[test]
fn test_trailing_crlf_adds_no_paragraph() {
    let bytes = write(&[SourceEntry::new("B.txt", "line1\nline2\r\n")]).unwrap();
    assert_eq!(paragraph_texts(&bytes), vec!["B.txt", "line1", "line2"]);
}

#[test]
fn test_no_entries() {
    let bytes = write(&[]).unwrap();

    assert_eq!(entry_names(&bytes), PARTS);
    assert!(paragraph_texts(&bytes).is_empty());

    let xml = String::from_utf8(read_entry(&bytes, "word/document.xml")).unwrap();
    assert_eq!(xml.matches("<w:sectPr/>").count(), 1);
}

#[test]
fn test_always_three_parts() {
    let inputs = [
        vec![SourceEntry::new("", "")],
        vec![SourceEntry::new("Empty.cs", "")],
        (0..20)
            .map(|i| SourceEntry::new(format!("F{i}.cs"), "x\ny\n"))
            .collect(),
    ];
    for entries in inputs {
        assert_eq!(entry_names(&write(&entries).unwrap()), PARTS);
    }
}

#[test]
fn test_fixed_parts_content() {
    let bytes = write(&[SourceEntry::new("A.txt", "hello")]).unwrap();

    let content_types = String::from_utf8(read_entry(&bytes, "[Content_Types].xml")).unwrap();
    assert!(content_types.contains(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#
    ));
    assert!(content_types.contains(r#"<Default Extension="xml" ContentType="application/xml"/>"#));
    assert!(content_types.contains(
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#
    ));

    let rels = String::from_utf8(read_entry(&bytes, "_rels/.rels")).unwrap();
    assert!(rels.contains(r#"Id="rId1""#));
    assert!(rels.contains(
        r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument""#
    ));
    assert!(rels.contains(r#"Target="word/document.xml""#));
}

#[test]
fn test_parts_are_well_formed_without_bom() {
    let bytes = write(&[
        SourceEntry::new("Odd <name> & \"quotes\".cs", "if (a < b && c > d) { s = 'x'; }"),
        SourceEntry::new("Unicode.cs", "// héllo wörld ✓ 𝄞"),
    ])
    .unwrap();

    for name in PARTS {
        let data = read_entry(&bytes, name);
        assert!(!data.starts_with(&[0xEF, 0xBB, 0xBF]), "{name} starts with a BOM");
        assert_well_formed(&data);
    }
}

#[test]
fn test_special_characters_escaped_once() {
    let line = r#"a < b && c > "d" 'e'"#;
    let bytes = write(&[SourceEntry::new("Esc.cs", line)]).unwrap();

    let xml = String::from_utf8(read_entry(&bytes, "word/document.xml")).unwrap();
    assert!(xml.contains("a &lt; b &amp;&amp; c &gt; &quot;d&quot; &apos;e&apos;"));
    assert!(!xml.contains("&amp;lt;"));
    assert!(!xml.contains("&amp;amp;"));

    assert_eq!(paragraph_texts(&bytes), vec!["Esc.cs", line]);
}

#[test]
fn test_whitespace_preserved() {
    let content = "    indented\n\ttabbed\ntrailing   \n";
    let bytes = write(&[SourceEntry::new("Ws.cs", content)]).unwrap();

    assert_eq!(
        paragraph_texts(&bytes),
        vec!["Ws.cs", "    indented", "\ttabbed", "trailing   "]
    );
    let xml = String::from_utf8(read_entry(&bytes, "word/document.xml")).unwrap();
    assert_eq!(
        xml.matches(r#"<w:t xml:space="preserve">"#).count(),
        4,
        "every run preserves whitespace"
    );
}

#[test]
fn test_line_endings_do_not_matter() {
    let lf = write(&[SourceEntry::new("X.cs", "a\n\nb\nc\n")]).unwrap();
    let crlf = write(&[SourceEntry::new("X.cs", "a\r\n\r\nb\r\nc\r\n")]).unwrap();

    assert_eq!(paragraph_texts(&lf), paragraph_texts(&crlf));
    assert_eq!(paragraph_texts(&lf), vec!["X.cs", "a", "", "b", "c"]);
}

#[test]
fn test_lone_carriage_return_survives_line_normalization() {
    let bytes = write(&[SourceEntry::new("CR\r.cs", "a\rb\nc\r\n")]).unwrap();

    let xml = read_entry(&bytes, "word/document.xml");
    assert!(!xml.contains(&b'\r'));
    assert_eq!(
        normalized_paragraph_texts(&bytes),
        vec!["CR\r.cs", "a\rb", "c"]
    );
    assert_eq!(normalized_paragraph_texts(&bytes), paragraph_texts(&bytes));
}

#[test]
fn test_order_preserved() {
    let entries = [
        SourceEntry::new("Zeta.cs", "z1\nz2"),
        SourceEntry::new("Alpha.cs", "a1"),
        SourceEntry::new("Zeta.cs", "again"),
    ];
    let bytes = write(&entries).unwrap();

    assert_eq!(
        paragraph_texts(&bytes),
        vec!["Zeta.cs", "z1", "z2", "Alpha.cs", "a1", "Zeta.cs", "again"]
    );
}

#[test]
fn test_invalid_xml_char_is_rejected() {
    let err = write(&[SourceEntry::new("Bell.cs", "ding\u{7}")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
}

#[test]
fn test_read_back_matches_raw_reader() {
    let entries = [
        SourceEntry::new("A.cs", "one\ntwo & three\n"),
        SourceEntry::new("B.cs", ""),
    ];
    let bytes = write(&entries).unwrap();
    let doc = Document::from_bytes(&bytes).unwrap();

    let texts: Vec<String> = doc.paragraphs().map(|p| p.text().to_string()).collect();
    assert_eq!(texts, paragraph_texts(&bytes));
    assert!(doc.has_section_properties());
}

#[test]
fn test_save_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bundle.docx");

    save(&[SourceEntry::new("A.txt", "hello")], &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(paragraph_texts(&bytes), vec!["A.txt", "hello"]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bundle.docx");
    fs::write(&path, b"stale").unwrap();

    save(&[SourceEntry::new("New.cs", "fresh")], &path).unwrap();

    let doc = Document::open(&path).unwrap();
    assert_eq!(doc.text(), "New.cs\nfresh");
}

#[test]
fn test_save_to_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("Bundle.docx");

    let err = save(&[SourceEntry::new("A.txt", "hello")], &path).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Destination);
    assert!(!path.exists());
}

#[test]
fn test_save_onto_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bundle.docx");
    fs::create_dir(&path).unwrap();

    let err = save(&[SourceEntry::new("A.txt", "hello")], &path).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Destination);
    assert!(path.is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[cfg(unix)]
#[test]
fn test_save_into_read_only_directory() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // privileged users (root) ignore directory permissions
    if fs::write(locked.join("check"), b"").is_ok() {
        eprintln!("skipping: directory permissions are not enforced for this user");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let path = locked.join("Bundle.docx");
    let err = save(&[SourceEntry::new("A.txt", "hello")], &path).unwrap_err();
    let listing = fs::read_dir(&locked).unwrap().count();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(err.kind(), ErrorKind::Destination);
    assert!(!path.exists());
    assert_eq!(listing, 0);
}

#[test]
fn test_save_new_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bundle.docx");
    save(&[SourceEntry::new("Old.cs", "old")], &path).unwrap();

    let err = save_new(&[SourceEntry::new("New.cs", "new")], &path).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Destination);
    assert_eq!(Document::open(&path).unwrap().text(), "Old.cs\nold");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_encoding_failure_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bundle.docx");

    let err = save(&[SourceEntry::new("Nul.cs", "\u{0}")], &path).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
