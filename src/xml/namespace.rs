//! XML namespaces used in the generated package

/// WordprocessingML main namespace
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Content Types namespace
pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
/// Package Relationships namespace
pub const PR: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Namespace declarations for document.xml
pub fn document_namespaces() -> Vec<(&'static str, &'static str)> {
    vec![("xmlns:w", W)]
}
