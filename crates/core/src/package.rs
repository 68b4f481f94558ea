//! Minimal OPC (Open Packaging Conventions) writer shared by the
//! spreadsheet and presentation exporters.
//!
//! Parts are buffered in memory and only turned into a ZIP archive by
//! [`PackageWriter::finish`], so a failure part-way through never leaves a
//! half-written file behind.

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
pub const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// Escape text for use in XML content or attribute values.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// A relationship entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    pub fn new(id: impl Into<String>, rel_type: &str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.to_string(),
            target: target.into(),
        }
    }
}

/// Serialize a list of relationships as a `.rels` part.
pub fn relationships_xml(rels: &[Relationship]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECLARATION);
    let _ = write!(xml, r#"<Relationships xmlns="{}">"#, RELS_NS);
    for rel in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            escape_xml(&rel.id),
            escape_xml(&rel.rel_type),
            escape_xml(&rel.target)
        );
    }
    xml.push_str("</Relationships>");
    xml
}

/// `docProps/core.xml` with the given title.
pub fn core_properties_xml(title: &str) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    let _ = write!(xml, "<dc:title>{}</dc:title>", escape_xml(title));
    xml.push_str("<dc:creator>deckguide</dc:creator>");
    xml.push_str("</cp:coreProperties>");
    xml
}

/// `docProps/app.xml` naming the producing application.
pub fn app_properties_xml() -> String {
    let mut xml = String::with_capacity(256);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
    );
    let _ = write!(
        xml,
        "<Application>deckguide {}</Application>",
        env!("CARGO_PKG_VERSION")
    );
    xml.push_str("</Properties>");
    xml
}

/// `[Content_Types].xml` entries.
#[derive(Debug, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Content types with the `rels` and `xml` defaults every package needs.
    pub fn new() -> Self {
        let mut types = Self::default();
        types.add_default("rels", CT_RELATIONSHIPS);
        types.add_default("xml", "application/xml");
        types
    }

    /// Register a default content type for a file extension (once).
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if !self.defaults.iter().any(|(ext, _)| ext == extension) {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Register an override for a specific part name (with leading `/`).
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides
            .push((part_name.to_string(), content_type.to_string()));
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 160);
        xml.push_str(XML_DECLARATION);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, ct) in &self.defaults {
            let _ = write!(xml, r#"<Default Extension="{}" ContentType="{}"/>"#, ext, ct);
        }
        for (part, ct) in &self.overrides {
            let _ = write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                ct
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Collects package parts and writes them as a ZIP archive.
#[derive(Debug, Default)]
pub struct PackageWriter {
    parts: Vec<(String, Vec<u8>)>,
}

impl PackageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part by name (without leading `/`).
    pub fn add_part(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.parts.push((name.into(), content.into()));
    }

    /// Write all parts, `[Content_Types].xml` first, and return the archive bytes.
    pub fn finish(self, content_types: &ContentTypes) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let content_types_xml = content_types.to_xml();
        let all_parts = std::iter::once(("[Content_Types].xml", content_types_xml.as_bytes()))
            .chain(self.parts.iter().map(|(n, c)| (n.as_str(), c.as_slice())));

        for (name, content) in all_parts {
            zip.start_file(name, options)
                .map_err(|e| Error::Serialization(format!("Failed to start '{}': {}", name, e)))?;
            zip.write_all(content)
                .map_err(|e| Error::Serialization(format!("Failed to write '{}': {}", name, e)))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::Serialization(format!("Failed to finish package: {}", e)))?;

        log::debug!("wrote package with {} parts", self.parts.len() + 1);
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_relationships_xml() {
        let xml = relationships_xml(&[Relationship::new(
            "rId1",
            REL_OFFICE_DOCUMENT,
            "ppt/presentation.xml",
        )]);
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains(r#"Target="ppt/presentation.xml""#));
    }

    #[test]
    fn test_content_types_deduplicate_defaults() {
        let mut types = ContentTypes::new();
        types.add_default("png", "image/png");
        types.add_default("png", "image/png");
        types.add_override("/ppt/presentation.xml", "application/x-test");

        let xml = types.to_xml();
        assert_eq!(xml.matches(r#"Extension="png""#).count(), 1);
        assert!(xml.contains(r#"PartName="/ppt/presentation.xml""#));
    }

    #[test]
    fn test_package_writer_roundtrip() {
        let mut package = PackageWriter::new();
        package.add_part("docProps/core.xml", core_properties_xml("Deck & Notes"));
        let bytes = package.finish(&ContentTypes::new()).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut core = String::new();
        archive
            .by_name("docProps/core.xml")
            .unwrap()
            .read_to_string(&mut core)
            .unwrap();
        assert!(core.contains("<dc:title>Deck &amp; Notes</dc:title>"));
        assert!(archive.by_name("[Content_Types].xml").is_ok());
    }
}
