//! PPTX file parser implementation.

use deckguide_core::{Error, ExtractedSlide, Presentation, PresentationFormat, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Line breaks inside a paragraph come out as vertical tabs, which text
/// cleaning later removes.
const LINE_BREAK: char = '\u{000B}';

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory file, checking its signature first.
    pub fn parse_bytes(&self, data: &[u8], filename: &str) -> Result<Presentation> {
        match PresentationFormat::from_magic(data) {
            Some(PresentationFormat::Pptx) => self.parse(Cursor::new(data), filename),
            Some(PresentationFormat::LegacyPpt) => Err(Error::InvalidInputFormat(format!(
                "{} is a legacy binary PowerPoint file; save it as .pptx first",
                filename
            ))),
            None => Err(Error::InvalidInputFormat(format!(
                "{} is not a .pptx presentation",
                filename
            ))),
        }
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive = ZipArchive::new(reader).map_err(|e| {
            Error::InvalidInputFormat(format!("{} is not a ZIP package: {}", filename, e))
        })?;

        if archive.by_name(PRESENTATION_RELS_PATH).is_err() {
            return Err(Error::InvalidInputFormat(format!(
                "{} has no presentation part",
                filename
            )));
        }

        let mut presentation = Presentation::new(filename, PresentationFormat::Pptx);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slides", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide paths.
    ///
    /// The `sldIdLst` of `presentation.xml` is authoritative. When it cannot
    /// be read, slides are ordered by the number in their relationship id or
    /// file name.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let slide_rels = parse_slide_relationships(&rels_content)?;

        let listed = self
            .read_file_from_archive(archive, PRESENTATION_PATH)
            .ok()
            .and_then(|xml| parse_slide_id_list(&xml).ok())
            .unwrap_or_default();

        if !listed.is_empty() {
            let by_id: HashMap<&str, &str> = slide_rels
                .iter()
                .map(|r| (r.id.as_str(), r.path.as_str()))
                .collect();
            let ordered: Vec<String> = listed
                .iter()
                .filter_map(|rid| by_id.get(rid.as_str()).map(|p| p.to_string()))
                .collect();
            if !ordered.is_empty() {
                return Ok(ordered);
            }
        }

        log::debug!("no usable sldIdLst, ordering slides by relationship number");
        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .into_iter()
            .map(|r| {
                let order_num = extract_slide_number(&r.path).or_else(|| extract_slide_number(&r.id));
                (r.path, order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<ExtractedSlide> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut slide = ExtractedSlide::new(slide_number);

        for shape in extract_shapes_from_xml(&content) {
            if shape.is_title && slide.title.is_none() {
                slide.title = Some(
                    deckguide_core::strip_control_chars(&shape.text)
                        .trim()
                        .to_string(),
                );
            }
            slide.add_block(&shape.text);
        }

        log::debug!(
            "slide {}: {} blocks, title={:?}",
            slide_number,
            slide.blocks.len(),
            slide.title
        );
        Ok(slide)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::Zip(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A slide relationship from `presentation.xml.rels`.
#[derive(Debug)]
struct SlideRel {
    id: String,
    path: String,
}

/// Collect the slide relationships, resolving targets to archive paths.
fn parse_slide_relationships(xml: &str) -> Result<Vec<SlideRel>> {
    let mut slides = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let rel_type = attr_value(e, b"Type").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                let id = attr_value(e, b"Id").unwrap_or_default();

                if rel_type.ends_with("/slide") {
                    slides.push(SlideRel {
                        id,
                        path: resolve_target(&target),
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of `p:sldId` entries, in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(rid) = attr_value(e, b"r:id") {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing presentation: {}", e)));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Resolve a relationship target relative to the `ppt/` directory.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = vec!["ppt"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Text-bearing shape extracted from slide XML.
#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    is_title: bool,
}

/// Extract the top-level text shapes of a slide, in document order.
///
/// Only `p:sp` elements directly in the shape tree count; shapes inside
/// group shapes or `mc:AlternateContent` (either branch) are skipped. A
/// shape is the title if it is a `title` or `ctrTitle` placeholder.
fn extract_shapes_from_xml(xml_content: &str) -> Vec<ShapeInfo> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    // nesting depth of containers whose shapes are not top level
    let mut nested_depth = 0usize;
    let mut current_shape: Option<ShapeInfo> = None;
    let mut paragraph_count = 0usize;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"grpSp" | b"AlternateContent" => nested_depth += 1,
                b"sp" if nested_depth == 0 => {
                    current_shape = Some(ShapeInfo::default());
                    paragraph_count = 0;
                }
                b"ph" => mark_title(&mut current_shape, e),
                b"p" => {
                    if let Some(ref mut shape) = current_shape {
                        if paragraph_count > 0 {
                            shape.text.push('\n');
                        }
                        paragraph_count += 1;
                    }
                }
                b"t" => in_text_run = current_shape.is_some(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"ph" => mark_title(&mut current_shape, e),
                b"br" => {
                    if let Some(ref mut shape) = current_shape {
                        shape.text.push(LINE_BREAK);
                    }
                }
                b"p" => {
                    if let Some(ref mut shape) = current_shape {
                        if paragraph_count > 0 {
                            shape.text.push('\n');
                        }
                        paragraph_count += 1;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_text_run {
                    if let Some(ref mut shape) = current_shape {
                        match e.unescape() {
                            Ok(text) => shape.text.push_str(&text),
                            Err(err) => log::warn!("Skipping undecodable text run: {}", err),
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"grpSp" | b"AlternateContent" => nested_depth = nested_depth.saturating_sub(1),
                b"sp" if nested_depth == 0 => {
                    if let Some(shape) = current_shape.take() {
                        shapes.push(shape);
                    }
                    in_text_run = false;
                }
                b"t" => in_text_run = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error, keeping shapes read so far: {}", e);
                break;
            }
            _ => {}
        }
    }

    shapes
}

fn mark_title(current_shape: &mut Option<ShapeInfo>, e: &BytesStart) {
    if let Some(ref mut shape) = current_shape {
        if let Some(ph_type) = attr_value(e, b"type") {
            if ph_type == "title" || ph_type == "ctrTitle" {
                shape.is_title = true;
            }
        }
    }
}

/// Value of the attribute with the given (qualified) name.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_xml(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
    {}
  </p:spTree></p:cSld>
</p:sld>"#,
            shapes
        )
    }

    fn text_shape(ph: &str, paragraphs: &[&str]) -> String {
        let paras: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"s\"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>",
            ph, paras
        )
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("ppt/slides/slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(resolve_target("../ppt/slides/slide3.xml"), "ppt/slides/slide3.xml");
        assert_eq!(resolve_target("./slides/slide4.xml"), "ppt/slides/slide4.xml");
    }

    #[test]
    fn test_shapes_keep_document_order() {
        let xml = slide_xml(&format!(
            "{}{}{}",
            text_shape("", &["Bottom text"]),
            text_shape(r#"<p:ph type="title"/>"#, &["Heading"]),
            text_shape("", &["Third"]),
        ));
        let shapes = extract_shapes_from_xml(&xml);
        let texts: Vec<&str> = shapes.iter().map(|s| s.text.as_str()).collect();

        assert_eq!(texts, vec!["Bottom text", "Heading", "Third"]);
        assert!(!shapes[0].is_title);
        assert!(shapes[1].is_title);
    }

    #[test]
    fn test_paragraphs_joined_with_newline() {
        let xml = slide_xml(&text_shape("", &["One", "Two"]));
        let shapes = extract_shapes_from_xml(&xml);
        assert_eq!(shapes[0].text, "One\nTwo");
    }

    #[test]
    fn test_runs_keep_inner_spaces_and_entities() {
        let xml = slide_xml(
            "<p:sp><p:txBody><a:p><a:r><a:t>Health </a:t></a:r><a:r><a:t>&amp; Wellness</a:t></a:r></a:p></p:txBody></p:sp>",
        );
        let shapes = extract_shapes_from_xml(&xml);
        assert_eq!(shapes[0].text, "Health & Wellness");
    }

    #[test]
    fn test_line_break_becomes_vertical_tab() {
        let xml = slide_xml(
            "<p:sp><p:txBody><a:p><a:r><a:t>Line</a:t></a:r><a:br/><a:r><a:t>break</a:t></a:r></a:p></p:txBody></p:sp>",
        );
        let shapes = extract_shapes_from_xml(&xml);
        assert_eq!(shapes[0].text, "Line\u{000B}break");
    }

    #[test]
    fn test_group_shapes_are_skipped() {
        let xml = slide_xml(&format!(
            "<p:grpSp><p:nvGrpSpPr/>{}</p:grpSp>{}",
            text_shape("", &["Inside group"]),
            text_shape("", &["Top level"]),
        ));
        let shapes = extract_shapes_from_xml(&xml);
        let texts: Vec<&str> = shapes.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Top level"]);
    }

    #[test]
    fn test_alternate_content_shapes_are_skipped() {
        let xml = slide_xml(&format!(
            r#"{}<mc:AlternateContent xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><mc:Choice Requires="a14">{}</mc:Choice><mc:Fallback>{}</mc:Fallback></mc:AlternateContent>{}"#,
            text_shape("", &["Before"]),
            text_shape("", &["Formula text"]),
            text_shape("", &["Formula text"]),
            text_shape("", &["After"]),
        ));
        let shapes = extract_shapes_from_xml(&xml);
        let texts: Vec<&str> = shapes.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Before", "After"]);
    }

    #[test]
    fn test_center_title_placeholder() {
        let xml = slide_xml(&text_shape(r#"<p:ph type="ctrTitle"/>"#, &["Cover"]));
        assert!(extract_shapes_from_xml(&xml)[0].is_title);

        let xml = slide_xml(&text_shape(r#"<p:ph type="body" idx="1"/>"#, &["Body"]));
        assert!(!extract_shapes_from_xml(&xml)[0].is_title);
    }

    #[test]
    fn test_parse_slide_relationships() {
        let rels = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="slideLayouts/slideLayout1.xml"/>
</Relationships>"#;
        let slides = parse_slide_relationships(rels).unwrap();
        let paths: Vec<&str> = slides.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]);
    }

    #[test]
    fn test_parse_slide_id_list() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(parse_slide_id_list(xml).unwrap(), vec!["rId3", "rId2"]);
    }

    #[test]
    fn test_parse_bytes_rejects_non_zip() {
        let err = PptxParser::new()
            .parse_bytes(b"this is plain text, not a deck", "notes.txt")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInputFormat(_)));
    }

    #[test]
    fn test_parse_bytes_rejects_legacy_ppt() {
        let mut data = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        data.extend_from_slice(&[0u8; 64]);
        let err = PptxParser::new().parse_bytes(&data, "old.ppt").unwrap_err();
        assert!(matches!(err, Error::InvalidInputFormat(ref m) if m.contains("legacy")));
    }

    const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Build an in-memory ZIP package from (path, content) pairs.
    fn package(parts: &[(&str, String)]) -> Vec<u8> {
        use std::io::Write;
        use zip::write::FileOptions;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    /// Presentation rels mapping rId2 to slide1.xml and rId3 to slide2.xml.
    fn presentation_rels() -> String {
        format!(
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId3" Type="{0}" Target="slides/slide2.xml"/><Relationship Id="rId2" Type="{0}" Target="slides/slide1.xml"/></Relationships>"#,
            SLIDE_REL
        )
    }

    fn two_slide_parts(with_presentation: bool) -> Vec<(&'static str, String)> {
        let mut parts = vec![
            ("ppt/_rels/presentation.xml.rels", presentation_rels()),
            (
                "ppt/slides/slide1.xml",
                slide_xml(&text_shape("", &["From slide1.xml"])),
            ),
            (
                "ppt/slides/slide2.xml",
                slide_xml(&text_shape("", &["From slide2.xml"])),
            ),
        ];
        if with_presentation {
            parts.push((
                "ppt/presentation.xml",
                r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst><p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId2"/></p:sldIdLst></p:presentation>"#.to_string(),
            ));
        }
        parts
    }

    fn first_blocks(presentation: &Presentation) -> Vec<(usize, &str)> {
        presentation
            .slides
            .iter()
            .map(|s| (s.number, s.blocks[0].as_str()))
            .collect()
    }

    #[test]
    fn test_parse_empty_zip_is_invalid_input() {
        let bytes = package(&[]);
        let err = PptxParser::new()
            .parse(Cursor::new(bytes), "empty.pptx")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInputFormat(_)));
    }

    #[test]
    fn test_parse_zip_without_presentation_rels_is_invalid_input() {
        let bytes = package(&[("word/document.xml", "<w:document/>".to_string())]);
        let err = PptxParser::new()
            .parse_bytes(&bytes, "letter.docx")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInputFormat(ref m) if m.contains("presentation")));
    }

    #[test]
    fn test_parse_follows_slide_id_list_order() {
        let bytes = package(&two_slide_parts(true));
        let presentation = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();

        assert_eq!(
            first_blocks(&presentation),
            vec![(1, "From slide2.xml"), (2, "From slide1.xml")]
        );
    }

    #[test]
    fn test_parse_without_presentation_part_sorts_by_slide_number() {
        let bytes = package(&two_slide_parts(false));
        let presentation = PptxParser::new().parse_bytes(&bytes, "deck.pptx").unwrap();

        assert_eq!(
            first_blocks(&presentation),
            vec![(1, "From slide1.xml"), (2, "From slide2.xml")]
        );
    }
}
