//! PPTX writer.
//!
//! Builds a complete presentation package around a single slide master with
//! one "Title and Content" layout. Slides are described by [`DeckSlide`];
//! shape geometry and fonts are explicit, everything else inherits from the
//! bundled master.

use deckguide_core::package::{
    app_properties_xml, core_properties_xml, escape_xml, relationships_xml, ContentTypes,
    PackageWriter, Relationship, CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES,
    REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES, REL_OFFICE_DOCUMENT, XML_DECLARATION,
};
use deckguide_core::{FontStyle, Frame, Result, Rgb};
use std::fmt::Write as FmtWrite;
use std::io::Cursor;

const SLIDE_MASTER_XML: &str = include_str!("../resources/slideMasters/slideMaster1.xml");
const SLIDE_LAYOUT_XML: &str = include_str!("../resources/slideLayouts/slideLayout1.xml");
const THEME_XML: &str = include_str!("../resources/theme/theme1.xml");
const PRES_PROPS_XML: &str = include_str!("../resources/presProps.xml");

const NS_DECLS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";

/// 10in x 7.5in, the 4:3 default slide size.
pub const SLIDE_WIDTH: i64 = 9_144_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;

/// Text with an optional explicit font; `None` inherits from the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledText {
    pub text: String,
    pub font: Option<FontStyle>,
}

impl StyledText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
        }
    }

    pub fn styled(text: impl Into<String>, font: FontStyle) -> Self {
        Self {
            text: text.into(),
            font: Some(font),
        }
    }
}

/// A free-floating text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    pub text: StyledText,
}

/// Supported embedded image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Decoded-enough image: raw bytes plus format and pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
    pub width_px: u32,
    pub height_px: u32,
}

impl Image {
    /// Identify the format and read the dimensions of an image.
    ///
    /// Returns `None` for anything that is not a readable PNG, JPEG or GIF.
    pub fn decode(bytes: Vec<u8>) -> Option<Self> {
        let reader = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .ok()?;
        let kind = match reader.format()? {
            image::ImageFormat::Png => ImageKind::Png,
            image::ImageFormat::Jpeg => ImageKind::Jpeg,
            image::ImageFormat::Gif => ImageKind::Gif,
            other => {
                log::warn!("Unsupported image format {:?}", other);
                return None;
            }
        };
        let (width_px, height_px) = match reader.into_dimensions() {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Could not read image dimensions: {}", e);
                return None;
            }
        };
        if width_px == 0 || height_px == 0 {
            return None;
        }

        Some(Self {
            bytes,
            kind,
            width_px,
            height_px,
        })
    }

    /// Height in EMU that keeps the aspect ratio at the given width.
    pub fn height_for_width(&self, width: i64) -> i64 {
        (width as f64 * self.height_px as f64 / self.width_px as f64).round() as i64
    }
}

/// A picture placed on a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub frame: Frame,
    pub image: Image,
}

/// Description of one output slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckSlide {
    /// Title placeholder text.
    pub title: Option<StyledText>,
    /// Paragraphs of the body placeholder, in order.
    pub body: Vec<StyledText>,
    pub text_boxes: Vec<TextBox>,
    pub pictures: Vec<Picture>,
    /// Solid background color; `None` inherits from the master.
    pub background: Option<Rgb>,
}

/// An output presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    pub title: String,
    pub slides: Vec<DeckSlide>,
}

impl Deck {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slides: Vec::new(),
        }
    }

    /// Serialize the deck as `.pptx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        DeckWriter::new(self).write()
    }
}

/// Writes a [`Deck`] as an OPC package.
struct DeckWriter<'a> {
    deck: &'a Deck,
    package: PackageWriter,
    content_types: ContentTypes,
    media_count: usize,
}

impl<'a> DeckWriter<'a> {
    fn new(deck: &'a Deck) -> Self {
        Self {
            deck,
            package: PackageWriter::new(),
            content_types: ContentTypes::new(),
            media_count: 0,
        }
    }

    fn write(mut self) -> Result<Vec<u8>> {
        self.write_package_parts();
        self.write_presentation();
        self.write_master_parts();

        let deck = self.deck;
        for (idx, slide) in deck.slides.iter().enumerate() {
            self.write_slide(idx + 1, slide)?;
        }

        log::debug!(
            "writing deck '{}' with {} slides and {} media parts",
            self.deck.title,
            self.deck.slides.len(),
            self.media_count
        );
        self.package.finish(&self.content_types)
    }

    fn write_package_parts(&mut self) {
        self.package.add_part(
            "_rels/.rels",
            relationships_xml(&[
                Relationship::new("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
                Relationship::new("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
                Relationship::new("rId3", REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
            ]),
        );
        self.package
            .add_part("docProps/core.xml", core_properties_xml(&self.deck.title));
        self.package.add_part("docProps/app.xml", app_properties_xml());
        self.content_types
            .add_override("/docProps/core.xml", CT_CORE_PROPERTIES);
        self.content_types
            .add_override("/docProps/app.xml", CT_EXTENDED_PROPERTIES);
    }

    fn write_presentation(&mut self) {
        // rId1 master, rId2 theme, rId3 presProps, rId4.. slides
        let mut rels = vec![
            Relationship::new("rId1", &rel("slideMaster"), "slideMasters/slideMaster1.xml"),
            Relationship::new("rId2", &rel("theme"), "theme/theme1.xml"),
            Relationship::new("rId3", &rel("presProps"), "presProps.xml"),
        ];

        let mut xml = String::with_capacity(1024 + self.deck.slides.len() * 48);
        xml.push_str(XML_DECLARATION);
        let _ = write!(xml, r#"<p:presentation {} saveSubsetFonts="1">"#, NS_DECLS);
        xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

        if !self.deck.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for idx in 0..self.deck.slides.len() {
                let rid = format!("rId{}", idx + 4);
                let _ = write!(xml, r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + idx, rid);
                rels.push(Relationship::new(
                    rid,
                    &rel("slide"),
                    format!("slides/slide{}.xml", idx + 1),
                ));
            }
            xml.push_str("</p:sldIdLst>");
        }

        let _ = write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="{}" cy="{}"/>"#,
            SLIDE_WIDTH, SLIDE_HEIGHT, SLIDE_HEIGHT, SLIDE_WIDTH
        );
        xml.push_str("</p:presentation>");

        self.package.add_part("ppt/presentation.xml", xml);
        self.package
            .add_part("ppt/_rels/presentation.xml.rels", relationships_xml(&rels));
        self.content_types
            .add_override("/ppt/presentation.xml", CT_PRESENTATION);
    }

    fn write_master_parts(&mut self) {
        self.package
            .add_part("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML);
        self.package.add_part(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships_xml(&[
                Relationship::new("rId1", &rel("slideLayout"), "../slideLayouts/slideLayout1.xml"),
                Relationship::new("rId2", &rel("theme"), "../theme/theme1.xml"),
            ]),
        );
        self.package
            .add_part("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML);
        self.package.add_part(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships_xml(&[Relationship::new(
                "rId1",
                &rel("slideMaster"),
                "../slideMasters/slideMaster1.xml",
            )]),
        );
        self.package.add_part("ppt/theme/theme1.xml", THEME_XML);
        self.package.add_part("ppt/presProps.xml", PRES_PROPS_XML);

        self.content_types
            .add_override("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER);
        self.content_types
            .add_override("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT);
        self.content_types
            .add_override("/ppt/theme/theme1.xml", CT_THEME);
        self.content_types
            .add_override("/ppt/presProps.xml", CT_PRES_PROPS);
    }

    fn write_slide(&mut self, number: usize, slide: &DeckSlide) -> Result<()> {
        let mut rels = vec![Relationship::new(
            "rId1",
            &rel("slideLayout"),
            "../slideLayouts/slideLayout1.xml",
        )];

        let mut picture_rids = Vec::with_capacity(slide.pictures.len());
        for picture in &slide.pictures {
            self.media_count += 1;
            let media_name = format!(
                "image{}.{}",
                self.media_count,
                picture.image.kind.extension()
            );
            let rid = format!("rId{}", rels.len() + 1);
            rels.push(Relationship::new(
                rid.clone(),
                &rel("image"),
                format!("../media/{}", media_name),
            ));
            self.package
                .add_part(format!("ppt/media/{}", media_name), picture.image.bytes.clone());
            self.content_types.add_default(
                picture.image.kind.extension(),
                picture.image.kind.content_type(),
            );
            picture_rids.push(rid);
        }

        let xml = slide_xml(slide, &picture_rids);
        let part_name = format!("ppt/slides/slide{}.xml", number);
        self.content_types
            .add_override(&format!("/{}", part_name), CT_SLIDE);
        self.package.add_part(part_name, xml);
        self.package.add_part(
            format!("ppt/slides/_rels/slide{}.xml.rels", number),
            relationships_xml(&rels),
        );
        Ok(())
    }
}

fn rel(kind: &str) -> String {
    format!("{}/{}", REL_BASE, kind)
}

/// Serialize one slide. `picture_rids[i]` is the relationship of `slide.pictures[i]`.
fn slide_xml(slide: &DeckSlide, picture_rids: &[String]) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    let _ = write!(xml, "<p:sld {}>", NS_DECLS);
    xml.push_str("<p:cSld>");

    if let Some(color) = slide.background {
        let _ = write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
            color.hex()
        );
    }

    xml.push_str("<p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

    let mut shape_id = 2u32;

    if let Some(ref title) = slide.title {
        write_placeholder(&mut xml, shape_id, "Title 1", r#"<p:ph type="title"/>"#, std::slice::from_ref(title));
        shape_id += 1;
    }

    write_placeholder(
        &mut xml,
        shape_id,
        "Content Placeholder 2",
        r#"<p:ph idx="1"/>"#,
        &slide.body,
    );
    shape_id += 1;

    for text_box in &slide.text_boxes {
        write_text_box(&mut xml, shape_id, text_box);
        shape_id += 1;
    }

    for (picture, rid) in slide.pictures.iter().zip(picture_rids) {
        write_picture(&mut xml, shape_id, picture, rid);
        shape_id += 1;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn write_placeholder(xml: &mut String, id: u32, name: &str, ph: &str, paragraphs: &[StyledText]) {
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/>"#,
        id, name, ph
    );
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    if paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in paragraphs {
        write_paragraph(xml, paragraph);
    }
    xml.push_str("</p:txBody></p:sp>");
}

fn write_text_box(xml: &mut String, id: u32, text_box: &TextBox) {
    let f = &text_box.frame;
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
        id,
        id - 1
    );
    let _ = write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
        f.x, f.y, f.cx, f.cy
    );
    xml.push_str(r#"<p:txBody><a:bodyPr wrap="none"><a:spAutoFit/></a:bodyPr><a:lstStyle/>"#);
    write_paragraph(xml, &text_box.text);
    xml.push_str("</p:txBody></p:sp>");
}

fn write_picture(xml: &mut String, id: u32, picture: &Picture, rid: &str) {
    let f = &picture.frame;
    let _ = write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        id,
        id - 1
    );
    let _ = write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        rid
    );
    let _ = write!(
        xml,
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        f.x, f.y, f.cx, f.cy
    );
}

/// One `a:p`. Newlines inside the text become `a:br` line breaks.
fn write_paragraph(xml: &mut String, paragraph: &StyledText) {
    let font = paragraph.font.as_ref();
    xml.push_str("<a:p>");
    for (idx, line) in paragraph.text.split('\n').enumerate() {
        if idx > 0 {
            let _ = write!(xml, "<a:br>{}</a:br>", char_properties("a:rPr", font));
        }
        if !line.is_empty() {
            let _ = write!(
                xml,
                "<a:r>{}<a:t>{}</a:t></a:r>",
                char_properties("a:rPr", font),
                escape_xml(line)
            );
        }
    }
    xml.push_str(&char_properties("a:endParaRPr", font));
    xml.push_str("</a:p>");
}

/// Character properties element (`a:rPr` or `a:endParaRPr`) for a font, or a
/// bare language tag when the font is inherited.
fn char_properties(tag: &str, font: Option<&FontStyle>) -> String {
    let Some(font) = font else {
        return format!(r#"<{} lang="en-US" dirty="0"/>"#, tag);
    };

    let mut props = format!(
        r#"<{} lang="en-US" sz="{}" b="{}" i="{}" dirty="0">"#,
        tag,
        font.size_hundredths(),
        u8::from(font.bold),
        u8::from(font.italic)
    );
    let _ = write!(
        props,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></{}>"#,
        font.color.hex(),
        escape_xml(&font.family),
        tag
    );
    props
}
