//! Single-sheet workbook holding the design report.

use crate::strings::SharedStrings;
use deckguide_core::package::{
    app_properties_xml, core_properties_xml, escape_xml, relationships_xml, ContentTypes,
    PackageWriter, Relationship, CT_CORE_PROPERTIES, CT_EXTENDED_PROPERTIES,
    REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES, REL_OFFICE_DOCUMENT, XML_DECLARATION,
};
use deckguide_core::report::REPORT_COLUMNS;
use deckguide_core::{strip_control_chars, Result, SlideReportRow};
use std::fmt::Write as FmtWrite;

pub const DEFAULT_SHEET_NAME: &str = "Slide Guide";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

/// Column widths are clamped to this many characters.
const MAX_COLUMN_WIDTH: usize = 60;

/// Style index of header cells (bold, thin border).
const HEADER_STYLE: u32 = 1;

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2">"#,
    r#"<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="2">"#,
    r#"<border><left/><right/><top/><bottom/><diagonal/></border>"#,
    r#"<border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border>"#,
    r#"</borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top"/></xf>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#
);

/// A cell value as written to the sheet.
enum Cell {
    Number(usize),
    Text(usize),
}

/// Builds the report workbook.
#[derive(Debug)]
pub struct ReportWorkbook {
    sheet_name: String,
}

impl Default for ReportWorkbook {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl ReportWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different worksheet name. Excel limits names to 31 characters.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into().chars().take(31).collect();
        self
    }

    /// Serialize the rows as `.xlsx` bytes: a header row followed by one row
    /// per report row.
    pub fn to_bytes(&self, rows: &[SlideReportRow]) -> Result<Vec<u8>> {
        let mut strings = SharedStrings::new();
        let sheet_xml = self.sheet_xml(rows, &mut strings);

        let mut package = PackageWriter::new();
        let mut content_types = ContentTypes::new();

        package.add_part(
            "_rels/.rels",
            relationships_xml(&[
                Relationship::new("rId1", REL_OFFICE_DOCUMENT, "xl/workbook.xml"),
                Relationship::new("rId2", REL_CORE_PROPERTIES, "docProps/core.xml"),
                Relationship::new("rId3", REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
            ]),
        );
        package.add_part("docProps/core.xml", core_properties_xml(&self.sheet_name));
        package.add_part("docProps/app.xml", app_properties_xml());
        package.add_part("xl/workbook.xml", self.workbook_xml());
        package.add_part(
            "xl/_rels/workbook.xml.rels",
            relationships_xml(&[
                Relationship::new("rId1", &rel("worksheet"), "worksheets/sheet1.xml"),
                Relationship::new("rId2", &rel("styles"), "styles.xml"),
                Relationship::new("rId3", &rel("sharedStrings"), "sharedStrings.xml"),
            ]),
        );
        package.add_part("xl/worksheets/sheet1.xml", sheet_xml);
        package.add_part("xl/styles.xml", STYLES_XML);
        package.add_part("xl/sharedStrings.xml", strings.to_xml());

        content_types.add_override("/docProps/core.xml", CT_CORE_PROPERTIES);
        content_types.add_override("/docProps/app.xml", CT_EXTENDED_PROPERTIES);
        content_types.add_override("/xl/workbook.xml", CT_WORKBOOK);
        content_types.add_override("/xl/worksheets/sheet1.xml", CT_WORKSHEET);
        content_types.add_override("/xl/styles.xml", CT_STYLES);
        content_types.add_override("/xl/sharedStrings.xml", CT_SHARED_STRINGS);

        log::debug!(
            "writing workbook with {} rows, {} shared strings",
            rows.len(),
            strings.len()
        );
        package.finish(&content_types)
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECLARATION);
        let _ = write!(xml, r#"<workbook xmlns="{}" xmlns:r="{}">"#, NS_MAIN, NS_REL);
        let _ = write!(
            xml,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>"#,
            escape_xml(&self.sheet_name)
        );
        xml.push_str("</workbook>");
        xml
    }

    fn sheet_xml(&self, rows: &[SlideReportRow], strings: &mut SharedStrings) -> String {
        let body: Vec<[String; 11]> = rows
            .iter()
            .map(|row| row.cells().map(|cell| strip_control_chars(&cell)))
            .collect();

        let mut xml = String::with_capacity(1024 + rows.len() * 1024);
        xml.push_str(XML_DECLARATION);
        let _ = write!(xml, r#"<worksheet xmlns="{}" xmlns:r="{}">"#, NS_MAIN, NS_REL);
        xml.push_str(r#"<sheetViews><sheetView workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/></sheetView></sheetViews>"#);
        xml.push_str(r#"<sheetFormatPr defaultRowHeight="15"/>"#);

        xml.push_str("<cols>");
        for (col, width) in column_widths(&body).into_iter().enumerate() {
            let _ = write!(
                xml,
                r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                col + 1,
                width
            );
        }
        xml.push_str("</cols>");

        xml.push_str("<sheetData>");
        let header: Vec<Cell> = REPORT_COLUMNS
            .iter()
            .map(|name| Cell::Text(strings.add(name)))
            .collect();
        write_row(&mut xml, 1, &header, Some(HEADER_STYLE));

        for (idx, (row, cells)) in rows.iter().zip(&body).enumerate() {
            let values: Vec<Cell> = cells
                .iter()
                .enumerate()
                .map(|(col, text)| match col {
                    0 => Cell::Number(row.slide_number),
                    _ => Cell::Text(strings.add(text)),
                })
                .collect();
            write_row(&mut xml, idx + 2, &values, None);
        }
        xml.push_str("</sheetData>");

        xml.push_str("</worksheet>");
        xml
    }
}

fn rel(kind: &str) -> String {
    format!("{}/{}", NS_REL, kind)
}

fn write_row(xml: &mut String, row_num: usize, cells: &[Cell], style: Option<u32>) {
    let _ = write!(xml, r#"<row r="{}">"#, row_num);
    let style_attr = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    for (col, cell) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_name(col), row_num);
        let _ = match cell {
            Cell::Number(n) => write!(xml, r#"<c r="{}"{}><v>{}</v></c>"#, cell_ref, style_attr, n),
            Cell::Text(idx) => write!(
                xml,
                r#"<c r="{}"{} t="s"><v>{}</v></c>"#,
                cell_ref, style_attr, idx
            ),
        };
    }
    xml.push_str("</row>");
}

/// Column widths in characters: the longest header or cell, plus padding,
/// clamped to [`MAX_COLUMN_WIDTH`].
fn column_widths(body: &[[String; 11]]) -> Vec<usize> {
    REPORT_COLUMNS
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest = body
                .iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 26 -> AA).
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckguide_core::{build_report, ExtractedSlide};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    fn sample_rows() -> Vec<SlideReportRow> {
        build_report(&[
            ExtractedSlide::new(1).with_blocks(["Determinants of Health"]),
            ExtractedSlide::new(2).with_blocks(["Health & wellness"]),
        ])
    }

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(10), "K");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_header_and_rows() {
        let bytes = ReportWorkbook::new().to_bytes(&sample_rows()).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

        // header + 2 split rows + 1 full row
        assert_eq!(sheet.matches("<row ").count(), 4);
        assert!(sheet.contains(r#"<c r="A1" s="1" t="s"><v>0</v></c>"#));
        assert!(sheet.contains(r#"<c r="K1" s="1" t="s">"#));
        assert!(sheet.contains(r#"<c r="A2"><v>1</v></c>"#));
        assert!(sheet.contains(r#"<c r="A4"><v>2</v></c>"#));

        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains(">Slide Number<"));
        assert!(strings.contains(">Designer Note<"));
        assert!(strings.contains(">Determinants of Health<"));
        assert!(strings.contains(">Health &amp; wellness<"));
        assert!(strings.contains(">Part 2<"));
    }

    #[test]
    fn test_workbook_parts() {
        let bytes = ReportWorkbook::new()
            .with_sheet_name("Guide")
            .to_bytes(&sample_rows())
            .unwrap();

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"<sheet name="Guide" sheetId="1" r:id="rId1"/>"#));

        let content_types = read_part(&bytes, "[Content_Types].xml");
        assert!(content_types.contains(r#"PartName="/xl/worksheets/sheet1.xml""#));
        assert!(content_types.contains(r#"PartName="/xl/sharedStrings.xml""#));
    }

    #[test]
    fn test_control_chars_removed_from_cells() {
        let mut rows = sample_rows();
        rows[0].block_title = "Bad\u{0001}title".to_string();
        let bytes = ReportWorkbook::new().to_bytes(&rows).unwrap();
        let strings = read_part(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains(">Badtitle<"));
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let bytes = ReportWorkbook::new().to_bytes(&[]).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), 1);
    }

    #[test]
    fn test_sheet_name_truncated() {
        let wb = ReportWorkbook::new().with_sheet_name("x".repeat(40));
        assert_eq!(wb.sheet_name.chars().count(), 31);
    }

    #[test]
    fn test_column_widths_clamped() {
        let rows = sample_rows();
        let body: Vec<[String; 11]> = rows.iter().map(SlideReportRow::cells).collect();
        let widths = column_widths(&body);
        assert_eq!(widths.len(), 11);
        assert_eq!(widths[0], "Slide Number".len() + 2);
        assert!(widths.iter().all(|w| *w <= MAX_COLUMN_WIDTH));
    }
}
