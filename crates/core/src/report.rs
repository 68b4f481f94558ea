//! Slide-by-slide design report.
//!
//! Each slide yields one row, or two rows when its content should be split.
//! Split rows share the block title and suggestion and differ only in the
//! part label and designer note.

use crate::rules::{classify, DesignSuggestion};
use crate::types::ExtractedSlide;
use serde::{Serialize, Serializer};

/// Maximum number of characters kept from the first block for the title.
pub const BLOCK_TITLE_MAX_CHARS: usize = 60;

/// Title used for slides without any text.
pub const UNTITLED: &str = "Untitled";

/// Column headers, in the order [`SlideReportRow::cells`] returns them.
pub const REPORT_COLUMNS: [&str; 11] = [
    "Slide Number",
    "Slide Part",
    "Block Title",
    "Layout",
    "Typography",
    "Color Theme",
    "Icon Style",
    "Animation",
    "Visual Type",
    "Visual Prompt",
    "Designer Note",
];

/// Which portion of a slide a report row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartLabel {
    FullSlide,
    Part1,
    Part2,
}

impl PartLabel {
    /// The parts a slide is reported as.
    pub fn for_split(split: bool) -> &'static [PartLabel] {
        if split {
            &[PartLabel::Part1, PartLabel::Part2]
        } else {
            &[PartLabel::FullSlide]
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FullSlide => "Full Slide",
            Self::Part1 => "Part 1",
            Self::Part2 => "Part 2",
        }
    }

    pub fn designer_note(&self) -> &'static str {
        match self {
            Self::FullSlide => "All content can be on one slide.",
            Self::Part1 => "Split: place this in the first half of the sequence.",
            Self::Part2 => "Split: continue this from the previous slide.",
        }
    }
}

impl Serialize for PartLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One row of the design report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideReportRow {
    /// 1-based slide number.
    pub slide_number: usize,
    pub part: PartLabel,
    pub block_title: String,
    #[serde(flatten)]
    pub suggestion: DesignSuggestion,
    pub designer_note: &'static str,
}

impl SlideReportRow {
    /// Cell texts in [`REPORT_COLUMNS`] order.
    pub fn cells(&self) -> [String; 11] {
        let s = &self.suggestion;
        [
            self.slide_number.to_string(),
            self.part.label().to_string(),
            self.block_title.clone(),
            s.layout.to_string(),
            s.typography.to_string(),
            s.color_theme.to_string(),
            s.icon_style.to_string(),
            s.animation.to_string(),
            s.visual_type.to_string(),
            s.visual_prompt.to_string(),
            self.designer_note.to_string(),
        ]
    }
}

/// Title of a slide for the report: the first block, cut to 60 characters
/// with `...` appended when cut, or `Untitled` when the slide has no text.
pub fn block_title<S: AsRef<str>>(blocks: &[S]) -> String {
    let Some(first) = blocks.first().map(AsRef::as_ref) else {
        return UNTITLED.to_string();
    };

    if first.chars().count() <= BLOCK_TITLE_MAX_CHARS {
        return first.to_string();
    }

    let mut title: String = first.chars().take(BLOCK_TITLE_MAX_CHARS).collect();
    title.push_str("...");
    title
}

/// Rows for a single slide.
pub fn slide_rows(slide: &ExtractedSlide) -> Vec<SlideReportRow> {
    let classification = classify(&slide.blocks);
    let title = block_title(&slide.blocks);

    PartLabel::for_split(classification.split)
        .iter()
        .map(|&part| SlideReportRow {
            slide_number: slide.number,
            part,
            block_title: title.clone(),
            suggestion: *classification.suggestion(),
            designer_note: part.designer_note(),
        })
        .collect()
}

/// Build the report for a whole deck, in slide order with parts kept together.
pub fn build_report(slides: &[ExtractedSlide]) -> Vec<SlideReportRow> {
    let rows: Vec<SlideReportRow> = slides.iter().flat_map(slide_rows).collect();
    log::debug!("built {} report rows from {} slides", rows.len(), slides.len());
    rows
}

/// Columns shown by [`render_table`]; the full set is too wide for a terminal.
const TABLE_COLUMNS: [usize; 5] = [0, 1, 2, 3, 8];

/// Render the report as a fixed-width text table for terminal output.
pub fn render_table(rows: &[SlideReportRow]) -> String {
    let cells: Vec<[String; 11]> = rows.iter().map(SlideReportRow::cells).collect();

    let widths: Vec<usize> = TABLE_COLUMNS
        .iter()
        .map(|&col| {
            cells
                .iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(REPORT_COLUMNS[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<&str> = TABLE_COLUMNS.iter().map(|&c| REPORT_COLUMNS[c]).collect();
    push_table_line(&mut out, &header, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_table_line(&mut out, &rule, &widths);

    for row in &cells {
        let line: Vec<&str> = TABLE_COLUMNS.iter().map(|&c| row[c].as_str()).collect();
        push_table_line(&mut out, &line, &widths);
    }

    out
}

fn push_table_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
