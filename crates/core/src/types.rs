//! Domain types for representing extracted presentation content.

use crate::clean::strip_control_chars;
use serde::{Deserialize, Serialize};

/// Represents an entire presentation with its extracted content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Detected format of the source file.
    pub format: PresentationFormat,

    /// Slides in presentation order.
    pub slides: Vec<ExtractedSlide>,
}

impl Presentation {
    /// Create a new presentation with the given filename and format.
    pub fn new(filename: impl Into<String>, format: PresentationFormat) -> Self {
        Self {
            filename: filename.into(),
            format,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: ExtractedSlide) {
        self.slides.push(slide);
    }

    /// Total number of text blocks across all slides.
    pub fn block_count(&self) -> usize {
        self.slides.iter().map(|s| s.blocks.len()).sum()
    }
}

/// The container format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Recognised only so it can be rejected
    /// with a useful message.
    LegacyPpt,
}

impl PresentationFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::LegacyPpt);
        }

        None
    }

    /// Short lowercase name used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::LegacyPpt => "ppt",
        }
    }
}

/// A single extracted slide.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Text of the title placeholder, if the slide has one.
    pub title: Option<String>,

    /// Non-empty, trimmed, cleaned text blocks in shape order.
    pub blocks: Vec<String>,
}

impl ExtractedSlide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            title: None,
            blocks: Vec::new(),
        }
    }

    /// Add a block of shape text.
    ///
    /// The text is stripped of control characters and then trimmed; blocks
    /// that end up empty are dropped.
    pub fn add_block(&mut self, text: &str) {
        let cleaned = strip_control_chars(text);
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return;
        }
        self.blocks.push(trimmed.to_string());
    }

    /// Builder-style variant of [`add_block`](Self::add_block).
    pub fn with_blocks<I, S>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for block in blocks {
            self.add_block(block.as_ref());
        }
        self
    }

    /// Set the title placeholder text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The title text to reuse when rebuilding this slide, if any.
    ///
    /// Returns `None` when there is no title placeholder or its text is
    /// blank.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_block_trims_and_skips_empty() {
        let mut slide = ExtractedSlide::new(1);
        slide.add_block("  Determinants of Health  ");
        slide.add_block("   ");
        slide.add_block("");

        assert_eq!(slide.blocks, vec!["Determinants of Health"]);
    }

    #[test]
    fn test_add_block_strips_control_chars() {
        let slide = ExtractedSlide::new(1).with_blocks(["Line\u{000B}break"]);
        assert_eq!(slide.blocks, vec!["Linebreak"]);
    }

    #[test]
    fn test_add_block_control_chars_before_trim() {
        let slide = ExtractedSlide::new(1).with_blocks(["\u{0001}", "a", "b", "\u{0002} x"]);

        assert_eq!(slide.blocks, vec!["a", "b", "x"]);
        assert!(slide.blocks.iter().all(|b| !b.is_empty() && b.trim() == b.as_str()));
    }

    #[test]
    fn test_usable_title() {
        assert_eq!(ExtractedSlide::new(1).usable_title(), None);
        assert_eq!(ExtractedSlide::new(1).with_title("   ").usable_title(), None);
        assert_eq!(
            ExtractedSlide::new(1).with_title(" Overview ").usable_title(),
            Some("Overview")
        );
    }

    #[test]
    fn test_format_from_magic() {
        assert_eq!(
            PresentationFormat::from_magic(b"PK\x03\x04rest"),
            Some(PresentationFormat::Pptx)
        );
        assert_eq!(
            PresentationFormat::from_magic(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Some(PresentationFormat::LegacyPpt)
        );
        assert_eq!(PresentationFormat::from_magic(b"hello world"), None);
        assert_eq!(PresentationFormat::from_magic(b"PK"), None);
    }
}
