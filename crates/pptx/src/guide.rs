//! Guide deck: one slide per report row, spelling out the suggestion.

use crate::writer::{Deck, DeckSlide, StyledText};
use deckguide_core::SlideReportRow;

/// Build a deck that mirrors the report rows as slide content.
pub fn build_guide_deck(title: &str, rows: &[SlideReportRow]) -> Deck {
    let mut deck = Deck::new(title);
    deck.slides = rows.iter().map(guide_slide).collect();
    deck
}

fn guide_slide(row: &SlideReportRow) -> DeckSlide {
    let s = &row.suggestion;
    let lines = [
        format!("Block: {}", row.block_title),
        format!("Layout: {}", s.layout),
        format!("Typography: {}", s.typography),
        format!("Color Theme: {}", s.color_theme),
        format!("Icon Style: {}", s.icon_style),
        format!("Animation: {}", s.animation),
        format!("Visual: {} — {}", s.visual_type, s.visual_prompt),
        format!("Note: {}", row.designer_note),
    ];

    DeckSlide {
        title: Some(StyledText::plain(format!(
            "Slide {} – {}",
            row.slide_number,
            row.part.label()
        ))),
        body: lines.into_iter().map(StyledText::plain).collect(),
        ..Default::default()
    }
}
