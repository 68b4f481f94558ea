//! Branded rewrite of an existing deck.
//!
//! Every input slide becomes a "Title and Content" slide carrying the old
//! title and text, a caption with the design suggestion, a footer, the logo
//! and a solid background.

use crate::writer::{Deck, DeckSlide, Image, Picture, StyledText, TextBox};
use deckguide_core::{
    classify, AssetFetcher, DeckStyle, DesignSuggestion, ExtractedSlide, Frame, Presentation,
    Result,
};

/// Caption stamped on each rewritten slide.
pub fn suggestion_caption(suggestion: &DesignSuggestion) -> String {
    format!(
        "AI Layout: {} | Visual: {}",
        suggestion.layout, suggestion.visual_type
    )
}

/// Title used when a slide has no usable title of its own.
pub fn fallback_title(slide_number: usize) -> String {
    format!("Slide {}", slide_number)
}

/// Rebuilds decks in the branded style.
pub struct DeckRewriter<F> {
    style: DeckStyle,
    fetcher: F,
}

impl<F: AssetFetcher> DeckRewriter<F> {
    pub fn new(style: DeckStyle, fetcher: F) -> Self {
        Self { style, fetcher }
    }

    /// Rewrite a presentation and serialize the result as `.pptx` bytes.
    pub fn rewrite(&self, presentation: &Presentation) -> Result<Vec<u8>> {
        self.build_deck(presentation).to_bytes()
    }

    /// Build the rewritten deck without serializing it.
    pub fn build_deck(&self, presentation: &Presentation) -> Deck {
        let logo = self.fetch_logo();
        let mut deck = Deck::new(deck_title(&presentation.filename));
        deck.slides = presentation
            .slides
            .iter()
            .map(|slide| self.build_slide(slide, logo.as_ref()))
            .collect();
        deck
    }

    fn build_slide(&self, slide: &ExtractedSlide, logo: Option<&Image>) -> DeckSlide {
        let style = &self.style;

        let title = match slide.usable_title() {
            Some(text) => StyledText::styled(text, style.title_font.clone()),
            None => {
                log::debug!("slide {} has no title, using a placeholder", slide.number);
                StyledText::plain(fallback_title(slide.number))
            }
        };

        let body = slide
            .blocks
            .iter()
            .map(|block| StyledText::styled(block.as_str(), style.body_font.clone()))
            .collect();

        let suggestion = classify(&slide.blocks).suggestion();
        let text_boxes = vec![
            TextBox {
                frame: style.suggestion_frame,
                text: StyledText::plain(suggestion_caption(suggestion)),
            },
            TextBox {
                frame: style.footer_frame,
                text: StyledText::styled(style.footer_text.as_str(), style.footer_font.clone()),
            },
        ];

        let pictures = logo
            .map(|image| Picture {
                frame: Frame {
                    x: style.logo_left,
                    y: style.logo_top,
                    cx: style.logo_width,
                    cy: image.height_for_width(style.logo_width),
                },
                image: image.clone(),
            })
            .into_iter()
            .collect();

        DeckSlide {
            title: Some(title),
            body,
            text_boxes,
            pictures,
            background: Some(style.background),
        }
    }

    /// Fetch and decode the logo once per run; any failure means no logo.
    fn fetch_logo(&self) -> Option<Image> {
        let url = self.style.logo_url.as_deref()?;
        let Some(bytes) = self.fetcher.fetch(url) else {
            log::warn!("Logo unavailable from {}, continuing without it", url);
            return None;
        };
        let image = Image::decode(bytes);
        if image.is_none() {
            log::warn!("Logo from {} is not a usable image, continuing without it", url);
        }
        image
    }
}

fn deck_title(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);
    format!("{} (rewritten)", stem)
}
