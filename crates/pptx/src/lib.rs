//! PPTX (Office Open XML) reader and writer backend for slide deck guidance.
//!
//! Reads .pptx files (ZIP archives of XML parts) into slides of text blocks,
//! and writes the guide deck and the branded rewrite of a deck.

pub mod guide;
pub mod parser;
pub mod rewrite;
pub mod writer;

pub use guide::build_guide_deck;
pub use parser::PptxParser;
pub use rewrite::DeckRewriter;
pub use writer::{Deck, DeckSlide, Image, ImageKind, Picture, StyledText, TextBox};
