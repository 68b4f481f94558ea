//! Core domain types, slide classification rules, and design report
//! building for slide deck guidance.

pub mod clean;
pub mod error;
pub mod fetch;
pub mod package;
pub mod report;
pub mod rules;
pub mod search;
pub mod style;
pub mod types;

pub use clean::strip_control_chars;
pub use error::{Error, Result};
pub use fetch::{AssetFetcher, NoFetch, StaticFetcher};
pub use report::{block_title, build_report, render_table, PartLabel, SlideReportRow};
pub use rules::{classify, Classification, DesignSuggestion, Rule, RULES};
pub use search::{preview_url, visual_search_term};
pub use style::{inches, DeckStyle, FontStyle, Frame, Rgb};
pub use types::{ExtractedSlide, Presentation, PresentationFormat};
