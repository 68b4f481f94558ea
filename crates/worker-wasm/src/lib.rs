//! WASM-compatible wrapper for slide design guidance.
//!
//! This crate exposes report building and deck export to JavaScript for use
//! in the browser or Cloudflare Workers. Nothing here touches the network, so
//! the branded rewrite is produced without a logo.

use deckguide_core::{build_report, DeckStyle, NoFetch, Presentation, SlideReportRow};
use deckguide_pptx::{build_guide_deck, DeckRewriter, PptxParser};
use deckguide_xlsx::ReportWorkbook;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of analyzing a presentation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Detected format of the source file.
    pub format: String,
    /// Number of slides found in the source.
    pub slide_count: usize,
    /// One row per slide, or two for slides that should be split.
    pub rows: Vec<SlideReportRow>,
}

/// Build the design report for a PowerPoint file.
///
/// # Arguments
/// * `data` - The raw bytes of the PPTX file
/// * `filename` - The original filename
///
/// # Returns
/// A JavaScript object with the report rows, or throws on error.
#[wasm_bindgen]
pub fn analyze_presentation(data: &[u8], filename: &str) -> Result<JsValue, JsValue> {
    let result = analyze_presentation_impl(data, filename).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Build the design report spreadsheet (`.xlsx` bytes).
#[wasm_bindgen]
pub fn export_report_xlsx(data: &[u8], filename: &str) -> Result<Vec<u8>, JsValue> {
    export_report_xlsx_impl(data, filename).map_err(|e| JsValue::from_str(&e))
}

/// Build the guide deck (`.pptx` bytes).
#[wasm_bindgen]
pub fn export_guide_deck(data: &[u8], filename: &str) -> Result<Vec<u8>, JsValue> {
    export_guide_deck_impl(data, filename).map_err(|e| JsValue::from_str(&e))
}

/// Rebuild the deck in the branded style (`.pptx` bytes, no logo).
#[wasm_bindgen]
pub fn rewrite_presentation(data: &[u8], filename: &str) -> Result<Vec<u8>, JsValue> {
    rewrite_presentation_impl(data, filename).map_err(|e| JsValue::from_str(&e))
}

fn parse(data: &[u8], filename: &str) -> Result<Presentation, String> {
    PptxParser::new()
        .parse_bytes(data, filename)
        .map_err(|e| format!("PPTX parsing error: {}", e))
}

fn analyze_presentation_impl(data: &[u8], filename: &str) -> Result<AnalysisResult, String> {
    let presentation = parse(data, filename)?;
    Ok(AnalysisResult {
        format: presentation.format.as_str().to_string(),
        slide_count: presentation.slides.len(),
        rows: build_report(&presentation.slides),
    })
}

fn export_report_xlsx_impl(data: &[u8], filename: &str) -> Result<Vec<u8>, String> {
    let presentation = parse(data, filename)?;
    ReportWorkbook::new()
        .to_bytes(&build_report(&presentation.slides))
        .map_err(|e| format!("Spreadsheet error: {}", e))
}

fn export_guide_deck_impl(data: &[u8], filename: &str) -> Result<Vec<u8>, String> {
    let presentation = parse(data, filename)?;
    build_guide_deck("Slide Design Guide", &build_report(&presentation.slides))
        .to_bytes()
        .map_err(|e| format!("Deck error: {}", e))
}

fn rewrite_presentation_impl(data: &[u8], filename: &str) -> Result<Vec<u8>, String> {
    let presentation = parse(data, filename)?;
    let style = DeckStyle::default().with_logo_url(None);
    DeckRewriter::new(style, NoFetch)
        .rewrite(&presentation)
        .map_err(|e| format!("Deck error: {}", e))
}
