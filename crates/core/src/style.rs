//! Fixed styling of the branded deck.

use serde::Serialize;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Convert inches to EMU.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH).round() as i64
}

/// Default branding logo.
pub const DEFAULT_LOGO_URL: &str =
    "https://upload.wikimedia.org/wikipedia/en/1/1e/Apollo_Hospitals_Logo.png";

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Six-digit uppercase hex, as DrawingML `srgbClr` expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Font settings for a run of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontStyle {
    pub family: String,
    pub size_pt: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Rgb,
}

impl FontStyle {
    pub fn new(family: impl Into<String>, size_pt: f64, color: Rgb) -> Self {
        Self {
            family: family.into(),
            size_pt,
            bold: false,
            italic: false,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Size in hundredths of a point, as DrawingML `sz` expects.
    pub fn size_hundredths(&self) -> u32 {
        (self.size_pt * 100.0).round() as u32
    }
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    /// Build a frame from inch measurements.
    pub fn inches(x: f64, y: f64, cx: f64, cy: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(cx),
            cy: inches(cy),
        }
    }
}

/// Styling applied to every slide of a rewritten deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckStyle {
    pub title_font: FontStyle,
    pub body_font: FontStyle,
    pub suggestion_frame: Frame,
    pub footer_text: String,
    pub footer_font: FontStyle,
    pub footer_frame: Frame,
    pub background: Rgb,
    /// Where to fetch the logo from. `None` disables the logo.
    pub logo_url: Option<String>,
    pub logo_left: i64,
    pub logo_top: i64,
    pub logo_width: i64,
}

impl Default for DeckStyle {
    fn default() -> Self {
        Self {
            title_font: FontStyle::new("Poppins", 32.0, Rgb(0, 51, 102)).bold(),
            body_font: FontStyle::new("Segoe UI", 18.0, Rgb::BLACK),
            suggestion_frame: Frame::inches(0.5, 6.0, 5.5, 0.6),
            footer_text: "Powered by Apollo Knowledge".to_string(),
            footer_font: FontStyle::new("Segoe UI", 10.0, Rgb(100, 100, 100)).italic(),
            footer_frame: Frame::inches(0.5, 6.8, 9.0, 0.3),
            background: Rgb(210, 230, 255),
            logo_url: Some(DEFAULT_LOGO_URL.to_string()),
            logo_left: inches(8.2),
            logo_top: inches(6.7),
            logo_width: inches(1.0),
        }
    }
}

impl DeckStyle {
    /// Override the logo source; `None` disables the logo.
    pub fn with_logo_url(mut self, url: Option<String>) -> Self {
        self.logo_url = url;
        self
    }
}
