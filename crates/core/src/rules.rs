//! Keyword rules that attach a design suggestion to a slide.
//!
//! The rule table is ordered and the first rule whose keyword occurs in the
//! slide's lowercased text wins. A slide that matches nothing gets
//! [`FALLBACK`]. Both the spreadsheet report and the rewritten deck read from
//! this one table.

use serde::Serialize;

/// Slides with more blocks than this are reported in two parts.
pub const SPLIT_BLOCK_THRESHOLD: usize = 3;

/// Keywords that always cause a slide to be reported in two parts.
pub const SPLIT_KEYWORDS: &[&str] = &["components", "diseases", "determinants", "definition"];

/// Fixed bundle of design guidance for one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSuggestion {
    pub layout: &'static str,
    pub typography: &'static str,
    pub color_theme: &'static str,
    pub icon_style: &'static str,
    pub animation: &'static str,
    /// Short descriptor of the main visual, also stamped on rewritten slides.
    pub visual_type: &'static str,
    /// Longer prompt describing the visual to source or generate.
    pub visual_prompt: &'static str,
}

/// Identifies which rule produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleId {
    Who,
    Components,
    India,
    Fallback,
}

/// One entry of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    /// Lowercase substring that triggers the rule. `None` only for the fallback.
    pub keyword: Option<&'static str>,
    pub suggestion: DesignSuggestion,
}

impl Rule {
    /// Whether this rule fires for the given lowercased slide text.
    pub fn matches(&self, full_text: &str) -> bool {
        match self.keyword {
            Some(keyword) => full_text.contains(keyword),
            None => true,
        }
    }
}

/// Keyword rules in evaluation order.
pub static RULES: [Rule; 3] = [
    Rule {
        id: RuleId::Who,
        keyword: Some("who"),
        suggestion: DesignSuggestion {
            layout: "Two-column: WHO quote on left, image on right",
            typography: "Poppins Bold 32pt heading, Segoe UI 18pt body, quote in italics",
            color_theme: "WHO blue (#009ADE) with white and navy accents",
            icon_style: "Line icons: globe and stethoscope",
            animation: "Fade in quote, then wipe in image from right",
            visual_type: "Quote bubble + doctor team image",
            visual_prompt: "WHO definition of health quote in a speech bubble, diverse doctor team in a bright hospital corridor",
        },
    },
    Rule {
        id: RuleId::Components,
        keyword: Some("components"),
        suggestion: DesignSuggestion {
            layout: "4-quadrant grid",
            typography: "Poppins SemiBold 28pt heading, Segoe UI 16pt quadrant labels",
            color_theme: "Four-tone palette: green, blue, orange, purple on white",
            icon_style: "Health category emoji icons: 💪 🧠 🤝 🕊️",
            animation: "Appear quadrant by quadrant, clockwise",
            visual_type: "Infographic with icons",
            visual_prompt: "Infographic of physical mental social spiritual health, four quadrants with flat icons",
        },
    },
    Rule {
        id: RuleId::India,
        keyword: Some("india"),
        suggestion: DesignSuggestion {
            layout: "Map overlay",
            typography: "Poppins Bold 30pt heading, Segoe UI 14pt data callouts",
            color_theme: "Saffron, white and teal with red hotspot markers",
            icon_style: "Map pins with statistic badges",
            animation: "Zoom into map, then pop in hotspots one by one",
            visual_type: "India map infographic",
            visual_prompt: "India map with disease hotspot statistics, highlighted states with percentage callouts",
        },
    },
];

/// Suggestion used when no keyword rule matches.
pub static FALLBACK: Rule = Rule {
    id: RuleId::Fallback,
    keyword: None,
    suggestion: DesignSuggestion {
        layout: "Standard title-content: title on top, image on right",
        typography: "Poppins Bold 32pt heading, Segoe UI 18pt body",
        color_theme: "Soft pastel palette (light blue, mint, peach)",
        icon_style: "Simple flat icons",
        animation: "Subtle fade in per bullet",
        visual_type: "Photo + icon",
        visual_prompt: "Healthcare professionals teamwork photo, bright clinic setting, soft pastel tones",
    },
};

/// Outcome of classifying one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the slide should be reported as two parts.
    pub split: bool,
    /// The rule that supplied the suggestion.
    pub rule: &'static Rule,
}

impl Classification {
    pub fn suggestion(&self) -> &'static DesignSuggestion {
        &self.rule.suggestion
    }
}

/// Join blocks with single spaces and lowercase the result.
pub fn full_text<S: AsRef<str>>(blocks: &[S]) -> String {
    blocks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First rule in table order that matches, or the fallback.
pub fn select_rule(full_text: &str) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| rule.matches(full_text))
        .unwrap_or(&FALLBACK)
}

/// Whether a slide's content should be split across two parts.
pub fn requires_split(block_count: usize, full_text: &str) -> bool {
    block_count > SPLIT_BLOCK_THRESHOLD || SPLIT_KEYWORDS.iter().any(|k| full_text.contains(k))
}

/// Classify a slide from its text blocks.
pub fn classify<S: AsRef<str>>(blocks: &[S]) -> Classification {
    let text = full_text(blocks);
    let rule = select_rule(&text);
    let split = requires_split(blocks.len(), &text);
    log::debug!(
        "classified slide: rule={:?} split={} blocks={}",
        rule.id,
        split,
        blocks.len()
    );
    Classification { split, rule }
}
