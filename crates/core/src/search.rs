//! Search terms for visual preview lookups.

/// Number of words kept from the visual prompt.
const SEARCH_TERM_WORDS: usize = 5;

/// Placeholder replaced by the encoded search term in endpoint templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Default image endpoint used for previews.
pub const DEFAULT_PREVIEW_ENDPOINT: &str = "https://source.unsplash.com/800x600/?{query}";

/// Derive a query-string-safe search term from a visual prompt.
///
/// Keeps the first comma-separated segment, then its first five words.
pub fn visual_search_term(prompt: &str) -> String {
    let segment = prompt.split(',').next().unwrap_or_default();
    let words: Vec<&str> = segment.split_whitespace().take(SEARCH_TERM_WORDS).collect();
    urlencoding::encode(&words.join(" ")).into_owned()
}

/// Build a preview URL by substituting an already encoded term into a template.
///
/// Templates without a `{query}` placeholder get the term appended.
pub fn preview_url(template: &str, encoded_term: &str) -> String {
    if template.contains(QUERY_PLACEHOLDER) {
        template.replace(QUERY_PLACEHOLDER, encoded_term)
    } else {
        format!("{}{}", template, encoded_term)
    }
}
