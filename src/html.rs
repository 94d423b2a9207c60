use scraper::{ElementRef, Html, Selector};

use crate::errors::IndexError;

/// Compiles the important-tag CSS selector from its config form.
pub fn parse_tag_selector(selector: &str) -> Result<Selector, IndexError> {
    Selector::parse(selector).map_err(|_| IndexError::Selector {
        selector: selector.to_string(),
    })
}

/// Extracts the page's full text: every text fragment trimmed, empties
/// dropped, the rest joined by single spaces.
pub fn extract_text(document: &Html) -> String {
    join_fragments(document.root_element())
}

/// Extracts the text of every element matching the important-tag selector,
/// one joined string per element.
pub fn extract_important_text(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(join_fragments)
        .filter(|text| !text.is_empty())
        .collect()
}

fn join_fragments(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
