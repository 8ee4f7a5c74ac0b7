//! HTML content selection
//!
//! This module narrows a listing page down to the elements matched by the
//! configured CSS selector and flattens each one into a compact text block
//! for the extraction strategy.

use scraper::{ElementRef, Html, Selector};

/// Elements rendered inside a line of text; any other element separates words
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark",
    "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// Returns the text of every element matching `selector`, in document order
///
/// Text nodes are joined as rendered: inline markup inside a word does not
/// split it, while block elements and line breaks separate words. Whitespace
/// is then collapsed to single spaces; elements with no text are skipped.
///
/// # Arguments
///
/// * `html` - The page HTML
/// * `selector` - CSS selector for the listing entries
///
/// # Returns
///
/// * `Ok(Vec<String>)` - One text block per matched element
/// * `Err(String)` - The selector could not be parsed
///
/// # Example
///
/// ```
/// use venue_crawler::crawler::select_blocks;
///
/// let html = r#"<div class="info-container"><h3>Ash<b>ton</b> Gardens</h3><p>Sugar Hill</p></div>"#;
/// let blocks = select_blocks(html, "[class^='info-container']").unwrap();
/// assert_eq!(blocks, vec!["Ashton Gardens Sugar Hill"]);
/// ```
pub fn select_blocks(html: &str, selector: &str) -> Result<Vec<String>, String> {
    let selector =
        Selector::parse(selector).map_err(|e| format!("invalid selector '{}': {:?}", selector, e))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|element| {
            let mut raw = String::new();
            push_rendered_text(element, &mut raw);
            collapse_whitespace(&raw)
        })
        .filter(|text| !text.is_empty())
        .collect())
}

fn push_rendered_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            let separates = !INLINE_ELEMENTS.iter().any(|inline| *inline == name);
            if separates {
                out.push(' ');
            }
            push_rendered_text(child, out);
            if separates {
                out.push(' ');
            }
        }
    }
}

/// Collapses runs of whitespace to one space and trims the ends
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
