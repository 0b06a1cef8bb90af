use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Text nodes of `element`, each trimmed, empties dropped, joined by `sep`.
pub fn element_text(element: ElementRef<'_>, sep: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid selector {css:?}: {e}");
            None
        }
    }
}

/// Text of the first element matching `css`, or `None` if absent or blank.
pub fn select_text(root: ElementRef<'_>, css: &str, sep: &str) -> Option<String> {
    let selector = selector(css)?;
    let text = element_text(root.select(&selector).next()?, sep);
    (!text.is_empty()).then_some(text)
}

/// `href` values of every element matching `css`, in document order.
pub fn select_hrefs(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Appends a query string to `base`, picking `?` or `&` as needed.
pub fn with_query(base: &str, query: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{query}")
}
