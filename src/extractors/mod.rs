pub mod detail;
pub mod listing;
pub mod numeric;

pub use detail::DetailExtractor;
pub use listing::{ListingExtractor, SoldPriceExtractor};

use scraper::{ElementRef, Html, Selector};

/// Turns one parsed page into typed output. Missing elements resolve to
/// defaults inside the implementation; extraction itself never fails.
pub trait Extractor {
    type Output;

    fn extract_document(&self, document: &Html) -> Self::Output;

    fn extract(&self, body: &str) -> Self::Output {
        let document = Html::parse_document(body);
        self.extract_document(&document)
    }
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{css}': {e}"))
}

/// Text content with each text node trimmed and the pieces concatenated.
pub(crate) fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Cleaned text of the first element under `scope` matching `selector`.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(clean_text)
}

pub(crate) fn first_text_in(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(clean_text)
}
