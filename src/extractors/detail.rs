use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::numeric::dotted_digits;
use super::{Extractor, clean_text, first_text_in, selector};
use crate::models::{DEFAULT_COMMENT, DEFAULT_FEEDBACK, DEFAULT_PRICE_TEXT, ItemPatch};

static SELLER_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector("h2.d-stores-info-categories__container__info__section__title"));
static FEEDBACK: LazyLock<Selector> =
    LazyLock::new(|| selector("div.d-stores-info-categories__container__info__section__item"));
static RATING_LABEL: LazyLock<Selector> =
    LazyLock::new(|| selector("div.fdbk-detail-seller-rating__label"));
static RATING_VALUE: LazyLock<Selector> =
    LazyLock::new(|| selector("span.fdbk-detail-seller-rating__value"));
static PRIMARY_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("div.x-price-primary"));
static APPROX_PRICE: LazyLock<Selector> = LazyLock::new(|| selector("div.x-price-approx"));
static COMMENT: LazyLock<Selector> =
    LazyLock::new(|| selector("div.fdbk-container__details__comment"));

const COMMENT_SEPARATOR: &str = "&";

/// Reads seller and feedback data off an item's detail page.
///
/// The returned patch always carries every enrichment field, defaulted where
/// the page lacked the element, so a merge marks the record as enriched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailExtractor;

impl Extractor for DetailExtractor {
    type Output = ItemPatch;

    fn extract_document(&self, document: &Html) -> ItemPatch {
        let seller_name = first_text_in(document, &SELLER_NAME);
        let feedback_pr = first_text_in(document, &FEEDBACK);
        let primary_price = first_text_in(document, &PRIMARY_PRICE).and_then(|t| dotted_digits(&t));
        let approx_price = first_text_in(document, &APPROX_PRICE).and_then(|t| dotted_digits(&t));

        let comments: Vec<String> = document.select(&COMMENT).map(clean_text).collect();
        let comment = (!comments.is_empty()).then(|| comments.join(COMMENT_SEPARATOR));

        let ratings = document
            .select(&RATING_LABEL)
            .map(clean_text)
            .zip(document.select(&RATING_VALUE).map(clean_text))
            .filter(|(label, _)| !label.is_empty())
            .collect();

        ItemPatch {
            seller_name: Some(seller_name.unwrap_or_default()),
            feedback_pr: Some(feedback_pr.unwrap_or_else(|| DEFAULT_FEEDBACK.to_string())),
            item_primary_price: Some(primary_price.unwrap_or_else(|| DEFAULT_PRICE_TEXT.to_string())),
            item_approx_price: Some(approx_price.unwrap_or_else(|| DEFAULT_PRICE_TEXT.to_string())),
            comment: Some(comment.unwrap_or_else(|| DEFAULT_COMMENT.to_string())),
            ratings,
            ..ItemPatch::default()
        }
    }
}
