use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_FEEDBACK: &str = "0";
pub const DEFAULT_PRICE_TEXT: &str = "0";
pub const DEFAULT_COMMENT: &str = "0";

/// A fully materialized listing row, keyed by `item_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "item_no")]
    pub item_code: String,
    pub url: String,
    pub title: String,
    /// `None` when the listing's price text held no number.
    pub price: Option<f64>,
    pub shipping: f64,
    pub time_left: String,
    pub time_end: String,
    pub bid_count: u32,
    pub review_count: u32,
    pub seller_name: String,
    pub feedback_pr: String,
    pub item_primary_price: String,
    pub item_approx_price: String,
    pub comment: String,
    /// Seller rating label -> value. Labels are whatever the detail page shows.
    pub ratings: BTreeMap<String, String>,
}

impl Item {
    /// Applies the documented defaults to every field the patch left unset.
    pub fn from_patch(item_code: impl Into<String>, patch: &ItemPatch) -> Self {
        Self {
            item_code: item_code.into(),
            url: patch.url.clone().unwrap_or_default(),
            title: patch.title.clone().unwrap_or_default(),
            price: patch.price,
            shipping: patch.shipping.unwrap_or(0.0),
            time_left: patch.time_left.clone().unwrap_or_default(),
            time_end: patch.time_end.clone().unwrap_or_default(),
            bid_count: patch.bid_count.unwrap_or(0),
            review_count: patch.review_count.unwrap_or(0),
            seller_name: patch.seller_name.clone().unwrap_or_default(),
            feedback_pr: patch
                .feedback_pr
                .clone()
                .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string()),
            item_primary_price: patch
                .item_primary_price
                .clone()
                .unwrap_or_else(|| DEFAULT_PRICE_TEXT.to_string()),
            item_approx_price: patch
                .item_approx_price
                .clone()
                .unwrap_or_else(|| DEFAULT_PRICE_TEXT.to_string()),
            comment: patch
                .comment
                .clone()
                .unwrap_or_else(|| DEFAULT_COMMENT.to_string()),
            ratings: patch.ratings.clone(),
        }
    }
}

/// A partial record. Only fields that are `Some` (and rating labels that are
/// present) overwrite the stored value when merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub shipping: Option<f64>,
    pub time_left: Option<String>,
    pub time_end: Option<String>,
    pub bid_count: Option<u32>,
    pub review_count: Option<u32>,
    pub seller_name: Option<String>,
    pub feedback_pr: Option<String>,
    pub item_primary_price: Option<String>,
    pub item_approx_price: Option<String>,
    pub comment: Option<String>,
    pub ratings: BTreeMap<String, String>,
}

impl ItemPatch {
    /// Field-by-field merge; each set field in `other` replaces ours whole.
    pub fn merge(&mut self, other: ItemPatch) {
        fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.url, other.url);
        take(&mut self.title, other.title);
        take(&mut self.price, other.price);
        take(&mut self.shipping, other.shipping);
        take(&mut self.time_left, other.time_left);
        take(&mut self.time_end, other.time_end);
        take(&mut self.bid_count, other.bid_count);
        take(&mut self.review_count, other.review_count);
        take(&mut self.seller_name, other.seller_name);
        take(&mut self.feedback_pr, other.feedback_pr);
        take(&mut self.item_primary_price, other.item_primary_price);
        take(&mut self.item_approx_price, other.item_approx_price);
        take(&mut self.comment, other.comment);
        self.ratings.extend(other.ratings);
    }

    /// True once any detail-page field has landed.
    pub fn is_enriched(&self) -> bool {
        self.seller_name.is_some()
            || self.feedback_pr.is_some()
            || self.item_primary_price.is_some()
            || self.item_approx_price.is_some()
            || self.comment.is_some()
            || !self.ratings.is_empty()
    }
}

/// One row of a listing page, before it is keyed into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub item_code: String,
    pub url: String,
    pub title: String,
    pub price: Option<f64>,
    pub shipping: f64,
    pub time_left: String,
    pub time_end: String,
    pub bid_count: u32,
    pub review_count: u32,
}

impl ListingEntry {
    pub fn to_patch(&self) -> ItemPatch {
        ItemPatch {
            url: Some(self.url.clone()),
            title: Some(self.title.clone()),
            price: self.price,
            shipping: Some(self.shipping),
            time_left: Some(self.time_left.clone()),
            time_end: Some(self.time_end.clone()),
            bid_count: Some(self.bid_count),
            review_count: Some(self.review_count),
            ..ItemPatch::default()
        }
    }
}

/// Text after the `itm` path marker up to the query string, e.g.
/// `https://www.ebay.com/itm/1234567?hash=x` -> `1234567`.
pub fn item_code_from_url(url: &str) -> Option<String> {
    let start = url.find("itm")? + "itm".len();
    let rest = url[start..].trim_start_matches('/');
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let code = &rest[..end];

    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_code_is_taken_between_marker_and_query() {
        assert_eq!(
            item_code_from_url("https://www.ebay.com/itm/256123456789?hash=item3ba1&var=0").as_deref(),
            Some("256123456789")
        );
        assert_eq!(
            item_code_from_url("https://www.ebay.co.uk/itm/1234").as_deref(),
            Some("1234")
        );
        assert_eq!(item_code_from_url("https://www.ebay.com/sch/i.html?_nkw=x"), None);
        assert_eq!(item_code_from_url("https://www.ebay.com/itm/?x=1"), None);
    }

    #[test]
    fn merge_only_overwrites_set_fields() {
        let mut stored = ItemPatch {
            title: Some("Lamp".into()),
            price: Some(10.0),
            ..Default::default()
        };
        stored.merge(ItemPatch {
            seller_name: Some("acme".into()),
            price: None,
            ..Default::default()
        });

        assert_eq!(stored.title.as_deref(), Some("Lamp"));
        assert_eq!(stored.price, Some(10.0));
        assert_eq!(stored.seller_name.as_deref(), Some("acme"));
    }

    #[test]
    fn merge_unions_rating_labels() {
        let mut stored = ItemPatch::default();
        stored.ratings.insert("Communication".into(), "5.0".into());

        let mut incoming = ItemPatch::default();
        incoming.ratings.insert("Shipping speed".into(), "4.9".into());
        stored.merge(incoming);

        assert_eq!(stored.ratings.len(), 2);
        assert!(stored.is_enriched());
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let item = Item::from_patch("42", &ItemPatch::default());
        assert_eq!(item.feedback_pr, "0");
        assert_eq!(item.item_primary_price, "0");
        assert_eq!(item.comment, "0");
        assert_eq!(item.shipping, 0.0);
        assert_eq!(item.price, None);
        assert!(item.seller_name.is_empty());
    }
}
