use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::numeric::{digits_only, parse_price};
use super::{Extractor, clean_text, first_text, selector};
use crate::models::{ListingEntry, PriceSample, item_code_from_url};

static ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("div.s-item__info.clearfix"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".s-item__title span"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.s-item__price"));
static SHIPPING: LazyLock<Selector> =
    LazyLock::new(|| selector("span.s-item__shipping.s-item__logisticsCost span.ITALIC"));
static TIME_LEFT: LazyLock<Selector> = LazyLock::new(|| selector(".s-item__time-left"));
static TIME_END: LazyLock<Selector> = LazyLock::new(|| selector(".s-item__time-end"));
static BIDS: LazyLock<Selector> = LazyLock::new(|| selector(".s-item__bids.s-item__bidCount"));
static REVIEWS: LazyLock<Selector> = LazyLock::new(|| selector(".s-item__reviews-count span"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static SOLD_PRICE: LazyLock<Selector> = LazyLock::new(|| selector(".s-item__price"));
static SOLD_SHIPPING: LazyLock<Selector> =
    LazyLock::new(|| selector(".s-item__shipping.s-item__logisticsCost"));

/// Pulls listing rows out of a search result page.
#[derive(Debug, Clone, Copy)]
pub struct ListingExtractor {
    /// The first result block on a page is a placeholder, not a listing.
    skip_first_entry: bool,
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ListingExtractor {
    pub fn new(skip_first_entry: bool) -> Self {
        Self { skip_first_entry }
    }

    fn extract_entry(&self, entry: ElementRef<'_>) -> Option<ListingEntry> {
        let Some(url) = entry
            .select(&LINK)
            .next()
            .and_then(|link| link.value().attr("href"))
            .map(str::to_string)
        else {
            warn!("Listing entry has no link, skipping");
            return None;
        };

        let Some(item_code) = item_code_from_url(&url) else {
            warn!(url = %url, "Listing link carries no item code, skipping");
            return None;
        };

        let price = first_text(entry, &PRICE).and_then(|text| parse_price(&text));
        let shipping = first_text(entry, &SHIPPING).and_then(|text| parse_price(&text));
        let bid_count = first_text(entry, &BIDS).and_then(|text| digits_only(&text));
        let review_count = first_text(entry, &REVIEWS).and_then(|text| digits_only(&text));

        Some(ListingEntry {
            item_code,
            url,
            title: first_text(entry, &TITLE).unwrap_or_default(),
            price,
            shipping: shipping.unwrap_or(0.0),
            time_left: first_text(entry, &TIME_LEFT).unwrap_or_default(),
            time_end: first_text(entry, &TIME_END).unwrap_or_default(),
            bid_count: bid_count.unwrap_or(0),
            review_count: review_count.unwrap_or(0),
        })
    }
}

impl Extractor for ListingExtractor {
    type Output = Vec<ListingEntry>;

    fn extract_document(&self, document: &Html) -> Vec<ListingEntry> {
        let skip = usize::from(self.skip_first_entry);
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for element in document.select(&ENTRY).skip(skip) {
            let Some(entry) = self.extract_entry(element) else {
                continue;
            };
            if !seen.insert(entry.item_code.clone()) {
                debug!(item_code = %entry.item_code, "Duplicate listing on page, keeping the first");
                continue;
            }
            entries.push(entry);
        }

        debug!(entries = entries.len(), skip_first = self.skip_first_entry, "Extracted listing page");
        entries
    }
}

/// Collects the raw price/shipping sample from a sold-items page.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoldPriceExtractor;

impl Extractor for SoldPriceExtractor {
    type Output = PriceSample;

    fn extract_document(&self, document: &Html) -> PriceSample {
        let prices = document
            .select(&SOLD_PRICE)
            .filter_map(|element| parse_price(&clean_text(element)))
            .filter(|price| *price > 0.0)
            .collect();

        let shipping = document
            .select(&SOLD_SHIPPING)
            .map(|element| parse_price(&clean_text(element)).unwrap_or(0.0))
            .collect();

        PriceSample { prices, shipping }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, title: &str, price: &str, extra: &str) -> String {
        format!(
            r#"<div class="s-item__info clearfix">
                <a class="s-item__link" href="https://www.ebay.com/itm/{code}?hash=item{code}">
                    <div class="s-item__title"><span role="heading">{title}</span></div>
                </a>
                <div class="s-item__details">
                    <span class="s-item__price">{price}</span>
                    {extra}
                </div>
            </div>"#
        )
    }

    fn page(entries: &[String]) -> String {
        format!(
            "<html><body><ul class=\"srp-results\">{}</ul></body></html>",
            entries.join("\n")
        )
    }

    fn five_entry_page() -> String {
        page(&[
            entry("000", "Shop on eBay", "$20.00", ""),
            entry(
                "101",
                "Desk Lamp",
                "$1,234.56",
                r#"<span class="s-item__shipping s-item__logisticsCost"><span class="ITALIC">+$4.99 shipping</span></span>
                   <span class="s-item__time-left">2d 4h</span>
                   <span class="s-item__time-end">(Fri, 10:30)</span>
                   <span class="s-item__bids s-item__bidCount">12 bids</span>
                   <span class="s-item__reviews-count"><span>(1,024)</span></span>"#,
            ),
            entry(
                "102",
                "Floor Lamp",
                "$45.00",
                r#"<span class="s-item__shipping s-item__logisticsCost"><span class="ITALIC">Free shipping</span></span>"#,
            ),
            entry("103", "Lamp Shade", "See price", ""),
            entry("104", "Bulb", "$3.10", ""),
        ])
    }

    #[test]
    fn skips_first_entry_and_keeps_the_rest() {
        let entries = ListingExtractor::default().extract(&five_entry_page());
        assert_eq!(entries.len(), 4);
        let codes: Vec<&str> = entries.iter().map(|e| e.item_code.as_str()).collect();
        assert_eq!(codes, ["101", "102", "103", "104"]);
    }

    #[test]
    fn parses_price_and_shipping() {
        let entries = ListingExtractor::default().extract(&five_entry_page());

        let lamp = &entries[0];
        assert_eq!(lamp.title, "Desk Lamp");
        assert_eq!(lamp.price, Some(1234.56));
        assert_eq!(lamp.shipping, 4.99);
        assert_eq!(lamp.time_left, "2d 4h");
        assert_eq!(lamp.time_end, "(Fri, 10:30)");
        assert_eq!(lamp.bid_count, 12);
        assert_eq!(lamp.review_count, 1024);
        assert_eq!(lamp.url, "https://www.ebay.com/itm/101?hash=item101");

        assert_eq!(entries[1].price, Some(45.0));
        assert_eq!(entries[1].shipping, 0.0);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let entries = ListingExtractor::default().extract(&five_entry_page());

        let shade = &entries[2];
        assert_eq!(shade.price, None);
        assert_eq!(shade.shipping, 0.0);
        assert_eq!(shade.bid_count, 0);
        assert_eq!(shade.review_count, 0);
        assert!(shade.time_left.is_empty());
        assert!(shade.time_end.is_empty());
    }

    #[test]
    fn malformed_entry_does_not_abort_the_page() {
        let html = page(&[
            entry("000", "placeholder", "$1.00", ""),
            r#"<div class="s-item__info clearfix"><span class="s-item__price">$9.00</span></div>"#
                .to_string(),
            r#"<div class="s-item__info clearfix"><a href="https://www.ebay.com/itm/555"></a></div>"#
                .to_string(),
            entry("201", "Kettle", "$19.99", ""),
        ]);

        let entries = ListingExtractor::default().extract(&html);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].item_code, "555");
        assert!(entries[0].title.is_empty());
        assert_eq!(entries[0].price, None);
        assert_eq!(entries[1].item_code, "201");
    }

    #[test]
    fn first_entry_kept_when_skipping_disabled() {
        let entries = ListingExtractor::new(false).extract(&five_entry_page());
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].item_code, "000");
    }

    #[test]
    fn duplicate_codes_are_dropped() {
        let html = page(&[
            entry("000", "placeholder", "$1.00", ""),
            entry("301", "Mug", "$5.00", ""),
            entry("301", "Mug again", "$6.00", ""),
        ]);
        let entries = ListingExtractor::default().extract(&html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Mug");
    }

    #[test]
    fn sold_sample_drops_unparsable_prices_and_defaults_shipping() {
        let html = r#"<html><body>
            <span class="s-item__price">$20.00</span>
            <span class="s-item__price">$30.00</span>
            <span class="s-item__price">Tap item to see current price</span>
            <span class="s-item__shipping s-item__logisticsCost">+$5.00 shipping</span>
            <span class="s-item__shipping s-item__logisticsCost">Free shipping</span>
        </body></html>"#;

        let sample = SoldPriceExtractor.extract(html);
        assert_eq!(sample.prices, vec![20.0, 30.0]);
        assert_eq!(sample.shipping, vec![5.0, 0.0]);
    }
}
