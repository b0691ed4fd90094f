mod item;
mod query;
mod report;

pub use item::{
    DEFAULT_COMMENT, DEFAULT_FEEDBACK, DEFAULT_PRICE_TEXT, Item, ItemPatch, ListingEntry,
    item_code_from_url,
};
pub use query::{Condition, ListingType, Region, SearchQuery};
pub use report::{AverageReport, PriceSample};
