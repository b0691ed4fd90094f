use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::models::Item;

/// Columns every export carries, in order. Rating-label columns follow.
pub const FIXED_COLUMNS: [&str; 14] = [
    "item_no",
    "url",
    "title",
    "price",
    "shipping",
    "time_left",
    "time_end",
    "bid_count",
    "review_count",
    "seller_name",
    "feedback_pr",
    "item_primary_price",
    "item_approx_price",
    "comment",
];

/// Rating labels in the order they are first seen across `items`. The set
/// depends on what the detail pages showed, so it varies run to run.
pub fn rating_labels(items: &[Item]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .flat_map(|item| item.ratings.keys().map(String::as_str))
        .filter(|label| seen.insert(*label))
        .map(str::to_string)
        .collect()
}

pub fn items_schema(labels: &[String]) -> Schema {
    let mut fields = vec![
        Field::new("item_no", DataType::Utf8, false),
        Field::new("url", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("price", DataType::Float64, true),
        Field::new("shipping", DataType::Float64, false),
        Field::new("time_left", DataType::Utf8, false),
        Field::new("time_end", DataType::Utf8, false),
        Field::new("bid_count", DataType::UInt32, false),
        Field::new("review_count", DataType::UInt32, false),
        Field::new("seller_name", DataType::Utf8, false),
        Field::new("feedback_pr", DataType::Utf8, false),
        Field::new("item_primary_price", DataType::Utf8, false),
        Field::new("item_approx_price", DataType::Utf8, false),
        Field::new("comment", DataType::Utf8, false),
    ];
    fields.extend(
        labels
            .iter()
            .map(|label| Field::new(label.as_str(), DataType::Utf8, true)),
    );
    Schema::new(fields)
}

fn string_column<'a>(items: &'a [Item], field: impl Fn(&'a Item) -> &'a str) -> ArrayRef {
    Arc::new(items.iter().map(|item| Some(field(item))).collect::<StringArray>())
}

/// One record batch holding every item, fixed columns first.
pub fn items_to_record_batch(items: &[Item]) -> Result<RecordBatch> {
    let labels = rating_labels(items);
    let schema = Arc::new(items_schema(&labels));

    let mut columns: Vec<ArrayRef> = vec![
        string_column(items, |item| item.item_code.as_str()),
        string_column(items, |item| item.url.as_str()),
        string_column(items, |item| item.title.as_str()),
        Arc::new(items.iter().map(|item| item.price).collect::<Float64Array>()),
        Arc::new(items.iter().map(|item| Some(item.shipping)).collect::<Float64Array>()),
        string_column(items, |item| item.time_left.as_str()),
        string_column(items, |item| item.time_end.as_str()),
        Arc::new(items.iter().map(|item| Some(item.bid_count)).collect::<UInt32Array>()),
        Arc::new(items.iter().map(|item| Some(item.review_count)).collect::<UInt32Array>()),
        string_column(items, |item| item.seller_name.as_str()),
        string_column(items, |item| item.feedback_pr.as_str()),
        string_column(items, |item| item.item_primary_price.as_str()),
        string_column(items, |item| item.item_approx_price.as_str()),
        string_column(items, |item| item.comment.as_str()),
    ];

    for label in &labels {
        let values: StringArray = items
            .iter()
            .map(|item| item.ratings.get(label).map(String::as_str))
            .collect();
        columns.push(Arc::new(values));
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_items;
    use super::*;
    use arrow::array::Array;

    #[test]
    fn labels_follow_first_observation() {
        let labels = rating_labels(&sample_items());
        assert_eq!(labels, ["Accurate description", "Communication", "Shipping speed"]);
    }

    #[test]
    fn batch_has_fixed_then_dynamic_columns() {
        let batch = items_to_record_batch(&sample_items()).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), FIXED_COLUMNS.len() + 3);

        let schema = batch.schema();
        for (index, name) in FIXED_COLUMNS.iter().enumerate() {
            assert_eq!(schema.field(index).name().as_str(), *name);
        }

        let price = batch
            .column(3)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(price.value(0), 1234.56);
        assert!(price.is_null(1));

        let shipping_speed = batch
            .column(FIXED_COLUMNS.len() + 2)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert!(shipping_speed.is_null(0));
        assert_eq!(shipping_speed.value(1), "4.8");
    }

    #[test]
    fn empty_input_gives_an_empty_batch() {
        let batch = items_to_record_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), FIXED_COLUMNS.len());
    }
}
