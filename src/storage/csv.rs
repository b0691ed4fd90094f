use std::fs::File;
use std::path::Path;

use arrow::csv::WriterBuilder;
use tracing::debug;

use crate::error::Result;
use crate::models::Item;
use crate::storage::table::items_to_record_batch;

/// Writes the item table as CSV with a header row. Missing prices and
/// rating values are empty cells.
pub fn write_items_csv(items: &[Item], output_path: &Path) -> Result<()> {
    let batch = items_to_record_batch(items)?;

    let file = File::create(output_path)?;
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch)?;

    debug!(rows = batch.num_rows(), path = %output_path.display(), "Wrote csv file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::fixtures::sample_items;

    #[test]
    fn header_then_one_line_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");

        write_items_csv(&sample_items(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("item_no,url,title,price,shipping,"));
        assert!(lines[0].ends_with("Accurate description,Communication,Shipping speed"));
        assert!(lines[1].starts_with("101,https://www.ebay.com/itm/101?hash=a,Desk Lamp,1234.56,4.99,"));
        assert!(lines[2].starts_with("102,"));
        assert!(lines[2].ends_with(",,,4.8"));
    }
}
