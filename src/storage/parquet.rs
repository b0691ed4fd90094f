use std::fs::File;
use std::path::Path;

use parquet::arrow::ArrowWriter;
use tracing::debug;

use crate::error::Result;
use crate::models::Item;
use crate::storage::table::items_to_record_batch;

pub struct ParquetConverter;

impl ParquetConverter {
    pub fn convert_items_to_parquet(items: &[Item], output_path: &Path) -> Result<()> {
        let batch = items_to_record_batch(items)?;

        let file = File::create(output_path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        debug!(
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            path = %output_path.display(),
            "Wrote parquet file"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::fixtures::sample_items;
    use parquet::file::reader::{FileReader, SerializedFileReader};

    #[test]
    fn writes_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.parquet");

        ParquetConverter::convert_items_to_parquet(&sample_items(), &path).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let metadata = reader.metadata();
        assert_eq!(metadata.file_metadata().num_rows(), 2);
        assert_eq!(metadata.file_metadata().schema_descr().num_columns(), 17);
    }
}
