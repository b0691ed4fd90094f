pub mod aggregate;
pub mod csv;
pub mod json;
pub mod parquet;
pub mod table;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::Item;

pub use aggregate::AggregateStore;
pub use json::JsonWriter;
pub use parquet::ParquetConverter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Csv, OutputFormat::Parquet, OutputFormat::Json];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| Error::Validation {
                parameter: "format",
                value: s.to_string(),
                allowed: Self::ALL.map(|format| format.extension()).join(", "),
            })
    }
}

/// Writes `items` to `path` in the requested format, creating parent
/// directories as needed.
pub async fn export_items(items: &[Item], format: OutputFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    match format {
        OutputFormat::Csv => csv::write_items_csv(items, path)?,
        OutputFormat::Parquet => ParquetConverter::convert_items_to_parquet(items, path)?,
        OutputFormat::Json => {
            let mut writer = JsonWriter::new(path).await?;
            for item in items {
                writer.write_item(item).await?;
            }
            writer.finish().await?;
        }
    }

    info!(
        rows = items.len(),
        format = %format,
        path = %path.display(),
        "Exported items"
    );
    Ok(())
}
