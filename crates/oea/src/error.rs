//! Error type for the OEA helper.

use oea_core::{DatasetError, SchemaError};
use oea_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum OeaError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("CSV read error: {0}")]
    CsvRead(#[from] csv_types::CsvReadError),

    #[error("CSV write error: {0}")]
    CsvWrite(#[from] csv_types::CsvWriteError),

    #[error("JSON read error: {0}")]
    JsonRead(#[from] json_types::JsonReadError),

    #[error("JSON write error: {0}")]
    JsonWrite(#[from] json_types::JsonWriteError),

    #[error("Catalog descriptor error: {0}")]
    Catalog(#[from] serde_json::Error),

    /// A column declared in the schema is absent from the dataset
    #[error("Column '{column}' declared for entity '{entity}' is missing from the data")]
    MissingColumn { entity: String, column: String },

    /// A sample read found no complete line
    #[error("No complete line in the first bytes of {0}")]
    IncompleteSample(String),
}

pub type Result<T> = std::result::Result<T, OeaError>;
