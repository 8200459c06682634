//! CSV conversions for oea-core types.
//!
//! This crate converts between oea-core's [`Record`](oea_core::Record) /
//! [`Dataset`](oea_core::Dataset) and CSV text.
//!
//! # Modules
//!
//! - [`forward`] - Records / Dataset → CSV text
//! - [`reverse`] - CSV text → typed Dataset
//!
//! # Example
//!
//! ```rust
//! use csv_types::{read_csv, records_to_csv};
//! use oea_core::{EntitySchema, Record};
//!
//! // Forward: records → CSV, private `_` fields dropped
//! let records = vec![Record::new().with("Id", "A1").with("_tmp", 1).with("Age", 7)];
//! let text = records_to_csv(&records, true).unwrap();
//! assert_eq!(text, "Id,Age\nA1,7\n");
//!
//! // Reverse: CSV → Dataset, cells cast through the schema
//! let schema = EntitySchema::from_triples("P", &[["Id", "string", "hash"], ["Age", "integer", "no-op"]]).unwrap();
//! let dataset = read_csv(&text, &schema, true).unwrap();
//! assert_eq!(dataset.get(0, "Age"), Some(&oea_core::Value::Int(7)));
//! ```

pub mod forward;
pub mod reverse;

pub use forward::{dataset_to_csv, header_of, records_to_csv, CsvWriteError};
pub use reverse::{read_csv, read_csv_untyped, CsvReadError};
