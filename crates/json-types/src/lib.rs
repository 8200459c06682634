//! JSON conversions for oea-core types.
//!
//! This crate converts oea-core's [`Record`](oea_core::Record) and
//! [`Dataset`](oea_core::Dataset) to and from JSON text.
//!
//! # Modules
//!
//! - [`forward`] - Records → JSON array / newline-delimited JSON
//! - [`reverse`] - Newline-delimited JSON → typed Dataset
//!
//! # Example
//!
//! ```rust
//! use json_types::records_to_json_array;
//! use oea_core::Record;
//!
//! let records = vec![Record::new().with("id", "s1").with("_etag", "x")];
//! assert_eq!(records_to_json_array(&records).unwrap(), r#"[{"id":"s1"}]"#);
//! ```

pub mod forward;
pub mod reverse;

pub use forward::{
    dataset_to_ndjson, records_to_json_array, records_to_ndjson, JsonValue, JsonWriteError,
};
pub use reverse::{read_ndjson, JsonReadError};
