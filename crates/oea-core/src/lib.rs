//! Core types for the OEA test-data toolkit.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - [`SemanticType`] - Closed set of column types with their storage mapping
//! - [`Value`] / [`Record`] - Field values and ordered field mappings
//! - [`Dataset`] - Ordered columns plus rows, the local stand-in for a dataframe
//! - [`ColumnPolicy`] / [`EntitySchema`] / [`SchemaRegistry`] - Schema
//!   declarations loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! oea-core (this crate)
//!    │
//!    ├─── testdata-generator  (builds Records)
//!    ├─── csv-types           (Records -> CSV, CSV -> Dataset)
//!    ├─── json-types          (Records -> JSON)
//!    └─── oea                 (pseudonymizes Datasets against EntitySchemas)
//! ```
//!
//! # Example
//!
//! ```rust
//! use oea_core::{ColumnPolicy, EntitySchema};
//!
//! let schema = EntitySchema::from_triples(
//!     "Person",
//!     &[["Id", "string", "hash"], ["Name", "string", "no-op"]],
//! )
//! .unwrap();
//! assert_eq!(schema.column("Id").unwrap().policy, ColumnPolicy::Hash);
//! ```

pub mod dataset;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use dataset::{Dataset, DatasetError};
pub use schema::{ColumnPolicy, ColumnSpec, EntitySchema, SchemaError, SchemaRegistry};
pub use types::{CastError, SemanticType, StorageField, StorageSchema, StorageType, UnknownTypeError};
pub use values::{is_private_field, Record, Value, PRIVATE_FIELD_MARKER};
