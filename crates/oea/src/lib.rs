//! OEA helper: pseudonymization and stage processing.
//!
//! This crate moves entity data from stage 1 (raw landed CSV) into stage 2
//! tables, pseudonymizing columns according to each entity's schema.
//!
//! # Modules
//!
//! - [`pseudonymize`](crate::pseudonymize()) - Salted SHA-256 pseudonyms,
//!   masking and lookup tables
//! - [`sanitize_column_name`] / [`fix_column_names`] - Column names safe for
//!   the table format
//! - [`TableEngine`] - Reading and writing datasets as tables of part files
//! - [`Catalog`] - Database descriptors over stage folders
//! - [`Oea`] - Stage roots plus the storage and table operations
//! - [`OeaModule`] - Processing of one source folder through the stages
//!
//! # Example
//!
//! ```rust
//! use oea::pseudonymize;
//! use oea_core::{Dataset, EntitySchema, Record};
//!
//! let schema = EntitySchema::from_triples(
//!     "Person",
//!     &[["Id", "string", "hash"], ["Name", "string", "no-op"]],
//! )
//! .unwrap();
//! let people = Dataset::from_records(&[Record::new().with("Id", "A1").with("Name", "Sam")]);
//!
//! let out = pseudonymize(&people, &schema, "x").unwrap();
//! assert_eq!(out.pseudonymized.columns(), ["Id_pseudonym", "Name"]);
//! assert_eq!(out.lookup.columns(), ["Id_pseudonym", "Id"]);
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod helper;
pub mod module;
pub mod pseudonymize;
pub mod sanitize;

pub use catalog::{Catalog, DatabaseDescriptor, TableDescriptor};
pub use engine::{LocalTableEngine, TableEngine, TableFormat, WriteMode};
pub use error::{OeaError, Result};
pub use helper::{account_from_workspace, Oea};
pub use module::{OeaModule, LOOKUP_SUFFIX, STAGE_TABLE_FORMAT};
pub use pseudonymize::{
    digest_value, pseudonym_column, pseudonymize, salted_digest, Pseudonymized, MASK,
    PSEUDONYM_SUFFIX,
};
pub use sanitize::{fix_column_names, sanitize_column_name};
