//! Synthetic test-data generators for OEA education data domains.
//!
//! Each domain generator owns a seeded [`Faker`] and produces a fixed-order
//! list of [`OutputBatch`]es: records plus the relative path they are
//! appended to. Rendering and writing are left to the caller so the same
//! batches can land on local disk or anywhere else.
//!
//! # Architecture
//!
//! ```text
//! GenerateOptions (seed, counts, reference date)
//!        │
//!        ▼
//! ┌──────────────────────┐
//! │  DomainGenerator     │
//! │                      │
//! │  - Faker (StdRng)    │
//! │  - domain settings   │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!    OutputBatch { path, payload }
//! ```
//!
//! # Example
//!
//! ```rust
//! use testdata_generator::{build_generator, Domain, GenerateOptions};
//!
//! let options = GenerateOptions::default().with_seed(42).with_count(5);
//! let mut generator = build_generator(Domain::Intune, &options).unwrap();
//! let batches = generator.generate().unwrap();
//! assert_eq!(batches[0].record_count(), 5);
//! ```

pub mod domains;
pub mod faker;
pub mod generator;
pub mod generators;

pub use faker::Faker;
pub use generator::{
    build_generator, Domain, DomainGenerator, GenerateOptions, GeneratorError, OutputBatch,
    Payload,
};
