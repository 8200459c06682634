//! Writes generated OEA test data to disk.
//!
//! A [`Populator`] drives one [`DomainGenerator`](testdata_generator::DomainGenerator)
//! and appends every rendered batch under an output directory through a
//! [`FileWriter`](oea_storage::FileWriter).
//!
//! # Example
//!
//! ```ignore
//! use testdata_generator::{build_generator, Domain, GenerateOptions};
//! use testdata_populate::Populator;
//!
//! let generator = build_generator(Domain::MsInsights, &GenerateOptions::default())?;
//! let metrics = Populator::new(generator, "/tmp/test_data").populate()?;
//! println!("{} records in {} files", metrics.records_written, metrics.files_written);
//! ```

pub mod args;
mod error;
mod populator;

pub use args::PopulateArgs;
pub use error::PopulatorError;
pub use populator::{PopulateMetrics, Populator};
