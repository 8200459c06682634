//! Error types for the populator.

use thiserror::Error;

/// Errors that can occur while writing generated data.
#[derive(Error, Debug)]
pub enum PopulatorError {
    /// Generator or rendering failure.
    #[error("Generator error: {0}")]
    Generator(#[from] testdata_generator::GeneratorError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Storage(#[from] oea_storage::StorageError),

    /// Preparing the output directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid combination of arguments.
    #[error("Invalid arguments: {0}")]
    Arguments(String),
}
