//! Individual value generators.
//!
//! Each function draws from the caller's RNG so that a domain generator
//! owning a single seeded stream stays reproducible end to end.

pub mod choice;
pub mod numeric;
pub mod timestamp;
pub mod uuid;

pub use choice::{ChoiceSet, WeightedChoice};
