//! Fixed and weighted choice sets.
//!
//! Both are validated on construction so a misconfigured domain rule fails
//! before any record is produced.

use crate::generator::GeneratorError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Uniform choice over a non-empty list.
#[derive(Debug, Clone)]
pub struct ChoiceSet<T> {
    items: Vec<T>,
}

impl<T> ChoiceSet<T> {
    pub fn new(items: impl Into<Vec<T>>) -> Result<Self, GeneratorError> {
        let items = items.into();
        if items.is_empty() {
            return Err(GeneratorError::Configuration(
                "choice set must not be empty".to_string(),
            ));
        }
        Ok(Self { items })
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> &T {
        &self.items[rng.gen_range(0..self.items.len())]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

/// Weighted choice: item `i` is drawn with probability `weights[i] / sum`.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    items: Vec<T>,
    index: WeightedIndex<u32>,
}

impl<T> WeightedChoice<T> {
    pub fn new(items: impl Into<Vec<T>>, weights: &[u32]) -> Result<Self, GeneratorError> {
        let items = items.into();
        if items.is_empty() {
            return Err(GeneratorError::Configuration(
                "weighted choice must not be empty".to_string(),
            ));
        }
        if items.len() != weights.len() {
            return Err(GeneratorError::Configuration(format!(
                "weighted choice has {} items but {} weights",
                items.len(),
                weights.len()
            )));
        }
        let index = WeightedIndex::new(weights)
            .map_err(|e| GeneratorError::Configuration(format!("invalid weights: {e}")))?;
        Ok(Self { items, index })
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> &T {
        &self.items[self.index.sample(rng)]
    }
}
