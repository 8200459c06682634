//! Numeric value generators.

use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Generate a random number with at most `digits` digits (`0..10^digits`).
///
/// Leading zeros are not padded, so the result may be shorter.
pub fn generate_up_to_digits<R: Rng>(rng: &mut R, digits: u32) -> u64 {
    if digits == 0 {
        return 0;
    }
    let upper = 10u64.saturating_pow(digits.min(19));
    rng.gen_range(0..upper)
}

/// Generate a string of exactly `digits` decimal digits, first digit nonzero.
pub fn generate_fixed_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);
    for i in 0..digits {
        let low = if i == 0 { 1 } else { 0 };
        let digit: u8 = rng.gen_range(low..10);
        result.push(char::from(b'0' + digit));
    }
    result
}
