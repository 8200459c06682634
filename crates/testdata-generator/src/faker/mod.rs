//! Seeded source of realistic-looking fake values.
//!
//! Every value is drawn from one `StdRng`, and every "relative to now" range
//! is resolved against a fixed reference instant, so two fakers built with
//! the same seed and reference produce identical sequences.

mod pools;

use crate::generators::numeric::{generate_fixed_digits, generate_int_range, generate_up_to_digits};
use crate::generators::timestamp::{generate_date_range, generate_timestamp_range};
use crate::generators::uuid::{generate_uuid_simple, generate_uuid_v4};
use crate::generators::{ChoiceSet, WeightedChoice};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Reference date used when none is configured.
pub const DEFAULT_REFERENCE_DATE: (i32, u32, u32) = (2021, 7, 12);

/// The default reference instant, midnight of [`DEFAULT_REFERENCE_DATE`].
pub fn default_reference() -> NaiveDateTime {
    let (y, m, d) = DEFAULT_REFERENCE_DATE;
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Gender used to pick gendered first names and title prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// `Mr` or `Ms`.
    pub fn title_prefix(&self) -> &'static str {
        match self {
            Self::Male => "Mr",
            Self::Female => "Ms",
        }
    }
}

/// Seeded fake-data source.
pub struct Faker {
    rng: StdRng,
    reference: NaiveDateTime,
}

impl Faker {
    /// Create a faker with the given seed and the default reference instant.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            reference: default_reference(),
        }
    }

    /// Replace the reference instant that relative ranges resolve against.
    pub fn with_reference(mut self, reference: NaiveDateTime) -> Self {
        self.reference = reference;
        self
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Direct access to the underlying stream.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn pick<'a, T>(&mut self, set: &'a ChoiceSet<T>) -> &'a T {
        set.pick(&mut self.rng)
    }

    pub fn pick_weighted<'a, T>(&mut self, choice: &'a WeightedChoice<T>) -> &'a T {
        choice.pick(&mut self.rng)
    }

    fn from_pool(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool.choose(&mut self.rng).copied().unwrap_or_default()
    }

    pub fn boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    pub fn gender(&mut self) -> Gender {
        if self.boolean() {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    // ------------------------------------------------------------------
    // Identifiers and numbers
    // ------------------------------------------------------------------

    pub fn uuid4(&mut self) -> Uuid {
        generate_uuid_v4(&mut self.rng)
    }

    /// UUID v4 without hyphens.
    pub fn uuid4_simple(&mut self) -> String {
        generate_uuid_simple(&mut self.rng)
    }

    /// Random number with at most `digits` digits.
    pub fn random_number(&mut self, digits: u32) -> u64 {
        generate_up_to_digits(&mut self.rng, digits)
    }

    /// Random integer in `[min, max]`.
    pub fn pyint(&mut self, min: i64, max: i64) -> i64 {
        generate_int_range(&mut self.rng, min, max)
    }

    // ------------------------------------------------------------------
    // People
    // ------------------------------------------------------------------

    pub fn first_name(&mut self) -> &'static str {
        match self.gender() {
            Gender::Male => self.first_name_male(),
            Gender::Female => self.first_name_female(),
        }
    }

    pub fn first_name_male(&mut self) -> &'static str {
        self.from_pool(pools::FIRST_NAMES_MALE)
    }

    pub fn first_name_female(&mut self) -> &'static str {
        self.from_pool(pools::FIRST_NAMES_FEMALE)
    }

    pub fn first_name_for(&mut self, gender: Gender) -> &'static str {
        match gender {
            Gender::Male => self.first_name_male(),
            Gender::Female => self.first_name_female(),
        }
    }

    pub fn last_name(&mut self) -> &'static str {
        self.from_pool(pools::LAST_NAMES)
    }

    /// Email address at a free provider.
    pub fn free_email(&mut self) -> String {
        let first = self.first_name().to_lowercase();
        let last = self.last_name().to_lowercase();
        let local = match self.rng.gen_range(0..3) {
            0 => format!("{first}.{last}"),
            1 => format!("{first}{last}"),
            _ => format!("{}{}{}", &first[..1], last, self.rng.gen_range(10..100)),
        };
        let domain = self.from_pool(pools::FREE_EMAIL_DOMAINS);
        format!("{local}@{domain}")
    }

    /// Ten-character password with at least one special character, digit,
    /// upper-case and lower-case letter.
    pub fn password(&mut self) -> String {
        const LENGTH: usize = 10;
        const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
        const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        const DIGITS: &[u8] = b"0123456789";

        let mut chars: Vec<u8> = Vec::with_capacity(LENGTH);
        for class in [pools::PASSWORD_SPECIALS, DIGITS, UPPER, LOWER] {
            chars.push(class[self.rng.gen_range(0..class.len())]);
        }
        let all: Vec<u8> = [pools::PASSWORD_SPECIALS, DIGITS, UPPER, LOWER].concat();
        while chars.len() < LENGTH {
            chars.push(all[self.rng.gen_range(0..all.len())]);
        }
        chars.shuffle(&mut self.rng);
        chars.into_iter().map(char::from).collect()
    }

    pub fn phone_number(&mut self) -> String {
        let format = self.from_pool(pools::PHONE_FORMATS);
        format
            .chars()
            .map(|c| {
                if c == '#' {
                    char::from(b'0' + self.rng.gen_range(0..10u8))
                } else {
                    c
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Places
    // ------------------------------------------------------------------

    pub fn city(&mut self) -> String {
        match self.rng.gen_range(0..3) {
            0 => format!(
                "{} {}{}",
                self.from_pool(pools::CITY_PREFIXES),
                self.first_name(),
                self.from_pool(pools::CITY_SUFFIXES)
            ),
            1 => format!(
                "{}{}",
                self.last_name(),
                self.from_pool(pools::CITY_SUFFIXES)
            ),
            _ => format!(
                "{} {}",
                self.from_pool(pools::CITY_PREFIXES),
                self.last_name()
            ),
        }
    }

    pub fn state_abbr(&mut self) -> &'static str {
        self.from_pool(pools::STATE_ABBRS)
    }

    pub fn street_name(&mut self) -> String {
        let name = if self.boolean() {
            self.first_name()
        } else {
            self.last_name()
        };
        format!("{name} {}", self.from_pool(pools::STREET_SUFFIXES))
    }

    /// Five-digit postal code.
    pub fn postcode(&mut self) -> String {
        format!("{:05}", self.rng.gen_range(501..100_000))
    }

    /// Building number of three to five digits.
    pub fn building_number(&mut self) -> String {
        let digits = self.rng.gen_range(3..=5);
        generate_fixed_digits(&mut self.rng, digits)
    }

    // ------------------------------------------------------------------
    // Dates
    // ------------------------------------------------------------------

    /// Date in `[reference + start, reference + end]`.
    pub fn date_between(&mut self, start: Duration, end: Duration) -> NaiveDate {
        let today = self.reference.date();
        generate_date_range(&mut self.rng, today + start, today + end)
    }

    /// Timestamp in `[reference + start, reference + end]`.
    pub fn date_time_between(&mut self, start: Duration, end: Duration) -> NaiveDateTime {
        generate_timestamp_range(&mut self.rng, self.reference + start, self.reference + end)
    }
}

/// `n` years as a duration of 365-day years.
pub fn years(n: i64) -> Duration {
    Duration::days(365 * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Faker::new(1);
        let mut b = Faker::new(1);
        for _ in 0..10 {
            assert_eq!(a.uuid4(), b.uuid4());
            assert_eq!(a.city(), b.city());
            assert_eq!(a.free_email(), b.free_email());
            assert_eq!(a.password(), b.password());
        }
    }

    #[test]
    fn test_different_seed_diverges() {
        let mut a = Faker::new(1);
        let mut b = Faker::new(2);
        let left: Vec<Uuid> = (0..5).map(|_| a.uuid4()).collect();
        let right: Vec<Uuid> = (0..5).map(|_| b.uuid4()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn test_password_classes() {
        let mut faker = Faker::new(9);
        for _ in 0..20 {
            let password = faker.password();
            assert_eq!(password.len(), 10);
            assert!(password.chars().any(|c| c.is_ascii_digit()));
            assert!(password.chars().any(|c| c.is_ascii_uppercase()));
            assert!(password.chars().any(|c| c.is_ascii_lowercase()));
            assert!(password.bytes().any(|c| pools::PASSWORD_SPECIALS.contains(&c)));
        }
    }

    #[test]
    fn test_dates_relative_to_reference() {
        let mut faker = Faker::new(3);
        let reference = faker.reference();
        for _ in 0..50 {
            let ts = faker.date_time_between(Duration::days(-30), Duration::zero());
            assert!(ts <= reference);
            assert!(ts >= reference - Duration::days(30));
        }
        let birth = faker.date_between(years(-18), years(-5));
        assert!(birth < reference.date() - years(4));
    }

    #[test]
    fn test_custom_reference() {
        let reference = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut faker = Faker::new(3).with_reference(reference);
        let ts = faker.date_time_between(Duration::days(-1), Duration::zero());
        assert!(ts >= reference - Duration::days(1));
    }

    #[test]
    fn test_formats() {
        let mut faker = Faker::new(5);
        assert_eq!(faker.postcode().len(), 5);
        let building = faker.building_number();
        assert!((3..=5).contains(&building.len()));
        assert!(faker.phone_number().chars().any(|c| c.is_ascii_digit()));
        assert!(faker.free_email().contains('@'));
        assert_eq!(faker.uuid4_simple().len(), 32);
        assert!(faker.random_number(5) < 100_000);
    }
}
