//! Timestamp value generators.
//!
//! Ranges are expressed relative to a reference instant rather than the wall
//! clock, so output only depends on the seed and the reference.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;

/// Generate a random timestamp in `[start, end]` with second precision.
///
/// An empty or inverted range yields `start`.
pub fn generate_timestamp_range<R: Rng>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start + Duration::seconds(rng.gen_range(0..=span))
}

/// Generate a random date in `[start, end]`.
pub fn generate_date_range<R: Rng>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    start + Duration::days(rng.gen_range(0..=span))
}

/// Parse a timestamp given as RFC 3339, `YYYY-MM-DDTHH:MM:SS` or a bare date.
pub fn parse_reference(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_timestamp_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let start = parse_reference("2020-01-01").unwrap();
        let end = parse_reference("2024-12-31T23:59:59Z").unwrap();
        for _ in 0..50 {
            let dt = generate_timestamp_range(&mut rng, start, end);
            assert!(dt >= start && dt <= end);
        }
    }

    #[test]
    fn test_inverted_range_yields_start() {
        let mut rng = StdRng::seed_from_u64(42);
        let start = parse_reference("2021-07-12").unwrap();
        let end = parse_reference("2021-07-01").unwrap();
        assert_eq!(generate_timestamp_range(&mut rng, start, end), start);
    }

    #[test]
    fn test_generate_date_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let start = NaiveDate::from_ymd_opt(2003, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let d = generate_date_range(&mut rng, start, end);
        assert!((2003..=2016).contains(&d.year()));
    }

    #[test]
    fn test_deterministic_generation() {
        let start = parse_reference("2021-05-13").unwrap();
        let end = parse_reference("2021-07-12").unwrap();
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        assert_eq!(
            generate_timestamp_range(&mut rng1, start, end),
            generate_timestamp_range(&mut rng2, start, end)
        );
    }
}
