//! Seeded UUIDs for device and directory object ids.

use rand::Rng;
use uuid::{Builder, Uuid};

/// Random (version 4) UUID drawn from `rng`.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Version 4 UUID as 32 lowercase hex digits, the form Intune device ids use.
pub fn generate_uuid_simple<R: Rng>(rng: &mut R) -> String {
    generate_uuid_v4(rng).simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_version_and_variant() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = generate_uuid_v4(&mut rng);
        let second = generate_uuid_v4(&mut rng);
        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 4);
        assert_eq!(first.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_same_seed_same_ids() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        for _ in 0..5 {
            assert_eq!(generate_uuid_v4(&mut a), generate_uuid_v4(&mut b));
        }
    }

    #[test]
    fn test_simple_form() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_uuid_simple(&mut rng);
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
