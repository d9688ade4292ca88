//! Order number generation.
//!
//! Format: `SA-<base36 millis timestamp>-<4 base36 random chars>`, uppercase.
//! Not unique by construction — rapid concurrent calls can collide on the
//! timestamp — so storage-level reservation is the actual guarantee and
//! generation is only "practically unique".

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "SA";

const SUFFIX_LEN: usize = 4;
const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Short, sortable, customer-facing order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Wrap an already-generated number (rehydration, wire input).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh number from an explicit clock and rng.
    ///
    /// Both inputs are explicit so tests can pin the output.
    pub fn generate(now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let timestamp = base36(now.timestamp_millis().max(0) as u64);
        let mut suffix = String::with_capacity(SUFFIX_LEN);
        for _ in 0..SUFFIX_LEN {
            let idx = rng.gen_range(0..BASE36_DIGITS.len());
            suffix.push(BASE36_DIGITS[idx] as char);
        }
        Self(format!("{ORDER_NUMBER_PREFIX}-{timestamp}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn base36_encodes_expected_digits() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn generated_number_has_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let number = OrderNumber::generate(test_now(), &mut rng);

        let parts: Vec<&str> = number.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], ORDER_NUMBER_PREFIX);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(number
            .as_str()
            .chars()
            .all(|c| c == '-' || c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn timestamp_component_is_deterministic_for_a_fixed_clock() {
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);

        let a = OrderNumber::generate(test_now(), &mut rng_a);
        let b = OrderNumber::generate(test_now(), &mut rng_b);

        let ts = |n: &OrderNumber| n.as_str().split('-').nth(1).unwrap().to_string();
        assert_eq!(ts(&a), ts(&b));
    }

    #[test]
    fn later_clocks_sort_after_earlier_ones() {
        let mut rng = StdRng::seed_from_u64(7);
        let earlier = OrderNumber::generate(test_now(), &mut rng);
        let later = OrderNumber::generate(test_now() + chrono::Duration::days(30), &mut rng);

        // Same-width base36 timestamps sort lexicographically.
        assert!(later.as_str() > earlier.as_str());
    }
}
