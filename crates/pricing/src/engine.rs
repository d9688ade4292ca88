//! Price computation: base rate x urgency x pages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stackassign_core::{DomainError, DomainResult};

use crate::level::AcademicLevel;
use crate::quote::PriceQuote;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Urgency multiplier by days remaining until the deadline.
///
/// First match wins, descending thresholds. Negative values land in the
/// most-urgent band; whether a negative value is acceptable at all is the
/// caller's decision (order creation rejects it, mid-life repricing does not).
pub fn urgency_multiplier(days: i64) -> f64 {
    if days >= 14 {
        1.0
    } else if days >= 7 {
        1.3
    } else if days >= 3 {
        1.6
    } else if days >= 2 {
        2.2
    } else {
        3.0
    }
}

/// Days until `deadline`, as seen from `now`: `ceil((deadline - now) / 1 day)`.
///
/// "Now" is an explicit input so the engine itself stays referentially
/// transparent. Negative when the deadline has passed.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (deadline - now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Compute a price breakdown.
///
/// `total_price = round(rate * multiplier * pages)`, rounded to the nearest
/// whole rupee with halves away from zero (`f64::round`); the same rule is
/// used everywhere a price is derived.
pub fn compute_price(
    level: AcademicLevel,
    days_until_deadline: i64,
    pages: u32,
) -> DomainResult<PriceQuote> {
    if pages < 1 {
        return Err(DomainError::validation("at least 1 page is required"));
    }

    let price_per_page = level.base_rate();
    let urgency_multiplier = urgency_multiplier(days_until_deadline);

    Ok(PriceQuote {
        price_per_page,
        urgency_multiplier,
        pages,
        total_price: round_total(price_per_page, urgency_multiplier, pages),
    })
}

fn round_total(price_per_page: i64, multiplier: f64, pages: u32) -> i64 {
    (price_per_page as f64 * multiplier * pages as f64).round() as i64
}

/// One row of the public pricing table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTier {
    /// Days-remaining threshold this tier starts at.
    pub days: i64,
    pub label: &'static str,
    pub urgency_multiplier: f64,
    pub price_per_page: i64,
    pub total_price: i64,
}

/// The five standard deadline tiers for a level/pages pair.
pub fn quote_tiers(level: AcademicLevel, pages: u32) -> DomainResult<Vec<PriceTier>> {
    if pages < 1 {
        return Err(DomainError::validation("at least 1 page is required"));
    }

    const TIERS: [(i64, &str); 5] = [
        (14, "14+ days"),
        (7, "7-13 days"),
        (3, "3-6 days"),
        (2, "24-48 hours"),
        (1, "Under 24 hours"),
    ];

    let price_per_page = level.base_rate();
    Ok(TIERS
        .iter()
        .map(|&(days, label)| {
            let multiplier = urgency_multiplier(days);
            PriceTier {
                days,
                label,
                urgency_multiplier: multiplier,
                price_per_page,
                total_price: round_total(price_per_page, multiplier, pages),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn multiplier_boundaries() {
        let cases = [
            (14, 1.0),
            (13, 1.3),
            (7, 1.3),
            (6, 1.6),
            (3, 1.6),
            (2, 2.2),
            (1, 3.0),
            (0, 3.0),
            (-5, 3.0),
        ];
        for (days, expected) in cases {
            assert_eq!(urgency_multiplier(days), expected, "days={days}");
        }
    }

    #[test]
    fn bachelor_five_pages_two_weeks_out() {
        let quote = compute_price(AcademicLevel::Bachelor, 14, 5).unwrap();
        assert_eq!(quote.price_per_page, 350);
        assert_eq!(quote.urgency_multiplier, 1.0);
        assert_eq!(quote.total_price, 1750);
    }

    #[test]
    fn phd_two_pages_last_minute() {
        let quote = compute_price(AcademicLevel::Phd, 1, 2).unwrap();
        assert_eq!(quote.price_per_page, 750);
        assert_eq!(quote.urgency_multiplier, 3.0);
        assert_eq!(quote.total_price, 4500);
    }

    #[test]
    fn fractional_totals_round_to_nearest_rupee() {
        // 450 * 1.3 * 3 = 1755; 350 * 1.3 = 455. Both take a float detour
        // slightly off the exact value and must land back via rounding.
        let quote = compute_price(AcademicLevel::Master, 7, 3).unwrap();
        assert_eq!(quote.total_price, 1755);

        let quote = compute_price(AcademicLevel::Bachelor, 7, 1).unwrap();
        assert_eq!(quote.total_price, 455);
    }

    #[test]
    fn zero_pages_is_a_validation_error() {
        let err = compute_price(AcademicLevel::Bachelor, 14, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn days_until_rounds_up_partial_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(days_until(now + Duration::days(14), now), 14);
        assert_eq!(days_until(now + Duration::hours(1), now), 1);
        assert_eq!(days_until(now + Duration::milliseconds(500), now), 1);
        assert_eq!(days_until(now, now), 0);
        assert_eq!(days_until(now - Duration::hours(1), now), 0);
        assert_eq!(days_until(now - Duration::days(2), now), -2);
        assert_eq!(
            days_until(now - Duration::days(2) - Duration::hours(1), now),
            -2
        );
    }

    #[test]
    fn tier_table_covers_all_five_bands() {
        let tiers = quote_tiers(AcademicLevel::HighSchool, 4).unwrap();
        assert_eq!(tiers.len(), 5);
        assert_eq!(tiers[0].total_price, 1000);
        assert_eq!(tiers[4].urgency_multiplier, 3.0);
        assert_eq!(tiers[4].total_price, 3000);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_level() -> impl Strategy<Value = AcademicLevel> {
            prop::sample::select(AcademicLevel::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn compute_price_is_deterministic(
                level in any_level(),
                days in -60i64..365,
                pages in 1u32..500,
            ) {
                let a = compute_price(level, days, pages).unwrap();
                let b = compute_price(level, days, pages).unwrap();
                prop_assert_eq!(a, b);
            }

            #[test]
            fn total_is_monotonic_in_pages(
                level in any_level(),
                days in -60i64..365,
                pages in 1u32..499,
            ) {
                let smaller = compute_price(level, days, pages).unwrap();
                let larger = compute_price(level, days, pages + 1).unwrap();
                prop_assert!(larger.total_price >= smaller.total_price);
            }

            #[test]
            fn multiplier_never_increases_with_more_time(days in -60i64..365) {
                prop_assert!(urgency_multiplier(days) >= urgency_multiplier(days + 1));
            }

            #[test]
            fn totals_are_positive(
                level in any_level(),
                days in -60i64..365,
                pages in 1u32..500,
            ) {
                prop_assert!(compute_price(level, days, pages).unwrap().total_price > 0);
            }
        }
    }
}
