use serde::{Deserialize, Serialize};

use stackassign_core::ValueObject;

/// Currency all prices are quoted in.
pub const CURRENCY: &str = "INR";

/// Immutable price breakdown for one (level, urgency, pages) computation.
///
/// `total_price` is a whole-rupee amount; recomputing with identical inputs
/// yields an identical quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Per-page rate in INR, looked up by academic level.
    pub price_per_page: i64,
    /// Deadline-driven scaling factor, always >= 1.0.
    pub urgency_multiplier: f64,
    /// Page count the quote was computed for.
    pub pages: u32,
    /// round(price_per_page * urgency_multiplier * pages), in INR.
    pub total_price: i64,
}

impl ValueObject for PriceQuote {}
