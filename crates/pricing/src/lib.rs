//! `stackassign-pricing` — pure price computation.
//!
//! Maps (academic level, days until deadline, page count) to a price
//! breakdown. No IO, no clocks: "now" is always an explicit argument of the
//! caller-side [`days_until`] helper, never read inside the engine.

pub mod engine;
pub mod level;
pub mod quote;

pub use engine::{compute_price, days_until, quote_tiers, urgency_multiplier, PriceTier};
pub use level::{AcademicLevel, FALLBACK_LEVEL};
pub use quote::{PriceQuote, CURRENCY};
