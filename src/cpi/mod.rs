//! Carbon Performance Index computation and discount tiering.

/// Period aggregation and in-place rescoring.
pub mod batch;
pub mod discount;
/// Energy-to-carbon conversion.
pub mod emissions;
/// Billing period boundaries.
pub mod period;
pub mod report;
/// Tenant reward propagation.
pub mod rewards;
pub mod score;

pub use batch::{BatchProcessor, RecomputeSummary, recompute_all, recompute_one};
pub use discount::{DiscountTier, TierSchedule, discount_for_score};
pub use emissions::compute_emissions;
pub use period::BillingPeriod;
pub use score::{Scoring, ScoringStrategy, compute_score};
