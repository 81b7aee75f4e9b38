//! Plain records consumed and produced by the scoring core.

/// Metered energy samples.
pub mod reading;
/// Tenants and their reward state.
pub mod tenant;
pub mod unit;

// Re-export the main types for convenience
pub use reading::EnergyReading;
pub use tenant::{RewardState, Tenant};
pub use unit::{BuildingType, QuotaUpdate, Unit};
