//! Propagation of unit discounts onto tenant reward state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Tenant, Unit};

/// Badge thresholds, best first.
const BADGES: [(u8, &str); 3] = [
    (90, "Eco Champion"),
    (70, "Green Warrior"),
    (50, "Eco Explorer"),
];

/// Parameters of the lifetime savings estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub monthly_rent_usd: f64,
    /// Months the current discount is assumed to have applied.
    pub months: u32,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            monthly_rent_usd: 2000.0,
            months: 3,
        }
    }
}

impl RewardPolicy {
    /// Savings estimate for a discount fraction, rounded to cents.
    pub fn saved_estimate(&self, discount_fraction: f64) -> f64 {
        let raw = discount_fraction * self.monthly_rent_usd * f64::from(self.months);
        (raw * 100.0).round() / 100.0
    }
}

/// Badge labels earned at a score. Empty below the lowest threshold.
pub fn badges_for_score(score: u8) -> Vec<String> {
    BADGES
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, label)| vec![(*label).to_string()])
        .unwrap_or_default()
}

/// Refreshes one tenant from its unit.
pub fn sync_tenant(tenant: &mut Tenant, unit: &Unit, policy: &RewardPolicy) {
    let rewards = &mut tenant.reward_state;
    rewards.current_discount = unit.discount_fraction;
    rewards.lifetime_saved_estimate = policy.saved_estimate(unit.discount_fraction);
    rewards.badges = badges_for_score(unit.performance_score);
}

/// Refreshes every tenant whose unit exists. Returns the number synced.
///
/// Tenants referencing unknown units are left untouched.
pub fn sync_rewards(tenants: &mut [Tenant], units: &[Unit], policy: &RewardPolicy) -> usize {
    let by_id: HashMap<&str, &Unit> = units.iter().map(|u| (u.id.as_str(), u)).collect();
    let mut synced = 0;
    for tenant in tenants.iter_mut() {
        if let Some(unit) = by_id.get(tenant.unit_id.as_str()) {
            sync_tenant(tenant, unit, policy);
            synced += 1;
        }
    }
    synced
}
