//! Post-hoc building and unit views derived from scored units.

use std::fmt;

use serde::Serialize;

use super::discount::{DiscountTier, TierSchedule};
use crate::model::{BuildingType, EnergyReading, Tenant, Unit};

/// Aggregate indicators for one building after a recompute.
///
/// Computed from the scored units and the building's in-period readings so
/// report figures always agree with the unit records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingReport {
    pub building_id: String,
    pub total_units: usize,
    /// Sum of per-reading emissions in the active period (kg CO₂e).
    pub total_co2e_this_period: f64,
    /// Sum of unit `current_period_emissions_kg` (kg CO₂e).
    pub total_unit_emissions_kg: f64,
    /// Mean CPI, rounded to one decimal.
    pub average_cpi: f64,
    /// Units per tier, best first.
    pub tier_counts: [usize; 4],
}

impl BuildingReport {
    /// Builds the report.
    ///
    /// # Arguments
    ///
    /// * `building_id` - Building the units belong to
    /// * `units` - Scored units of the building
    /// * `period_readings` - The building's readings within the active period
    /// * `tiers` - Schedule used to bucket scores
    pub fn from_units<'a>(
        building_id: &str,
        units: &[&Unit],
        period_readings: impl IntoIterator<Item = &'a EnergyReading>,
        tiers: TierSchedule,
    ) -> Self {
        let total_co2e_this_period = period_readings.into_iter().map(|r| r.emissions_kg()).sum();
        let total_unit_emissions_kg = units.iter().map(|u| u.current_period_emissions_kg).sum();

        let average_cpi = if units.is_empty() {
            0.0
        } else {
            let sum: f64 = units.iter().map(|u| f64::from(u.performance_score)).sum();
            (sum / units.len() as f64 * 10.0).round() / 10.0
        };

        let mut tier_counts = [0_usize; 4];
        for u in units {
            let idx = match tiers.tier_for(u.performance_score) {
                DiscountTier::Tier1 => 0,
                DiscountTier::Tier2 => 1,
                DiscountTier::Tier3 => 2,
                DiscountTier::None => 3,
            };
            tier_counts[idx] += 1;
        }

        Self {
            building_id: building_id.to_string(),
            total_units: units.len(),
            total_co2e_this_period,
            total_unit_emissions_kg,
            average_cpi,
            tier_counts,
        }
    }
}

impl fmt::Display for BuildingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Building Report: {} ---", self.building_id)?;
        writeln!(f, "Units:                 {}", self.total_units)?;
        writeln!(
            f,
            "Period CO2e:           {:.2} kg",
            self.total_co2e_this_period
        )?;
        writeln!(f, "Average CPI:           {:.1}", self.average_cpi)?;
        for (tier, count) in DiscountTier::ALL.iter().zip(self.tier_counts) {
            writeln!(f, "{:<22} {count}", format!("{}:", tier.label()))?;
        }
        Ok(())
    }
}

/// Compact per-unit entry of a building overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSummary {
    pub id: String,
    pub cpi: u8,
    pub current_kg_co2e: f64,
    pub baseline_kg_co2e: f64,
    pub discount: f64,
}

impl From<&Unit> for UnitSummary {
    fn from(u: &Unit) -> Self {
        Self {
            id: u.id.clone(),
            cpi: u.performance_score,
            current_kg_co2e: u.current_period_emissions_kg,
            baseline_kg_co2e: u.baseline_emissions_kg,
            discount: u.discount_fraction,
        }
    }
}

/// Tenant contact shown next to a unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantContact {
    pub name: String,
    pub email: String,
}

/// Landlord table row for one unit.
///
/// `quota_kg` is the resolved target, so rows for units without an override
/// show the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitRow {
    pub id: String,
    pub building_type: BuildingType,
    pub area: f64,
    pub occupancy: u32,
    pub medical_flag: bool,
    pub baseline_kg_co2e: f64,
    pub current_kg_co2e: f64,
    pub quota_kg: f64,
    pub usage_vs_quota_pct: f64,
    pub cpi: u8,
    pub discount: f64,
    pub discount_tier: DiscountTier,
    pub tenant: Option<TenantContact>,
}

impl UnitRow {
    pub fn new(unit: &Unit, tenant: Option<&Tenant>, tiers: TierSchedule) -> Self {
        Self {
            id: unit.id.clone(),
            building_type: unit.building_type,
            area: unit.floor_area,
            occupancy: unit.occupancy_count,
            medical_flag: unit.medical_accommodation,
            baseline_kg_co2e: unit.baseline_emissions_kg,
            current_kg_co2e: unit.current_period_emissions_kg,
            quota_kg: unit.target_emissions_kg(),
            usage_vs_quota_pct: unit.usage_vs_quota_pct(),
            cpi: unit.performance_score,
            discount: unit.discount_fraction,
            discount_tier: tiers.tier_for(unit.performance_score),
            tenant: tenant.map(|t| TenantContact {
                name: t.display_name.clone(),
                email: t.contact_email.clone(),
            }),
        }
    }
}

impl fmt::Display for UnitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenant = self.tenant.as_ref().map_or("-", |t| t.name.as_str());
        write!(
            f,
            "{:<9} | CPI={:>3}  used={:>7.2} / {:>7.2} kg ({:>5.1}%) | {:<13} | {}",
            self.id,
            self.cpi,
            self.current_kg_co2e,
            self.quota_kg,
            self.usage_vs_quota_pct,
            self.discount_tier.label(),
            tenant,
        )
    }
}
