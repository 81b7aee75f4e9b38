//! Rentable units and the landlord-facing quota edit payload.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::cpi::score::{resolve_target, usage_vs_quota_pct};

/// Occupancy class of a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingType {
    #[default]
    Residential,
    Commercial,
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Residential => write!(f, "Residential"),
            Self::Commercial => write!(f, "Commercial"),
        }
    }
}

/// A rentable unit together with its cached period score.
///
/// `current_period_emissions_kg`, `performance_score`, `discount_fraction`
/// and `last_updated_at` are derived fields owned by the batch processor and
/// are overwritten together on every recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub building_id: String,
    #[serde(default)]
    pub building_type: BuildingType,
    /// Floor area (sq ft).
    pub floor_area: f64,
    pub occupancy_count: u32,
    /// Medical accommodation raises the occupancy factor by 1.5x.
    #[serde(default)]
    pub medical_accommodation: bool,
    /// Historical reference emissions (kg CO₂e per period).
    pub baseline_emissions_kg: f64,
    /// Landlord override for the scoring target.
    #[serde(default)]
    pub quota_emissions_kg: Option<f64>,
    #[serde(default)]
    pub current_period_emissions_kg: f64,
    /// CPI in `[0, 100]`.
    #[serde(default)]
    pub performance_score: u8,
    #[serde(default)]
    pub discount_fraction: f64,
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Unit {
    /// Creates an unscored unit with no quota override.
    pub fn new(
        id: impl Into<String>,
        building_id: impl Into<String>,
        floor_area: f64,
        occupancy_count: u32,
        baseline_emissions_kg: f64,
    ) -> Self {
        Self {
            id: id.into(),
            building_id: building_id.into(),
            building_type: BuildingType::default(),
            floor_area,
            occupancy_count,
            medical_accommodation: false,
            baseline_emissions_kg,
            quota_emissions_kg: None,
            current_period_emissions_kg: 0.0,
            performance_score: 0,
            discount_fraction: 0.0,
            last_updated_at: None,
        }
    }

    pub fn with_quota(mut self, quota_kg: f64) -> Self {
        self.quota_emissions_kg = Some(quota_kg);
        self
    }

    pub fn with_medical_accommodation(mut self, flag: bool) -> Self {
        self.medical_accommodation = flag;
        self
    }

    pub fn with_building_type(mut self, building_type: BuildingType) -> Self {
        self.building_type = building_type;
        self
    }

    /// Scoring target: the quota when present and positive, else the baseline.
    pub fn target_emissions_kg(&self) -> f64 {
        resolve_target(self.baseline_emissions_kg, self.quota_emissions_kg)
    }

    /// Current period emissions as a percentage of the target, rounded to 0.1.
    pub fn usage_vs_quota_pct(&self) -> f64 {
        usage_vs_quota_pct(self.current_period_emissions_kg, self.target_emissions_kg())
    }
}

/// Landlord edit to a unit's scoring inputs.
///
/// `quota` distinguishes three states: absent (leave untouched), `null`
/// (clear the override and fall back to baseline) and a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuotaUpdate {
    #[serde(default, deserialize_with = "present")]
    pub quota: Option<Option<f64>>,
    #[serde(default, alias = "medicalFlag")]
    pub medical_accommodation: Option<bool>,
}

impl QuotaUpdate {
    pub fn set_quota(quota_kg: f64) -> Self {
        Self {
            quota: Some(Some(quota_kg)),
            medical_accommodation: None,
        }
    }

    pub fn clear_quota() -> Self {
        Self {
            quota: Some(None),
            medical_accommodation: None,
        }
    }

    /// Applies the edit to `unit`. Derived fields are left for the caller to rescore.
    pub fn apply(&self, unit: &mut Unit) {
        if let Some(quota) = self.quota {
            unit.quota_emissions_kg = quota;
        }
        if let Some(flag) = self.medical_accommodation {
            unit.medical_accommodation = flag;
        }
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
