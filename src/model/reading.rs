use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cpi::emissions::compute_emissions;

/// A single metered energy sample for one unit.
///
/// `emissions_kg` is derived once at construction from consumption and grid
/// intensity. Fields are read-only; deserialized readings re-derive their
/// emissions and ignore any supplied value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReadingRecord")]
pub struct EnergyReading {
    unit_id: String,
    timestamp: DateTime<Utc>,
    energy_consumed_kwh: f64,
    grid_carbon_intensity: f64,
    emissions_kg: f64,
}

/// Wire form of a reading; emissions are never taken from input.
#[derive(Deserialize)]
struct ReadingRecord {
    unit_id: String,
    timestamp: DateTime<Utc>,
    energy_consumed_kwh: f64,
    grid_carbon_intensity: f64,
}

impl From<ReadingRecord> for EnergyReading {
    fn from(r: ReadingRecord) -> Self {
        Self::new(
            r.unit_id,
            r.timestamp,
            r.energy_consumed_kwh,
            r.grid_carbon_intensity,
        )
    }
}

impl EnergyReading {
    /// Creates a reading and derives its emissions.
    pub fn new(
        unit_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        energy_consumed_kwh: f64,
        grid_carbon_intensity: f64,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            timestamp,
            energy_consumed_kwh,
            grid_carbon_intensity,
            emissions_kg: compute_emissions(energy_consumed_kwh, grid_carbon_intensity),
        }
    }

    /// Identifier of the unit this sample belongs to.
    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    /// Sample time (UTC).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Energy consumed over the sample interval (kWh).
    pub fn energy_consumed_kwh(&self) -> f64 {
        self.energy_consumed_kwh
    }

    /// Grid carbon intensity at sample time (kg CO₂e per kWh).
    pub fn grid_carbon_intensity(&self) -> f64 {
        self.grid_carbon_intensity
    }

    /// Carbon-equivalent mass for this sample (kg CO₂e).
    pub fn emissions_kg(&self) -> f64 {
        self.emissions_kg
    }
}
