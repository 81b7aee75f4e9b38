//! Synchronous repository over units, tenants and readings.

mod memory;

use chrono::{DateTime, Utc};

pub use memory::InMemoryStore;

use crate::model::{EnergyReading, Tenant, Unit};

/// Unit query. An empty filter matches every unit.
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub building_id: Option<String>,
}

impl UnitFilter {
    pub fn building(building_id: impl Into<String>) -> Self {
        Self {
            building_id: Some(building_id.into()),
        }
    }

    pub fn matches(&self, unit: &Unit) -> bool {
        self.building_id
            .as_deref()
            .is_none_or(|b| unit.building_id == b)
    }
}

/// Reading query over unit ids and a lower time bound.
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    /// Matches readings of any of these units.
    pub unit_ids: Option<Vec<String>>,
    /// Inclusive lower bound.
    pub since: Option<DateTime<Utc>>,
}

impl ReadingFilter {
    pub fn unit(unit_id: impl Into<String>) -> Self {
        Self {
            unit_ids: Some(vec![unit_id.into()]),
            since: None,
        }
    }

    pub fn units<I, S>(unit_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unit_ids: Some(unit_ids.into_iter().map(Into::into).collect()),
            since: None,
        }
    }

    pub fn since(mut self, ts: DateTime<Utc>) -> Self {
        self.since = Some(ts);
        self
    }

    pub fn matches(&self, reading: &EnergyReading) -> bool {
        let unit_ok = self
            .unit_ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| *id == reading.unit_id()));
        let time_ok = self.since.is_none_or(|since| reading.timestamp() >= since);
        unit_ok && time_ok
    }
}

/// Data access consumed by the ledger.
///
/// Query methods return matches in insertion order.
pub trait Repository {
    fn find_units(&self, filter: &UnitFilter) -> Vec<&Unit>;

    fn find_unit(&self, id: &str) -> Option<&Unit>;

    fn find_unit_mut(&mut self, id: &str) -> Option<&mut Unit>;

    fn find_readings(&self, filter: &ReadingFilter) -> Vec<&EnergyReading>;

    /// Every reading, in insertion order.
    fn all_readings(&self) -> &[EnergyReading];

    fn insert_readings(&mut self, readings: Vec<EnergyReading>);

    fn find_tenant(&self, id: &str) -> Option<&Tenant>;

    fn find_tenant_mut(&mut self, id: &str) -> Option<&mut Tenant>;

    fn find_tenant_by_unit(&self, unit_id: &str) -> Option<&Tenant>;

    /// Mutable units alongside the readings, for a full recompute pass.
    fn units_and_readings_mut(&mut self) -> (&mut [Unit], &[EnergyReading]);

    /// Mutable tenants alongside the units, for reward sync.
    fn tenants_and_units_mut(&mut self) -> (&mut [Tenant], &[Unit]);
}
