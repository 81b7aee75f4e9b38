use crate::model::{EnergyReading, Tenant, Unit};

use super::{ReadingFilter, Repository, UnitFilter};

/// Volatile vector-backed repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    units: Vec<Unit>,
    tenants: Vec<Tenant>,
    readings: Vec<EnergyReading>,
}

impl InMemoryStore {
    pub fn new(units: Vec<Unit>, tenants: Vec<Tenant>, readings: Vec<EnergyReading>) -> Self {
        Self {
            units,
            tenants,
            readings,
        }
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }
}

impl Repository for InMemoryStore {
    fn find_units(&self, filter: &UnitFilter) -> Vec<&Unit> {
        self.units.iter().filter(|u| filter.matches(u)).collect()
    }

    fn find_unit(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    fn find_unit_mut(&mut self, id: &str) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    fn find_readings(&self, filter: &ReadingFilter) -> Vec<&EnergyReading> {
        self.readings.iter().filter(|r| filter.matches(r)).collect()
    }

    fn all_readings(&self) -> &[EnergyReading] {
        &self.readings
    }

    fn insert_readings(&mut self, readings: Vec<EnergyReading>) {
        self.readings.extend(readings);
    }

    fn find_tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    fn find_tenant_mut(&mut self, id: &str) -> Option<&mut Tenant> {
        self.tenants.iter_mut().find(|t| t.id == id)
    }

    fn find_tenant_by_unit(&self, unit_id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.unit_id == unit_id)
    }

    fn units_and_readings_mut(&mut self) -> (&mut [Unit], &[EnergyReading]) {
        (&mut self.units, &self.readings)
    }

    fn tenants_and_units_mut(&mut self) -> (&mut [Tenant], &[Unit]) {
        (&mut self.tenants, &self.units)
    }
}
