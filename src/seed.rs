//! Deterministic demo building: roster, synthetic daily readings and streaks.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use crate::config::{ConfigError, DemoConfig, VerdantConfig};
use crate::cpi::BillingPeriod;
use crate::ledger::CarbonLedger;
use crate::model::BuildingType::{Commercial as C, Residential as R};
use crate::model::{BuildingType, EnergyReading, Tenant, Unit};
use crate::store::{InMemoryStore, Repository};

struct RosterEntry {
    unit_id: &'static str,
    building_type: BuildingType,
    area: f64,
    occupancy: u32,
    medical: bool,
    baseline_kg: f64,
    /// `(tenant id, name, email, target CPI)`; `None` for a vacant unit.
    tenant: Option<(&'static str, &'static str, &'static str, u8)>,
}

const fn slot(
    unit_id: &'static str,
    building_type: BuildingType,
    area: f64,
    occupancy: u32,
    medical: bool,
    baseline_kg: f64,
    tenant: Option<(&'static str, &'static str, &'static str, u8)>,
) -> RosterEntry {
    RosterEntry {
        unit_id,
        building_type,
        area,
        occupancy,
        medical,
        baseline_kg,
        tenant,
    }
}

#[rustfmt::skip]
const ROSTER: [RosterEntry; 30] = [
    slot("unit_101", R, 600.0, 1, false, 200.0, Some(("tenant_01", "Alex Johnson", "alex@example.com", 92))),
    slot("unit_204", R, 950.0, 3, true, 450.0, Some(("tenant_04", "Emma Wilson", "emma@example.com", 100))),
    slot("unit_401", R, 700.0, 2, false, 280.0, Some(("tenant_09", "Robert Lee", "robert@example.com", 98))),
    slot("unit_102", R, 800.0, 2, false, 320.0, Some(("tenant_02", "Sarah Chen", "sarah@example.com", 96))),
    slot("unit_302", R, 1100.0, 3, false, 420.0, Some(("tenant_08", "Maria Garcia", "maria@example.com", 95))),
    slot("unit_103", R, 650.0, 1, false, 190.0, Some(("tenant_03", "Mike Rodriguez", "mike@example.com", 93))),
    slot("unit_205", R, 850.0, 2, false, 300.0, Some(("tenant_05", "David Kim", "david@example.com", 91))),
    slot("unit_203", R, 900.0, 2, false, 360.0, Some(("tenant_06", "Lisa Park", "lisa@example.com", 88))),
    slot("unit_301", C, 1200.0, 4, false, 550.0, Some(("tenant_07", "James Taylor", "james@example.com", 85))),
    slot("unit_402", C, 1000.0, 3, false, 480.0, Some(("tenant_10", "Jennifer Brown", "jennifer@example.com", 82))),
    slot("unit_501", R, 750.0, 2, false, 250.0, Some(("tenant_11", "Chris Anderson", "chris@example.com", 78))),
    slot("unit_502", R, 550.0, 1, true, 180.0, Some(("tenant_12", "Patricia Martinez", "patricia@example.com", 76))),
    slot("unit_503", C, 850.0, 2, false, 380.0, Some(("tenant_13", "Kevin White", "kevin@example.com", 72))),
    slot("unit_504", R, 680.0, 2, false, 270.0, Some(("tenant_14", "Amanda Thompson", "amanda@example.com", 68))),
    slot("unit_505", C, 1050.0, 3, false, 400.0, Some(("tenant_15", "Daniel Harris", "daniel@example.com", 65))),
    slot("unit_506", R, 920.0, 3, true, 420.0, Some(("tenant_16", "Michelle Clark", "michelle@example.com", 62))),
    slot("unit_507", R, 580.0, 1, false, 170.0, Some(("tenant_17", "Ryan Lewis", "ryan@example.com", 55))),
    slot("unit_508", C, 950.0, 4, false, 440.0, Some(("tenant_18", "Nicole Walker", "nicole@example.com", 45))),
    slot("unit_509", R, 780.0, 2, false, 310.0, Some(("tenant_19", "Brandon Hall", "brandon@example.com", 35))),
    slot("unit_510", C, 1150.0, 5, false, 520.0, Some(("tenant_20", "Stephanie Allen", "stephanie@example.com", 28))),
    slot("unit_511", R, 650.0, 1, false, 200.0, None),
    slot("unit_512", R, 800.0, 2, false, 300.0, None),
    slot("unit_513", C, 900.0, 2, false, 350.0, None),
    slot("unit_514", R, 720.0, 2, false, 260.0, None),
    slot("unit_515", C, 1100.0, 4, false, 480.0, None),
    slot("unit_516", R, 580.0, 1, false, 190.0, None),
    slot("unit_517", R, 850.0, 3, true, 400.0, None),
    slot("unit_518", C, 980.0, 3, false, 420.0, None),
    slot("unit_519", R, 690.0, 2, false, 250.0, None),
    slot("unit_520", C, 1050.0, 4, false, 460.0, None),
];

/// Usage percentage that the plateau formula maps to `score`.
fn usage_for_score(score: u8) -> f64 {
    if score >= 100 {
        50.0
    } else {
        (200.0 - f64::from(score)) / 2.0
    }
}

/// Seeded generator for the demo building.
pub struct Seeder {
    config: DemoConfig,
    rng: StdRng,
}

impl Seeder {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            config: config.clone(),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Units and tenants of the demo building. Quotas are `baseline * quota_factor`
    /// rounded to cents.
    pub fn roster(&self) -> (Vec<Unit>, Vec<Tenant>) {
        let mut units = Vec::with_capacity(ROSTER.len());
        let mut tenants = Vec::new();
        for e in &ROSTER {
            let quota = (e.baseline_kg * self.config.quota_factor * 100.0).round() / 100.0;
            units.push(
                Unit::new(
                    e.unit_id,
                    self.config.building_id.as_str(),
                    e.area,
                    e.occupancy,
                    e.baseline_kg,
                )
                .with_quota(quota)
                .with_building_type(e.building_type)
                .with_medical_accommodation(e.medical),
            );
            if let Some((id, name, email, _)) = e.tenant {
                tenants.push(Tenant::new(id, e.unit_id, name, email));
            }
        }
        (units, tenants)
    }

    /// Daily readings for the configured month and the month before it.
    ///
    /// Each tenanted unit's in-month emissions are sized so the plateau
    /// formula yields its target score. Vacant units get no readings.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `demo.year`/`demo.month` is not a valid month
    /// or the intensity range is empty.
    pub fn readings(&mut self, units: &[Unit]) -> Result<Vec<EnergyReading>, ConfigError> {
        let (lo, hi) = (self.config.intensity_min, self.config.intensity_max);
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo < hi) {
            return Err(ConfigError {
                field: "demo.intensity_max".to_string(),
                message: format!("intensity range [{lo}, {hi}) is empty or not positive"),
            });
        }
        let scored = NaiveDate::from_ymd_opt(self.config.year, self.config.month, 1)
            .ok_or_else(|| ConfigError {
                field: "demo.month".to_string(),
                message: format!("{}-{} is not a valid month", self.config.year, self.config.month),
            })?;
        let previous = scored
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| ConfigError {
                field: "demo.year".to_string(),
                message: "no month precedes the configured month".to_string(),
            })?;

        let mut readings = Vec::new();
        for (entry, unit) in ROSTER.iter().zip(units) {
            let Some((_, _, _, score)) = entry.tenant else {
                continue;
            };
            let prior_kg = unit.baseline_emissions_kg * self.rng.random_range(0.8..1.0);
            readings.extend(self.month_readings(&unit.id, previous, prior_kg));

            let target_kg = unit.target_emissions_kg() * usage_for_score(score) / 100.0;
            readings.extend(self.month_readings(&unit.id, scored, target_kg));
        }
        Ok(readings)
    }

    /// One reading per day of the month starting at `first`, totalling `emissions_kg`
    /// under the mean-intensity aggregation.
    fn month_readings(
        &mut self,
        unit_id: &str,
        first: NaiveDate,
        emissions_kg: f64,
    ) -> Vec<EnergyReading> {
        let start = first.and_time(NaiveTime::MIN).and_utc();
        let days = BillingPeriod::containing(start).days() as usize;
        let (lo, hi) = (self.config.intensity_min, self.config.intensity_max);

        let intensities: Vec<f64> = (0..days).map(|_| self.rng.random_range(lo..hi)).collect();
        let weights: Vec<f64> = (0..days).map(|_| self.rng.random_range(0.6..1.4)).collect();
        let mean_intensity = intensities.iter().sum::<f64>() / days as f64;
        let total_kwh = emissions_kg / mean_intensity;
        let weight_sum: f64 = weights.iter().sum();

        first
            .iter_days()
            .take(days)
            .zip(intensities.iter().zip(&weights))
            .map(|(date, (&intensity, &w))| {
                EnergyReading::new(
                    unit_id,
                    date.and_time(NaiveTime::MIN).and_utc(),
                    total_kwh * w / weight_sum,
                    intensity,
                )
            })
            .collect()
    }

    /// Randomizes streaks from current scores: 5-19 days at CPI 70 and
    /// above, otherwise 0-4.
    pub fn assign_streaks(&mut self, tenants: &mut [Tenant], units: &[Unit]) {
        for tenant in tenants.iter_mut() {
            let score = units
                .iter()
                .find(|u| u.id == tenant.unit_id)
                .map_or(0, |u| u.performance_score);
            tenant.reward_state.streak_days = if score >= 70 {
                self.rng.random_range(5..=19)
            } else {
                self.rng.random_range(0..=4)
            };
        }
    }
}

/// Builds a scored ledger over the demo building.
///
/// Readings are generated, every unit is recomputed at `now` and tenant
/// streaks are assigned from the resulting scores.
///
/// # Errors
///
/// Returns the first `validate()` error, or a `ConfigError` if the demo
/// month is invalid.
pub fn demo_ledger(
    config: &VerdantConfig,
    now: DateTime<Utc>,
) -> Result<CarbonLedger<InMemoryStore>, ConfigError> {
    if let Some(err) = config.validate().into_iter().next() {
        return Err(err);
    }
    let mut seeder = Seeder::new(&config.demo);
    let (units, tenants) = seeder.roster();
    let readings = seeder.readings(&units)?;
    info!(
        building = %config.demo.building_id,
        units = units.len(),
        tenants = tenants.len(),
        readings = readings.len(),
        "seeded demo building"
    );

    let mut ledger = CarbonLedger::new(InMemoryStore::new(units, tenants, readings), config);
    ledger.recompute_at(now);
    let (tenants, units) = ledger.repository_mut().tenants_and_units_mut();
    seeder.assign_streaks(tenants, units);
    Ok(ledger)
}
