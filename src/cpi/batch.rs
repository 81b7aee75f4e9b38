//! Period aggregation and in-place rescoring of unit collections.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::discount::TierSchedule;
use super::emissions::compute_emissions;
use super::period::BillingPeriod;
use super::score::{PlateauScoring, ScoringStrategy};
use crate::model::{EnergyReading, Unit};

/// Grid intensity assumed for a unit with no in-period readings (kg CO₂e/kWh).
pub const DEFAULT_GRID_INTENSITY: f64 = 0.42;

/// Per-unit totals over one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodAggregate {
    /// Sum of consumption (kWh).
    pub total_kwh: f64,
    /// Arithmetic mean of reading intensities.
    pub mean_intensity: f64,
    /// `total_kwh * mean_intensity` (kg CO₂e).
    pub emissions_kg: f64,
    pub reading_count: usize,
}

/// Aggregates readings in iteration order.
///
/// With no readings, consumption is zero and the intensity falls back to
/// `default_intensity`.
pub fn aggregate<'a>(
    readings: impl IntoIterator<Item = &'a EnergyReading>,
    default_intensity: f64,
) -> PeriodAggregate {
    let mut total_kwh = 0.0;
    let mut intensity_sum = 0.0;
    let mut reading_count = 0_usize;
    for r in readings {
        total_kwh += r.energy_consumed_kwh();
        intensity_sum += r.grid_carbon_intensity();
        reading_count += 1;
    }
    let mean_intensity = if reading_count > 0 {
        intensity_sum / reading_count as f64
    } else {
        default_intensity
    };
    PeriodAggregate {
        total_kwh,
        mean_intensity,
        emissions_kg: compute_emissions(total_kwh, mean_intensity),
        reading_count,
    }
}

/// Groups in-period readings by unit id, preserving input order within each group.
pub fn group_by_unit<'a>(
    readings: &'a [EnergyReading],
    period: &BillingPeriod,
) -> HashMap<&'a str, Vec<&'a EnergyReading>> {
    let mut groups: HashMap<&str, Vec<&EnergyReading>> = HashMap::new();
    for r in readings.iter().filter(|r| period.contains(r.timestamp())) {
        groups.entry(r.unit_id()).or_default().push(r);
    }
    groups
}

/// Outcome of one full recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecomputeSummary {
    pub period: BillingPeriod,
    pub units_scored: usize,
    pub readings_in_period: usize,
    /// In-period readings whose unit id matched no unit.
    pub orphan_readings: usize,
}

/// Rescores units from readings with a fixed strategy and tier schedule.
///
/// Generic over `S: ScoringStrategy` for static dispatch.
#[derive(Debug, Clone)]
pub struct BatchProcessor<S: ScoringStrategy> {
    strategy: S,
    tiers: TierSchedule,
    default_intensity: f64,
}

impl Default for BatchProcessor<PlateauScoring> {
    fn default() -> Self {
        Self::new(
            PlateauScoring,
            TierSchedule::Current,
            DEFAULT_GRID_INTENSITY,
        )
    }
}

impl<S: ScoringStrategy> BatchProcessor<S> {
    /// Creates a processor.
    ///
    /// # Arguments
    ///
    /// * `strategy` - Score formula
    /// * `tiers` - Score-to-discount schedule
    /// * `default_intensity` - Intensity used for units without readings
    pub fn new(strategy: S, tiers: TierSchedule, default_intensity: f64) -> Self {
        Self {
            strategy,
            tiers,
            default_intensity,
        }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn tiers(&self) -> TierSchedule {
        self.tiers
    }

    /// Recomputes every unit against one global billing period.
    ///
    /// The period is the month of the latest reading in `readings` (or of
    /// `now` if empty). Readings for unknown units are ignored; units with
    /// no in-period readings are scored on zero emissions.
    pub fn recompute_all(
        &self,
        units: &mut [Unit],
        readings: &[EnergyReading],
        now: DateTime<Utc>,
    ) -> RecomputeSummary {
        let period = BillingPeriod::active(readings, now);
        let groups = group_by_unit(readings, &period);
        let readings_in_period: usize = groups.values().map(Vec::len).sum();

        let mut matched = 0_usize;
        for unit in units.iter_mut() {
            let group = groups.get(unit.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            matched += group.len();
            let agg = aggregate(group.iter().copied(), self.default_intensity);
            self.apply(unit, &agg, now);
        }

        RecomputeSummary {
            period,
            units_scored: units.len(),
            readings_in_period,
            orphan_readings: readings_in_period - matched,
        }
    }

    /// Recomputes a single unit against a given period start.
    ///
    /// Produces the same derived fields as [`Self::recompute_all`] would for
    /// this unit when both use the same period.
    pub fn recompute_one(
        &self,
        unit: &mut Unit,
        readings: &[EnergyReading],
        period_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PeriodAggregate {
        let agg = aggregate(
            readings
                .iter()
                .filter(|r| r.unit_id() == unit.id && r.timestamp() >= period_start),
            self.default_intensity,
        );
        self.apply(unit, &agg, now);
        agg
    }

    // All derived fields are written together.
    fn apply(&self, unit: &mut Unit, agg: &PeriodAggregate, now: DateTime<Utc>) {
        let score = self.strategy.score(unit, agg.emissions_kg);
        unit.current_period_emissions_kg = agg.emissions_kg;
        unit.performance_score = score;
        unit.discount_fraction = self.tiers.discount_for(score);
        unit.last_updated_at = Some(now);
    }
}

/// Recomputes all units with the plateau formula and 90/70/50 tiers.
pub fn recompute_all(
    units: &mut [Unit],
    readings: &[EnergyReading],
    now: DateTime<Utc>,
) -> RecomputeSummary {
    BatchProcessor::default().recompute_all(units, readings, now)
}

/// Recomputes one unit with the plateau formula and 90/70/50 tiers.
pub fn recompute_one(
    unit: &mut Unit,
    readings: &[EnergyReading],
    period_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> PeriodAggregate {
    BatchProcessor::default().recompute_one(unit, readings, period_start, now)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::cpi::score::{ImprovementScoring, Scoring};

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        ts(2025, 2, 28)
    }

    #[test]
    fn aggregate_empty_uses_default_intensity() {
        let agg = aggregate(std::iter::empty(), DEFAULT_GRID_INTENSITY);
        assert_eq!(agg.total_kwh, 0.0);
        assert_eq!(agg.mean_intensity, 0.42);
        assert_eq!(agg.emissions_kg, 0.0);
        assert_eq!(agg.reading_count, 0);
    }

    #[test]
    fn aggregate_uses_mean_intensity_not_per_reading_emissions() {
        let readings = [
            EnergyReading::new("u", ts(2025, 2, 1), 100.0, 0.2),
            EnergyReading::new("u", ts(2025, 2, 2), 300.0, 0.6),
        ];
        let agg = aggregate(readings.iter(), DEFAULT_GRID_INTENSITY);
        assert_eq!(agg.total_kwh, 400.0);
        assert!((agg.mean_intensity - 0.4).abs() < 1e-12);
        // 400 * 0.4 = 160, not 20 + 180 = 200.
        assert!((agg.emissions_kg - 160.0).abs() < 1e-9);
    }

    #[test]
    fn group_by_unit_filters_to_period() {
        let readings = vec![
            EnergyReading::new("a", ts(2025, 1, 31), 5.0, 0.4),
            EnergyReading::new("a", ts(2025, 2, 1), 1.0, 0.4),
            EnergyReading::new("b", ts(2025, 2, 3), 2.0, 0.4),
            EnergyReading::new("a", ts(2025, 2, 4), 3.0, 0.4),
        ];
        let period = BillingPeriod::containing(ts(2025, 2, 10));
        let groups = group_by_unit(&readings, &period);
        assert_eq!(groups.len(), 2);
        let a: Vec<f64> = groups["a"].iter().map(|r| r.energy_consumed_kwh()).collect();
        assert_eq!(a, vec![1.0, 3.0]);
        assert_eq!(groups["b"].len(), 1);
    }

    #[test]
    fn recompute_all_writes_all_derived_fields() {
        let mut units = vec![Unit::new("u1", "b1", 600.0, 1, 200.0).with_quota(180.0)];
        // 99 kg at a constant 0.45 intensity is 220 kWh.
        let readings = vec![
            EnergyReading::new("u1", ts(2025, 2, 1), 120.0, 0.45),
            EnergyReading::new("u1", ts(2025, 2, 2), 100.0, 0.45),
        ];
        let summary = recompute_all(&mut units, &readings, now());

        let u = &units[0];
        assert!((u.current_period_emissions_kg - 99.0).abs() < 1e-9);
        assert_eq!(u.performance_score, 90);
        assert_eq!(u.discount_fraction, 0.05);
        assert_eq!(u.last_updated_at, Some(now()));
        assert_eq!(summary.units_scored, 1);
        assert_eq!(summary.readings_in_period, 2);
        assert_eq!(summary.orphan_readings, 0);
    }

    #[test]
    fn unit_without_readings_scores_perfect() {
        let mut units = vec![
            Unit::new("quiet", "b1", 500.0, 1, 300.0),
            Unit::new("busy", "b1", 500.0, 1, 300.0),
        ];
        let readings = vec![EnergyReading::new("busy", ts(2025, 2, 5), 1000.0, 0.42)];
        recompute_all(&mut units, &readings, now());
        assert_eq!(units[0].current_period_emissions_kg, 0.0);
        assert_eq!(units[0].performance_score, 100);
        assert_eq!(units[0].discount_fraction, 0.05);
        assert_eq!(units[1].performance_score, 0);
    }

    #[test]
    fn orphan_readings_are_excluded() {
        let mut units = vec![Unit::new("u1", "b1", 500.0, 1, 300.0)];
        let readings = vec![
            EnergyReading::new("ghost", ts(2025, 2, 5), 1000.0, 0.42),
            EnergyReading::new("u1", ts(2025, 2, 5), 10.0, 0.5),
        ];
        let summary = recompute_all(&mut units, &readings, now());
        assert_eq!(summary.orphan_readings, 1);
        assert!((units[0].current_period_emissions_kg - 5.0).abs() < 1e-12);
    }

    #[test]
    fn period_is_global_not_per_unit() {
        // u1's only reading is in January, but u2 has a February reading.
        let mut units = vec![
            Unit::new("u1", "b1", 500.0, 1, 100.0),
            Unit::new("u2", "b1", 500.0, 1, 100.0),
        ];
        let readings = vec![
            EnergyReading::new("u1", ts(2025, 1, 20), 500.0, 0.5),
            EnergyReading::new("u2", ts(2025, 2, 2), 10.0, 0.5),
        ];
        let summary = recompute_all(&mut units, &readings, now());
        assert_eq!(summary.period.start, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(units[0].current_period_emissions_kg, 0.0);
        assert_eq!(units[0].performance_score, 100);
    }

    #[test]
    fn recompute_all_is_idempotent() {
        let mut units = vec![
            Unit::new("u1", "b1", 700.0, 2, 280.0).with_quota(252.0),
            Unit::new("u2", "b1", 900.0, 2, 360.0),
        ];
        let readings = vec![
            EnergyReading::new("u1", ts(2025, 2, 1), 150.0, 0.41),
            EnergyReading::new("u2", ts(2025, 2, 1), 400.0, 0.44),
            EnergyReading::new("u1", ts(2025, 2, 9), 170.0, 0.43),
        ];
        recompute_all(&mut units, &readings, now());
        let first = units.clone();
        recompute_all(&mut units, &readings, now());
        assert_eq!(first, units);
    }

    #[test]
    fn recompute_one_matches_batch() {
        let base = vec![
            Unit::new("u1", "b1", 700.0, 2, 280.0).with_quota(252.0),
            Unit::new("u2", "b1", 900.0, 2, 360.0),
        ];
        let readings = vec![
            EnergyReading::new("u1", ts(2025, 1, 28), 999.0, 0.4),
            EnergyReading::new("u1", ts(2025, 2, 1), 151.3, 0.41),
            EnergyReading::new("u2", ts(2025, 2, 1), 400.0, 0.44),
            EnergyReading::new("u1", ts(2025, 2, 9), 170.7, 0.437),
            EnergyReading::new("u1", ts(2025, 2, 11), 33.1, 0.391),
        ];
        let mut batch = base.clone();
        let summary = recompute_all(&mut batch, &readings, now());

        let mut single = base[0].clone();
        recompute_one(&mut single, &readings, summary.period.start, now());
        assert_eq!(single, batch[0]);
        assert_eq!(
            single.current_period_emissions_kg.to_bits(),
            batch[0].current_period_emissions_kg.to_bits()
        );
    }

    #[test]
    fn processor_uses_configured_strategy_and_tiers() {
        let unit = Unit::new("u1", "b1", 800.0, 2, 320.0).with_quota(288.0);
        // 180 kg: plateau scores 75, improvement scores 37.
        let readings = vec![EnergyReading::new("u1", ts(2025, 2, 3), 400.0, 0.45)];

        let mut legacy = vec![unit.clone()];
        BatchProcessor::new(ImprovementScoring, TierSchedule::Legacy, DEFAULT_GRID_INTENSITY)
            .recompute_all(&mut legacy, &readings, now());
        assert_eq!(legacy[0].performance_score, 37);
        assert_eq!(legacy[0].discount_fraction, 0.0);

        let mut current = vec![unit];
        BatchProcessor::new(Scoring::Plateau, TierSchedule::Legacy, DEFAULT_GRID_INTENSITY)
            .recompute_all(&mut current, &readings, now());
        assert_eq!(current[0].performance_score, 75);
        assert_eq!(current[0].discount_fraction, 0.02);
    }
}
