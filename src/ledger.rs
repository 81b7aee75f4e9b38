//! Orchestration of recompute, reward sync and landlord/tenant views over a repository.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{InputPolicy, VerdantConfig};
use crate::cpi::batch::{BatchProcessor, RecomputeSummary};
use crate::cpi::discount::TierSchedule;
use crate::cpi::period::BillingPeriod;
use crate::cpi::report::{BuildingReport, UnitRow, UnitSummary};
use crate::cpi::rewards::{RewardPolicy, sync_rewards, sync_tenant};
use crate::cpi::score::{Scoring, ScoringStrategy};
use crate::error::{LedgerError, Result};
use crate::model::{EnergyReading, QuotaUpdate, RewardState};
use crate::store::{ReadingFilter, Repository, UnitFilter};

/// Days of history returned by [`CarbonLedger::tenant_usage`].
pub const USAGE_WINDOW_DAYS: i64 = 30;

/// Emissions split by end use, derived from fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageBreakdown {
    pub hvac: f64,
    pub lights: f64,
    pub water: f64,
    pub appliances: f64,
    pub other: f64,
}

impl UsageBreakdown {
    /// Splits `total_kg` 45/20/15/12/8.
    pub fn from_total(total_kg: f64) -> Self {
        Self {
            hvac: total_kg * 0.45,
            lights: total_kg * 0.20,
            water: total_kg * 0.15,
            appliances: total_kg * 0.12,
            other: total_kg * 0.08,
        }
    }
}

/// Tenant dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantSummary {
    pub tenant_id: String,
    pub unit_id: String,
    pub cpi: u8,
    pub current_kg_co2e: f64,
    /// Resolved scoring target.
    pub quota_kg: f64,
    /// Usage vs target in percent, capped at 100.
    pub progress: f64,
    pub discount: f64,
    pub breakdown: UsageBreakdown,
    pub rewards: RewardState,
}

/// One reading as shown on the tenant usage chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsagePoint {
    pub timestamp: DateTime<Utc>,
    pub kwh: f64,
    pub emissions_kg: f64,
}

impl From<&EnergyReading> for UsagePoint {
    fn from(r: &EnergyReading) -> Self {
        Self {
            timestamp: r.timestamp(),
            kwh: r.energy_consumed_kwh(),
            emissions_kg: r.emissions_kg(),
        }
    }
}

/// Recent readings of a tenant's unit, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantUsage {
    pub unit_id: String,
    pub readings: Vec<UsagePoint>,
}

/// Landlord building overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingOverview {
    #[serde(flatten)]
    pub report: BuildingReport,
    pub units: Vec<UnitSummary>,
}

/// Carbon ledger over a repository.
///
/// Generic over `R: Repository` for static dispatch. Owns the batch
/// processor and reward policy built from configuration.
pub struct CarbonLedger<R: Repository> {
    repo: R,
    processor: BatchProcessor<Scoring>,
    rewards: RewardPolicy,
    input_policy: InputPolicy,
}

impl<R: Repository> CarbonLedger<R> {
    /// Creates a ledger.
    ///
    /// # Arguments
    ///
    /// * `repo` - Repository holding units, tenants and readings
    /// * `config` - Scoring, rewards and input sections are used
    pub fn new(repo: R, config: &VerdantConfig) -> Self {
        Self {
            repo,
            processor: config.processor(),
            rewards: config.reward_policy(),
            input_policy: config.input.policy,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn tiers(&self) -> TierSchedule {
        self.processor.tiers()
    }

    /// Billing period the next recompute would use.
    pub fn active_period(&self, now: DateTime<Utc>) -> BillingPeriod {
        BillingPeriod::active(self.repo.all_readings(), now)
    }

    /// Runs [`Self::recompute_at`] with the current time.
    pub fn recompute(&mut self) -> RecomputeSummary {
        self.recompute_at(Utc::now())
    }

    /// Rescores every unit and then syncs every tenant's rewards.
    ///
    /// # Arguments
    ///
    /// * `now` - Written to `last_updated_at`; also the period fallback when
    ///   there are no readings
    pub fn recompute_at(&mut self, now: DateTime<Utc>) -> RecomputeSummary {
        let (units, readings) = self.repo.units_and_readings_mut();
        let summary = self.processor.recompute_all(units, readings, now);

        let (tenants, units) = self.repo.tenants_and_units_mut();
        let synced = sync_rewards(tenants, units, &self.rewards);

        if summary.orphan_readings > 0 {
            debug!(
                orphans = summary.orphan_readings,
                "ignored in-period readings for unknown units"
            );
        }
        info!(
            period = %summary.period,
            strategy = self.processor.strategy().name(),
            units = summary.units_scored,
            readings = summary.readings_in_period,
            tenants = synced,
            "recompute complete"
        );
        summary
    }

    /// Runs [`Self::update_quota_at`] with the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::update_quota_at`].
    pub fn update_quota(&mut self, unit_id: &str, update: &QuotaUpdate) -> Result<UnitRow> {
        self.update_quota_at(unit_id, update, Utc::now())
    }

    /// Applies a landlord edit and rescores only the edited unit.
    ///
    /// The unit is scored against the global active period so the result
    /// equals what a full recompute would produce. Its tenant, if any, is
    /// synced afterwards.
    ///
    /// # Returns
    ///
    /// The updated landlord row for the unit.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a negative or non-finite quota; `UnitNotFound` if
    /// no unit has `unit_id`.
    pub fn update_quota_at(
        &mut self,
        unit_id: &str,
        update: &QuotaUpdate,
        now: DateTime<Utc>,
    ) -> Result<UnitRow> {
        if let Some(Some(quota)) = update.quota {
            if !quota.is_finite() || quota < 0.0 {
                return Err(LedgerError::InvalidInput(format!(
                    "quota must be a finite number >= 0, got {quota}"
                )));
            }
        }

        let (units, readings) = self.repo.units_and_readings_mut();
        let period = BillingPeriod::active(readings, now);
        let unit = units
            .iter_mut()
            .find(|u| u.id == unit_id)
            .ok_or_else(|| LedgerError::UnitNotFound(unit_id.to_string()))?;
        update.apply(unit);
        let agg = self.processor.recompute_one(unit, readings, period.start, now);
        let (score, quota) = (unit.performance_score, unit.quota_emissions_kg);

        let (tenants, units) = self.repo.tenants_and_units_mut();
        if let (Some(tenant), Some(unit)) = (
            tenants.iter_mut().find(|t| t.unit_id == unit_id),
            units.iter().find(|u| u.id == unit_id),
        ) {
            sync_tenant(tenant, unit, &self.rewards);
        }

        info!(
            unit = unit_id,
            ?quota,
            emissions_kg = agg.emissions_kg,
            score,
            "quota updated"
        );
        self.unit_row(unit_id)
    }

    /// Aggregate figures and per-unit summaries for a building.
    ///
    /// An unknown building yields an empty overview.
    pub fn building_overview(&self, building_id: &str) -> BuildingOverview {
        self.building_overview_at(building_id, Utc::now())
    }

    /// Same as [`Self::building_overview`], with `now` deciding the period
    /// when the repository holds no readings.
    pub fn building_overview_at(&self, building_id: &str, now: DateTime<Utc>) -> BuildingOverview {
        let units = self.repo.find_units(&UnitFilter::building(building_id));
        let period = self.active_period(now);
        let filter = ReadingFilter::units(units.iter().map(|u| u.id.as_str())).since(period.start);
        let readings = self.repo.find_readings(&filter);

        BuildingOverview {
            report: BuildingReport::from_units(
                building_id,
                &units,
                readings.into_iter(),
                self.tiers(),
            ),
            units: units.iter().map(|u| UnitSummary::from(*u)).collect(),
        }
    }

    /// Landlord table rows for a building, in repository order.
    pub fn unit_rows(&self, building_id: &str) -> Vec<UnitRow> {
        self.repo
            .find_units(&UnitFilter::building(building_id))
            .into_iter()
            .map(|u| UnitRow::new(u, self.repo.find_tenant_by_unit(&u.id), self.tiers()))
            .collect()
    }

    /// Landlord row for one unit.
    ///
    /// # Errors
    ///
    /// `UnitNotFound` if no unit has `unit_id`.
    pub fn unit_row(&self, unit_id: &str) -> Result<UnitRow> {
        let unit = self
            .repo
            .find_unit(unit_id)
            .ok_or_else(|| LedgerError::UnitNotFound(unit_id.to_string()))?;
        Ok(UnitRow::new(
            unit,
            self.repo.find_tenant_by_unit(unit_id),
            self.tiers(),
        ))
    }

    /// Tenant dashboard summary.
    ///
    /// # Errors
    ///
    /// `TenantNotFound`, or `UnitNotFound` if the tenant's unit is missing.
    pub fn tenant_summary(&self, tenant_id: &str) -> Result<TenantSummary> {
        let tenant = self
            .repo
            .find_tenant(tenant_id)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant_id.to_string()))?;
        let unit = self
            .repo
            .find_unit(&tenant.unit_id)
            .ok_or_else(|| LedgerError::UnitNotFound(tenant.unit_id.clone()))?;

        let quota_kg = unit.target_emissions_kg();
        let progress = if quota_kg > 0.0 {
            (unit.current_period_emissions_kg / quota_kg * 100.0).min(100.0)
        } else {
            0.0
        };

        Ok(TenantSummary {
            tenant_id: tenant.id.clone(),
            unit_id: unit.id.clone(),
            cpi: unit.performance_score,
            current_kg_co2e: unit.current_period_emissions_kg,
            quota_kg,
            progress,
            discount: unit.discount_fraction,
            breakdown: UsageBreakdown::from_total(unit.current_period_emissions_kg),
            rewards: tenant.reward_state.clone(),
        })
    }

    /// Readings of the tenant's unit within 30 days of that unit's latest reading.
    ///
    /// # Errors
    ///
    /// `TenantNotFound` if no tenant has `tenant_id`.
    pub fn tenant_usage(&self, tenant_id: &str) -> Result<TenantUsage> {
        let tenant = self
            .repo
            .find_tenant(tenant_id)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant_id.to_string()))?;

        let all = self.repo.find_readings(&ReadingFilter::unit(tenant.unit_id.as_str()));
        let latest = all.iter().map(|r| r.timestamp()).max();
        let mut readings = match latest {
            Some(latest) => {
                let since = latest - Duration::days(USAGE_WINDOW_DAYS);
                all.into_iter()
                    .filter(|r| r.timestamp() >= since)
                    .collect::<Vec<_>>()
            }
            None => Vec::new(),
        };
        readings.sort_by_key(|r| r.timestamp());

        Ok(TenantUsage {
            unit_id: tenant.unit_id.clone(),
            readings: readings.into_iter().map(UsagePoint::from).collect(),
        })
    }

    /// Records a suggestion as acknowledged; repeating it is a no-op.
    ///
    /// # Returns
    ///
    /// The tenant's acknowledged suggestion ids.
    ///
    /// # Errors
    ///
    /// `TenantNotFound` if no tenant has `tenant_id`.
    pub fn acknowledge_suggestion(
        &mut self,
        tenant_id: &str,
        suggestion_id: &str,
    ) -> Result<Vec<String>> {
        let tenant = self
            .repo
            .find_tenant_mut(tenant_id)
            .ok_or_else(|| LedgerError::TenantNotFound(tenant_id.to_string()))?;
        if tenant.acknowledge(suggestion_id) {
            debug!(tenant = tenant_id, suggestion = suggestion_id, "suggestion acknowledged");
        }
        Ok(tenant.acknowledged_suggestion_ids.clone())
    }

    /// Appends readings. Scores are not touched until the next recompute.
    ///
    /// Under the `reject` input policy the whole batch is refused if any
    /// reading has negative or non-finite consumption or intensity.
    ///
    /// # Errors
    ///
    /// `InvalidInput` naming the first offending reading.
    pub fn ingest(&mut self, readings: Vec<EnergyReading>) -> Result<usize> {
        if self.input_policy == InputPolicy::Reject {
            if let Some((idx, field)) = readings.iter().enumerate().find_map(|(i, r)| {
                invalid_field(r).map(|field| (i, field))
            }) {
                warn!(index = idx, field, "rejected reading batch");
                return Err(LedgerError::InvalidInput(format!(
                    "reading {idx} ({}): {field} must be a finite number >= 0",
                    readings[idx].unit_id()
                )));
            }
        }
        let count = readings.len();
        self.repo.insert_readings(readings);
        info!(count, "readings ingested");
        Ok(count)
    }
}

fn invalid_field(r: &EnergyReading) -> Option<&'static str> {
    let bad = |v: f64| !v.is_finite() || v < 0.0;
    if bad(r.energy_consumed_kwh()) {
        Some("kwh")
    } else if bad(r.grid_carbon_intensity()) {
        Some("grid intensity")
    } else {
        None
    }
}
