//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};

use verdant::config::VerdantConfig;
use verdant::ledger::CarbonLedger;
use verdant::model::{EnergyReading, Tenant, Unit};
use verdant::seed::demo_ledger;
use verdant::store::InMemoryStore;

/// Noon UTC on the given 2025 date.
pub fn ts(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
}

/// Fixed recompute instant after the February 2025 billing month.
pub fn now() -> DateTime<Utc> {
    ts(3, 1)
}

/// Three units of building `b1`:
///
/// - `u1`: quota 180, 99 kg in February (CPI 90)
/// - `u2`: baseline 324, no quota, 259.2 kg in February (CPI 40)
/// - `u3`: baseline 300, no readings (CPI 100)
pub fn small_building() -> (Vec<Unit>, Vec<Tenant>, Vec<EnergyReading>) {
    let units = vec![
        Unit::new("u1", "b1", 600.0, 1, 200.0).with_quota(180.0),
        Unit::new("u2", "b1", 900.0, 2, 324.0),
        Unit::new("u3", "b1", 700.0, 2, 300.0),
    ];
    let tenants = vec![
        Tenant::new("t1", "u1", "Alex Johnson", "alex@example.com"),
        Tenant::new("t2", "u2", "Lisa Park", "lisa@example.com"),
    ];
    let readings = vec![
        EnergyReading::new("u1", ts(1, 15), 400.0, 0.42),
        EnergyReading::new("u1", ts(2, 1), 120.0, 0.45),
        EnergyReading::new("u1", ts(2, 2), 100.0, 0.45),
        EnergyReading::new("u2", ts(2, 3), 576.0, 0.45),
    ];
    (units, tenants, readings)
}

/// Ledger over [`small_building`] with the given configuration, recomputed at [`now`].
pub fn small_ledger(config: &VerdantConfig) -> CarbonLedger<InMemoryStore> {
    let (units, tenants, readings) = small_building();
    let mut ledger = CarbonLedger::new(InMemoryStore::new(units, tenants, readings), config);
    ledger.recompute_at(now());
    ledger
}

/// Seeded demo building recomputed at [`now`].
pub fn seeded_ledger() -> CarbonLedger<InMemoryStore> {
    demo_ledger(&VerdantConfig::demo(), now()).expect("demo config should seed")
}
