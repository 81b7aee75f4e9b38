//! CSV export of the landlord unit report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use csv::QuoteStyle;

use crate::cpi::report::UnitRow;

/// Column header of the landlord report.
pub const HEADER: [&str; 13] = [
    "Unit ID",
    "Building Type",
    "Tenant Name",
    "Area (sqft)",
    "Occupancy",
    "Medical Accommodation",
    "Baseline CO₂e (kg)",
    "Current CO₂e (kg)",
    "Quota (kg)",
    "Usage vs Quota (%)",
    "CPI Score",
    "Discount (%)",
    "Discount Tier",
];

/// Exports report rows to a CSV file at the given path.
///
/// Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `rows` - Landlord rows, one per unit
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_report_csv(rows: &[UnitRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_report_csv(rows, buf)
}

/// Writes report rows as CSV to any writer. Header cells are bare, every
/// data cell is quoted.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_report_csv(rows: &[UnitRow], mut writer: impl Write) -> io::Result<()> {
    let mut head = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(&mut writer);
    head.write_record(HEADER)?;
    head.flush()?;
    drop(head);

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    for r in rows {
        wtr.write_record(&[
            r.id.clone(),
            r.building_type.to_string(),
            r.tenant
                .as_ref()
                .map_or_else(|| "N/A".to_string(), |t| t.name.clone()),
            r.area.to_string(),
            r.occupancy.to_string(),
            if r.medical_flag { "Yes" } else { "No" }.to_string(),
            format!("{:.2}", r.baseline_kg_co2e),
            format!("{:.2}", r.current_kg_co2e),
            format!("{:.2}", r.quota_kg),
            format!("{:.1}", r.usage_vs_quota_pct),
            r.cpi.to_string(),
            format!("{:.1}", r.discount * 100.0),
            r.discount_tier.label().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
