//! Verdant entry point: CLI wiring, ledger construction and reporting.

use std::process;

use chrono::Utc;
use tracing::info;

use verdant::cli::{self, CliOptions};
use verdant::config::VerdantConfig;
use verdant::io::export::export_report_csv;
use verdant::io::ingest::load_readings_csv;
use verdant::ledger::CarbonLedger;
use verdant::observability::init_tracing;
use verdant::seed::{Seeder, demo_ledger};
use verdant::store::InMemoryStore;

/// Loads configuration: `--config` takes priority, then `--preset`.
fn load_config(cli: &CliOptions) -> Result<VerdantConfig, String> {
    let mut cfg = if let Some(ref path) = cli.config {
        VerdantConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else {
        let name = cli.preset.as_deref().unwrap_or("demo");
        VerdantConfig::from_preset(name).map_err(|e| e.to_string())?
    };

    if let Some(seed) = cli.seed {
        cfg.demo.seed = seed;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(lines.join("\n"));
    }
    Ok(cfg)
}

/// Builds the scored ledger: seeded demo readings, or the demo roster scored
/// against readings loaded from `--readings`.
fn build_ledger(cli: &CliOptions, cfg: &VerdantConfig) -> Result<CarbonLedger<InMemoryStore>, String> {
    let now = Utc::now();
    let Some(ref path) = cli.readings else {
        return demo_ledger(cfg, now).map_err(|e| e.to_string());
    };

    let readings = load_readings_csv(path, cfg.input.policy).map_err(|e| e.to_string())?;
    let (units, tenants) = Seeder::new(&cfg.demo).roster();
    let mut ledger = CarbonLedger::new(InMemoryStore::new(units, tenants, Vec::new()), cfg);
    ledger.ingest(readings).map_err(|e| e.to_string())?;
    ledger.recompute_at(now);
    Ok(ledger)
}

fn run(cli: &CliOptions) -> Result<(), String> {
    let cfg = load_config(cli)?;
    let ledger = build_ledger(cli, &cfg)?;
    let building = cli.building.as_deref().unwrap_or(&cfg.demo.building_id);

    let rows = ledger.unit_rows(building);
    for row in &rows {
        println!("{row}");
    }
    println!("\n{}", ledger.building_overview(building).report);

    if let Some(ref path) = cli.report_out {
        export_report_csv(&rows, path)
            .map_err(|e| format!("failed to write CSV \"{}\": {e}", path.display()))?;
        info!(path = %path.display(), rows = rows.len(), "report written");
    }

    if cli.serve {
        serve(ledger, cli.port)?;
    }
    Ok(())
}

#[cfg(feature = "api")]
fn serve(ledger: CarbonLedger<InMemoryStore>, port: u16) -> Result<(), String> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(verdant::api::AppState::new(ledger));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {e}"))?;
    rt.block_on(verdant::api::serve(state, addr))
        .map_err(|e| format!("server error on {addr}: {e}"))
}

#[cfg(not(feature = "api"))]
fn serve(_ledger: CarbonLedger<InMemoryStore>, _port: u16) -> Result<(), String> {
    Err("--serve requires building with `--features api`".to_string())
}

fn main() {
    init_tracing();

    let cli = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };
    if cli.help {
        cli::print_usage();
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
