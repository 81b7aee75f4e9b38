use std::env;
use std::path::PathBuf;

/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub readings: Option<PathBuf>,
    pub seed: Option<u64>,
    pub building: Option<String>,
    pub report_out: Option<PathBuf>,
    pub serve: bool,
    pub port: u16,
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: None,
            preset: None,
            readings: None,
            seed: None,
            building: None,
            report_out: None,
            serve: false,
            port: DEFAULT_PORT,
            help: false,
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses arguments (without the program name).
///
/// Defaults to the `demo` preset when neither `--config` nor `--preset` is given.
///
/// # Errors
///
/// Returns a message for unknown flags, missing or malformed values,
/// repeated flags, and `--config` combined with `--preset`.
pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--readings" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --readings (expected a CSV file path)")?;
                if opts.readings.replace(PathBuf::from(path)).is_some() {
                    return Err("--readings provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--building" => {
                i += 1;
                let id = args.next_or_err(i, "missing value for --building (expected a building id)")?;
                opts.building = Some(id.to_string());
            }
            "--report-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --report-out (expected a file path)")?;
                if opts.report_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--report-out provided more than once".to_string());
                }
            }
            "--serve" => opts.serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
            }
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.config.is_none() && opts.preset.is_none() {
        opts.preset = Some("demo".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("verdant: Carbon Performance Index ledger");
    eprintln!();
    eprintln!("Usage: verdant [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load configuration from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset (demo, legacy)");
    eprintln!("  --readings <path>      Score the demo roster against readings from CSV");
    eprintln!("  --seed <u64>           Override the demo seed");
    eprintln!("  --building <id>        Building to report (default: demo.building_id)");
    eprintln!("  --report-out <path>    Export the landlord report to CSV");
    eprintln!("  --serve                Start the REST API after reporting (feature `api`)");
    eprintln!("  --port <u16>           API server port (default: {DEFAULT_PORT})");
    eprintln!("  --help                 Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the demo preset is used.");
}
