use std::env;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};

/// Default port of the HTTP API.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub plot: bool,
    pub plot_out: Option<PathBuf>,
    pub write_demo: Option<PathBuf>,
    pub log_json: bool,
    pub tui: bool,
    pub serve: bool,
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut preset = None;
    let mut date = None;
    let mut time = None;
    let mut plot = false;
    let mut plot_out = None;
    let mut write_demo = None;
    let mut log_json = false;
    let mut tui = false;
    let mut serve = false;
    let mut port = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--date" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --date (expected YYYY-MM-DD)")?;
                let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| format!("invalid --date \"{raw}\": {e} (expected YYYY-MM-DD)"))?;
                if date.replace(parsed).is_some() {
                    return Err("--date provided more than once".to_string());
                }
            }
            "--time" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --time (expected HH:MM)")?;
                let parsed = NaiveTime::parse_from_str(raw, "%H:%M")
                    .map_err(|e| format!("invalid --time \"{raw}\": {e} (expected HH:MM)"))?;
                if time.replace(parsed).is_some() {
                    return Err("--time provided more than once".to_string());
                }
            }
            "--plot" => plot = true,
            "--plot-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --plot-out (expected a file path)")?;
                if plot_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--plot-out provided more than once".to_string());
                }
            }
            "--write-demo" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --write-demo (expected a directory)")?;
                if write_demo.replace(PathBuf::from(path)).is_some() {
                    return Err("--write-demo provided more than once".to_string());
                }
            }
            "--log-json" => log_json = true,
            "--tui" => tui = true,
            "--serve" => serve = true,
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let parsed = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                if port.replace(parsed).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if tui && serve {
        return Err("arguments `--tui` and `--serve` are mutually exclusive".to_string());
    }
    if port.is_some() && !serve {
        return Err("`--port` only applies together with `--serve`".to_string());
    }

    if config.is_none() && preset.is_none() {
        preset = Some("demo".to_string());
    }

    Ok(CliOptions {
        config,
        preset,
        date,
        time,
        plot: plot || plot_out.is_some(),
        plot_out,
        write_demo,
        log_json,
        tui,
        serve,
        port: port.unwrap_or(DEFAULT_PORT),
    })
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
    eprintln!("renewable-forecast: one-step-ahead wind and solar production forecasts");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  renewable-forecast [--config <path> | --preset <name>] [--date YYYY-MM-DD] [--time HH:MM]"
    );
    eprintln!("                     [--plot] [--plot-out <path>] [--write-demo <dir>] [--log-json]");
    eprintln!("                     [--tui | --serve [--port <u16>]]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>      Load data, models and settings from a TOML file");
    eprintln!("  --preset <name>      Use a built-in synthetic preset (demo, demo_gappy)");
    eprintln!("  --date <YYYY-MM-DD>  Date to forecast (default from [presentation])");
    eprintln!("  --time <HH:MM>       Time of day to forecast (default from [presentation])");
    eprintln!("  --plot               Print actual-vs-forecast summaries for both series");
    eprintln!("  --plot-out <path>    Export actual-vs-forecast series to CSV (implies --plot)");
    eprintln!("  --write-demo <dir>   Write synthetic data, models and forecast.toml, then exit");
    eprintln!("  --log-json           Emit logs as JSON lines on stderr");
    eprintln!("  --tui                Interactive terminal dashboard (feature `tui`)");
    eprintln!("  --serve              Start the REST API (feature `api`)");
    eprintln!("  --port <u16>         API server port (default: {DEFAULT_PORT})");
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the demo preset is used.");
}
