//! Forecast dashboard entry point: CLI wiring and config-driven service construction.

mod cli;

use std::process;

use chrono::NaiveDateTime;
use renewable_forecast::config::ForecastConfig;
use renewable_forecast::forecast::{EnergyType, ForecastService, PlotData};
use renewable_forecast::io::export::export_plot_csv;
use renewable_forecast::models::PretrainedModel;
use renewable_forecast::report::ReportView;
use renewable_forecast::{logging, synthetic};
use tracing::{error, info};

use cli::CliOptions;

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

/// Loads the configuration: `--config` takes priority, then `--preset`.
fn load_config(cli: &CliOptions) -> ForecastConfig {
    let loaded = if let Some(ref path) = cli.config {
        ForecastConfig::from_toml_file(path)
    } else {
        ForecastConfig::from_preset(cli.preset.as_deref().unwrap_or("demo"))
    };
    let cfg = loaded.unwrap_or_else(|e| fail(e));

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

/// File-backed service for `--config`, synthetic one for presets.
fn build_service(cli: &CliOptions, cfg: &ForecastConfig) -> ForecastService<PretrainedModel> {
    if cli.config.is_some() {
        ForecastService::from_config(cfg).unwrap_or_else(|e| fail(e))
    } else {
        synthetic::demo_service(cfg)
    }
}

/// Combines `--date`/`--time` with the preselected defaults.
fn requested_datetime(cli: &CliOptions, cfg: &ForecastConfig) -> NaiveDateTime {
    let p = &cfg.presentation;
    let date = cli.date.unwrap_or(p.default_date);
    if !p.is_selectable(date) {
        fail(format!(
            "date {date} is outside the selectable range {} to {}",
            p.min_date, p.max_date
        ));
    }
    date.and_time(cli.time.unwrap_or(p.default_time))
}

fn print_plots(cli: &CliOptions, service: &ForecastService<PretrainedModel>) {
    let mut plots: Vec<PlotData> = Vec::with_capacity(EnergyType::ALL.len());
    for energy in EnergyType::ALL {
        match service.plot(energy) {
            Ok(plot) => {
                println!("\n{plot}");
                plots.push(plot);
            }
            Err(e) => {
                error!(%energy, error = %e, "full-series forecast failed");
                println!("\n--- Actual vs Forecasted {energy} Energy Production ---\nForecast failed: {e}");
            }
        }
    }

    if let Some(ref path) = cli.plot_out {
        if let Err(e) = export_plot_csv(&plots, path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Plot data written to {}", path.display());
    }
}

#[cfg(feature = "tui")]
fn run_tui(cfg: ForecastConfig, service: ForecastService<PretrainedModel>, requested: NaiveDateTime) {
    let app = renewable_forecast::tui::runtime::App::new(service, cfg.presentation, requested);
    if let Err(e) = renewable_forecast::tui::run(app) {
        fail(format!("TUI crashed: {e}"));
    }
}

#[cfg(not(feature = "tui"))]
fn run_tui(_: ForecastConfig, _: ForecastService<PretrainedModel>, _: NaiveDateTime) {
    fail("--tui requires building with `--features tui`");
}

#[cfg(feature = "api")]
fn serve(cfg: ForecastConfig, service: ForecastService<PretrainedModel>, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(renewable_forecast::api::AppState {
        service,
        presentation: cfg.presentation,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
    if let Err(e) = rt.block_on(renewable_forecast::api::serve(state, addr)) {
        fail(format!("API server on {addr}: {e}"));
    }
}

#[cfg(not(feature = "api"))]
fn serve(_: ForecastConfig, _: ForecastService<PretrainedModel>, _: u16) {
    fail("--serve requires building with `--features api`");
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });

    // the TUI owns the terminal, so it runs without a log subscriber
    if !cli.tui {
        if let Err(e) = logging::init(cli.log_json) {
            eprintln!("warning: logging disabled: {e}");
        }
    }

    let cfg = load_config(&cli);

    if let Some(ref dir) = cli.write_demo {
        let path = synthetic::write_demo(dir, &cfg).unwrap_or_else(|e| fail(e));
        info!(config = %path.display(), "demo setup ready");
        println!("Demo files written. Run with: --config {}", path.display());
        return;
    }

    let requested = requested_datetime(&cli, &cfg);
    let service = build_service(&cli, &cfg);

    if cli.tui {
        run_tui(cfg, service, requested);
        return;
    }

    let report = service.forecast_both(requested);
    println!(
        "{}",
        ReportView {
            report: &report,
            window_size: service.settings().window_size,
        }
    );

    if cli.plot {
        print_plots(&cli, &service);
    }

    if cli.serve {
        serve(cfg, service, cli.port);
    }
}
