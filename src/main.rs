//! Utility billing entry point: CLI wiring and scenario-driven billing run.

mod cli;

use std::io::{self, Write};
use std::process;

use tracing_subscriber::EnvFilter;

use utility_billing::config::ScenarioConfig;
use utility_billing::io::export::export_csv;
use utility_billing::sim::runner::{PeriodReport, PeriodRunner};

use cli::{CliOptions, Command};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_scenario(opts: &CliOptions) -> ScenarioConfig {
    // --scenario takes priority; the parser already defaulted --preset
    let loaded = if let Some(ref path) = opts.scenario {
        ScenarioConfig::from_toml_file(path)
    } else {
        ScenarioConfig::from_preset(opts.preset.as_deref().unwrap_or("baseline"))
    };
    let mut scenario = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = opts.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(days) = opts.days {
        scenario.simulation.days = days;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    scenario
}

fn print_report(report: &PeriodReport, show_status: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for r in &report.supply {
        writeln!(out, "[{}] {}: {}", r.address, r.utility, r.status)?;
    }

    if show_status {
        writeln!(out)?;
        for p in &report.portfolios {
            p.show_status(&mut out)?;
        }
    }

    writeln!(out, "\n{}", report.statement)?;
    out.flush()
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            cli::print_usage();
            return;
        }
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };

    init_tracing();

    let scenario = load_scenario(&opts);
    let report = PeriodRunner::new(scenario).run().unwrap_or_else(|e| {
        eprintln!("error: billing run failed: {e}");
        process::exit(1);
    });

    if let Err(e) = print_report(&report, opts.status) {
        eprintln!("error: failed to write report: {e}");
        process::exit(1);
    }

    if let Some(ref path) = opts.bills_out {
        if let Err(e) = export_csv(&report.statement, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Bills written to {}", path.display());
    }

    if opts.serve {
        serve(report, opts.port);
    }
}

#[cfg(feature = "api")]
fn serve(report: PeriodReport, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let state = Arc::new(utility_billing::api::AppState {
        rates: report.rates.snapshot(),
        statement: report.statement,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(utility_billing::api::serve(state, addr)) {
        eprintln!("error: API server failed: {e}");
        process::exit(1);
    }
}

#[cfg(not(feature = "api"))]
fn serve(_report: PeriodReport, _port: u16) {
    eprintln!("error: --serve requires building with `--features api`");
    process::exit(1);
}
