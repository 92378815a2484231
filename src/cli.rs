use std::env;
use std::path::PathBuf;

/// Default API port.
pub const DEFAULT_PORT: u16 = 3000;

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub days: Option<usize>,
    pub bills_out: Option<PathBuf>,
    pub status: bool,
    pub serve: bool,
    pub port: u16,
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliOptions),
    Help,
}

pub fn parse_args() -> Result<Command, String> {
    parse_args_from(env::args().skip(1))
}

pub fn parse_args_from(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let args: Vec<String> = args.into_iter().collect();
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut seed = None;
    let mut days = None;
    let mut bills_out = None;
    let mut status = false;
    let mut serve = false;
    let mut port = None;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--status" => status = true,
            "--serve" => serve = true,
            "--scenario" => {
                i += 1;
                let path = args.value_for(i, flag, "a TOML file path")?;
                set_once(&mut scenario, PathBuf::from(path), flag)?;
            }
            "--preset" => {
                i += 1;
                let name = args.value_for(i, flag, "a preset name")?;
                set_once(&mut preset, name.to_string(), flag)?;
            }
            "--seed" => {
                i += 1;
                let raw = args.value_for(i, flag, "a u64")?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                set_once(&mut seed, value, flag)?;
            }
            "--days" => {
                i += 1;
                let raw = args.value_for(i, flag, "a day count")?;
                let value = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--days value \"{raw}\" is not a valid day count"))?;
                set_once(&mut days, value, flag)?;
            }
            "--bills-out" => {
                i += 1;
                let path = args.value_for(i, flag, "a file path")?;
                set_once(&mut bills_out, PathBuf::from(path), flag)?;
            }
            "--port" => {
                i += 1;
                let raw = args.value_for(i, flag, "a u16")?;
                let value = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                set_once(&mut port, value, flag)?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if port.is_some() && !serve {
        return Err("--port requires --serve".to_string());
    }

    if scenario.is_none() && preset.is_none() {
        preset = Some("baseline".to_string());
    }

    Ok(Command::Run(CliOptions {
        scenario,
        preset,
        seed,
        days,
        bills_out,
        status,
        serve,
        port: port.unwrap_or(DEFAULT_PORT),
    }))
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

trait SliceArgExt {
    fn value_for(&self, index: usize, flag: &str, expected: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn value_for(&self, index: usize, flag: &str, expected: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| format!("missing value for {flag} (expected {expected})"))
    }
}

pub fn print_usage() {
    eprintln!("utility-billing: simulate a billing period and print the statement");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  utility-billing [--scenario <path> | --preset <name>] [--seed <u64>] [--days <n>]"
    );
    eprintln!("                  [--bills-out <path>] [--status] [--serve [--port <u16>]]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset (baseline, solar_street, commercial)");
    eprintln!("  --seed <u64>        Override random seed");
    eprintln!("  --days <n>          Override billing period length");
    eprintln!("  --bills-out <path>  Export bill lines to CSV");
    eprintln!("  --status            Print every account's status block");
    eprintln!("  --serve             Start REST API server after the period (feature `api`)");
    eprintln!("  --port <u16>        API server port (default: {DEFAULT_PORT})");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args_from(args.iter().map(|s| s.to_string()))
    }

    fn run_opts(args: &[&str]) -> CliOptions {
        match parse(args).expect("parse should succeed") {
            Command::Run(opts) => opts,
            Command::Help => panic!("expected run options"),
        }
    }

    #[test]
    fn defaults_to_baseline_preset() {
        let opts = run_opts(&[]);
        assert_eq!(opts.preset.as_deref(), Some("baseline"));
        assert!(opts.scenario.is_none());
        assert_eq!(opts.port, DEFAULT_PORT);
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = run_opts(&["--scenario", "street.toml", "--seed", "9", "--days", "7"]);
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("street.toml")
        );
        assert!(opts.preset.is_none());
        assert_eq!(opts.seed, Some(9));
        assert_eq!(opts.days, Some(7));
    }

    #[test]
    fn scenario_and_preset_are_exclusive() {
        let err = parse(&["--scenario", "a.toml", "--preset", "baseline"]).unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(parse(&["--seed", "abc"]).is_err());
        assert!(parse(&["--serve", "--port", "70000"]).is_err());
    }

    #[test]
    fn port_requires_serve() {
        assert!(parse(&["--port", "8080"]).is_err());
        let opts = run_opts(&["--serve", "--port", "8080"]);
        assert!(opts.serve);
        assert_eq!(opts.port, 8080);
    }

    #[test]
    fn missing_value_is_reported() {
        let err = parse(&["--bills-out"]).unwrap_err();
        assert!(err.contains("--bills-out"));
    }

    #[test]
    fn repeated_flags_are_rejected() {
        for args in [
            ["--seed", "1", "--seed", "2"],
            ["--days", "3", "--days", "4"],
            ["--preset", "baseline", "--preset", "commercial"],
        ] {
            let err = parse(&args).unwrap_err();
            assert!(err.contains("more than once"), "{args:?}: {err}");
        }
        let err = parse(&["--serve", "--port", "1", "--port", "2"]).unwrap_err();
        assert!(err.contains("--port provided more than once"));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--status", "-h"]), Ok(Command::Help));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert!(parse(&["--telemetry"]).unwrap_err().contains("unknown argument"));
    }
}
