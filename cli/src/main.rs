//! hookcheck CLI - preload hook detection tool.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::debug;

use hookcheck_probe::platform;
use hookcheck_probe::{CheckOutcome, HookDetector, ScanReport, DEFAULT_SYMBOLS};

#[derive(Parser)]
#[command(name = "hookcheck")]
#[command(
    version,
    about = "Detect dynamic-linker interposition on C runtime functions"
)]
struct Cli {
    /// Path to the C runtime shared library [default: platform well-known path]
    #[arg(long, value_name = "FILE")]
    libc: Option<PathBuf>,

    /// Symbol to check; repeat for several [default: open readdir fopen accept access unlink]
    #[arg(short = 's', long = "symbol", value_name = "NAME")]
    symbols: Vec<String>,

    /// Emit the report as JSON instead of human-readable lines
    #[arg(long)]
    json: bool,

    /// Exit with status 2 when at least one hook is detected
    #[arg(long)]
    fail_on_hook: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}hookcheck:{} {:#}", RED, RESET, e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let libc_path = cli.libc.unwrap_or_else(platform::default_libc_path);
    debug!("probing against {}", libc_path.display());

    let detector = HookDetector::with_symbols(&libc_path, effective_symbols(&cli.symbols));
    let report = detector.scan()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(ExitCode::from(exit_status(&report, cli.fail_on_hook)))
}

/// CLI-supplied symbol list, or the built-in default when none was given.
fn effective_symbols(cli_symbols: &[String]) -> Vec<String> {
    if cli_symbols.is_empty() {
        DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
    } else {
        cli_symbols.to_vec()
    }
}

/// Completion of the full check is status 0 regardless of findings, the
/// historical behavior of this kind of probe. `--fail-on-hook` opts into a
/// distinct status so scripts can branch without parsing output.
fn exit_status(report: &ScanReport, fail_on_hook: bool) -> u8 {
    if fail_on_hook && !report.is_clean() {
        2
    } else {
        0
    }
}

// ANSI color codes
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const RESET: &str = "\x1b[0m";

fn print_report(report: &ScanReport) {
    for check in &report.checks {
        println!("Checking {} syscall.", check.symbol);
        match &check.outcome {
            CheckOutcome::Clean { .. } => {}
            CheckOutcome::Hooked(finding) => {
                println!("{}Preload hooks detected!{}", RED, RESET);
                println!("Libc address: {:#x}", finding.libc_address);
                println!("Next address: {:#x}", finding.next_address);
                if let Some(module) = &finding.interposer {
                    println!("Interposer: {}", module);
                }
            }
            CheckOutcome::Unresolved { reason } => {
                eprintln!("{}Warning:{} {}", YELLOW, RESET, reason);
            }
        }
    }
}
