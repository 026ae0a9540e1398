//! Game balance simulator CLI.
//!
//! Plays many consecutive runs on a fresh profile to analyze balance.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                    # Default: 50 runs, 10 waves
//!   cargo run --bin simulate -- -n 100 -w 5    # 100 runs of up to 5 waves
//!   cargo run --bin simulate -- --seed 42      # Reproducible run

use skirmish::simulator::{run_simulation, SimConfig};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              SKIRMISH BALANCE SIMULATOR                       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:           {}", config.num_runs);
    println!("  Max Waves:      {}", config.max_waves);
    println!("  Round Limit:    {}", config.max_rounds_per_wave);
    println!("  Buy Upgrades:   {}", config.buy_upgrades);
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = run_simulation(&config);

    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        match std::fs::write(&filename, json) {
            Ok(()) => println!("JSON report saved to: {}", filename),
            Err(e) => eprintln!("Failed to write JSON report: {}", e),
        }
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "-w" | "--waves" => {
                if i + 1 < args.len() {
                    config.max_waves = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-r" | "--rounds" => {
                if i + 1 < args.len() {
                    config.max_rounds_per_wave = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--no-upgrades" => {
                config.buy_upgrades = false;
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--quick" => {
                config = SimConfig::quick();
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Skirmish Balance Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>      Number of consecutive runs (default: 50)");
    println!("    -w, --waves <W>     Waves to clear for a victory (default: 10)");
    println!("    -s, --seed <S>      Random seed for reproducibility");
    println!("    -r, --rounds <R>    Round limit per wave (default: 500)");
    println!("    --no-upgrades       Never buy meta-upgrades");
    println!("    -v, --verbose       Print every run");
    println!("    --json              Save JSON report");
    println!("    --quick             Quick test (10 runs of 5 waves)");
    println!("    -h, --help          Show this help");
}
