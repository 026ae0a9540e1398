//! Balance simulator for repeated auto-battler runs.
//!
//! Plays a single profile through many consecutive runs, buying meta-upgrades
//! between runs, to see how difficulty and upgrade investment interact:
//! - Waves cleared per run
//! - Resource income and upgrade purchases
//! - Difficulty growth across runs
//!
//! Runs go through `GameSession`, so results match real gameplay behavior.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{SimReport, SimRunStats};
pub use runner::run_simulation;
