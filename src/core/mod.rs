//! Stat model, balance constants, and combat configuration.

#![allow(unused_imports)]

pub mod config;
pub mod constants;
pub mod stats;

pub use config::*;
pub use constants::*;
pub use stats::*;
