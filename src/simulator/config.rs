//! Simulation configuration.

/// Configuration for a simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of consecutive runs played on one profile
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// A run that clears this many waves ends in victory
    pub max_waves: u32,

    /// Rounds a single wave may last before the run is abandoned
    pub max_rounds_per_wave: u32,

    /// Whether to spend resources on meta-upgrades between runs
    pub buy_upgrades: bool,

    /// Log verbosity (0 = silent, 1 = summary, 2 = detailed)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 50,
            seed: None,
            max_waves: 10,
            max_rounds_per_wave: 500,
            buy_upgrades: true,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for a short balance check
    pub fn quick() -> Self {
        Self {
            num_runs: 10,
            max_waves: 5,
            ..Default::default()
        }
    }

    /// Baseline without upgrade purchases, to compare against
    pub fn no_upgrades(num_runs: u32) -> Self {
        Self {
            num_runs,
            buy_upgrades: false,
            ..Default::default()
        }
    }
}
