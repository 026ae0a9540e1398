//! Main simulation runner.
//!
//! Drives a `GameSession` with a simulated millisecond clock and tracks
//! each finished run externally.

use super::config::SimConfig;
use super::report::{SimReport, SimRunStats};
use crate::combat::{CombatStatus, NullSink};
use crate::progression::{MemoryProgressStore, RunResult, RunStats};
use crate::session::GameSession;
use crate::spawn::LevelScaledSpawner;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut session: GameSession =
        GameSession::load("SimPlayer".to_string(), Box::new(MemoryProgressStore::new()));
    let mut clock: u64 = 0;
    let mut runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed + run_idx as u64),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut stats = simulate_single_run(&mut session, config, &mut rng, &mut clock);
        if config.buy_upgrades {
            stats.upgrades_bought = buy_upgrades(&mut session);
        }

        if config.verbosity >= 2 {
            println!(
                "Run {}/{} - {:?}, Waves {}, Kills {}, Resources {}, Difficulty {:.2}, Upgrades {}",
                run_idx + 1,
                config.num_runs,
                stats.result,
                stats.waves_cleared,
                stats.enemies_defeated,
                stats.resources_gained,
                stats.difficulty,
                stats.upgrades_bought
            );
        }
        runs.push(stats);
    }

    SimReport::from_runs(runs, session.get_progress())
}

/// Play one run to completion: defeat, victory after `max_waves`, or timeout.
fn simulate_single_run(
    session: &mut GameSession,
    config: &SimConfig,
    rng: &mut ChaCha8Rng,
    clock: &mut u64,
) -> SimRunStats {
    let step = session.config().round_duration_ms + 1;

    let difficulty = session.start_run(*clock).difficulty;
    let mut spawner = LevelScaledSpawner::new(ChaCha8Rng::seed_from_u64(rng.gen()), difficulty);
    let mut rounds: u64 = 0;
    let mut timed_out = false;

    while session.get_current_run().is_some() {
        if !session.in_combat() {
            let wave = session.get_current_run().map_or(0, |run| run.wave);
            if wave > config.max_waves {
                session.complete_run(*clock);
                break;
            }
            if !session.begin_wave(&mut spawner, NullSink, *clock) {
                break;
            }
        }

        let mut wave_rounds = 0;
        while session.in_combat() && wave_rounds < config.max_rounds_per_wave {
            *clock += step;
            session.update(*clock, rng);
            wave_rounds += 1;
        }
        rounds += wave_rounds as u64;

        if session.combat_status() == Some(CombatStatus::InProgress) {
            debug!(rounds = wave_rounds, "wave timed out");
            timed_out = true;
            session.abandon_run(*clock);
        }
    }

    let run = session
        .last_run()
        .cloned()
        .unwrap_or_else(|| RunStats::new(String::new(), 0, difficulty));
    SimRunStats {
        result: run.result.unwrap_or(RunResult::Defeat),
        waves_cleared: run.wave.saturating_sub(1),
        enemies_defeated: run.enemies_defeated,
        damage_dealt: run.damage_dealt,
        damage_taken: run.damage_taken,
        resources_gained: run.resources_gained,
        experience_gained: run.experience_gained,
        difficulty: run.difficulty,
        rounds,
        timed_out,
        upgrades_bought: 0,
    }
}

/// Greedily buys the cheapest affordable upgrade until nothing is affordable.
fn buy_upgrades(session: &mut GameSession) -> u32 {
    let mut bought = 0;
    loop {
        let resources = session.get_progress().resources;
        let cheapest = session
            .get_progress()
            .sorted_upgrades()
            .into_iter()
            .filter(|u| !u.is_maxed() && u.cost <= resources)
            .min_by_key(|u| u.cost)
            .map(|u| u.id.clone());

        match cheapest {
            Some(id) if session.purchase_upgrade(&id) => bought += 1,
            _ => break,
        }
    }
    bought
}
