//! Simulation report generation.

use crate::progression::{PlayerProgress, RunResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one simulated run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimRunStats {
    pub result: RunResult,
    pub waves_cleared: u32,
    pub enemies_defeated: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub resources_gained: u64,
    pub experience_gained: u64,
    pub difficulty: f64,
    pub rounds: u64,
    pub timed_out: bool,
    pub upgrades_bought: u32,
}

/// Aggregated results from a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub victories: u32,
    pub defeats: u32,
    pub timeouts: u32,

    // Aggregated stats
    pub avg_waves_cleared: f64,
    pub best_waves_cleared: u32,
    pub avg_enemies_defeated: f64,
    pub avg_resources_gained: f64,
    pub avg_rounds: f64,
    pub first_difficulty: f64,
    pub last_difficulty: f64,

    // Shop
    pub total_upgrades_bought: u32,
    pub final_resources: u64,
    pub final_upgrade_levels: BTreeMap<String, u32>,

    /// Waves cleared -> number of runs
    pub wave_distribution: BTreeMap<u32, u32>,

    // Individual run stats for detailed analysis
    pub runs: Vec<SimRunStats>,
}

impl SimReport {
    /// Create a report from finished runs and the profile they left behind.
    pub fn from_runs(runs: Vec<SimRunStats>, progress: &PlayerProgress) -> Self {
        let num_runs = runs.len() as u32;
        let divisor = num_runs.max(1) as f64;
        let victories = runs
            .iter()
            .filter(|r| r.result == RunResult::Victory)
            .count() as u32;
        let timeouts = runs.iter().filter(|r| r.timed_out).count() as u32;

        let avg_waves_cleared =
            runs.iter().map(|r| r.waves_cleared as f64).sum::<f64>() / divisor;
        let avg_enemies_defeated =
            runs.iter().map(|r| r.enemies_defeated as f64).sum::<f64>() / divisor;
        let avg_resources_gained =
            runs.iter().map(|r| r.resources_gained as f64).sum::<f64>() / divisor;
        let avg_rounds = runs.iter().map(|r| r.rounds as f64).sum::<f64>() / divisor;

        let mut wave_distribution = BTreeMap::new();
        for run in &runs {
            *wave_distribution.entry(run.waves_cleared).or_insert(0) += 1;
        }

        Self {
            num_runs,
            victories,
            defeats: num_runs - victories,
            timeouts,
            avg_waves_cleared,
            best_waves_cleared: runs.iter().map(|r| r.waves_cleared).max().unwrap_or(0),
            avg_enemies_defeated,
            avg_resources_gained,
            avg_rounds,
            first_difficulty: runs.first().map_or(0.0, |r| r.difficulty),
            last_difficulty: runs.last().map_or(0.0, |r| r.difficulty),
            total_upgrades_bought: runs.iter().map(|r| r.upgrades_bought).sum(),
            final_resources: progress.resources,
            final_upgrade_levels: progress
                .meta_upgrades
                .values()
                .map(|u| (u.id.clone(), u.level))
                .collect(),
            wave_distribution,
            runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} victories, {} defeats ({} timed out)\n\n",
            self.num_runs, self.victories, self.defeats, self.timeouts
        ));

        report.push_str("── RUNS ─────────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Waves Cleared:   {:.1}\n",
            self.avg_waves_cleared
        ));
        report.push_str(&format!(
            "  Best Waves Cleared:  {}\n",
            self.best_waves_cleared
        ));
        report.push_str(&format!(
            "  Avg Enemies Killed:  {:.1}\n",
            self.avg_enemies_defeated
        ));
        report.push_str(&format!(
            "  Avg Resources:       {:.0}\n",
            self.avg_resources_gained
        ));
        report.push_str(&format!("  Avg Rounds:          {:.0}\n", self.avg_rounds));
        report.push_str(&format!(
            "  Difficulty:          {:.2} -> {:.2}\n\n",
            self.first_difficulty, self.last_difficulty
        ));

        report.push_str("── WAVES CLEARED ────────────────────────────────────────────────\n");
        for (waves, count) in &self.wave_distribution {
            let pct = (*count as f64 / self.num_runs.max(1) as f64) * 100.0;
            let bar: String = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!("  {:3} waves: {:>5.1}% {}\n", waves, pct, bar));
        }
        report.push('\n');

        report.push_str("── UPGRADES ─────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Purchased:           {}\n",
            self.total_upgrades_bought
        ));
        report.push_str(&format!(
            "  Unspent Resources:   {}\n",
            self.final_resources
        ));
        for (id, level) in &self.final_upgrade_levels {
            report.push_str(&format!("  {:<18} Lv {}\n", id, level));
        }
        report.push('\n');

        report.push_str("── BALANCE ASSESSMENT ───────────────────────────────────────────\n");
        let win_rate = (self.victories as f64 / self.num_runs.max(1) as f64) * 100.0;
        let rating = if win_rate > 90.0 {
            "TOO EASY - Runs rarely fail"
        } else if win_rate > 40.0 {
            "GOOD - Challenging but fair"
        } else if win_rate > 10.0 {
            "HARD - Upgrades needed to finish"
        } else {
            "TOO HARD - Runs almost never finish"
        };
        report.push_str(&format!("  Win Rate: {:.1}%\n", win_rate));
        report.push_str(&format!("  Rating:   {}\n", rating));

        if self.timeouts > 0 {
            report.push_str("  ⚠️  Some waves hit the round limit - stalemates?\n");
        }
        if self.last_difficulty > self.first_difficulty + 1.0 {
            report.push_str("  ⚠️  Difficulty outpacing upgrade investment\n");
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::default_progress;

    fn run(result: RunResult, waves_cleared: u32, upgrades_bought: u32) -> SimRunStats {
        SimRunStats {
            result,
            waves_cleared,
            enemies_defeated: waves_cleared as u64 * 2,
            damage_dealt: 100,
            damage_taken: 50,
            resources_gained: 300,
            experience_gained: 20,
            difficulty: 1.0,
            rounds: 40,
            timed_out: false,
            upgrades_bought,
        }
    }

    #[test]
    fn test_report_generation() {
        let runs = vec![
            run(RunResult::Defeat, 2, 1),
            run(RunResult::Victory, 5, 2),
        ];

        let report = SimReport::from_runs(runs, &default_progress());
        assert_eq!(report.num_runs, 2);
        assert_eq!(report.victories, 1);
        assert_eq!(report.defeats, 1);
        assert_eq!(report.best_waves_cleared, 5);
        assert_eq!(report.total_upgrades_bought, 3);
        assert!((report.avg_waves_cleared - 3.5).abs() < 0.01);
        assert_eq!(report.wave_distribution.get(&2), Some(&1));
        assert_eq!(report.final_upgrade_levels.len(), 8);
    }

    #[test]
    fn test_text_and_json_output() {
        let report = SimReport::from_runs(vec![run(RunResult::Victory, 3, 0)], &default_progress());
        let text = report.to_text();
        assert!(text.contains("SIMULATION REPORT"));
        assert!(text.contains("damage_boost"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["num_runs"], 1);
        assert_eq!(json["runs"][0]["result"], "Victory");
    }

    #[test]
    fn test_empty_report() {
        let report = SimReport::from_runs(Vec::new(), &PlayerProgress::default());
        assert_eq!(report.num_runs, 0);
        assert!((report.avg_waves_cleared).abs() < f64::EPSILON);
        assert!(report.to_text().contains("Win Rate: 0.0%"));
    }
}
