use super::persistence::{MemoryProgressStore, ProgressStore};
use super::types::{Loadout, MetaUpgradeType, PlayerProgress, RunEvent, RunResult, RunStats};
use crate::core::constants::*;
use crate::core::stats::{scale, CombatEntity};
use tracing::{debug, info, warn};

/// Owns the persistent `PlayerProgress` and the active run.
///
/// Every mutation that changes the persisted record (run end, purchase,
/// unlock) is written through to the store. Store failures are logged and
/// never interrupt play.
pub struct ProgressionLedger {
    progress: PlayerProgress,
    current_run: Option<RunStats>,
    store: Box<dyn ProgressStore>,
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self::new(PlayerProgress::default(), Box::new(MemoryProgressStore::new()))
    }
}

impl ProgressionLedger {
    pub fn new(progress: PlayerProgress, store: Box<dyn ProgressStore>) -> Self {
        Self {
            progress,
            current_run: None,
            store,
        }
    }

    /// Loads saved progress from `store`, falling back to `defaults` when the
    /// store is empty or unreadable. Upgrades and unlocks present in
    /// `defaults` but missing from the save are merged in.
    pub fn load(store: Box<dyn ProgressStore>, defaults: PlayerProgress) -> Self {
        let progress = match store.load() {
            Ok(Some(mut saved)) => {
                for (id, upgrade) in defaults.meta_upgrades {
                    saved.meta_upgrades.entry(id).or_insert(upgrade);
                }
                saved.unlocked_content.extend(defaults.unlocked_content);
                saved
            }
            Ok(None) => defaults,
            Err(e) => {
                warn!(error = %e, "could not load progress, starting fresh");
                defaults
            }
        };
        Self::new(progress, store)
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn current_run(&self) -> Option<&RunStats> {
        self.current_run.as_ref()
    }

    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// Difficulty of the next run: grows with lifetime runs, discounted by
    /// upgrade investment, floored at 1.
    pub fn difficulty(&self) -> f64 {
        let raw = 1.0 + self.progress.total_runs as f64 * DIFFICULTY_PER_RUN
            - self.progress.upgrade_investment();
        raw.max(MIN_DIFFICULTY)
    }

    fn resource_multiplier(&self) -> f64 {
        1.0 + self.progress.upgrade_effect(MetaUpgradeType::ResourceGain)
    }

    /// Starts a fresh run, discarding any run still in progress.
    pub fn start_new_run(&mut self, now: i64) -> &RunStats {
        if let Some(old) = self.current_run.take() {
            debug!(run = %old.id, "discarding unfinished run");
        }
        let run = RunStats::new(uuid::Uuid::new_v4().to_string(), now, self.difficulty());
        info!(run = %run.id, difficulty = run.difficulty, "run started");
        self.current_run.insert(run)
    }

    /// Folds a combat event into the active run. Returns the resources
    /// awarded (non-zero only for enemy defeats). No-op without a run.
    pub fn track_combat_event(&mut self, event: RunEvent) -> u64 {
        let multiplier = self.resource_multiplier();
        let Some(run) = self.current_run.as_mut() else {
            return 0;
        };
        match event {
            RunEvent::DamageDealt(amount) => {
                run.damage_dealt += amount;
                0
            }
            RunEvent::DamageTaken(amount) => {
                run.damage_taken += amount;
                0
            }
            RunEvent::EnemyDefeated { level } => {
                let reward =
                    (level as f64 * RESOURCES_PER_ENEMY_LEVEL * multiplier).floor() as u64;
                run.enemies_defeated += 1;
                run.resources_gained += reward;
                self.progress.resources += reward;
                debug!(level, reward, "enemy defeated");
                reward
            }
        }
    }

    /// Moves the active run to its next wave. Returns the new wave number.
    pub fn advance_wave(&mut self) -> Option<u32> {
        let run = self.current_run.as_mut()?;
        run.wave += 1;
        Some(run.wave)
    }

    /// Credits experience scaled by XP-gain upgrades. Returns the amount credited.
    pub fn record_experience(&mut self, base: u64) -> u64 {
        let multiplier = 1.0 + self.progress.upgrade_effect(MetaUpgradeType::XpGain);
        let Some(run) = self.current_run.as_mut() else {
            return 0;
        };
        let gained = (base as f64 * multiplier).floor() as u64;
        run.experience_gained += gained;
        gained
    }

    /// Finalizes the active run, pays the completion reward, updates lifetime
    /// statistics and the best run, then persists. Returns the finished run.
    pub fn end_run(&mut self, result: RunResult, now: i64) -> Option<RunStats> {
        let mut run = self.current_run.take()?;
        run.end_time = Some(now);
        run.result = Some(result);

        let victory_bonus = match result {
            RunResult::Victory => RUN_REWARD_VICTORY_BONUS,
            RunResult::Defeat => 0,
        };
        let base = run.wave as u64 * RUN_REWARD_PER_WAVE
            + run.enemies_defeated * RUN_REWARD_PER_KILL
            + (run.difficulty * RUN_REWARD_DIFFICULTY_FACTOR).floor() as u64
            + victory_bonus;
        let reward = (base as f64 * self.resource_multiplier()).floor() as u64;
        run.resources_gained += reward;
        self.progress.resources += reward;

        let stats = &mut self.progress.statistics;
        stats.total_enemies_defeated += run.enemies_defeated;
        stats.total_damage_dealt += run.damage_dealt;
        stats.total_damage_taken += run.damage_taken;
        stats.total_resources_gained += run.resources_gained;
        stats.total_play_time += run.duration_seconds();
        self.progress.total_runs += 1;

        let is_best = self
            .progress
            .best_run
            .as_ref()
            .map_or(true, |best| run.beats(best));
        if is_best {
            self.progress.best_run = Some(run.clone());
        }

        info!(
            run = %run.id,
            ?result,
            wave = run.wave,
            reward,
            best = is_best,
            "run ended"
        );
        self.persist();
        Some(run)
    }

    /// Buys one level of an upgrade. Fails on unknown id, max level or
    /// insufficient resources, leaving everything untouched.
    pub fn purchase_upgrade(&mut self, id: &str) -> bool {
        let resources = self.progress.resources;
        let Some(upgrade) = self.progress.meta_upgrades.get_mut(id) else {
            return false;
        };
        if upgrade.is_maxed() || resources < upgrade.cost {
            return false;
        }

        let paid = upgrade.cost;
        upgrade.level += 1;
        upgrade.cost = (upgrade.cost as f64 * UPGRADE_COST_GROWTH).floor() as u64;
        let level = upgrade.level;
        self.progress.resources -= paid;

        info!(upgrade = id, level, paid, "upgrade purchased");
        self.persist();
        true
    }

    /// Deducts `amount` from the balance without persisting. Fails, leaving
    /// the balance untouched, when it is too small.
    pub fn spend_resources(&mut self, amount: u64) -> bool {
        if self.progress.resources < amount {
            return false;
        }
        self.progress.resources -= amount;
        true
    }

    /// Fraction taken off skill cooldowns by Cooldown upgrades, at most 1.
    pub fn cooldown_reduction(&self) -> f64 {
        self.progress
            .upgrade_effect(MetaUpgradeType::Cooldown)
            .clamp(0.0, 1.0)
    }

    /// Records the loadout in the persisted progress and saves it.
    pub fn save_loadout(&mut self, loadout: Loadout) {
        self.progress.loadout = Some(loadout);
        self.persist();
    }

    /// Multiplies the entity's stats by each stat upgrade's `1 + value * level`.
    /// Applies at most once per entity; returns false if already applied.
    /// Cooldown upgrades act on skills instead, see `cooldown_reduction`.
    pub fn apply_meta_upgrades(&self, entity: &mut CombatEntity) -> bool {
        if entity.applied.meta_upgrades {
            return false;
        }
        for upgrade in self.progress.sorted_upgrades() {
            if upgrade.level == 0 {
                continue;
            }
            let factor = 1.0 + upgrade.effect();
            let stats = &mut entity.stats;
            match upgrade.upgrade_type {
                MetaUpgradeType::Damage => stats.attack = scale(stats.attack, factor),
                MetaUpgradeType::Defense => stats.defense = scale(stats.defense, factor),
                MetaUpgradeType::Speed => stats.speed = scale(stats.speed, factor),
                MetaUpgradeType::Health => stats.scale_max_health(factor),
                MetaUpgradeType::Energy => stats.scale_max_energy(factor),
                MetaUpgradeType::ResourceGain
                | MetaUpgradeType::XpGain
                | MetaUpgradeType::Cooldown => {}
            }
        }
        entity.applied.meta_upgrades = true;
        true
    }

    /// Returns true if `id` was newly unlocked.
    pub fn unlock_content(&mut self, id: &str) -> bool {
        if !self.progress.unlocked_content.insert(id.to_string()) {
            return false;
        }
        info!(content = id, "content unlocked");
        self.persist();
        true
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.progress.unlocked_content.contains(id)
    }

    /// Writes the current record to the store.
    pub fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.progress) {
            warn!(error = %e, "failed to save progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stats::{CombatStats, EntityId};
    use crate::progression::persistence::SaveError;
    use crate::progression::types::MetaUpgrade;

    fn upgrade(id: &str, upgrade_type: MetaUpgradeType, value: f64, cost: u64) -> MetaUpgrade {
        MetaUpgrade {
            id: id.to_string(),
            name: id.to_string(),
            upgrade_type,
            value,
            cost,
            level: 0,
            max_level: 3,
        }
    }

    fn ledger_with(upgrades: Vec<MetaUpgrade>, resources: u64) -> ProgressionLedger {
        let mut progress = PlayerProgress::new(upgrades, []);
        progress.resources = resources;
        ProgressionLedger::new(progress, Box::new(MemoryProgressStore::new()))
    }

    fn saved_progress(ledger: &ProgressionLedger) -> Option<PlayerProgress> {
        ledger.store().load().unwrap()
    }

    #[test]
    fn test_difficulty_floor_and_growth() {
        let mut ledger = ledger_with(vec![upgrade("dmg", MetaUpgradeType::Damage, 0.5, 0)], 0);
        assert!((ledger.difficulty() - 1.0).abs() < 1e-9);

        ledger.progress.total_runs = 5;
        assert!((ledger.difficulty() - 1.5).abs() < 1e-9);

        ledger.progress.meta_upgrades.get_mut("dmg").unwrap().level = 2;
        // 1.5 - 1.0 = 0.5, floored at 1
        assert!((ledger.difficulty() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_new_run_records_difficulty() {
        let mut ledger = ledger_with(vec![], 0);
        ledger.progress.total_runs = 3;
        let run = ledger.start_new_run(1000);
        assert!((run.difficulty - 1.3).abs() < 1e-9);
        assert_eq!(run.wave, 1);
        assert_eq!(run.start_time, 1000);
    }

    #[test]
    fn test_enemy_defeat_reward_uses_resource_gain() {
        let mut ledger = ledger_with(
            vec![upgrade("gain", MetaUpgradeType::ResourceGain, 0.1, 0)],
            0,
        );
        ledger.progress.meta_upgrades.get_mut("gain").unwrap().level = 2;
        ledger.start_new_run(0);

        // floor(3 * 5 * 1.2) = 18
        assert_eq!(ledger.track_combat_event(RunEvent::EnemyDefeated { level: 3 }), 18);
        ledger.track_combat_event(RunEvent::DamageDealt(40));
        ledger.track_combat_event(RunEvent::DamageTaken(7));

        let run = ledger.current_run().unwrap();
        assert_eq!(run.enemies_defeated, 1);
        assert_eq!(run.resources_gained, 18);
        assert_eq!(run.damage_dealt, 40);
        assert_eq!(run.damage_taken, 7);
        assert_eq!(ledger.progress().resources, 18);
    }

    #[test]
    fn test_events_without_run_are_ignored() {
        let mut ledger = ledger_with(vec![], 0);
        assert_eq!(ledger.track_combat_event(RunEvent::EnemyDefeated { level: 5 }), 0);
        assert_eq!(ledger.progress().resources, 0);
        assert!(ledger.advance_wave().is_none());
        assert!(ledger.end_run(RunResult::Defeat, 10).is_none());
    }

    #[test]
    fn test_end_run_reward_and_statistics() {
        let mut ledger = ledger_with(vec![], 0);
        ledger.start_new_run(100);
        ledger.track_combat_event(RunEvent::EnemyDefeated { level: 1 });
        ledger.track_combat_event(RunEvent::EnemyDefeated { level: 2 });
        ledger.track_combat_event(RunEvent::DamageDealt(90));
        ledger.advance_wave();

        let run = ledger.end_run(RunResult::Victory, 160).unwrap();
        // kills: 5 + 10; completion: 2*50 + 2*10 + floor(1.0*100) + 500 = 720
        assert_eq!(run.resources_gained, 735);
        assert_eq!(run.result, Some(RunResult::Victory));
        assert_eq!(run.end_time, Some(160));

        let progress = ledger.progress();
        assert_eq!(progress.resources, 735);
        assert_eq!(progress.total_runs, 1);
        assert_eq!(progress.statistics.total_enemies_defeated, 2);
        assert_eq!(progress.statistics.total_damage_dealt, 90);
        assert_eq!(progress.statistics.total_play_time, 60);
        assert_eq!(progress.best_run.as_ref().map(|r| r.id.clone()), Some(run.id));
        assert!(ledger.current_run().is_none());
        assert_eq!(saved_progress(&ledger).as_ref(), Some(ledger.progress()));
    }

    #[test]
    fn test_best_run_kept_when_new_run_is_worse() {
        let mut ledger = ledger_with(vec![], 0);
        ledger.start_new_run(0);
        ledger.advance_wave();
        ledger.advance_wave();
        let first = ledger.end_run(RunResult::Defeat, 10).unwrap();

        ledger.start_new_run(20);
        let second = ledger.end_run(RunResult::Victory, 30).unwrap();
        assert_eq!(second.wave, 1);
        assert_eq!(ledger.progress().best_run.as_ref().unwrap().id, first.id);
    }

    #[test]
    fn test_purchase_upgrade_escalates_cost() {
        let mut ledger = ledger_with(vec![upgrade("dmg", MetaUpgradeType::Damage, 0.05, 100)], 300);
        assert!(ledger.purchase_upgrade("dmg"));

        let upgrade = &ledger.progress().meta_upgrades["dmg"];
        assert_eq!(upgrade.level, 1);
        assert_eq!(upgrade.cost, 150);
        assert_eq!(ledger.progress().resources, 200);

        assert!(ledger.purchase_upgrade("dmg"));
        assert_eq!(ledger.progress().resources, 50);
        assert_eq!(ledger.progress().meta_upgrades["dmg"].cost, 225);

        // 50 < 225
        assert!(!ledger.purchase_upgrade("dmg"));
        assert_eq!(ledger.progress().resources, 50);
        assert_eq!(ledger.progress().meta_upgrades["dmg"].level, 2);
    }

    #[test]
    fn test_purchase_at_max_level_fails_untouched() {
        let mut ledger = ledger_with(vec![upgrade("dmg", MetaUpgradeType::Damage, 0.05, 100)], 10_000);
        ledger.progress.meta_upgrades.get_mut("dmg").unwrap().level = 3;

        assert!(!ledger.purchase_upgrade("dmg"));
        assert_eq!(ledger.progress().resources, 10_000);
        assert_eq!(ledger.progress().meta_upgrades["dmg"].level, 3);
        assert_eq!(ledger.progress().meta_upgrades["dmg"].cost, 100);
    }

    #[test]
    fn test_purchase_unknown_upgrade_fails() {
        let mut ledger = ledger_with(vec![], 10_000);
        assert!(!ledger.purchase_upgrade("nope"));
        assert_eq!(ledger.progress().resources, 10_000);
        assert!(saved_progress(&ledger).is_none());
    }

    #[test]
    fn test_apply_meta_upgrades_once() {
        let mut ledger = ledger_with(
            vec![
                upgrade("dmg", MetaUpgradeType::Damage, 0.1, 0),
                upgrade("hp", MetaUpgradeType::Health, 0.2, 0),
                upgrade("cd", MetaUpgradeType::Cooldown, 0.1, 0),
            ],
            0,
        );
        ledger.progress.meta_upgrades.get_mut("dmg").unwrap().level = 2;
        ledger.progress.meta_upgrades.get_mut("hp").unwrap().level = 1;
        ledger.progress.meta_upgrades.get_mut("cd").unwrap().level = 3;

        let stats = CombatStats::new(1, 100, 15, 10, 10, 50);
        let mut player = CombatEntity::player(EntityId(1), "Hero".to_string(), stats);

        assert!(ledger.apply_meta_upgrades(&mut player));
        assert_eq!(player.stats.attack, 18);
        assert_eq!(player.stats.max_health(), 120);
        assert_eq!(player.stats.current_health(), 120);
        assert_eq!(player.stats.defense, 10);

        assert!(!ledger.apply_meta_upgrades(&mut player));
        assert_eq!(player.stats.attack, 18);
        assert_eq!(player.stats.max_health(), 120);
    }

    #[test]
    fn test_record_experience_scales_with_xp_gain() {
        let mut ledger = ledger_with(vec![upgrade("xp", MetaUpgradeType::XpGain, 0.25, 0)], 0);
        ledger.progress.meta_upgrades.get_mut("xp").unwrap().level = 2;
        assert_eq!(ledger.record_experience(10), 0);

        ledger.start_new_run(0);
        assert_eq!(ledger.record_experience(10), 15);
        assert_eq!(ledger.current_run().unwrap().experience_gained, 15);
    }

    #[test]
    fn test_unlock_content() {
        let mut ledger = ledger_with(vec![], 0);
        assert!(!ledger.is_unlocked("meteor"));
        assert!(ledger.unlock_content("meteor"));
        assert!(!ledger.unlock_content("meteor"));
        assert!(ledger.is_unlocked("meteor"));
    }

    #[test]
    fn test_spend_resources_fails_closed() {
        let mut ledger = ledger_with(vec![], 100);
        assert!(!ledger.spend_resources(150));
        assert_eq!(ledger.progress().resources, 100);
        assert!(ledger.spend_resources(100));
        assert_eq!(ledger.progress().resources, 0);
    }

    #[test]
    fn test_cooldown_reduction_follows_upgrades() {
        let mut ledger = ledger_with(vec![upgrade("cd", MetaUpgradeType::Cooldown, 0.05, 100)], 1000);
        assert_eq!(ledger.cooldown_reduction(), 0.0);
        assert!(ledger.purchase_upgrade("cd"));
        assert!(ledger.purchase_upgrade("cd"));
        assert!((ledger.cooldown_reduction() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_save_loadout_persists() {
        let mut ledger = ledger_with(vec![], 0);
        let loadout = Loadout {
            skills: vec![Some("meteor".to_string()), None],
            passive_levels: [("thorns".to_string(), 3)].into_iter().collect(),
            ..Loadout::default()
        };
        ledger.save_loadout(loadout.clone());
        assert_eq!(ledger.progress().loadout.as_ref(), Some(&loadout));
        assert_eq!(saved_progress(&ledger).and_then(|p| p.loadout), Some(loadout));
    }

    #[test]
    fn test_load_merges_new_defaults() {
        let mut saved = PlayerProgress::new([upgrade("dmg", MetaUpgradeType::Damage, 0.05, 100)], []);
        saved.resources = 77;
        saved.meta_upgrades.get_mut("dmg").unwrap().level = 2;
        let store = MemoryProgressStore::with_progress(saved);

        let defaults = PlayerProgress::new(
            [
                upgrade("dmg", MetaUpgradeType::Damage, 0.05, 100),
                upgrade("hp", MetaUpgradeType::Health, 0.1, 100),
            ],
            ["fireball".to_string()],
        );
        let ledger = ProgressionLedger::load(Box::new(store), defaults);

        assert_eq!(ledger.progress().resources, 77);
        assert_eq!(ledger.progress().meta_upgrades["dmg"].level, 2);
        assert!(ledger.progress().meta_upgrades.contains_key("hp"));
        assert!(ledger.is_unlocked("fireball"));
    }

    struct FailingStore;

    impl ProgressStore for FailingStore {
        fn load(&self) -> Result<Option<PlayerProgress>, SaveError> {
            Err(SaveError::Corrupt("unreadable".to_string()))
        }

        fn save(&mut self, _progress: &PlayerProgress) -> Result<(), SaveError> {
            Err(SaveError::Corrupt("read-only".to_string()))
        }
    }

    #[test]
    fn test_store_failures_do_not_abort() {
        let mut defaults = PlayerProgress::new([upgrade("dmg", MetaUpgradeType::Damage, 0.05, 100)], []);
        defaults.resources = 500;
        let mut ledger = ProgressionLedger::load(Box::new(FailingStore), defaults);

        assert!(ledger.purchase_upgrade("dmg"));
        ledger.start_new_run(0);
        assert!(ledger.end_run(RunResult::Defeat, 5).is_some());
        assert_eq!(ledger.progress().total_runs, 1);
    }
}
