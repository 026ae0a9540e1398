//! The game-facing surface: loadout editing, the upgrade shop, and driving
//! waves of combat while reporting outcomes to the progression ledger.
//!
//! All timestamps passed in are milliseconds. The ledger records whole
//! seconds derived from them. Loadout changes are saved with the progress
//! record and restored on load.

use crate::combat::{CombatEngine, CombatEvent, CombatSink, CombatStatus, NullSink};
use crate::content;
use crate::core::config::CombatConfig;
use crate::core::constants::*;
use crate::core::stats::{CombatEntity, CombatStats, EntityId, EntityIdAllocator};
use crate::items::{GearLedger, GearSlot};
use crate::passives::PassiveLoadout;
use crate::progression::{
    Loadout, PlayerProgress, ProgressStore, ProgressionLedger, RunEvent, RunResult, RunStats,
};
use crate::skills::SkillLoadout;
use crate::spawn::{wave_enemy_count, wave_enemy_level, EnemySpawner};
use rand::Rng;
use tracing::{debug, info};

fn to_seconds(now_ms: u64) -> i64 {
    (now_ms / 1000) as i64
}

pub struct GameSession<S: CombatSink = NullSink> {
    player_name: String,
    ledger: ProgressionLedger,
    skills: SkillLoadout,
    passives: PassiveLoadout,
    gear: GearLedger,
    config: CombatConfig,
    ids: EntityIdAllocator,
    player_id: Option<EntityId>,
    engine: Option<CombatEngine<S>>,
    last_run: Option<RunStats>,
}

impl<S: CombatSink> GameSession<S> {
    /// Starts from the starter loadout, then restores any saved one.
    pub fn new(player_name: String, ledger: ProgressionLedger) -> Self {
        let saved = ledger.progress().loadout.clone();
        let mut session = Self {
            player_name,
            ledger,
            skills: content::starter_skills(),
            passives: content::starter_passives(),
            gear: content::starter_gear(),
            config: CombatConfig::default(),
            ids: EntityIdAllocator::new(),
            player_id: None,
            engine: None,
            last_run: None,
        };
        if let Some(saved) = saved {
            session.restore_loadout(&saved);
        }
        session
    }

    /// Re-equips a saved loadout. Entries that are unknown or no longer
    /// unlocked are dropped.
    fn restore_loadout(&mut self, saved: &Loadout) {
        for (id, level) in &saved.passive_levels {
            self.passives.set_level(id, *level);
        }
        for slot in 0..self.skills.max_slots() {
            self.skills.unequip(slot);
        }
        for (slot, id) in saved.skills.iter().enumerate() {
            if let Some(id) = id {
                self.try_equip_skill(id, slot);
            }
        }
        for slot in 0..self.passives.max_slots() {
            self.passives.unequip(slot);
        }
        for (slot, id) in saved.passives.iter().enumerate() {
            if let Some(id) = id {
                self.try_equip_passive(id, slot);
            }
        }
        for slot in GearSlot::ALL {
            self.gear.unequip(slot);
        }
        for (_, id) in &saved.gear {
            if let Some(id) = id {
                self.try_equip_gear(id);
            }
        }
    }

    /// Loads saved progress from `store`, defaulting to a fresh profile.
    pub fn load(player_name: String, store: Box<dyn ProgressStore>) -> Self {
        Self::new(
            player_name,
            ProgressionLedger::load(store, content::default_progress()),
        )
    }

    pub fn with_config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    // Read accessors

    pub fn get_progress(&self) -> &PlayerProgress {
        self.ledger.progress()
    }

    pub fn get_current_run(&self) -> Option<&RunStats> {
        self.ledger.current_run()
    }

    pub fn get_loadout(&self) -> Loadout {
        Loadout {
            skills: self.skills.slots().to_vec(),
            passives: self.passives.slots().to_vec(),
            gear: GearSlot::ALL
                .iter()
                .map(|slot| (*slot, self.gear.get(*slot).as_ref().map(|i| i.id.clone())))
                .collect(),
            passive_levels: self
                .passives
                .known_passives()
                .into_iter()
                .map(|p| (p.id.clone(), p.level))
                .collect(),
        }
    }

    pub fn get_gear(&self) -> &GearLedger {
        &self.gear
    }

    pub fn get_skills(&self) -> &SkillLoadout {
        &self.skills
    }

    pub fn get_passives(&self) -> &PassiveLoadout {
        &self.passives
    }

    /// The most recently finished run.
    pub fn last_run(&self) -> Option<&RunStats> {
        self.last_run.as_ref()
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ProgressionLedger {
        &self.ledger
    }

    pub fn engine(&self) -> Option<&CombatEngine<S>> {
        self.engine.as_ref()
    }

    pub fn in_combat(&self) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|engine| !engine.status().is_terminal())
    }

    // Commands

    pub fn purchase_upgrade(&mut self, id: &str) -> bool {
        self.ledger.purchase_upgrade(id)
    }

    /// Equips an unlocked skill. Takes effect from the next wave.
    pub fn equip_skill(&mut self, id: &str, slot: usize) -> bool {
        self.try_equip_skill(id, slot) && self.save_loadout()
    }

    pub fn unequip_skill(&mut self, slot: usize) -> bool {
        self.skills.unequip(slot) && self.save_loadout()
    }

    /// Equips an unlocked passive. Takes effect from the next wave.
    pub fn equip_passive(&mut self, id: &str, slot: usize) -> bool {
        self.try_equip_passive(id, slot) && self.save_loadout()
    }

    pub fn unequip_passive(&mut self, slot: usize) -> bool {
        self.passives.unequip(slot) && self.save_loadout()
    }

    /// Raises an unlocked passive one level, paying
    /// `PASSIVE_LEVEL_COST * current level` from the balance.
    pub fn level_up_passive(&mut self, id: &str) -> bool {
        if !self.ledger.is_unlocked(id) {
            return false;
        }
        let Some(passive) = self.passives.passive(id) else {
            return false;
        };
        if passive.is_maxed() {
            return false;
        }
        let cost = PASSIVE_LEVEL_COST * passive.level as u64;
        if !self.ledger.spend_resources(cost) {
            return false;
        }
        self.passives.level_up(id);
        info!(passive = id, cost, "passive levelled");
        self.save_loadout()
    }

    /// Equips a catalog item into its own slot. Set pieces require the set
    /// to be unlocked.
    pub fn equip_gear(&mut self, item_id: &str) -> bool {
        self.try_equip_gear(item_id) && self.save_loadout()
    }

    pub fn unequip_gear(&mut self, slot: GearSlot) -> bool {
        self.gear.unequip(slot).is_some() && self.save_loadout()
    }

    fn try_equip_skill(&mut self, id: &str, slot: usize) -> bool {
        self.ledger.is_unlocked(id) && self.skills.equip(id, slot)
    }

    fn try_equip_passive(&mut self, id: &str, slot: usize) -> bool {
        self.ledger.is_unlocked(id) && self.passives.equip(id, slot)
    }

    fn try_equip_gear(&mut self, item_id: &str) -> bool {
        let Some(item) = content::gear_item(item_id) else {
            return false;
        };
        if let Some(set_id) = &item.set_id {
            if !self.ledger.is_unlocked(set_id) {
                return false;
            }
        }
        let slot = item.slot;
        self.gear.equip(item, slot)
    }

    /// Writes the current loadout through the ledger. Always true so it can
    /// close a successful command.
    fn save_loadout(&mut self) -> bool {
        let loadout = self.get_loadout();
        self.ledger.save_loadout(loadout);
        true
    }

    /// Starts a new run, dropping any encounter still on the field.
    pub fn start_run(&mut self, now: u64) -> &RunStats {
        self.engine = None;
        self.player_id = None;
        self.ledger.start_new_run(to_seconds(now))
    }

    /// Builds a fresh, fully modified player for this wave.
    fn build_player(&mut self) -> CombatEntity {
        let stats = CombatStats::new(
            1,
            PLAYER_BASE_HEALTH,
            PLAYER_BASE_ATTACK,
            PLAYER_BASE_DEFENSE,
            PLAYER_BASE_SPEED,
            PLAYER_BASE_ENERGY,
        );
        let mut player = CombatEntity::player(self.ids.allocate(), self.player_name.clone(), stats);
        self.ledger.apply_meta_upgrades(&mut player);
        self.gear.apply_gear_stats(&mut player);
        player
    }

    /// Spawns the current wave and starts its encounter. Fails without an
    /// active run or while an encounter is still being fought.
    pub fn begin_wave(&mut self, spawner: &mut impl EnemySpawner, sink: S, now: u64) -> bool {
        if self.in_combat() {
            return false;
        }
        let Some(wave) = self.ledger.current_run().map(|run| run.wave) else {
            return false;
        };

        let player = self.build_player();
        let level = wave_enemy_level(wave);
        let enemies = (0..wave_enemy_count(wave))
            .map(|_| spawner.spawn_enemy(self.ids.allocate(), level))
            .collect();

        self.player_id = Some(player.id);
        let mut skills = self.skills.clone();
        skills.set_cooldown_reduction(self.ledger.cooldown_reduction());
        let mut engine = CombatEngine::new(
            player,
            enemies,
            skills,
            self.passives.clone(),
            sink,
            self.config.clone(),
        );
        engine.start(now);
        info!(wave, level, "wave started");
        self.engine = Some(engine);
        true
    }

    /// Advances the encounter and folds its events into the active run.
    /// Victory advances the run to the next wave; defeat ends the run.
    pub fn update(&mut self, now: u64, rng: &mut impl Rng) -> Vec<CombatEvent> {
        let Some(engine) = self.engine.as_mut() else {
            return Vec::new();
        };
        let events = engine.update(now, rng);
        for event in &events {
            self.record_event(event, now);
        }
        events
    }

    fn record_event(&mut self, event: &CombatEvent, now: u64) {
        match event {
            CombatEvent::DamageDealt {
                source,
                target,
                amount,
                ..
            } => {
                if Some(*source) == self.player_id {
                    self.ledger
                        .track_combat_event(RunEvent::DamageDealt(*amount as u64));
                }
                if Some(*target) == self.player_id {
                    self.ledger
                        .track_combat_event(RunEvent::DamageTaken(*amount as u64));
                }
            }
            CombatEvent::EntityDefeated {
                level,
                is_player: false,
                ..
            } => {
                self.ledger
                    .track_combat_event(RunEvent::EnemyDefeated { level: *level });
            }
            CombatEvent::Victory { experience_gained } => {
                self.ledger.record_experience(*experience_gained);
                if let Some(wave) = self.ledger.advance_wave() {
                    for id in content::unlocks_for_wave(wave) {
                        self.ledger.unlock_content(id);
                    }
                    debug!(wave, "wave cleared");
                }
            }
            CombatEvent::Defeat => {
                self.finish(RunResult::Defeat, now);
            }
            _ => {}
        }
    }

    fn finish(&mut self, result: RunResult, now: u64) -> Option<RunStats> {
        let run = self.ledger.end_run(result, to_seconds(now))?;
        self.last_run = Some(run.clone());
        Some(run)
    }

    /// Ends the run victoriously between waves.
    pub fn complete_run(&mut self, now: u64) -> Option<RunStats> {
        if self.in_combat() {
            return None;
        }
        self.engine = None;
        self.finish(RunResult::Victory, now)
    }

    /// Gives up the run, counting it as a defeat.
    pub fn abandon_run(&mut self, now: u64) -> Option<RunStats> {
        self.engine = None;
        self.finish(RunResult::Defeat, now)
    }

    /// Status of the current encounter, if any.
    pub fn combat_status(&self) -> Option<CombatStatus> {
        self.engine.as_ref().map(|engine| engine.status())
    }
}
