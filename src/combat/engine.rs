//! Round-based combat engine.
//!
//! `CombatEngine` owns one encounter: the player, the enemies of a wave, and the
//! player's skill/passive loadouts. It is driven from outside by `update(now)`:
//!
//! 1. When more than one round duration has elapsed since the last round
//!    started, every living combatant picks one action (fastest first).
//! 2. Queued actions resolve strictly in FIFO order.
//! 3. Deferred animation tasks that came due are flushed to the sink.
//! 4. Victory/defeat is checked once the player or every enemy is down.
//!
//! Terminal states are absorbing; a new engine is built for the next fight.

use super::ai::{select_action, turn_order};
use super::sink::{CombatSink, NullSink, ScheduledTask, TaskScheduler};
use super::types::{
    Animation, CombatAction, CombatEvent, CombatResult, CombatRound, CombatStatus, DamageKind,
};
use crate::core::config::CombatConfig;
use crate::core::constants::EXPERIENCE_PER_ENEMY_LEVEL;
use crate::core::stats::{CombatEntity, EntityId, Position};
use crate::passives::{damage_multiplier, PassiveEffectType, PassiveLoadout, PassiveResult, PassiveTrigger};
use crate::skills::{ResolvedSkillEffect, SkillEffectType, SkillLoadout, SkillTarget, TargetType};
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info};

pub struct CombatEngine<S: CombatSink = NullSink> {
    config: CombatConfig,
    status: CombatStatus,
    /// Player at index 0, enemies after it in spawn order
    roster: Vec<CombatEntity>,
    /// Levels of every enemy the encounter started with
    encounter_levels: Vec<u32>,
    skills: SkillLoadout,
    passives: PassiveLoadout,
    queue: VecDeque<CombatAction>,
    rounds: Vec<CombatRound>,
    last_round_start: u64,
    scheduler: TaskScheduler,
    sink: S,
    result: Option<CombatResult>,
}

impl<S: CombatSink> CombatEngine<S> {
    pub fn new(
        mut player: CombatEntity,
        enemies: Vec<CombatEntity>,
        skills: SkillLoadout,
        passives: PassiveLoadout,
        sink: S,
        config: CombatConfig,
    ) -> Self {
        player.is_player = true;
        let encounter_levels = enemies.iter().map(|e| e.stats.level).collect();
        let mut roster = Vec::with_capacity(enemies.len() + 1);
        roster.push(player);
        roster.extend(enemies.into_iter().map(|mut e| {
            e.is_player = false;
            e
        }));

        Self {
            config,
            status: CombatStatus::Waiting,
            roster,
            encounter_levels,
            skills,
            passives,
            queue: VecDeque::new(),
            rounds: Vec::new(),
            last_round_start: 0,
            scheduler: TaskScheduler::new(),
            sink,
            result: None,
        }
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn result(&self) -> Option<&CombatResult> {
        self.result.as_ref()
    }

    pub fn rounds(&self) -> &[CombatRound] {
        &self.rounds
    }

    pub fn round_number(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn roster(&self) -> &[CombatEntity] {
        &self.roster
    }

    pub fn player(&self) -> &CombatEntity {
        &self.roster[0]
    }

    pub fn enemies(&self) -> &[CombatEntity] {
        &self.roster[1..]
    }

    pub fn entity(&self, id: EntityId) -> Option<&CombatEntity> {
        self.roster.iter().find(|e| e.id == id)
    }

    pub fn skills(&self) -> &SkillLoadout {
        &self.skills
    }

    pub fn passives(&self) -> &PassiveLoadout {
        &self.passives
    }

    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Moves `Waiting` to `InProgress` and folds permanent passives into the
    /// player. The first round starts one round duration after `now`.
    pub fn start(&mut self, now: u64) -> bool {
        if self.status != CombatStatus::Waiting {
            return false;
        }
        self.passives.apply_permanent_passives(&mut self.roster[0]);
        self.skills.reset_cooldowns();
        self.status = CombatStatus::InProgress;
        self.last_round_start = now;
        for entity in &self.roster {
            self.sink.update_position(entity.id, entity.position);
            self.sink
                .update_health(entity.id, entity.stats.current_health(), entity.stats.max_health());
            self.sink.play_animation(entity.id, Animation::Idle);
        }
        info!(
            enemies = self.roster.len() - 1,
            player_health = self.roster[0].stats.current_health(),
            "combat started"
        );
        true
    }

    /// Advances the encounter to `now`. Returns the events produced.
    pub fn update(&mut self, now: u64, rng: &mut impl Rng) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        self.run_due_tasks(now);

        if self.status != CombatStatus::InProgress {
            return events;
        }

        let new_round = now.saturating_sub(self.last_round_start) > self.config.round_duration_ms;
        if new_round {
            self.last_round_start = now;
            self.process_round(now, &mut events);
        }

        self.process_actions(now, rng, &mut events);

        if new_round {
            self.finish_round();
        }

        self.check_termination(&mut events);
        events
    }

    /// Queues exactly one action per living combatant, fastest first.
    fn process_round(&mut self, now: u64, events: &mut Vec<CombatEvent>) {
        let number = self.rounds.len() as u32 + 1;
        let mut actions = Vec::new();

        for index in turn_order(&self.roster) {
            let actor = &self.roster[index];
            let skills = actor.is_player.then_some(&self.skills);
            if let Some(action) = select_action(actor, &self.roster, skills, &self.config) {
                actions.push(action);
            }
        }

        debug!(round = number, actions = actions.len(), "round started");
        self.queue.extend(actions.iter().cloned());
        self.rounds.push(CombatRound {
            number,
            actions,
            timestamp: now,
        });
        events.push(CombatEvent::RoundStarted { round: number });
    }

    fn process_actions(&mut self, now: u64, rng: &mut impl Rng, events: &mut Vec<CombatEvent>) {
        while let Some(action) = self.queue.pop_front() {
            match action {
                CombatAction::Attack {
                    source,
                    target,
                    damage,
                } => self.resolve_attack(source, target, damage, now, rng, events),
                CombatAction::Skill {
                    source,
                    target,
                    skill_id,
                } => self.resolve_skill(source, target, &skill_id, now, rng, events),
                CombatAction::Move {
                    source,
                    target_position,
                } => self.resolve_move(source, target_position, now, events),
            }
        }
    }

    fn finish_round(&mut self) {
        self.skills.update_cooldowns();
        let regen = self.config.energy_regen_per_round;
        if regen > 0 {
            for entity in self.roster.iter_mut().filter(|e| e.is_alive()) {
                entity.stats.restore_energy(regen);
            }
        }
    }

    /// Index of `id` if it is still on the roster and alive.
    fn living_index(&self, id: EntityId) -> Option<usize> {
        self.roster
            .iter()
            .position(|e| e.id == id)
            .filter(|&i| self.roster[i].is_alive())
    }

    fn schedule_idle(&mut self, entity: EntityId, now: u64) {
        self.scheduler.schedule(
            entity,
            now + self.config.idle_return_delay_ms,
            ScheduledTask::ReturnToIdle,
        );
    }

    fn run_due_tasks(&mut self, now: u64) {
        for (entity, task) in self.scheduler.take_due(now) {
            match task {
                ScheduledTask::ReturnToIdle => {
                    if self.living_index(entity).is_some() {
                        self.sink.play_animation(entity, Animation::Idle);
                    }
                }
            }
        }
    }

    /// Passive results for `owner` under `trigger`. Only the player carries a
    /// passive loadout.
    fn trigger_passives(
        &self,
        owner: usize,
        trigger: PassiveTrigger,
        target: Option<EntityId>,
        context: Option<f64>,
        rng: &mut impl Rng,
    ) -> Vec<PassiveResult> {
        let entity = &self.roster[owner];
        if !entity.is_player {
            return Vec::new();
        }
        self.passives
            .check_trigger(trigger, &entity.stats, target, context, rng)
    }

    /// Applies self-targeted heal/energy effects of fired passives to `owner`.
    fn apply_passive_results(
        &mut self,
        owner: EntityId,
        results: &[PassiveResult],
        events: &mut Vec<CombatEvent>,
    ) {
        let Some(index) = self.living_index(owner) else {
            return;
        };
        for result in results {
            events.push(CombatEvent::PassiveTriggered {
                owner,
                passive_id: result.passive_id.clone(),
            });
            for effect in &result.effects {
                let stats = &mut self.roster[index].stats;
                match effect.effect_type {
                    PassiveEffectType::Heal => {
                        let amount = stats.heal(effect.value);
                        if amount > 0 {
                            events.push(CombatEvent::Healed {
                                target: owner,
                                amount,
                            });
                        }
                    }
                    PassiveEffectType::EnergyRestore => {
                        let amount = stats.restore_energy(effect.value);
                        if amount > 0 {
                            events.push(CombatEvent::EnergyRestored {
                                target: owner,
                                amount,
                            });
                        }
                    }
                    // Handled at the damage site or at combat start
                    PassiveEffectType::DamageBoost
                    | PassiveEffectType::Thorns
                    | PassiveEffectType::StatBoost => {}
                }
            }
        }
        let stats = &self.roster[index].stats;
        self.sink
            .update_health(owner, stats.current_health(), stats.max_health());
    }

    fn resolve_attack(
        &mut self,
        source: EntityId,
        target: EntityId,
        base_damage: u32,
        now: u64,
        rng: &mut impl Rng,
        events: &mut Vec<CombatEvent>,
    ) {
        // Actions referencing combatants that died earlier this round are skipped.
        let (Some(src), Some(_)) = (self.living_index(source), self.living_index(target)) else {
            debug!(%source, %target, "attack skipped, combatant down");
            return;
        };

        let on_attack = self.trigger_passives(src, PassiveTrigger::OnAttack, Some(target), None, rng);
        let damage = ((base_damage as f64 * damage_multiplier(&on_attack)).floor() as u32).max(1);
        self.apply_passive_results(source, &on_attack, events);

        self.sink.play_animation(source, Animation::Attack);
        self.schedule_idle(source, now);
        self.deal_damage(source, target, damage, DamageKind::Attack, now, rng, events);
    }

    fn resolve_skill(
        &mut self,
        source: EntityId,
        target: EntityId,
        skill_id: &str,
        now: u64,
        rng: &mut impl Rng,
        events: &mut Vec<CombatEvent>,
    ) {
        let Some(src) = self.living_index(source) else {
            return;
        };
        if !self.roster[src].is_player {
            return;
        }
        let Some(skill) = self.skills.skill(skill_id) else {
            return;
        };
        let target_type = skill.target_type;
        let radius = skill.area_radius().unwrap_or(self.config.attack_range);

        let targets: Vec<SkillTarget> = match target_type {
            TargetType::SelfTarget => vec![self.skill_target(src)],
            TargetType::SingleEnemy => match self.living_index(target) {
                Some(t) => vec![self.skill_target(t)],
                None => Vec::new(),
            },
            TargetType::AllEnemies => self.living_opponents(src).map(|t| self.skill_target(t)).collect(),
            TargetType::Area => match self.living_index(target) {
                Some(t) => {
                    let center = self.roster[t].position;
                    let radius_sq = radius * radius;
                    self.living_opponents(src)
                        .filter(|&i| self.roster[i].position.planar_distance_sq(&center) <= radius_sq)
                        .map(|i| self.skill_target(i))
                        .collect()
                }
                None => Vec::new(),
            },
        };
        if targets.is_empty() {
            debug!(%source, skill_id, "skill skipped, no living targets");
            return;
        }

        let result = self
            .skills
            .execute(skill_id, &mut self.roster[src].stats, &targets);
        if !result.success {
            debug!(%source, skill_id, "skill not usable");
            return;
        }

        self.sink.play_animation(source, Animation::Cast);
        self.schedule_idle(source, now);
        events.push(CombatEvent::SkillUsed {
            source,
            skill_id: result.skill_id.clone(),
        });

        for effect in &result.effects {
            self.handle_skill_effect(source, effect, now, rng, events);
        }
    }

    fn handle_skill_effect(
        &mut self,
        source: EntityId,
        effect: &ResolvedSkillEffect,
        now: u64,
        rng: &mut impl Rng,
        events: &mut Vec<CombatEvent>,
    ) {
        match effect.effect_type {
            SkillEffectType::Damage => {
                if self.living_index(effect.target).is_some() {
                    self.deal_damage(
                        source,
                        effect.target,
                        effect.value,
                        DamageKind::Skill,
                        now,
                        rng,
                        events,
                    );
                }
            }
            SkillEffectType::Heal => {
                let Some(t) = self.living_index(effect.target) else {
                    return;
                };
                let amount = self.roster[t].stats.heal(effect.value);
                let stats = &self.roster[t].stats;
                self.sink
                    .update_health(effect.target, stats.current_health(), stats.max_health());
                events.push(CombatEvent::Healed {
                    target: effect.target,
                    amount,
                });
                if amount > 0 {
                    let on_heal =
                        self.trigger_passives(t, PassiveTrigger::OnHeal, None, Some(amount as f64), rng);
                    self.apply_passive_results(effect.target, &on_heal, events);
                }
            }
            SkillEffectType::Buff | SkillEffectType::Debuff => {
                // Recognized but not modelled: no stat changes over time yet.
                debug!(target = %effect.target, effect = ?effect.effect_type, "buff/debuff has no effect");
            }
        }
    }

    fn resolve_move(
        &mut self,
        source: EntityId,
        target_position: Position,
        now: u64,
        events: &mut Vec<CombatEvent>,
    ) {
        let Some(src) = self.living_index(source) else {
            return;
        };
        let entity = &mut self.roster[src];
        entity.position = entity
            .position
            .step_toward(&target_position, self.config.move_step);
        let position = entity.position;

        self.sink.update_position(source, position);
        self.sink.play_animation(source, Animation::Walk);
        self.schedule_idle(source, now);
        events.push(CombatEvent::Moved {
            entity: source,
            position,
        });
    }

    /// Applies already-final damage to `target`, then runs on-damaged passives
    /// (thorns reflect), death handling, and on-kill passives.
    #[allow(clippy::too_many_arguments)]
    fn deal_damage(
        &mut self,
        source: EntityId,
        target: EntityId,
        amount: u32,
        kind: DamageKind,
        now: u64,
        rng: &mut impl Rng,
        events: &mut Vec<CombatEvent>,
    ) {
        let Some(t) = self.living_index(target) else {
            return;
        };
        let dealt = self.roster[t].stats.take_damage(amount);
        let stats = &self.roster[t].stats;
        self.sink
            .update_health(target, stats.current_health(), stats.max_health());
        events.push(CombatEvent::DamageDealt {
            source,
            target,
            amount: dealt,
            kind,
        });

        if self.roster[t].is_alive() {
            self.sink.play_animation(target, Animation::Hit);
            self.schedule_idle(target, now);

            let on_damaged =
                self.trigger_passives(t, PassiveTrigger::OnDamaged, Some(source), Some(dealt as f64), rng);
            let reflected: u32 = on_damaged
                .iter()
                .flat_map(|r| r.effects.iter())
                .filter(|e| e.effect_type == PassiveEffectType::Thorns)
                .map(|e| e.value)
                .sum();
            self.apply_passive_results(target, &on_damaged, events);

            if reflected > 0 && kind != DamageKind::Reflect {
                self.deal_damage(target, source, reflected, DamageKind::Reflect, now, rng, events);
            }
        } else {
            self.handle_death(t, source, rng, events);
        }
    }

    fn handle_death(
        &mut self,
        index: usize,
        killer: EntityId,
        rng: &mut impl Rng,
        events: &mut Vec<CombatEvent>,
    ) {
        let dead = &self.roster[index];
        let (id, level, is_player) = (dead.id, dead.stats.level, dead.is_player);
        self.sink.play_animation(id, Animation::Death);
        events.push(CombatEvent::EntityDefeated {
            entity: id,
            level,
            is_player,
        });
        debug!(entity = %id, level, is_player, "combatant defeated");

        if !is_player {
            self.roster.remove(index);
            self.scheduler.cancel_entity(id);
        }

        if let Some(k) = self.living_index(killer) {
            let on_kill = self.trigger_passives(k, PassiveTrigger::OnKill, Some(id), None, rng);
            self.apply_passive_results(killer, &on_kill, events);
        }
    }

    fn check_termination(&mut self, events: &mut Vec<CombatEvent>) {
        let player_down = !self.roster[0].is_alive();
        let enemies_down = self.roster[1..].iter().all(|e| !e.is_alive());
        if !player_down && !enemies_down {
            return;
        }

        let player_id = self.roster[0].id;
        let (status, experience_gained) = if player_down {
            events.push(CombatEvent::Defeat);
            (CombatStatus::Defeat, 0)
        } else {
            let experience: u64 = self
                .encounter_levels
                .iter()
                .map(|&level| level as u64 * EXPERIENCE_PER_ENEMY_LEVEL)
                .sum();
            self.sink.play_animation(player_id, Animation::Victory);
            events.push(CombatEvent::Victory {
                experience_gained: experience,
            });
            (CombatStatus::Victory, experience)
        };

        self.status = status;
        self.queue.clear();
        self.result = Some(CombatResult {
            status,
            experience_gained,
            loot: Vec::new(),
            rounds: self.round_number(),
        });
        info!(?status, rounds = self.round_number(), experience_gained, "combat finished");
    }

    fn skill_target(&self, index: usize) -> SkillTarget {
        let entity = &self.roster[index];
        SkillTarget {
            id: entity.id,
            defense: entity.stats.defense,
        }
    }

    fn living_opponents(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let is_player = self.roster[index].is_player;
        (0..self.roster.len())
            .filter(move |&i| self.roster[i].is_player != is_player && self.roster[i].is_alive())
    }
}
