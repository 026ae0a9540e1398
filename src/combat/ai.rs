//! Greedy action selection: nearest target, first ready skill, else attack or close in.

use super::types::CombatAction;
use crate::core::config::CombatConfig;
use crate::core::constants::MIN_ATTACK_DAMAGE;
use crate::core::stats::{CombatEntity, CombatStats};
use crate::skills::SkillLoadout;

/// Basic attack damage: `max(1, attack - defense)`.
pub fn attack_damage(attacker: &CombatStats, defender: &CombatStats) -> u32 {
    attacker
        .attack
        .saturating_sub(defender.defense)
        .max(MIN_ATTACK_DAMAGE)
}

/// Indices of living combatants, fastest first. Ties keep roster order.
pub fn turn_order(roster: &[CombatEntity]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..roster.len())
        .filter(|&i| roster[i].is_alive())
        .collect();
    // sort_by_key is stable
    order.sort_by_key(|&i| std::cmp::Reverse(roster[i].stats.speed));
    order
}

/// Nearest living opponent by planar squared distance. On ties the first in
/// roster order wins.
pub fn nearest_opponent<'a>(
    actor: &CombatEntity,
    roster: &'a [CombatEntity],
) -> Option<(&'a CombatEntity, f32)> {
    let mut best: Option<(&CombatEntity, f32)> = None;
    for candidate in roster
        .iter()
        .filter(|c| c.is_player != actor.is_player && c.is_alive())
    {
        let distance = actor.position.planar_distance_sq(&candidate.position);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best
}

/// Picks exactly one action for `actor`, or `None` when nothing is targetable.
///
/// Only the player passes a skill loadout; enemies attack or move.
pub fn select_action(
    actor: &CombatEntity,
    roster: &[CombatEntity],
    skills: Option<&SkillLoadout>,
    config: &CombatConfig,
) -> Option<CombatAction> {
    let (target, distance_sq) = nearest_opponent(actor, roster)?;

    if let Some(skill) = skills.and_then(|s| s.ready_skill(actor.stats.current_energy())) {
        return Some(CombatAction::Skill {
            source: actor.id,
            target: target.id,
            skill_id: skill.id.clone(),
        });
    }

    if distance_sq <= config.attack_range_sq() {
        Some(CombatAction::Attack {
            source: actor.id,
            target: target.id,
            damage: attack_damage(&actor.stats, &target.stats),
        })
    } else {
        Some(CombatAction::Move {
            source: actor.id,
            target_position: target.position,
        })
    }
}
