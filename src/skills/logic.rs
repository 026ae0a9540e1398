//! Action-bar loadout: equip rules, cooldown/energy gating, effect values.

use super::types::{ResolvedSkillEffect, Skill, SkillResult, SkillTarget};
use crate::core::constants::MAX_SKILL_SLOTS;
use crate::core::stats::CombatStats;
use std::collections::HashMap;

/// Fixed-size ordered skill slots over a catalog of known skills.
#[derive(Debug, Clone)]
pub struct SkillLoadout {
    catalog: HashMap<String, Skill>,
    slots: Vec<Option<String>>,
    /// Fraction shaved off every cooldown a cast starts, in [0, 1]
    cooldown_reduction: f64,
}

impl Default for SkillLoadout {
    fn default() -> Self {
        Self::new(MAX_SKILL_SLOTS)
    }
}

impl SkillLoadout {
    pub fn new(max_slots: usize) -> Self {
        Self {
            catalog: HashMap::new(),
            slots: vec![None; max_slots],
            cooldown_reduction: 0.0,
        }
    }

    pub fn with_skills(max_slots: usize, skills: impl IntoIterator<Item = Skill>) -> Self {
        let mut loadout = Self::new(max_slots);
        for skill in skills {
            loadout.learn(skill);
        }
        loadout
    }

    /// Adds a skill to the catalog so it can be equipped.
    pub fn learn(&mut self, skill: Skill) {
        self.catalog.insert(skill.id.clone(), skill);
    }

    pub fn max_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.catalog.get(id)
    }

    /// Every known skill, sorted by id.
    pub fn known_skills(&self) -> Vec<&Skill> {
        let mut skills: Vec<&Skill> = self.catalog.values().collect();
        skills.sort_by(|a, b| a.id.cmp(&b.id));
        skills
    }

    pub fn cooldown_reduction(&self) -> f64 {
        self.cooldown_reduction
    }

    pub fn set_cooldown_reduction(&mut self, reduction: f64) {
        self.cooldown_reduction = reduction.clamp(0.0, 1.0);
    }

    /// Rounds a freshly cast skill waits: `floor(cooldown * (1 - reduction))`.
    pub fn effective_cooldown(&self, skill: &Skill) -> u32 {
        reduced_cooldown(skill.cooldown, self.cooldown_reduction)
    }

    pub fn is_equipped(&self, id: &str) -> bool {
        self.slots.iter().flatten().any(|s| s == id)
    }

    /// Equipped skills in slot order.
    pub fn equipped(&self) -> impl Iterator<Item = &Skill> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|id| self.catalog.get(id))
    }

    /// Assigns `id` to `slot`, first vacating any other slot holding it.
    pub fn equip(&mut self, id: &str, slot: usize) -> bool {
        if slot >= self.slots.len() || !self.catalog.contains_key(id) {
            return false;
        }
        for existing in self.slots.iter_mut() {
            if existing.as_deref() == Some(id) {
                *existing = None;
            }
        }
        self.slots[slot] = Some(id.to_string());
        true
    }

    pub fn unequip(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_some() => {
                *entry = None;
                true
            }
            _ => false,
        }
    }

    /// First equipped skill, in slot order, that is off cooldown and affordable.
    pub fn ready_skill(&self, energy: u32) -> Option<&Skill> {
        self.equipped()
            .find(|skill| skill.is_ready() && skill.is_affordable(energy))
    }

    /// Resolves a skill use. Fails closed, mutating nothing, when the skill is
    /// not equipped, still cooling down, or the source lacks energy.
    pub fn execute(
        &mut self,
        id: &str,
        source: &mut CombatStats,
        targets: &[SkillTarget],
    ) -> SkillResult {
        if !self.is_equipped(id) {
            return SkillResult::failed(id);
        }
        let reduction = self.cooldown_reduction;
        let Some(skill) = self.catalog.get_mut(id) else {
            return SkillResult::failed(id);
        };
        if !skill.is_ready() || !skill.is_affordable(source.current_energy()) {
            return SkillResult::failed(id);
        }

        let attack_factor = source.attack as f64 / 100.0;
        let mut effects = Vec::with_capacity(targets.len() * skill.effects.len());
        for target in targets {
            let mitigation = 1.0 - target.defense as f64 / 100.0;
            for effect in &skill.effects {
                let value = (effect.value * attack_factor * mitigation).floor().max(0.0) as u32;
                effects.push(ResolvedSkillEffect {
                    target: target.id,
                    effect_type: effect.effect_type,
                    value,
                    duration: effect.duration,
                });
            }
        }

        source.spend_energy(skill.energy_cost);
        skill.current_cooldown = reduced_cooldown(skill.cooldown, reduction);

        SkillResult {
            success: true,
            skill_id: skill.id.clone(),
            effects,
        }
    }

    /// Ticks every equipped skill's cooldown down by one round.
    pub fn update_cooldowns(&mut self) {
        for id in self.slots.iter().flatten() {
            if let Some(skill) = self.catalog.get_mut(id) {
                skill.current_cooldown = skill.current_cooldown.saturating_sub(1);
            }
        }
    }

    pub fn reset_cooldowns(&mut self) {
        for skill in self.catalog.values_mut() {
            skill.current_cooldown = 0;
        }
    }
}

fn reduced_cooldown(cooldown: u32, reduction: f64) -> u32 {
    (cooldown as f64 * (1.0 - reduction)).floor() as u32
}
