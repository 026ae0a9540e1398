//! Passive loadout: trigger filtering, chance rolls, level-scaled values.
//!
//! Effect values scale twice: once by the source's character level and once
//! by the passive's own level.

use super::types::{
    Passive, PassiveEffectType, PassiveResult, PassiveTrigger, ResolvedPassiveEffect,
};
use crate::core::constants::{MAX_PASSIVE_SLOTS, PASSIVE_LEVEL_SCALING, PERMANENT_HEALTH_PER_BOOST};
use crate::core::stats::{CombatEntity, CombatStats, EntityId};
use rand::Rng;
use std::collections::HashMap;

/// Fixed-size ordered passive slots over a catalog of known passives.
#[derive(Debug, Clone)]
pub struct PassiveLoadout {
    catalog: HashMap<String, Passive>,
    slots: Vec<Option<String>>,
}

impl Default for PassiveLoadout {
    fn default() -> Self {
        Self::new(MAX_PASSIVE_SLOTS)
    }
}

impl PassiveLoadout {
    pub fn new(max_slots: usize) -> Self {
        Self {
            catalog: HashMap::new(),
            slots: vec![None; max_slots],
        }
    }

    pub fn with_passives(max_slots: usize, passives: impl IntoIterator<Item = Passive>) -> Self {
        let mut loadout = Self::new(max_slots);
        for passive in passives {
            loadout.learn(passive);
        }
        loadout
    }

    pub fn learn(&mut self, passive: Passive) {
        self.catalog.insert(passive.id.clone(), passive);
    }

    pub fn max_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    pub fn passive(&self, id: &str) -> Option<&Passive> {
        self.catalog.get(id)
    }

    /// Every known passive, sorted by id.
    pub fn known_passives(&self) -> Vec<&Passive> {
        let mut passives: Vec<&Passive> = self.catalog.values().collect();
        passives.sort_by(|a, b| a.id.cmp(&b.id));
        passives
    }

    pub fn equipped(&self) -> impl Iterator<Item = &Passive> {
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

    /// Raises a known passive's level by one, up to its max.
    pub fn level_up(&mut self, id: &str) -> bool {
        match self.catalog.get_mut(id) {
            Some(passive) if !passive.is_maxed() => {
                passive.level += 1;
                true
            }
            _ => false,
        }
    }

    /// Sets a known passive's level, clamped to `[1, max_level]`.
    pub fn set_level(&mut self, id: &str, level: u32) -> bool {
        let Some(passive) = self.catalog.get_mut(id) else {
            return false;
        };
        passive.level = level.clamp(1, passive.max_level.max(1));
        true
    }

    /// Fires every equipped passive listening for `trigger`.
    ///
    /// Permanent passives always fire. Others fire only if every effect that
    /// declares a `chance` passes its own independent roll.
    pub fn check_trigger(
        &self,
        trigger: PassiveTrigger,
        source: &CombatStats,
        target: Option<EntityId>,
        context_value: Option<f64>,
        rng: &mut impl Rng,
    ) -> Vec<PassiveResult> {
        let level_scale = 1.0 + source.level.saturating_sub(1) as f64 * PASSIVE_LEVEL_SCALING;
        let context = context_value.unwrap_or(1.0);

        self.equipped()
            .filter(|p| p.trigger == trigger)
            .filter(|p| p.is_permanent() || roll_all(p, rng))
            .map(|p| {
                let scale = level_scale * p.level_scale();
                PassiveResult {
                    passive_id: p.id.clone(),
                    target,
                    effects: p
                        .effects
                        .iter()
                        .map(|e| ResolvedPassiveEffect {
                            effect_type: e.effect_type,
                            magnitude: e.value,
                            value: (e.value * scale * context).floor().max(0.0) as u32,
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Folds permanent stat boosts into `entity` once per entity lifetime.
    pub fn apply_permanent_passives(&self, entity: &mut CombatEntity) -> bool {
        if entity.applied.permanent_passives {
            return false;
        }
        let boosts = self
            .equipped()
            .filter(|p| p.is_permanent())
            .flat_map(|p| p.effects.iter().map(move |e| (e, p.level_scale())))
            .filter(|(e, _)| e.effect_type == PassiveEffectType::StatBoost);
        for (effect, scale) in boosts {
            let amount = (effect.value * scale).max(0.0).floor() as u32;
            entity.stats.attack += amount;
            entity.stats.defense += amount;
            entity
                .stats
                .add_max_health(amount * PERMANENT_HEALTH_PER_BOOST);
        }
        entity.applied.permanent_passives = true;
        true
    }
}

fn roll_all(passive: &Passive, rng: &mut impl Rng) -> bool {
    passive.effects.iter().all(|effect| match effect.chance {
        Some(chance) => rng.gen::<f64>() < chance,
        None => true,
    })
}
