use crate::core::constants::PASSIVE_LEVEL_SCALING;
use crate::core::stats::EntityId;
use serde::{Deserialize, Serialize};

/// Event class that gates passive activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassiveTrigger {
    OnAttack,
    OnDamaged,
    OnKill,
    OnHeal,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassiveEffectType {
    /// Permanent: flat attack/defense, x10 health
    StatBoost,
    /// On attack: damage multiplied by (1 + value)
    DamageBoost,
    Heal,
    EnergyRestore,
    /// On damaged: reflects a share of the damage back to the attacker
    Thorns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveEffect {
    pub effect_type: PassiveEffectType,
    pub value: f64,
    /// Probability in [0, 1] that this effect allows the passive to fire
    pub chance: Option<f64>,
    pub duration: Option<u32>,
}

impl PassiveEffect {
    pub fn new(effect_type: PassiveEffectType, value: f64) -> Self {
        Self {
            effect_type,
            value,
            chance: None,
            duration: None,
        }
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = Some(chance.clamp(0.0, 1.0));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    pub id: String,
    pub name: String,
    pub trigger: PassiveTrigger,
    pub effects: Vec<PassiveEffect>,
    pub level: u32,
    pub max_level: u32,
}

impl Passive {
    pub fn is_permanent(&self) -> bool {
        self.trigger == PassiveTrigger::Permanent
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    /// Multiplier from the passive's own level: +10% per level above 1.
    pub fn level_scale(&self) -> f64 {
        1.0 + self.level.saturating_sub(1) as f64 * PASSIVE_LEVEL_SCALING
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPassiveEffect {
    pub effect_type: PassiveEffectType,
    /// Declared magnitude, as written on the passive
    pub magnitude: f64,
    /// Magnitude scaled by source level, passive level and trigger context, floored
    pub value: u32,
}

/// One fired passive and what it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PassiveResult {
    pub passive_id: String,
    pub target: Option<EntityId>,
    pub effects: Vec<ResolvedPassiveEffect>,
}

/// Product of `(1 + magnitude)` over every damage-boost effect in `results`.
pub fn damage_multiplier(results: &[PassiveResult]) -> f64 {
    results
        .iter()
        .flat_map(|r| r.effects.iter())
        .filter(|e| e.effect_type == PassiveEffectType::DamageBoost)
        .fold(1.0, |acc, e| acc * (1.0 + e.magnitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boost(magnitude: f64) -> ResolvedPassiveEffect {
        ResolvedPassiveEffect {
            effect_type: PassiveEffectType::DamageBoost,
            magnitude,
            value: 0,
        }
    }

    #[test]
    fn test_damage_multiplier_compounds() {
        let results = vec![
            PassiveResult {
                passive_id: "a".to_string(),
                target: None,
                effects: vec![boost(0.2)],
            },
            PassiveResult {
                passive_id: "b".to_string(),
                target: None,
                effects: vec![
                    boost(0.5),
                    ResolvedPassiveEffect {
                        effect_type: PassiveEffectType::Heal,
                        magnitude: 10.0,
                        value: 10,
                    },
                ],
            },
        ];
        assert!((damage_multiplier(&results) - 1.8).abs() < 1e-9);
        assert!((damage_multiplier(&[]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_with_chance_clamps() {
        let effect = PassiveEffect::new(PassiveEffectType::Heal, 5.0).with_chance(1.7);
        assert_eq!(effect.chance, Some(1.0));
    }
}
