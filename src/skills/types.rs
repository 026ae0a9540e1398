use crate::core::stats::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillType {
    Attack,
    Heal,
    Buff,
    Debuff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    SelfTarget,
    SingleEnemy,
    AllEnemies,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillEffectType {
    Damage,
    Heal,
    Buff,
    Debuff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEffect {
    pub effect_type: SkillEffectType,
    /// Base magnitude before attack/defense scaling
    pub value: f64,
    /// Rounds the effect lasts (buff/debuff only)
    pub duration: Option<u32>,
    /// Radius around the primary target for area skills
    pub radius: Option<f32>,
}

impl SkillEffect {
    pub fn new(effect_type: SkillEffectType, value: f64) -> Self {
        Self {
            effect_type,
            value,
            duration: None,
            radius: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub skill_type: SkillType,
    pub target_type: TargetType,
    pub effects: Vec<SkillEffect>,
    /// Rounds between uses
    pub cooldown: u32,
    /// Rounds until usable again; only decreases, reset to `cooldown` on use
    pub current_cooldown: u32,
    pub energy_cost: u32,
}

impl Skill {
    pub fn is_ready(&self) -> bool {
        self.current_cooldown == 0
    }

    pub fn is_affordable(&self, energy: u32) -> bool {
        energy >= self.energy_cost
    }

    /// Largest radius declared by any effect.
    pub fn area_radius(&self) -> Option<f32> {
        self.effects
            .iter()
            .filter_map(|e| e.radius)
            .fold(None, |acc, r| Some(acc.map_or(r, |a: f32| a.max(r))))
    }
}

/// What `execute` needs to know about a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillTarget {
    pub id: EntityId,
    pub defense: u32,
}

/// One produced (target, effect, value) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSkillEffect {
    pub target: EntityId,
    pub effect_type: SkillEffectType,
    pub value: u32,
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillResult {
    pub success: bool,
    pub skill_id: String,
    pub effects: Vec<ResolvedSkillEffect>,
}

impl SkillResult {
    pub fn failed(skill_id: &str) -> Self {
        Self {
            success: false,
            skill_id: skill_id.to_string(),
            effects: Vec::new(),
        }
    }
}
