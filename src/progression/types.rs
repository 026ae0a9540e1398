use crate::items::GearSlot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunResult {
    Victory,
    Defeat,
}

/// Counters for the active run. Finalized once by `end_run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub id: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub enemies_defeated: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub resources_gained: u64,
    pub experience_gained: u64,
    pub result: Option<RunResult>,
    pub difficulty: f64,
    pub wave: u32,
}

impl RunStats {
    pub fn new(id: String, start_time: i64, difficulty: f64) -> Self {
        Self {
            id,
            start_time,
            end_time: None,
            enemies_defeated: 0,
            damage_dealt: 0,
            damage_taken: 0,
            resources_gained: 0,
            experience_gained: 0,
            result: None,
            difficulty,
            wave: 1,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Seconds between start and end, zero while running.
    pub fn duration_seconds(&self) -> u64 {
        self.end_time
            .map(|end| (end - self.start_time).max(0) as u64)
            .unwrap_or(0)
    }

    /// Best-run ordering: higher wave wins, then more resources.
    pub fn beats(&self, other: &RunStats) -> bool {
        (self.wave, self.resources_gained) > (other.wave, other.resources_gained)
    }
}

/// Per-run counter updates reported by combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    DamageDealt(u64),
    DamageTaken(u64),
    EnemyDefeated { level: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaUpgradeType {
    Damage,
    Health,
    Defense,
    Speed,
    ResourceGain,
    XpGain,
    Energy,
    Cooldown,
}

impl MetaUpgradeType {
    pub fn name(&self) -> &'static str {
        match self {
            MetaUpgradeType::Damage => "Damage",
            MetaUpgradeType::Health => "Health",
            MetaUpgradeType::Defense => "Defense",
            MetaUpgradeType::Speed => "Speed",
            MetaUpgradeType::ResourceGain => "Resource Gain",
            MetaUpgradeType::XpGain => "XP Gain",
            MetaUpgradeType::Energy => "Energy",
            MetaUpgradeType::Cooldown => "Cooldown",
        }
    }
}

/// A purchasable, leveled multiplier. Cost grows x1.5 per purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaUpgrade {
    pub id: String,
    pub name: String,
    pub upgrade_type: MetaUpgradeType,
    /// Effect per level, e.g. 0.05 = +5%
    pub value: f64,
    pub cost: u64,
    pub level: u32,
    pub max_level: u32,
}

impl MetaUpgrade {
    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    /// Total effect at the current level.
    pub fn effect(&self) -> f64 {
        self.value * self.level as f64
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LifetimeStatistics {
    pub total_enemies_defeated: u64,
    pub total_damage_dealt: u64,
    pub total_damage_taken: u64,
    pub total_resources_gained: u64,
    /// Seconds
    pub total_play_time: u64,
}

/// What the player has equipped, by id, plus the levels of known passives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub skills: Vec<Option<String>>,
    pub passives: Vec<Option<String>>,
    pub gear: Vec<(GearSlot, Option<String>)>,
    pub passive_levels: BTreeMap<String, u32>,
}

/// Everything that survives between runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub total_runs: u32,
    pub best_run: Option<RunStats>,
    pub resources: u64,
    pub meta_upgrades: HashMap<String, MetaUpgrade>,
    pub unlocked_content: HashSet<String>,
    pub statistics: LifetimeStatistics,
    /// Last saved loadout; `None` until the player changes the starter one
    pub loadout: Option<Loadout>,
}

impl PlayerProgress {
    pub fn new(
        upgrades: impl IntoIterator<Item = MetaUpgrade>,
        unlocked: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            meta_upgrades: upgrades.into_iter().map(|u| (u.id.clone(), u)).collect(),
            unlocked_content: unlocked.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Summed effect of every upgrade of `upgrade_type`.
    pub fn upgrade_effect(&self, upgrade_type: MetaUpgradeType) -> f64 {
        self.sorted_upgrades()
            .into_iter()
            .filter(|u| u.upgrade_type == upgrade_type)
            .map(MetaUpgrade::effect)
            .sum()
    }

    /// Summed `value * level` across all upgrades.
    pub fn upgrade_investment(&self) -> f64 {
        self.sorted_upgrades()
            .into_iter()
            .map(MetaUpgrade::effect)
            .sum()
    }

    /// Upgrades sorted by id, for stable display.
    pub fn sorted_upgrades(&self) -> Vec<&MetaUpgrade> {
        let mut upgrades: Vec<&MetaUpgrade> = self.meta_upgrades.values().collect();
        upgrades.sort_by(|a, b| a.id.cmp(&b.id));
        upgrades
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
