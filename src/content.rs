//! Built-in skills, passives, gear and meta-upgrades.

use crate::core::constants::{MAX_PASSIVE_SLOTS, MAX_SKILL_SLOTS};
use crate::items::{GearItem, GearLedger, GearSet, GearSlot, Rarity, SetBonus, StatBlock};
use crate::passives::{Passive, PassiveEffect, PassiveEffectType, PassiveLoadout, PassiveTrigger};
use crate::progression::{MetaUpgrade, MetaUpgradeType, PlayerProgress};
use crate::skills::{Skill, SkillEffect, SkillEffectType, SkillLoadout, SkillType, TargetType};

/// Content ids unlocked on a fresh profile.
pub const STARTER_CONTENT: &[&str] = &["fireball", "mend", "fury", "iron_skin", "warrior"];

/// Content unlocked once a run reaches the given wave.
pub const WAVE_UNLOCKS: &[(u32, &str)] = &[
    (2, "war_cry"),
    (3, "meteor"),
    (3, "thorns"),
    (4, "vampirism"),
    (4, "shockwave"),
    (5, "focus"),
    (6, "guardian"),
];

/// Content ids earned by reaching `wave`.
pub fn unlocks_for_wave(wave: u32) -> impl Iterator<Item = &'static str> {
    WAVE_UNLOCKS
        .iter()
        .filter(move |(required, _)| *required <= wave)
        .map(|(_, id)| *id)
}

fn skill(
    id: &str,
    name: &str,
    skill_type: SkillType,
    target_type: TargetType,
    effects: Vec<SkillEffect>,
    cooldown: u32,
    energy_cost: u32,
) -> Skill {
    Skill {
        id: id.to_string(),
        name: name.to_string(),
        skill_type,
        target_type,
        effects,
        cooldown,
        current_cooldown: 0,
        energy_cost,
    }
}

pub fn skill_catalog() -> Vec<Skill> {
    vec![
        skill(
            "fireball",
            "Fireball",
            SkillType::Attack,
            TargetType::SingleEnemy,
            vec![SkillEffect::new(SkillEffectType::Damage, 200.0)],
            3,
            20,
        ),
        skill(
            "mend",
            "Mend",
            SkillType::Heal,
            TargetType::SelfTarget,
            vec![SkillEffect::new(SkillEffectType::Heal, 150.0)],
            4,
            15,
        ),
        skill(
            "war_cry",
            "War Cry",
            SkillType::Buff,
            TargetType::SelfTarget,
            vec![SkillEffect {
                duration: Some(3),
                ..SkillEffect::new(SkillEffectType::Buff, 20.0)
            }],
            6,
            10,
        ),
        skill(
            "meteor",
            "Meteor",
            SkillType::Attack,
            TargetType::AllEnemies,
            vec![SkillEffect::new(SkillEffectType::Damage, 120.0)],
            5,
            35,
        ),
        skill(
            "shockwave",
            "Shockwave",
            SkillType::Attack,
            TargetType::Area,
            vec![SkillEffect {
                radius: Some(2.0),
                ..SkillEffect::new(SkillEffectType::Damage, 150.0)
            }],
            4,
            25,
        ),
    ]
}

fn passive(id: &str, name: &str, trigger: PassiveTrigger, effects: Vec<PassiveEffect>) -> Passive {
    Passive {
        id: id.to_string(),
        name: name.to_string(),
        trigger,
        effects,
        level: 1,
        max_level: 5,
    }
}

pub fn passive_catalog() -> Vec<Passive> {
    vec![
        passive(
            "fury",
            "Fury",
            PassiveTrigger::OnAttack,
            vec![PassiveEffect::new(PassiveEffectType::DamageBoost, 0.25).with_chance(0.3)],
        ),
        passive(
            "iron_skin",
            "Iron Skin",
            PassiveTrigger::Permanent,
            vec![PassiveEffect::new(PassiveEffectType::StatBoost, 2.0)],
        ),
        passive(
            "thorns",
            "Thorns",
            PassiveTrigger::OnDamaged,
            vec![PassiveEffect::new(PassiveEffectType::Thorns, 0.2)],
        ),
        passive(
            "vampirism",
            "Vampirism",
            PassiveTrigger::OnKill,
            vec![PassiveEffect::new(PassiveEffectType::Heal, 15.0)],
        ),
        passive(
            "focus",
            "Focus",
            PassiveTrigger::OnKill,
            vec![PassiveEffect::new(PassiveEffectType::EnergyRestore, 10.0)],
        ),
    ]
}

fn stats(attack: u32, defense: u32, health: u32, speed: u32, energy: u32) -> StatBlock {
    StatBlock {
        attack,
        defense,
        health,
        speed,
        energy,
    }
}

pub fn gear_sets() -> Vec<GearSet> {
    vec![
        GearSet {
            id: "warrior".to_string(),
            name: "Warrior's Resolve".to_string(),
            bonuses: vec![
                SetBonus {
                    pieces: 2,
                    stats: stats(5, 0, 0, 0, 0),
                },
                SetBonus {
                    pieces: 4,
                    stats: stats(0, 5, 50, 0, 0),
                },
            ],
        },
        GearSet {
            id: "guardian".to_string(),
            name: "Guardian's Oath".to_string(),
            bonuses: vec![
                SetBonus {
                    pieces: 2,
                    stats: stats(0, 8, 0, 0, 0),
                },
                SetBonus {
                    pieces: 3,
                    stats: stats(0, 0, 80, 0, 20),
                },
            ],
        },
    ]
}

fn gear(
    id: &str,
    name: &str,
    slot: GearSlot,
    rarity: Rarity,
    stats: StatBlock,
    set_id: Option<&str>,
) -> GearItem {
    GearItem {
        id: id.to_string(),
        name: name.to_string(),
        slot,
        rarity,
        level: 1,
        stats,
        set_id: set_id.map(str::to_string),
    }
}

pub fn gear_catalog() -> Vec<GearItem> {
    vec![
        gear("warrior_helm", "Warrior Helm", GearSlot::Head, Rarity::Uncommon, stats(0, 3, 10, 0, 0), Some("warrior")),
        gear("warrior_plate", "Warrior Plate", GearSlot::Chest, Rarity::Uncommon, stats(0, 5, 20, 0, 0), Some("warrior")),
        gear("warrior_greaves", "Warrior Greaves", GearSlot::Legs, Rarity::Uncommon, stats(0, 4, 10, 0, 0), Some("warrior")),
        gear("warrior_boots", "Warrior Boots", GearSlot::Feet, Rarity::Uncommon, stats(0, 2, 0, 2, 0), Some("warrior")),
        gear("iron_sword", "Iron Sword", GearSlot::MainHand, Rarity::Common, stats(6, 0, 0, 0, 0), None),
        gear("guardian_helm", "Guardian Helm", GearSlot::Head, Rarity::Rare, stats(0, 6, 20, 0, 0), Some("guardian")),
        gear("guardian_shield", "Guardian Shield", GearSlot::OffHand, Rarity::Rare, stats(0, 8, 0, 0, 0), Some("guardian")),
        gear("guardian_gauntlets", "Guardian Gauntlets", GearSlot::Hands, Rarity::Rare, stats(2, 4, 10, 0, 0), Some("guardian")),
        gear("focus_ring", "Focus Ring", GearSlot::Accessory, Rarity::Epic, stats(0, 0, 0, 1, 25), None),
    ]
}

/// Looks up a catalog item by id.
pub fn gear_item(id: &str) -> Option<GearItem> {
    gear_catalog().into_iter().find(|item| item.id == id)
}

fn upgrade(
    id: &str,
    name: &str,
    upgrade_type: MetaUpgradeType,
    value: f64,
    cost: u64,
    max_level: u32,
) -> MetaUpgrade {
    MetaUpgrade {
        id: id.to_string(),
        name: name.to_string(),
        upgrade_type,
        value,
        cost,
        level: 0,
        max_level,
    }
}

pub fn meta_upgrades() -> Vec<MetaUpgrade> {
    vec![
        upgrade("damage_boost", "Sharpened Blades", MetaUpgradeType::Damage, 0.05, 100, 10),
        upgrade("health_boost", "Hardy Constitution", MetaUpgradeType::Health, 0.1, 100, 10),
        upgrade("defense_boost", "Thick Hide", MetaUpgradeType::Defense, 0.05, 120, 10),
        upgrade("speed_boost", "Quick Step", MetaUpgradeType::Speed, 0.05, 150, 5),
        upgrade("resource_gain", "Scavenger", MetaUpgradeType::ResourceGain, 0.1, 200, 5),
        upgrade("xp_gain", "Fast Learner", MetaUpgradeType::XpGain, 0.1, 150, 5),
        upgrade("energy_boost", "Deep Reserves", MetaUpgradeType::Energy, 0.1, 100, 5),
        upgrade("cooldown", "Quickened Mind", MetaUpgradeType::Cooldown, 0.05, 250, 5),
    ]
}

/// A fresh profile: every upgrade at level 0 and the starter content unlocked.
pub fn default_progress() -> PlayerProgress {
    PlayerProgress::new(
        meta_upgrades(),
        STARTER_CONTENT.iter().map(|id| id.to_string()),
    )
}

/// Full skill catalog with Fireball and Mend equipped.
pub fn starter_skills() -> SkillLoadout {
    let mut loadout = SkillLoadout::with_skills(MAX_SKILL_SLOTS, skill_catalog());
    loadout.equip("fireball", 0);
    loadout.equip("mend", 1);
    loadout
}

/// Full passive catalog with Fury and Iron Skin equipped.
pub fn starter_passives() -> PassiveLoadout {
    let mut loadout = PassiveLoadout::with_passives(MAX_PASSIVE_SLOTS, passive_catalog());
    loadout.equip("fury", 0);
    loadout.equip("iron_skin", 1);
    loadout
}

/// Empty gear ledger with every set registered.
pub fn starter_gear() -> GearLedger {
    GearLedger::with_sets(gear_sets())
}
