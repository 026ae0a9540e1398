use crate::core::stats::{EntityId, Position};
use crate::items::GearItem;
use serde::{Deserialize, Serialize};

/// One combatant's decision for a round. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatAction {
    Move {
        source: EntityId,
        target_position: Position,
    },
    Attack {
        source: EntityId,
        target: EntityId,
        damage: u32,
    },
    Skill {
        source: EntityId,
        target: EntityId,
        skill_id: String,
    },
}

impl CombatAction {
    pub fn source(&self) -> EntityId {
        match self {
            CombatAction::Move { source, .. }
            | CombatAction::Attack { source, .. }
            | CombatAction::Skill { source, .. } => *source,
        }
    }
}

/// Append-only record of the actions generated in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatRound {
    pub number: u32,
    pub actions: Vec<CombatAction>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatStatus {
    Waiting,
    InProgress,
    Victory,
    Defeat,
}

impl CombatStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CombatStatus::Victory | CombatStatus::Defeat)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub status: CombatStatus,
    pub experience_gained: u64,
    /// Always empty: loot generation is an extension point
    pub loot: Vec<GearItem>,
    pub rounds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    Attack,
    Skill,
    Reflect,
}

/// Everything observable that happened during an `update` call.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    Moved {
        entity: EntityId,
        position: Position,
    },
    SkillUsed {
        source: EntityId,
        skill_id: String,
    },
    DamageDealt {
        source: EntityId,
        target: EntityId,
        amount: u32,
        kind: DamageKind,
    },
    Healed {
        target: EntityId,
        amount: u32,
    },
    EnergyRestored {
        target: EntityId,
        amount: u32,
    },
    PassiveTriggered {
        owner: EntityId,
        passive_id: String,
    },
    EntityDefeated {
        entity: EntityId,
        level: u32,
        is_player: bool,
    },
    Victory {
        experience_gained: u64,
    },
    Defeat,
}

/// Animation names understood by the render collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Idle,
    Walk,
    Attack,
    Cast,
    Hit,
    Death,
    Victory,
}

impl Animation {
    pub fn name(&self) -> &'static str {
        match self {
            Animation::Idle => "idle",
            Animation::Walk => "walk",
            Animation::Attack => "attack",
            Animation::Cast => "cast",
            Animation::Hit => "hit",
            Animation::Death => "death",
            Animation::Victory => "victory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_source() {
        let action = CombatAction::Skill {
            source: EntityId(4),
            target: EntityId(5),
            skill_id: "fireball".to_string(),
        };
        assert_eq!(action.source(), EntityId(4));
        let action = CombatAction::Move {
            source: EntityId(7),
            target_position: Position::default(),
        };
        assert_eq!(action.source(), EntityId(7));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!CombatStatus::Waiting.is_terminal());
        assert!(!CombatStatus::InProgress.is_terminal());
        assert!(CombatStatus::Victory.is_terminal());
        assert!(CombatStatus::Defeat.is_terminal());
    }

    #[test]
    fn test_animation_names() {
        assert_eq!(Animation::Idle.name(), "idle");
        assert_eq!(Animation::Death.name(), "death");
    }
}
