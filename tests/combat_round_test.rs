//! Integration test: Combat rounds end to end
//!
//! Spawns real enemies, drives the engine on a simulated clock, and checks
//! ordering, damage floors, sink output, and the victory payout.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish::combat::{
    attack_damage, turn_order, Animation, CombatEngine, CombatEvent, CombatStatus, DamageKind,
    RecordingSink,
};
use skirmish::content::{starter_passives, starter_skills};
use skirmish::core::config::CombatConfig;
use skirmish::core::stats::{CombatEntity, CombatStats, EntityId, Position};
use skirmish::passives::PassiveLoadout;
use skirmish::skills::SkillLoadout;
use skirmish::spawn::{EnemySpawner, LevelScaledSpawner};

const STEP: u64 = 2001;

fn hero(attack: u32, defense: u32, health: u32) -> CombatEntity {
    CombatEntity::player(
        EntityId(1),
        "Hero".to_string(),
        CombatStats::new(1, health, attack, defense, 10, 50),
    )
}

fn fight(engine: &mut CombatEngine<RecordingSink>, rng: &mut ChaCha8Rng) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    let mut now = 0;
    engine.start(now);
    while !engine.status().is_terminal() {
        now += STEP;
        events.extend(engine.update(now, rng));
        assert!(engine.round_number() < 1000, "combat did not terminate");
    }
    events
}

#[test]
fn test_damage_floor_is_one() {
    let attacker = CombatStats::new(1, 100, 15, 0, 10, 0);
    let defender = CombatStats::new(1, 100, 10, 20, 10, 0);
    assert_eq!(attack_damage(&attacker, &defender), 1);
}

#[test]
fn test_turn_order_fastest_first() {
    let roster: Vec<CombatEntity> = [10, 5, 15]
        .iter()
        .enumerate()
        .map(|(i, speed)| {
            CombatEntity::new(
                EntityId(i as u64 + 1),
                format!("Unit {}", i),
                CombatStats::new(1, 10, 1, 1, *speed, 0),
                Position::default(),
            )
        })
        .collect();

    let speeds: Vec<u32> = turn_order(&roster)
        .into_iter()
        .map(|i| roster[i].stats.speed)
        .collect();
    assert_eq!(speeds, vec![15, 10, 5]);
}

#[test]
fn test_spawned_wave_victory_pays_experience() {
    let mut spawner = LevelScaledSpawner::new(ChaCha8Rng::seed_from_u64(12345), 1.0);
    let enemies = vec![
        spawner.spawn_enemy(EntityId(2), 1),
        spawner.spawn_enemy(EntityId(3), 2),
    ];

    let mut engine = CombatEngine::new(
        hero(100, 50, 1000),
        enemies,
        SkillLoadout::default(),
        PassiveLoadout::default(),
        RecordingSink::new(),
        CombatConfig::default(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(12345);
    let events = fight(&mut engine, &mut rng);

    assert_eq!(engine.status(), CombatStatus::Victory);
    // 1 * 10 + 2 * 10
    assert!(events.contains(&CombatEvent::Victory {
        experience_gained: 30
    }));
    assert_eq!(engine.result().map(|r| r.experience_gained), Some(30));
    assert!(engine.enemies().is_empty());

    // Enemies walk in before anyone can swing
    assert!(events.iter().any(|e| matches!(e, CombatEvent::Moved { .. })));

    let defeated: Vec<EntityId> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::EntityDefeated { entity, .. } => Some(*entity),
            _ => None,
        })
        .collect();
    assert_eq!(defeated.len(), 2);
    for id in defeated {
        assert!(engine.sink().animations_for(id).contains(&Animation::Death));
    }
    assert!(engine
        .sink()
        .animations_for(EntityId(1))
        .contains(&Animation::Victory));
}

#[test]
fn test_hopeless_fight_ends_in_defeat() {
    let mut spawner = LevelScaledSpawner::new(ChaCha8Rng::seed_from_u64(7), 5.0);
    let enemies = (0..3).map(|i| spawner.spawn_enemy(EntityId(i + 2), 5)).collect();

    let mut engine = CombatEngine::new(
        hero(1, 0, 30),
        enemies,
        SkillLoadout::default(),
        PassiveLoadout::default(),
        RecordingSink::new(),
        CombatConfig::default(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let events = fight(&mut engine, &mut rng);

    assert_eq!(engine.status(), CombatStatus::Defeat);
    assert_eq!(events.last(), Some(&CombatEvent::Defeat));
    assert_eq!(engine.result().map(|r| r.experience_gained), Some(0));

    // Terminal state absorbs further updates
    assert!(engine.update(10_000_000, &mut rng).is_empty());
    assert_eq!(engine.status(), CombatStatus::Defeat);
}

#[test]
fn test_starter_loadout_casts_skills() {
    let mut spawner = LevelScaledSpawner::new(ChaCha8Rng::seed_from_u64(3), 1.0);
    let enemies = vec![spawner.spawn_enemy(EntityId(2), 3)];

    let mut engine = CombatEngine::new(
        hero(40, 20, 500),
        enemies,
        starter_skills(),
        starter_passives(),
        RecordingSink::new(),
        CombatConfig::default(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let events = fight(&mut engine, &mut rng);

    assert_eq!(engine.status(), CombatStatus::Victory);
    assert!(events.contains(&CombatEvent::SkillUsed {
        source: EntityId(1),
        skill_id: "fireball".to_string(),
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::DamageDealt {
            kind: DamageKind::Skill,
            ..
        }
    )));
    // Iron Skin: +2 attack, +2 defense, +20 health
    assert_eq!(engine.player().stats.attack, 42);
    assert_eq!(engine.player().stats.max_health(), 520);
}
