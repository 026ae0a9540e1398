//! Enemy construction for waves.

use crate::core::constants::*;
use crate::core::stats::{scale, CombatEntity, CombatStats, EntityId, Position};
use rand::Rng;
use std::f32::consts::TAU;

/// Produces enemies for a wave.
pub trait EnemySpawner {
    fn spawn_enemy(&mut self, id: EntityId, level: u32) -> CombatEntity;
}

/// Number of enemies in a wave: one per wave number, capped.
pub fn wave_enemy_count(wave: u32) -> u32 {
    wave.clamp(1, MAX_ENEMIES_PER_WAVE)
}

/// Enemy level for a wave.
pub fn wave_enemy_level(wave: u32) -> u32 {
    wave.max(1)
}

pub fn generate_enemy_name(rng: &mut impl Rng) -> String {
    let prefixes = [
        "Grizz", "Sav", "Dark", "Blood", "Bone", "Shadow", "Fel", "Dire", "Wild", "Grim",
    ];
    let roots = [
        "led", "age", "en", "tooth", "claw", "fang", "heart", "eye", "maw", "tail",
    ];
    let suffixes = [
        "Goblin", "Skeleton", "Slime", "Brute", "Stalker", "Wraith", "Imp", "Ghoul", "Raider",
        "Hound",
    ];

    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    let root = roots[rng.gen_range(0..roots.len())];
    let suffix = suffixes[rng.gen_range(0..suffixes.len())];

    format!("{}{} {}", prefix, root, suffix)
}

/// Scales base enemy stats by level and run difficulty, with per-stat
/// variance, and places each enemy on a ring around the origin.
pub struct LevelScaledSpawner<R: Rng> {
    rng: R,
    difficulty: f64,
}

impl<R: Rng> LevelScaledSpawner<R> {
    pub fn new(rng: R, difficulty: f64) -> Self {
        Self {
            rng,
            difficulty: difficulty.max(MIN_DIFFICULTY),
        }
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: f64) {
        self.difficulty = difficulty.max(MIN_DIFFICULTY);
    }

    fn scaled(&mut self, base: u32, per_level: u32, level: u32) -> u32 {
        let raw = base + per_level * level.saturating_sub(1);
        let variance = self
            .rng
            .gen_range(ENEMY_STAT_VARIANCE_MIN..=ENEMY_STAT_VARIANCE_MAX);
        scale(raw, self.difficulty * variance).max(1)
    }

    fn ring_position(&mut self) -> Position {
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = self.rng.gen_range(SPAWN_RING_MIN..=SPAWN_RING_MAX);
        Position::new(angle.cos() * radius, 0.0, angle.sin() * radius)
    }
}

impl<R: Rng> EnemySpawner for LevelScaledSpawner<R> {
    fn spawn_enemy(&mut self, id: EntityId, level: u32) -> CombatEntity {
        let level = level.max(1);
        let health = self.scaled(ENEMY_BASE_HEALTH, ENEMY_HEALTH_PER_LEVEL, level);
        let attack = self.scaled(ENEMY_BASE_ATTACK, ENEMY_ATTACK_PER_LEVEL, level);
        let defense = self.scaled(ENEMY_BASE_DEFENSE, ENEMY_DEFENSE_PER_LEVEL, level);
        let speed = self.scaled(ENEMY_BASE_SPEED, ENEMY_SPEED_PER_LEVEL, level);
        let stats = CombatStats::new(level, health, attack, defense, speed, 0);

        let name = generate_enemy_name(&mut self.rng);
        let position = self.ring_position();
        CombatEntity::new(id, name, stats, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    #[test]
    fn test_wave_enemy_count_is_capped() {
        assert_eq!(wave_enemy_count(0), 1);
        assert_eq!(wave_enemy_count(1), 1);
        assert_eq!(wave_enemy_count(3), 3);
        assert_eq!(wave_enemy_count(50), MAX_ENEMIES_PER_WAVE);
    }

    #[test]
    fn test_enemy_stats_within_variance() {
        let mut spawner = LevelScaledSpawner::new(create_test_rng(), 1.0);
        for i in 0..50 {
            let enemy = spawner.spawn_enemy(EntityId(i), 3);
            assert!(!enemy.is_player);
            assert_eq!(enemy.stats.level, 3);
            // base 50 + 2 * 12 = 74
            assert!((66..=81).contains(&enemy.stats.max_health()));
            assert_eq!(enemy.stats.current_health(), enemy.stats.max_health());
            // base 10 + 2 * 3 = 16
            assert!((14..=17).contains(&enemy.stats.attack));
        }
    }

    #[test]
    fn test_difficulty_scales_stats() {
        let mut easy = LevelScaledSpawner::new(create_test_rng(), 1.0);
        let mut hard = LevelScaledSpawner::new(create_test_rng(), 2.0);
        let a = easy.spawn_enemy(EntityId(1), 1);
        let b = hard.spawn_enemy(EntityId(1), 1);
        assert!(b.stats.max_health() > a.stats.max_health());
        assert!(b.stats.attack > a.stats.attack);
    }

    #[test]
    fn test_difficulty_floored() {
        let spawner = LevelScaledSpawner::new(create_test_rng(), 0.2);
        assert!((spawner.difficulty() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_enemies_spawn_on_ring() {
        let mut spawner = LevelScaledSpawner::new(create_test_rng(), 1.0);
        let origin = Position::default();
        for i in 0..20 {
            let enemy = spawner.spawn_enemy(EntityId(i), 1);
            let dist = enemy.position.planar_distance_sq(&origin).sqrt();
            assert!(dist >= SPAWN_RING_MIN - 0.01 && dist <= SPAWN_RING_MAX + 0.01);
        }
    }

    #[test]
    fn test_same_seed_same_enemy() {
        let mut a = LevelScaledSpawner::new(create_test_rng(), 1.3);
        let mut b = LevelScaledSpawner::new(create_test_rng(), 1.3);
        assert_eq!(a.spawn_enemy(EntityId(7), 2), b.spawn_enemy(EntityId(7), 2));
    }
}
