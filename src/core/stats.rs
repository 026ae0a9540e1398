//! Combatant stat model: clamped health/energy pools, positions, and entities.

use serde::{Deserialize, Serialize};

/// Opaque identity of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out unique entity ids for a session.
#[derive(Debug, Clone, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

/// Mutable stat record embedded in every combatant.
///
/// Health and energy pools are private so that every mutation goes through a
/// clamping method: `0 <= current <= max` holds after any call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub level: u32,
    max_health: u32,
    current_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    max_energy: u32,
    current_energy: u32,
}

impl CombatStats {
    /// Creates stats with full health and energy.
    pub fn new(
        level: u32,
        max_health: u32,
        attack: u32,
        defense: u32,
        speed: u32,
        max_energy: u32,
    ) -> Self {
        Self {
            level,
            max_health,
            current_health: max_health,
            attack,
            defense,
            speed,
            max_energy,
            current_energy: max_energy,
        }
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    pub fn current_energy(&self) -> u32 {
        self.current_energy
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    /// Removes health, flooring at zero. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current_health);
        self.current_health -= lost;
        lost
    }

    /// Restores health up to the maximum. Returns the health actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_health - self.current_health);
        self.current_health += gained;
        gained
    }

    /// Sets current health directly, clamped to `[0, max_health]`.
    pub fn set_current_health(&mut self, value: u32) {
        self.current_health = value.min(self.max_health);
    }

    /// Deducts energy. Fails without mutation if the pool is too small.
    pub fn spend_energy(&mut self, amount: u32) -> bool {
        if self.current_energy < amount {
            return false;
        }
        self.current_energy -= amount;
        true
    }

    /// Restores energy up to the maximum. Returns the energy actually gained.
    pub fn restore_energy(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_energy - self.current_energy);
        self.current_energy += gained;
        gained
    }

    /// Raises both max and current health by `amount`.
    pub fn add_max_health(&mut self, amount: u32) {
        self.max_health = self.max_health.saturating_add(amount);
        self.current_health = self
            .current_health
            .saturating_add(amount)
            .min(self.max_health);
    }

    /// Raises both max and current energy by `amount`.
    pub fn add_max_energy(&mut self, amount: u32) {
        self.max_energy = self.max_energy.saturating_add(amount);
        self.current_energy = self
            .current_energy
            .saturating_add(amount)
            .min(self.max_energy);
    }

    /// Multiplies max health by `factor`, scaling current health by the same factor.
    pub fn scale_max_health(&mut self, factor: f64) {
        self.max_health = scale(self.max_health, factor);
        self.current_health = scale(self.current_health, factor).min(self.max_health);
    }

    /// Multiplies max energy by `factor`, scaling current energy by the same factor.
    pub fn scale_max_energy(&mut self, factor: f64) {
        self.max_energy = scale(self.max_energy, factor);
        self.current_energy = scale(self.current_energy, factor).min(self.max_energy);
    }
}

/// Floors `value * factor`, never going negative.
pub fn scale(value: u32, factor: f64) -> u32 {
    (value as f64 * factor).max(0.0).floor() as u32
}

/// World-space position. Combat distance ignores `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared distance in the x/z plane.
    pub fn planar_distance_sq(&self, other: &Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx * dx + dz * dz
    }

    /// Moves up to `step` units toward `target` along the full 3D direction.
    /// Never overshoots the target.
    pub fn step_toward(&self, target: &Position, step: f32) -> Position {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let dz = target.z - self.z;
        let length = (dx * dx + dy * dy + dz * dz).sqrt();
        if length <= f32::EPSILON {
            return *self;
        }
        if length <= step {
            return *target;
        }
        let k = step / length;
        Position::new(self.x + dx * k, self.y + dy * k, self.z + dz * k)
    }
}

/// One-shot stat modifiers already folded into an entity's stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppliedModifiers {
    pub gear: bool,
    pub meta_upgrades: bool,
    pub permanent_passives: bool,
}

/// A combatant: the single player or an AI-controlled enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEntity {
    pub id: EntityId,
    pub name: String,
    pub stats: CombatStats,
    pub position: Position,
    pub is_player: bool,
    pub applied: AppliedModifiers,
}

impl CombatEntity {
    pub fn new(id: EntityId, name: String, stats: CombatStats, position: Position) -> Self {
        Self {
            id,
            name,
            stats,
            position,
            is_player: false,
            applied: AppliedModifiers::default(),
        }
    }

    pub fn player(id: EntityId, name: String, stats: CombatStats) -> Self {
        Self {
            is_player: true,
            ..Self::new(id, name, stats, Position::default())
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_stats_start_full() {
        let stats = CombatStats::new(1, 100, 15, 10, 10, 50);
        assert_eq!(stats.current_health(), 100);
        assert_eq!(stats.current_energy(), 50);
        assert!(stats.is_alive());
    }

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut stats = CombatStats::new(1, 50, 10, 5, 5, 0);
        assert_eq!(stats.take_damage(30), 30);
        assert_eq!(stats.take_damage(30), 20);
        assert_eq!(stats.current_health(), 0);
        assert!(!stats.is_alive());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut stats = CombatStats::new(1, 100, 10, 5, 5, 0);
        stats.take_damage(10);
        assert_eq!(stats.heal(50), 10);
        assert_eq!(stats.current_health(), 100);
    }

    #[test]
    fn test_spend_energy_fails_closed() {
        let mut stats = CombatStats::new(1, 100, 10, 5, 5, 20);
        assert!(!stats.spend_energy(25));
        assert_eq!(stats.current_energy(), 20);
        assert!(stats.spend_energy(20));
        assert_eq!(stats.current_energy(), 0);
    }

    #[test]
    fn test_scale_max_health_keeps_ratio() {
        let mut stats = CombatStats::new(1, 100, 10, 5, 5, 0);
        stats.take_damage(50);
        stats.scale_max_health(1.5);
        assert_eq!(stats.max_health(), 150);
        assert_eq!(stats.current_health(), 75);
    }

    #[test]
    fn test_planar_distance_ignores_y() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 100.0, 4.0);
        assert!((a.planar_distance_sq(&b) - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_step_toward_moves_fixed_step() {
        let from = Position::new(0.0, 0.0, 0.0);
        let to = Position::new(1.0, 0.0, 0.0);
        let moved = from.step_toward(&to, 0.1);
        assert!((moved.x - 0.1).abs() < 1e-6);
        assert_eq!(from.step_toward(&to, 5.0), to);
        assert_eq!(to.step_toward(&to, 0.1), to);
    }

    #[test]
    fn test_id_allocator_is_unique() {
        let mut ids = EntityIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
    }

    #[derive(Debug, Clone)]
    enum Mutation {
        Damage(u32),
        Heal(u32),
        Spend(u32),
        Restore(u32),
        AddHealth(u32),
        AddEnergy(u32),
        ScaleHealth(f64),
        ScaleEnergy(f64),
        SetHealth(u32),
    }

    fn mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            (0u32..500).prop_map(Mutation::Damage),
            (0u32..500).prop_map(Mutation::Heal),
            (0u32..500).prop_map(Mutation::Spend),
            (0u32..500).prop_map(Mutation::Restore),
            (0u32..500).prop_map(Mutation::AddHealth),
            (0u32..500).prop_map(Mutation::AddEnergy),
            (0.0f64..3.0).prop_map(Mutation::ScaleHealth),
            (0.0f64..3.0).prop_map(Mutation::ScaleEnergy),
            (0u32..1000).prop_map(Mutation::SetHealth),
        ]
    }

    proptest! {
        #[test]
        fn prop_pools_stay_within_bounds(
            max_health in 1u32..1000,
            max_energy in 0u32..200,
            ops in proptest::collection::vec(mutation(), 0..40),
        ) {
            let mut stats = CombatStats::new(1, max_health, 10, 5, 5, max_energy);
            for op in ops {
                match op {
                    Mutation::Damage(v) => { stats.take_damage(v); }
                    Mutation::Heal(v) => { stats.heal(v); }
                    Mutation::Spend(v) => { stats.spend_energy(v); }
                    Mutation::Restore(v) => { stats.restore_energy(v); }
                    Mutation::AddHealth(v) => stats.add_max_health(v),
                    Mutation::AddEnergy(v) => stats.add_max_energy(v),
                    Mutation::ScaleHealth(f) => stats.scale_max_health(f),
                    Mutation::ScaleEnergy(f) => stats.scale_max_energy(f),
                    Mutation::SetHealth(v) => stats.set_current_health(v),
                }
                prop_assert!(stats.current_health() <= stats.max_health());
                prop_assert!(stats.current_energy() <= stats.max_energy());
            }
        }
    }
}
