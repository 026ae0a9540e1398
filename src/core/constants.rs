// Round timing
pub const ROUND_DURATION_MS: u64 = 2000;
pub const IDLE_RETURN_DELAY_MS: u64 = 600;

// Positioning
pub const ATTACK_RANGE: f32 = 1.0;
pub const MOVE_STEP: f32 = 0.1;
pub const SPAWN_RING_MIN: f32 = 1.5;
pub const SPAWN_RING_MAX: f32 = 3.0;

// Damage
pub const MIN_ATTACK_DAMAGE: u32 = 1;
pub const EXPERIENCE_PER_ENEMY_LEVEL: u64 = 10;

// Energy
pub const ENERGY_REGEN_PER_ROUND: u32 = 5;

// Loadouts
pub const MAX_SKILL_SLOTS: usize = 4;
pub const MAX_PASSIVE_SLOTS: usize = 3;

// Passive scaling: +10% effect per source level and per passive level above 1
pub const PASSIVE_LEVEL_SCALING: f64 = 0.1;
pub const PERMANENT_HEALTH_PER_BOOST: u32 = 10;
// Levelling a passive costs this times its current level
pub const PASSIVE_LEVEL_COST: u64 = 150;

// Player baseline
pub const PLAYER_BASE_HEALTH: u32 = 100;
pub const PLAYER_BASE_ATTACK: u32 = 15;
pub const PLAYER_BASE_DEFENSE: u32 = 10;
pub const PLAYER_BASE_SPEED: u32 = 10;
pub const PLAYER_BASE_ENERGY: u32 = 50;

// Enemy scaling: base + per_level * (level - 1), then scaled by run difficulty
pub const ENEMY_BASE_HEALTH: u32 = 50;
pub const ENEMY_HEALTH_PER_LEVEL: u32 = 12;
pub const ENEMY_BASE_ATTACK: u32 = 10;
pub const ENEMY_ATTACK_PER_LEVEL: u32 = 3;
pub const ENEMY_BASE_DEFENSE: u32 = 5;
pub const ENEMY_DEFENSE_PER_LEVEL: u32 = 2;
pub const ENEMY_BASE_SPEED: u32 = 5;
pub const ENEMY_SPEED_PER_LEVEL: u32 = 1;
pub const ENEMY_STAT_VARIANCE_MIN: f64 = 0.9;
pub const ENEMY_STAT_VARIANCE_MAX: f64 = 1.1;
pub const MAX_ENEMIES_PER_WAVE: u32 = 5;

// Run difficulty: 1 + runs * growth - upgrade investment, floored at 1
pub const DIFFICULTY_PER_RUN: f64 = 0.1;
pub const MIN_DIFFICULTY: f64 = 1.0;

// Resource rewards
pub const RESOURCES_PER_ENEMY_LEVEL: f64 = 5.0;
pub const RUN_REWARD_PER_WAVE: u64 = 50;
pub const RUN_REWARD_PER_KILL: u64 = 10;
pub const RUN_REWARD_DIFFICULTY_FACTOR: f64 = 100.0;
pub const RUN_REWARD_VICTORY_BONUS: u64 = 500;

// Meta upgrades
pub const UPGRADE_COST_GROWTH: f64 = 1.5;

// Save file
pub const SAVE_VERSION_MAGIC: u64 = 0x534B_524D_0000_0002; // "SKRM" v2
