//! Combat tuning knobs, defaulting to the balance constants.

use super::constants::*;

/// Configuration for a combat engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatConfig {
    /// Minimum wall-clock time between round starts
    pub round_duration_ms: u64,
    /// Melee reach in world units (compared squared, x/z plane only)
    pub attack_range: f32,
    /// Distance covered by one Move action
    pub move_step: f32,
    /// Energy restored to every living combatant after each completed round
    pub energy_regen_per_round: u32,
    /// Delay before an animated entity returns to its idle animation
    pub idle_return_delay_ms: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            round_duration_ms: ROUND_DURATION_MS,
            attack_range: ATTACK_RANGE,
            move_step: MOVE_STEP,
            energy_regen_per_round: ENERGY_REGEN_PER_ROUND,
            idle_return_delay_ms: IDLE_RETURN_DELAY_MS,
        }
    }
}

impl CombatConfig {
    /// Config without passive energy regeneration.
    pub fn without_regen() -> Self {
        Self {
            energy_regen_per_round: 0,
            ..Default::default()
        }
    }

    pub fn attack_range_sq(&self) -> f32 {
        self.attack_range * self.attack_range
    }
}
