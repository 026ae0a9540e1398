//! Skirmish - auto-battler combat and progression library
//!
//! Round-based combat between a player and waves of enemies, skill and
//! passive loadouts, gear with set bonuses, and a persistent meta-upgrade
//! ledger that carries progress between runs.

pub mod combat;
pub mod content;
pub mod core;
pub mod items;
pub mod passives;
pub mod progression;
pub mod session;
pub mod simulator;
pub mod skills;
pub mod spawn;
