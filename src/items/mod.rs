//! Gear system: slots, rarity, set bonuses, and the equipment ledger.

#![allow(unused_imports)]

pub mod equipment;
pub mod types;

pub use equipment::*;
pub use types::*;
