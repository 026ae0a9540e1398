//! Run tracking, meta-upgrade purchasing and persisted player progress.

#![allow(unused_imports)]

pub mod logic;
pub mod persistence;
pub mod types;

pub use logic::*;
pub use persistence::*;
pub use types::*;
