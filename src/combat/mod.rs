//! Combat round engine: action selection, resolution, and collaborator hooks.

#![allow(unused_imports)]

pub mod ai;
pub mod engine;
pub mod sink;
pub mod types;

pub use ai::*;
pub use engine::*;
pub use sink::*;
pub use types::*;
