//! API data models

pub mod prediction;
pub mod engine;

pub use prediction::*;
pub use engine::*;
