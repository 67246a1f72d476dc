//! Core data models.

mod game;
mod ids;
mod stats;

pub use game::*;
pub use ids::*;
pub use stats::*;
