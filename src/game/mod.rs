// src/game/mod.rs

//! Recognition game: round generation, answer evaluation and leaderboard ranking.
//!
//! Everything here talks to the entity store through [`Store`](crate::store::Store)
//! and keeps no state between calls.

pub mod answer;
pub mod leaderboard;
pub mod round;

pub use answer::submit_answer;
pub use leaderboard::get_leaderboard;
pub use round::generate_round;
