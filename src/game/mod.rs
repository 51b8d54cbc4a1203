//! Core game logic: deck, rules, rounds, and the per-lobby state
//! machine. Everything here is synchronous and in-memory; callers
//! serialize access through the owning lobby's game lock.

pub mod card;
pub mod error;
pub mod player;
pub mod round;
pub mod rules;
pub mod state;

pub use card::{Card, Suit};
pub use error::ActionError;
pub use player::Player;
pub use rules::TrickEntry;
pub use state::{Game, GameOptions, Phase};
