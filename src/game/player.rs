//! Per-player state inside a game.

use serde::{Deserialize, Serialize};

use super::card::Card;

/// A seated player. The display name is the stable identity; lookups
/// are exact-match on `name`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub hand: Vec<Card>,
    /// Unset between the deal and this player's bid.
    pub prediction: Option<u8>,
    pub tricks_won: u8,
    pub score: i32,
    pub is_active: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            prediction: None,
            tricks_won: 0,
            score: 0,
            is_active: true,
        }
    }
}
