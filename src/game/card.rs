//! Deck construction and the card types.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The four card colors. Zoro uses colors rather than the French suits.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Red, Suit::Blue, Suit::Green, Suit::Yellow];
}

/// A single card. Zoro beats everything; Fool loses to everything
/// (unless a trick is all Fools, in which case the first one wins).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Card {
    Suited { suit: Suit, rank: u8 },
    Zoro,
    Fool,
}

impl Card {
    /// The card's suit, if it has one. Zoro and Fool are suitless.
    pub fn suit(&self) -> Option<Suit> {
        match self {
            Card::Suited { suit, .. } => Some(*suit),
            Card::Zoro | Card::Fool => None,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Card::Zoro | Card::Fool)
    }
}

/// Number of cards in a full deck: 4 suits x 13 ranks + 4 Zoros + 4 Fools.
pub const DECK_SIZE: usize = 60;

/// The fixed 60-card composition, unshuffled.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in 1..=13 {
            deck.push(Card::Suited { suit, rank });
        }
    }
    for _ in 0..4 {
        deck.push(Card::Zoro);
        deck.push(Card::Fool);
    }
    deck
}

/// A full deck in uniformly random order. The top of the deck is the
/// end of the vector; draw with `pop`.
pub fn shuffled_deck(rng: &mut impl Rng) -> Vec<Card> {
    let mut deck = standard_deck();
    deck.shuffle(rng);
    deck
}
