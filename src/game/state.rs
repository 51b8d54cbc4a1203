//! The authoritative per-lobby game aggregate and its operations.
//!
//! Every operation validates phase and actor before mutating and
//! returns a named rejection on failure, leaving the game unchanged.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::card::{Card, Suit};
use super::error::ActionError;
use super::player::Player;
use super::round;
use super::rules::{self, TrickEntry};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Bidding,
    ChoosingTrump,
    Playing,
    Scoring,
    Finished,
}

/// Per-game behavior switches. Defaults match the strictest observed
/// ruleset: bids in turn order only, no undo.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    /// Accept a bid from any player still lacking one instead of
    /// enforcing turn order.
    pub lenient_bidding: bool,
    pub undo_enabled: bool,
}

/// One play, recorded so it can be reversed.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub player_index: usize,
    pub card: Card,
    pub hand_index: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRoundScore {
    pub player: String,
    pub points: i32,
    pub tricks_won: u8,
    pub prediction: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoundScore {
    pub round: u8,
    pub scores: Vec<PlayerRoundScore>,
}

/// Rounds played for a given table size. Fewer players get more
/// rounds; round r deals r cards each plus one trump indicator, so
/// player_count * max_rounds + 1 never exceeds the 60-card deck.
pub fn max_rounds_for(player_count: usize) -> u8 {
    match player_count {
        3 => 20,
        4 => 15,
        5 => 12,
        6 => 10,
        // Creation rejects other table sizes; conservative fallback.
        _ => 12,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub session_id: Uuid,
    /// Seat order is fixed for the whole game and drives turn rotation.
    pub players: Vec<Player>,
    pub current_round: u8,
    pub max_rounds: u8,
    pub current_trick: Vec<TrickEntry>,
    pub current_player_index: usize,
    pub trump_card: Option<Card>,
    pub trump_suit: Option<Suit>,
    pub phase: Phase,
    pub round_scores: Vec<RoundScore>,
    pub deck: Vec<Card>,
    pub dealer: usize,
    pub is_paused: bool,
    /// Dealer seat while a drawn Zoro awaits a trump choice.
    pub trump_chooser: Option<usize>,
    pub options: GameOptions,
    /// Bounded by the current round: both stacks are cleared on every
    /// new deal.
    pub move_history: Vec<MoveRecord>,
    pub trick_history: Vec<Vec<TrickEntry>>,
}

impl Game {
    pub fn new(player_names: &[String], options: GameOptions) -> Result<Self, ActionError> {
        Self::new_with_rng(player_names, options, &mut rand::thread_rng())
    }

    pub fn new_with_rng(
        player_names: &[String],
        options: GameOptions,
        rng: &mut impl Rng,
    ) -> Result<Self, ActionError> {
        if !(3..=6).contains(&player_names.len()) {
            return Err(ActionError::NotEnoughPlayers);
        }
        let players: Vec<Player> = player_names.iter().map(|n| Player::new(n.as_str())).collect();
        let max_rounds = max_rounds_for(players.len());
        let mut game = Game {
            session_id: Uuid::new_v4(),
            players,
            current_round: 1,
            max_rounds,
            current_trick: Vec::new(),
            current_player_index: 0,
            trump_card: None,
            trump_suit: None,
            phase: Phase::Bidding,
            round_scores: Vec::new(),
            deck: Vec::new(),
            dealer: 0,
            is_paused: false,
            trump_chooser: None,
            options,
            move_history: Vec::new(),
            trick_history: Vec::new(),
        };
        round::begin_round(&mut game, rng);
        Ok(game)
    }

    /// Fresh game with the same seats and options, scores back at zero.
    pub fn restart(&self) -> Result<Self, ActionError> {
        let names: Vec<String> = self.players.iter().map(|p| p.name.clone()).collect();
        Self::new(&names, self.options)
    }

    pub fn player_index(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    fn guard(&self) -> Result<(), ActionError> {
        if self.players.is_empty() {
            return Err(ActionError::CorruptState);
        }
        Ok(())
    }

    fn bid_lead(&self) -> usize {
        (self.dealer + 1) % self.players.len()
    }

    /// Record a bid. Strict mode only accepts the player whose turn it
    /// is; once the last bid lands, play opens with the seat left of
    /// the dealer.
    pub fn submit_prediction(&mut self, name: &str, value: u8) -> Result<(), ActionError> {
        self.guard()?;
        if self.is_paused {
            return Err(ActionError::GamePaused);
        }
        if self.phase != Phase::Bidding {
            return Err(ActionError::InvalidPhase);
        }
        let idx = self.player_index(name).ok_or(ActionError::PlayerNotFound)?;
        if self.players[idx].prediction.is_some() {
            return Err(ActionError::AlreadyPredicted);
        }
        if !self.options.lenient_bidding && idx != self.current_player_index {
            return Err(ActionError::NotYourTurn);
        }
        if value > self.current_round {
            return Err(ActionError::PredictionOutOfRange);
        }

        self.players[idx].prediction = Some(value);

        if self.players.iter().all(|p| p.prediction.is_some()) {
            self.phase = Phase::Playing;
            self.current_player_index = self.bid_lead();
        } else {
            // Next seat still lacking a bid, wrapping around.
            let n = self.players.len();
            let mut next = (self.current_player_index + 1) % n;
            while self.players[next].prediction.is_some() {
                next = (next + 1) % n;
            }
            self.current_player_index = next;
        }
        Ok(())
    }

    /// Dealer resolves a Zoro trump indicator by naming the suit.
    pub fn choose_trump(&mut self, name: &str, suit: Suit) -> Result<(), ActionError> {
        self.guard()?;
        if self.is_paused {
            return Err(ActionError::GamePaused);
        }
        if self.phase != Phase::ChoosingTrump {
            return Err(ActionError::InvalidPhase);
        }
        let idx = self.player_index(name).ok_or(ActionError::PlayerNotFound)?;
        if self.trump_chooser != Some(idx) {
            return Err(ActionError::NotTrumpChooser);
        }
        self.trump_suit = Some(suit);
        self.trump_chooser = None;
        self.phase = Phase::Bidding;
        self.current_player_index = self.bid_lead();
        Ok(())
    }

    /// Play the card at `card_index` from the acting player's hand.
    /// Resolves the trick when it fills and scores the round when the
    /// last hand empties.
    pub fn submit_play(&mut self, name: &str, card_index: usize) -> Result<(), ActionError> {
        self.guard()?;
        if self.is_paused {
            return Err(ActionError::GamePaused);
        }
        if self.phase != Phase::Playing {
            return Err(ActionError::InvalidPhase);
        }
        let idx = self.player_index(name).ok_or(ActionError::PlayerNotFound)?;
        if idx != self.current_player_index {
            return Err(ActionError::NotYourTurn);
        }
        if card_index >= self.players[idx].hand.len() {
            return Err(ActionError::IllegalCardIndex);
        }
        let card = self.players[idx].hand[card_index];
        let lead = self.current_trick.first().map(|e| &e.card);
        if !rules::is_legal_play(&card, &self.players[idx].hand, lead) {
            return Err(ActionError::IllegalCardPlay);
        }

        if self.options.undo_enabled {
            self.move_history.push(MoveRecord {
                player_index: idx,
                card,
                hand_index: card_index,
            });
        }

        self.players[idx].hand.remove(card_index);
        self.current_trick.push(TrickEntry {
            player_name: self.players[idx].name.clone(),
            player_index: idx,
            card,
        });

        if self.current_trick.len() == self.players.len() {
            self.finish_trick()?;
        } else {
            self.current_player_index = (idx + 1) % self.players.len();
        }
        Ok(())
    }

    fn finish_trick(&mut self) -> Result<(), ActionError> {
        let winner_entry = rules::resolve_trick(&self.current_trick, self.trump_suit)
            .ok_or(ActionError::CorruptState)?;
        let winner = self.current_trick[winner_entry].player_index;
        self.players[winner].tricks_won += 1;
        if self.options.undo_enabled {
            self.trick_history.push(std::mem::take(&mut self.current_trick));
        } else {
            self.current_trick.clear();
        }
        self.current_player_index = winner;

        if self.players.iter().all(|p| p.hand.is_empty()) {
            self.score_round();
            self.phase = Phase::Scoring;
        }
        Ok(())
    }

    /// Exact bid pays 20 + 10 per predicted trick; a miss costs 10 per
    /// trick of error. Appends the round record before anything resets.
    fn score_round(&mut self) {
        let mut scores = Vec::with_capacity(self.players.len());
        for player in &mut self.players {
            let prediction = player.prediction.unwrap_or(0);
            let points = if prediction == player.tricks_won {
                20 + 10 * i32::from(prediction)
            } else {
                -10 * (i32::from(prediction) - i32::from(player.tricks_won)).abs()
            };
            player.score += points;
            scores.push(PlayerRoundScore {
                player: player.name.clone(),
                points,
                tricks_won: player.tricks_won,
                prediction,
            });
        }
        self.round_scores.push(RoundScore {
            round: self.current_round,
            scores,
        });
    }

    /// Advance out of Scoring into the next round, or into Finished
    /// when the round limit is reached.
    pub fn request_next_round(&mut self) -> Result<(), ActionError> {
        self.guard()?;
        if self.phase != Phase::Scoring {
            return Err(ActionError::InvalidPhase);
        }
        round::start_new_round(self);
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    /// Force the game over without scoring the round in progress.
    pub fn end(&mut self) {
        self.phase = Phase::Finished;
    }

    /// Reverse the most recent play: trick membership, the winner's
    /// trick count, the turn pointer, and (when the play had closed
    /// the round) the freshly appended round score.
    pub fn undo_last_move(&mut self) -> Result<(), ActionError> {
        self.guard()?;
        if !self.options.undo_enabled {
            return Err(ActionError::UndoUnavailable);
        }
        let record = self
            .move_history
            .last()
            .cloned()
            .ok_or(ActionError::UndoUnavailable)?;

        // Validate the whole reversal up front; a rejected undo must
        // leave the game untouched.
        let restore_trick = self.current_trick.is_empty();
        let undone_entry = if restore_trick {
            self.trick_history.last().and_then(|trick| trick.last())
        } else {
            self.current_trick.last()
        };
        let consistent = matches!(
            undone_entry, Some(entry) if entry.player_index == record.player_index
        ) && record.player_index < self.players.len()
            && record.hand_index <= self.players[record.player_index].hand.len();
        if !consistent {
            return Err(ActionError::CorruptState);
        }

        self.move_history.pop();

        if self.phase == Phase::Scoring {
            // The undone play completed the round; roll its scores back.
            if let Some(round_score) = self.round_scores.pop() {
                for entry in &round_score.scores {
                    if let Some(p) = self.players.iter_mut().find(|p| p.name == entry.player) {
                        p.score -= entry.points;
                    }
                }
            }
            self.phase = Phase::Playing;
        }

        // The undone play may have resolved a trick; restore it first.
        if restore_trick {
            // Non-empty, checked above.
            if let Some(last_trick) = self.trick_history.pop() {
                if let Some(won) = rules::resolve_trick(&last_trick, self.trump_suit) {
                    let winner = last_trick[won].player_index;
                    self.players[winner].tricks_won =
                        self.players[winner].tricks_won.saturating_sub(1);
                }
                self.current_trick = last_trick;
            }
        }

        self.current_trick.pop();
        self.players[record.player_index]
            .hand
            .insert(record.hand_index, record.card);
        self.current_player_index = record.player_index;
        Ok(())
    }
}
