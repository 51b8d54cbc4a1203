//! Dealing, trump determination, and round rollover.

use rand::Rng;

use super::card::{self, Card};
use super::state::{Game, Phase};

/// Deal `current_round` cards to each player in seat order, one card
/// per player per pass, from the top of the deck. Clears prior hands,
/// bids, and trick counts first.
pub(crate) fn deal_cards(game: &mut Game) {
    for player in &mut game.players {
        player.hand.clear();
        player.prediction = None;
        player.tricks_won = 0;
    }
    for _ in 0..game.current_round {
        for player in &mut game.players {
            if let Some(card) = game.deck.pop() {
                player.hand.push(card);
            }
        }
    }
}

/// Draw the trump indicator from the deck top. A suited card sets its
/// suit as trump; a Fool means no trump; a Zoro hands the choice to
/// the dealer via the ChoosingTrump phase. An exhausted deck leaves
/// the round trumpless.
pub(crate) fn set_trump(game: &mut Game) {
    game.trump_card = game.deck.pop();
    match game.trump_card {
        Some(Card::Suited { suit, .. }) => game.trump_suit = Some(suit),
        Some(Card::Fool) | None => game.trump_suit = None,
        Some(Card::Zoro) => {
            game.trump_suit = None;
            game.trump_chooser = Some(game.dealer);
            game.phase = Phase::ChoosingTrump;
        }
    }
}

/// Shuffle a fresh deck, deal, draw trump, and open bidding (or trump
/// choice) with the seat left of the dealer. The deck never carries
/// over between rounds.
pub(crate) fn begin_round(game: &mut Game, rng: &mut impl Rng) {
    game.current_trick.clear();
    game.move_history.clear();
    game.trick_history.clear();
    game.deck = card::shuffled_deck(rng);
    deal_cards(game);
    set_trump(game);
    if game.phase == Phase::ChoosingTrump {
        game.current_player_index = game.dealer;
    } else {
        game.phase = Phase::Bidding;
        game.current_player_index = (game.dealer + 1) % game.players.len();
    }
}

/// Advance to the next round, or finish the game once the limit is
/// reached. The dealer button moves one seat forward.
pub(crate) fn start_new_round(game: &mut Game) {
    start_new_round_with(game, &mut rand::thread_rng());
}

pub(crate) fn start_new_round_with(game: &mut Game, rng: &mut impl Rng) {
    game.current_round += 1;
    if game.current_round > game.max_rounds {
        game.phase = Phase::Finished;
        return;
    }
    game.dealer = (game.dealer + 1) % game.players.len();
    begin_round(game, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{Suit, DECK_SIZE};
    use crate::game::state::GameOptions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names() -> Vec<String> {
        vec!["ana".into(), "ben".into(), "cleo".into(), "dev".into()]
    }

    fn game() -> Game {
        let mut rng = StdRng::seed_from_u64(1);
        Game::new_with_rng(&names(), GameOptions::default(), &mut rng).unwrap()
    }

    #[test]
    fn deal_gives_round_number_of_cards_each() {
        let mut g = game();
        g.current_round = 5;
        g.deck = crate::game::card::standard_deck();
        deal_cards(&mut g);
        assert!(g.players.iter().all(|p| p.hand.len() == 5));
        assert!(g.players.iter().all(|p| p.prediction.is_none()));
        assert!(g.players.iter().all(|p| p.tricks_won == 0));
        assert_eq!(g.deck.len(), DECK_SIZE - 4 * 5);
    }

    #[test]
    fn suited_indicator_sets_its_suit_as_trump() {
        let mut g = game();
        g.deck = vec![Card::Suited { suit: Suit::Green, rank: 7 }];
        g.phase = Phase::Scoring;
        set_trump(&mut g);
        assert_eq!(g.trump_suit, Some(Suit::Green));
        assert_eq!(g.trump_card, Some(Card::Suited { suit: Suit::Green, rank: 7 }));
    }

    #[test]
    fn fool_indicator_means_no_trump() {
        let mut g = game();
        g.deck = vec![Card::Fool];
        g.phase = Phase::Bidding;
        set_trump(&mut g);
        assert_eq!(g.trump_card, Some(Card::Fool));
        assert_eq!(g.trump_suit, None);
        assert_ne!(g.phase, Phase::ChoosingTrump);
    }

    #[test]
    fn zoro_indicator_defers_to_the_dealer() {
        let mut g = game();
        g.deck = vec![Card::Zoro];
        set_trump(&mut g);
        assert_eq!(g.phase, Phase::ChoosingTrump);
        assert_eq!(g.trump_chooser, Some(g.dealer));
        assert_eq!(g.trump_suit, None);

        let dealer_name = g.players[g.dealer].name.clone();
        g.choose_trump(&dealer_name, Suit::Blue).unwrap();
        assert_eq!(g.trump_suit, Some(Suit::Blue));
        assert_eq!(g.phase, Phase::Bidding);
        assert_eq!(g.current_player_index, (g.dealer + 1) % 4);
    }

    #[test]
    fn empty_deck_leaves_round_trumpless() {
        let mut g = game();
        g.deck.clear();
        set_trump(&mut g);
        assert_eq!(g.trump_card, None);
        assert_eq!(g.trump_suit, None);
    }

    #[test]
    fn next_round_rotates_dealer_and_redeals() {
        let mut g = game();
        let dealer_before = g.dealer;
        g.current_round = 1;
        g.phase = Phase::Scoring;
        let mut rng = StdRng::seed_from_u64(2);
        start_new_round_with(&mut g, &mut rng);
        assert_eq!(g.current_round, 2);
        assert_eq!(g.dealer, (dealer_before + 1) % 4);
        assert!(g.players.iter().all(|p| p.hand.len() == 2));
        assert!(g.current_trick.is_empty());
        let in_hands: usize = g.players.iter().map(|p| p.hand.len()).sum();
        let trump_drawn = usize::from(g.trump_card.is_some());
        assert_eq!(in_hands + g.deck.len() + trump_drawn, DECK_SIZE);
    }

    #[test]
    fn exceeding_the_round_limit_finishes_the_game() {
        let mut g = game();
        g.current_round = g.max_rounds;
        g.phase = Phase::Scoring;
        start_new_round(&mut g);
        assert_eq!(g.phase, Phase::Finished);
        assert_eq!(g.current_round, g.max_rounds + 1);
    }
}
