//! Pure play-legality and trick-resolution rules.

use super::card::{Card, Suit};

/// Whether `card` may be played from `hand` given the card that led
/// the current trick (`None` when this card leads).
pub fn is_legal_play(card: &Card, hand: &[Card], lead: Option<&Card>) -> bool {
    // Leading, or playing a special card, is always legal.
    if card.is_special() {
        return true;
    }
    let Some(lead) = lead else { return true };
    // A special lead imposes no suit constraint.
    let Some(lead_suit) = lead.suit() else {
        return true;
    };
    if card.suit() == Some(lead_suit) {
        return true;
    }
    // Off-suit is only legal when no regular card of the lead suit remains.
    !hand.iter().any(|c| c.suit() == Some(lead_suit))
}

/// Whether `a` beats `b`, where `b` was played earlier in the trick.
/// Ties (off-suit, non-trump) go to the earlier card.
pub fn beats(a: &Card, b: &Card, trump: Option<Suit>) -> bool {
    // Arm order matters for the special ties: an earlier Zoro holds
    // against a later one, and a Fool never beats another Fool.
    match (a, b) {
        (_, Card::Zoro) => false,
        (Card::Zoro, _) => true,
        (Card::Fool, _) => false,
        (_, Card::Fool) => true,
        (Card::Suited { suit: sa, rank: ra }, Card::Suited { suit: sb, rank: rb }) => {
            let a_trump = trump == Some(*sa);
            let b_trump = trump == Some(*sb);
            if a_trump != b_trump {
                return a_trump;
            }
            sa == sb && ra > rb
        }
    }
}

/// One card played into a trick.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TrickEntry {
    pub player_name: String,
    /// Position in the game's player list at play time.
    pub player_index: usize,
    pub card: Card,
}

/// Index into `trick` of the winning entry. Folds left keeping the
/// running winner, so the first Zoro wins outright and an all-Fool
/// trick falls to the first entry.
pub fn resolve_trick(trick: &[TrickEntry], trump: Option<Suit>) -> Option<usize> {
    let mut winner = 0;
    for (i, entry) in trick.iter().enumerate().skip(1) {
        if beats(&entry.card, &trick[winner].card, trump) {
            winner = i;
        }
    }
    if trick.is_empty() {
        None
    } else {
        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suited(suit: Suit, rank: u8) -> Card {
        Card::Suited { suit, rank }
    }

    fn entry(index: usize, card: Card) -> TrickEntry {
        TrickEntry {
            player_name: format!("p{index}"),
            player_index: index,
            card,
        }
    }

    #[test]
    fn leading_any_card_is_legal() {
        let hand = [suited(Suit::Red, 4), Card::Fool];
        assert!(is_legal_play(&suited(Suit::Red, 4), &hand, None));
        assert!(is_legal_play(&Card::Fool, &hand, None));
    }

    #[test]
    fn must_follow_lead_suit_when_able() {
        let hand = [suited(Suit::Red, 4), suited(Suit::Blue, 9)];
        let lead = suited(Suit::Red, 11);
        assert!(is_legal_play(&suited(Suit::Red, 4), &hand, Some(&lead)));
        assert!(!is_legal_play(&suited(Suit::Blue, 9), &hand, Some(&lead)));
    }

    #[test]
    fn off_suit_legal_when_void_in_lead_suit() {
        let hand = [suited(Suit::Blue, 9), suited(Suit::Green, 2)];
        let lead = suited(Suit::Red, 11);
        assert!(is_legal_play(&suited(Suit::Blue, 9), &hand, Some(&lead)));
    }

    #[test]
    fn specials_always_legal_even_when_holding_lead_suit() {
        let hand = [suited(Suit::Red, 4), Card::Zoro, Card::Fool];
        let lead = suited(Suit::Red, 11);
        assert!(is_legal_play(&Card::Zoro, &hand, Some(&lead)));
        assert!(is_legal_play(&Card::Fool, &hand, Some(&lead)));
    }

    #[test]
    fn special_lead_imposes_no_constraint() {
        let hand = [suited(Suit::Red, 4), suited(Suit::Blue, 9)];
        assert!(is_legal_play(&suited(Suit::Blue, 9), &hand, Some(&Card::Fool)));
        assert!(is_legal_play(&suited(Suit::Blue, 9), &hand, Some(&Card::Zoro)));
    }

    #[test]
    fn special_ties_go_to_the_earlier_card() {
        assert!(!beats(&Card::Zoro, &Card::Zoro, None));
        assert!(!beats(&Card::Fool, &Card::Fool, None));
        assert!(!beats(&Card::Fool, &Card::Fool, Some(Suit::Red)));
    }

    #[test]
    fn first_zoro_wins_regardless_of_ranks() {
        let trick = [
            entry(0, suited(Suit::Red, 13)),
            entry(1, Card::Zoro),
            entry(2, Card::Zoro),
        ];
        assert_eq!(resolve_trick(&trick, Some(Suit::Red)), Some(1));
    }

    #[test]
    fn all_fools_first_player_wins() {
        let trick = [entry(0, Card::Fool), entry(1, Card::Fool), entry(2, Card::Fool)];
        assert_eq!(resolve_trick(&trick, None), Some(0));
    }

    #[test]
    fn trump_beats_higher_off_trump() {
        let trick = [
            entry(0, suited(Suit::Red, 13)),
            entry(1, suited(Suit::Blue, 2)),
            entry(2, suited(Suit::Red, 12)),
        ];
        assert_eq!(resolve_trick(&trick, Some(Suit::Blue)), Some(1));
    }

    #[test]
    fn highest_of_lead_suit_wins_without_trump() {
        let trick = [
            entry(0, suited(Suit::Red, 5)),
            entry(1, suited(Suit::Red, 11)),
            entry(2, suited(Suit::Green, 13)),
        ];
        assert_eq!(resolve_trick(&trick, None), Some(1));
    }

    #[test]
    fn fool_lead_passes_the_lead_to_next_regular_card() {
        let trick = [
            entry(0, Card::Fool),
            entry(1, suited(Suit::Green, 3)),
            entry(2, suited(Suit::Red, 13)),
        ];
        // Green 3 established the effective lead; off-suit red never overturns.
        assert_eq!(resolve_trick(&trick, None), Some(1));
    }

    #[test]
    fn off_suit_never_overturns_even_with_higher_rank() {
        assert!(!beats(
            &suited(Suit::Green, 13),
            &suited(Suit::Red, 2),
            None
        ));
    }
}
