//! Card primitives for the simulation engine.
//!
//! Provides the basic types shared by the dealer, the hand evaluator and the
//! Monte-Carlo win-rate estimator:
//! - `Card`: a single playing card with rank and suit
//! - `HoleCards`: a player's two private cards
//! - `Deck`: a shuffled deck with dead-card removal
//! - `Street`: the betting phase of a round

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Rank characters for display (index 0 = deuce, 12 = ace).
const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Suit characters for display.
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

/// A single playing card, encoded as `rank * 4 + suit` (0-51).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    id: u8,
}

impl Card {
    /// Create a card from rank (0-12: deuce to ace) and suit (0-3).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13, "rank must be 0-12");
        debug_assert!(suit < 4, "suit must be 0-3");
        Self { id: rank * 4 + suit }
    }

    /// Create a card from its ID (0-51).
    #[inline]
    pub fn from_id(id: u8) -> Self {
        debug_assert!(id < 52, "card id must be 0-51");
        Self { id }
    }

    /// Parse a card from a string like "As", "Kh", "2c".
    pub fn from_str(s: &str) -> Option<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return None;
        }
        let rank = RANK_CHARS.iter().position(|&c| c == chars[0].to_ascii_uppercase())?;
        let suit = SUIT_CHARS.iter().position(|&c| c == chars[1].to_ascii_lowercase())?;
        Some(Self::new(rank as u8, suit as u8))
    }

    /// The card's ID (0-51).
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The card's rank (0-12: deuce to ace).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.id / 4
    }

    /// The card's suit (0-3).
    #[inline]
    pub fn suit(&self) -> u8 {
        self.id % 4
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_CHARS[self.rank() as usize],
            SUIT_CHARS[self.suit() as usize]
        )
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A player's two hole cards.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoleCards {
    /// First card (higher rank by convention).
    pub card1: Card,
    /// Second card.
    pub card2: Card,
}

impl HoleCards {
    /// Create hole cards, ordering by rank (higher first).
    pub fn new(card1: Card, card2: Card) -> Self {
        if card1.rank() >= card2.rank() {
            Self { card1, card2 }
        } else {
            Self { card1: card2, card2: card1 }
        }
    }

    /// Parse hole cards from a string like "AhKs".
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.replace(' ', "");
        if s.len() != 4 {
            return None;
        }
        let c1 = Card::from_str(&s[0..2])?;
        let c2 = Card::from_str(&s[2..4])?;
        Some(Self::new(c1, c2))
    }

    /// Both cards as an array.
    pub fn cards(&self) -> [Card; 2] {
        [self.card1, self.card2]
    }
}

impl fmt::Display for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.card1, self.card2)
    }
}

impl fmt::Debug for HoleCards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A betting phase of a poker round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// All streets in play order.
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    /// The street that follows this one, if any.
    pub fn next(&self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    /// The street that precedes this one, if any.
    pub fn previous(&self) -> Option<Street> {
        match self {
            Street::Preflop => None,
            Street::Flop => Some(Street::Preflop),
            Street::Turn => Some(Street::Flop),
            Street::River => Some(Street::Turn),
        }
    }

    /// Street index (0-3), also the one-hot slot in the feature schema.
    pub fn index(&self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 1,
            Street::Turn => 2,
            Street::River => 3,
        }
    }

    /// Number of community cards dealt by the end of this street.
    pub fn community_cards(&self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Street::Preflop => write!(f, "preflop"),
            Street::Flop => write!(f, "flop"),
            Street::Turn => write!(f, "turn"),
            Street::River => write!(f, "river"),
        }
    }
}

/// A deck of cards with optional dead-card removal.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    /// Create a full 52-card deck in standard order.
    pub fn new() -> Self {
        let cards = (0..52).map(Card::from_id).collect();
        Self { cards, next: 0 }
    }

    /// Create a deck with the given cards removed.
    ///
    /// Used by the Monte-Carlo estimator to deal around known cards.
    pub fn without(dead: &[Card]) -> Self {
        let cards = (0..52)
            .map(Card::from_id)
            .filter(|c| !dead.contains(c))
            .collect();
        Self { cards, next: 0 }
    }

    /// Shuffle the undealt portion of the deck.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.cards[self.next..].shuffle(rng);
    }

    /// Deal the next card.
    pub fn deal(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied();
        if card.is_some() {
            self.next += 1;
        }
        card
    }

    /// Number of undealt cards.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_card_encoding() {
        let card = Card::new(12, 3); // As
        assert_eq!(card.rank(), 12);
        assert_eq!(card.suit(), 3);
        assert_eq!(card.to_string(), "As");
        assert_eq!(Card::from_str("As"), Some(card));
        assert_eq!(Card::from_str("as"), Some(card));
        assert_eq!(Card::from_str("Zz"), None);
    }

    #[test]
    fn test_hole_cards_ordering() {
        let low = Card::from_str("2c").unwrap();
        let high = Card::from_str("Ah").unwrap();
        let hole = HoleCards::new(low, high);
        assert_eq!(hole.card1, high);
        assert_eq!(hole.card2, low);
    }

    #[test]
    fn test_street_progression() {
        assert_eq!(Street::Preflop.next(), Some(Street::Flop));
        assert_eq!(Street::River.next(), None);
        assert_eq!(Street::Flop.previous(), Some(Street::Preflop));
        assert_eq!(Street::Preflop.previous(), None);
        assert_eq!(Street::Turn.index(), 2);
        assert_eq!(Street::River.community_cards(), 5);
    }

    #[test]
    fn test_deck_dead_cards() {
        let dead = [Card::from_str("As").unwrap(), Card::from_str("Kd").unwrap()];
        let mut deck = Deck::without(&dead);
        assert_eq!(deck.remaining(), 50);

        let mut rng = StdRng::seed_from_u64(7);
        deck.shuffle(&mut rng);
        while let Some(card) = deck.deal() {
            assert!(!dead.contains(&card));
        }
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_deck_deal_is_unique() {
        let mut deck = Deck::new();
        let mut rng = StdRng::seed_from_u64(11);
        deck.shuffle(&mut rng);

        let mut seen = std::collections::HashSet::new();
        while let Some(card) = deck.deal() {
            assert!(seen.insert(card.id()));
        }
        assert_eq!(seen.len(), 52);
    }
}
