//! Showdown hand evaluation.
//!
//! Ranks 5-card poker hands and finds the best 5-card hand out of the 7
//! cards available at showdown (two hole cards plus the full board). Used
//! both by the engine's showdown and by the Monte-Carlo win-rate estimator.

use super::card::{Card, Deck, HoleCards};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Hand rank categories, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

/// A comparable hand rank.
///
/// Packed as category (top bits) followed by up to five kicker ranks,
/// 4 bits each, so that a plain integer comparison orders hands correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandRank(u32);

impl HandRank {
    fn new(category: HandCategory, kickers: &[u8]) -> Self {
        let mut value = (category as u32) << 20;
        for (i, &k) in kickers.iter().take(5).enumerate() {
            value |= (k as u32) << (16 - i * 4);
        }
        Self(value)
    }

    /// The hand category encoded in this rank.
    pub fn category(&self) -> HandCategory {
        match self.0 >> 20 {
            0 => HandCategory::HighCard,
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            _ => HandCategory::StraightFlush,
        }
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Evaluate the best 5-card hand from exactly 7 cards.
pub fn evaluate_seven(cards: &[Card; 7]) -> HandRank {
    let mut best = HandRank(0);

    // All 21 ways of choosing 5 from 7.
    for i in 0..7 {
        for j in (i + 1)..7 {
            let hand: Vec<Card> = cards
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != i && k != j)
                .map(|(_, &c)| c)
                .collect();
            let rank = evaluate_five(&[hand[0], hand[1], hand[2], hand[3], hand[4]]);
            if rank > best {
                best = rank;
            }
        }
    }

    best
}

/// Evaluate a 5-card hand.
pub fn evaluate_five(cards: &[Card; 5]) -> HandRank {
    let mut rank_counts = [0u8; 13];
    let mut suit_counts = [0u8; 4];
    let mut rank_bits = 0u16;

    for card in cards {
        rank_counts[card.rank() as usize] += 1;
        suit_counts[card.suit() as usize] += 1;
        rank_bits |= 1 << card.rank();
    }

    let is_flush = suit_counts.iter().any(|&c| c == 5);
    let straight_high = find_straight(rank_bits);

    if is_flush {
        if let Some(high) = straight_high {
            return HandRank::new(HandCategory::StraightFlush, &[high]);
        }
    }

    // Group ranks by multiplicity, highest rank first.
    let mut quads = Vec::new();
    let mut trips = Vec::new();
    let mut pairs = Vec::new();
    let mut singles = Vec::new();
    for rank in (0..13u8).rev() {
        match rank_counts[rank as usize] {
            4 => quads.push(rank),
            3 => trips.push(rank),
            2 => pairs.push(rank),
            1 => singles.push(rank),
            _ => {}
        }
    }

    if let Some(&quad) = quads.first() {
        let kicker = trips
            .first()
            .or(pairs.first())
            .or(singles.first())
            .copied()
            .unwrap_or(0);
        return HandRank::new(HandCategory::FourOfAKind, &[quad, kicker]);
    }

    if !trips.is_empty() && !pairs.is_empty() {
        return HandRank::new(HandCategory::FullHouse, &[trips[0], pairs[0]]);
    }

    if is_flush {
        let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank()).collect();
        ranks.sort_by(|a, b| b.cmp(a));
        return HandRank::new(HandCategory::Flush, &ranks);
    }

    if let Some(high) = straight_high {
        return HandRank::new(HandCategory::Straight, &[high]);
    }

    if !trips.is_empty() {
        let kickers: Vec<u8> = singles.iter().take(2).copied().collect();
        return HandRank::new(
            HandCategory::ThreeOfAKind,
            &[
                trips[0],
                kickers.first().copied().unwrap_or(0),
                kickers.get(1).copied().unwrap_or(0),
            ],
        );
    }

    if pairs.len() >= 2 {
        let kicker = singles.first().copied().unwrap_or(0);
        return HandRank::new(HandCategory::TwoPair, &[pairs[0], pairs[1], kicker]);
    }

    if pairs.len() == 1 {
        let mut kickers = [0u8; 4];
        kickers[0] = pairs[0];
        for (i, &s) in singles.iter().take(3).enumerate() {
            kickers[i + 1] = s;
        }
        return HandRank::new(HandCategory::OnePair, &kickers);
    }

    HandRank::new(HandCategory::HighCard, &singles)
}

/// Find the highest straight in a rank bitmask.
///
/// Returns the straight's high-card rank, or `None`. The ace doubles as a
/// low card for the wheel (A-2-3-4-5).
fn find_straight(rank_bits: u16) -> Option<u8> {
    // Mirror the ace below the deuce for the wheel.
    let bits = (rank_bits << 1) | ((rank_bits >> 12) & 1);

    // Scan from ace-high down to the wheel.
    for high in (4..=13u8).rev() {
        let mask = 0b11111u16 << (high - 4);
        if (bits & mask) == mask {
            return Some(high - 1);
        }
    }

    None
}

/// Estimate the probability that `hole` wins at showdown against
/// `num_players - 1` unknown opponents, given the community cards seen so
/// far.
///
/// Runs `trials` Monte-Carlo deals in parallel: each trial deals the
/// opponents' hole cards and the rest of the board from the unseen cards
/// and compares showdown ranks. A tie counts as a win. Every trial seeds
/// its own RNG from a single base value drawn from `rng`, so the result is
/// reproducible for a given caller RNG state regardless of scheduling.
pub fn estimate_win_rate<R: Rng>(
    trials: u32,
    num_players: usize,
    hole: &HoleCards,
    community: &[Card],
    rng: &mut R,
) -> f64 {
    debug_assert!(num_players >= 2, "need at least one opponent");
    if trials == 0 {
        return 0.0;
    }

    let base_seed: u64 = rng.gen();
    let dead: Vec<Card> = hole
        .cards()
        .iter()
        .copied()
        .chain(community.iter().copied())
        .collect();

    let wins: u32 = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut trial_rng = StdRng::seed_from_u64(base_seed.wrapping_add(trial as u64));
            let mut deck = Deck::without(&dead);
            deck.shuffle(&mut trial_rng);

            let mut opponents = Vec::with_capacity(num_players - 1);
            for _ in 0..num_players - 1 {
                let c1 = deck.deal().expect("deck covers every opponent");
                let c2 = deck.deal().expect("deck covers every opponent");
                opponents.push(HoleCards::new(c1, c2));
            }

            let mut board = community.to_vec();
            while board.len() < 5 {
                board.push(deck.deal().expect("deck covers the board"));
            }

            let ours = evaluate_seven(&seven_from(hole, &board));
            let beaten = opponents
                .iter()
                .any(|opp| evaluate_seven(&seven_from(opp, &board)) > ours);
            if beaten {
                0
            } else {
                1
            }
        })
        .sum();

    wins as f64 / trials as f64
}

/// Assemble the 7 showdown cards for a hand on a complete board.
fn seven_from(hole: &HoleCards, board: &[Card]) -> [Card; 7] {
    debug_assert_eq!(board.len(), 5);
    [
        hole.card1, hole.card2, board[0], board[1], board[2], board[3], board[4],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five(s: &str) -> [Card; 5] {
        let s = s.replace(' ', "");
        let mut cards = [Card::from_id(0); 5];
        for (i, chunk) in (0..s.len()).step_by(2).enumerate() {
            cards[i] = Card::from_str(&s[chunk..chunk + 2]).unwrap();
        }
        cards
    }

    fn seven(s: &str) -> [Card; 7] {
        let s = s.replace(' ', "");
        let mut cards = [Card::from_id(0); 7];
        for (i, chunk) in (0..s.len()).step_by(2).enumerate() {
            cards[i] = Card::from_str(&s[chunk..chunk + 2]).unwrap();
        }
        cards
    }

    #[test]
    fn test_category_ordering() {
        let high_card = evaluate_five(&five("As Kd Qh Jc 9s"));
        let one_pair = evaluate_five(&five("As Ad Kh Qc Js"));
        let two_pair = evaluate_five(&five("As Ad Kh Kc Js"));
        let trips = evaluate_five(&five("As Ad Ah Kc Js"));
        let straight = evaluate_five(&five("Ts 9d 8h 7c 6s"));
        let flush = evaluate_five(&five("As Ks 9s 7s 2s"));
        let full_house = evaluate_five(&five("As Ad Ah Kc Kd"));
        let quads = evaluate_five(&five("As Ad Ah Ac Kd"));
        let straight_flush = evaluate_five(&five("9s 8s 7s 6s 5s"));

        let mut ranks = [
            high_card, one_pair, two_pair, trips, straight, flush, full_house, quads,
            straight_flush,
        ];
        let sorted = ranks;
        ranks.sort();
        assert_eq!(ranks, sorted, "categories must already be in ascending order");
    }

    #[test]
    fn test_wheel_straight() {
        let wheel = evaluate_five(&five("5s 4d 3h 2c As"));
        assert_eq!(wheel.category(), HandCategory::Straight);

        // The wheel is the lowest straight.
        let six_high = evaluate_five(&five("6s 5d 4h 3c 2s"));
        assert!(six_high > wheel);
    }

    #[test]
    fn test_kickers_break_ties() {
        let ace_kicker = evaluate_five(&five("Ks Kd Ah 9c 2s"));
        let queen_kicker = evaluate_five(&five("Kh Kc Qd 9s 2d"));
        assert!(ace_kicker > queen_kicker);
    }

    #[test]
    fn test_seven_card_best_hand() {
        // Board pairs the ace, hole cards make a full house.
        let rank = evaluate_seven(&seven("As Ad 8h 8c 2s 7d Ac"));
        assert_eq!(rank.category(), HandCategory::FullHouse);

        // Flush on board beats the pair in the hole.
        let rank = evaluate_seven(&seven("2h 2d Ks Qs 9s 5s 3s"));
        assert_eq!(rank.category(), HandCategory::Flush);
    }

    #[test]
    fn test_identical_hands_tie() {
        let a = evaluate_seven(&seven("As Kd Qh Jc 9s 3d 2c"));
        let b = evaluate_seven(&seven("Ad Ks Qc Jh 9d 3c 2h"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_win_rate_orders_hands() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let aces = HoleCards::from_str("AsAd").unwrap();
        let trash = HoleCards::from_str("7h2c").unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let aces_rate = estimate_win_rate(2000, 2, &aces, &[], &mut rng);
        let trash_rate = estimate_win_rate(2000, 2, &trash, &[], &mut rng);

        // Heads-up, pocket aces win roughly 85% against a random hand.
        assert!(aces_rate > 0.80, "aces win rate {} too low", aces_rate);
        assert!(trash_rate < 0.45, "72o win rate {} too high", trash_rate);
        assert!(aces_rate > trash_rate);
    }

    #[test]
    fn test_win_rate_deterministic_per_seed() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let hole = HoleCards::from_str("KhQh").unwrap();
        let board = [
            Card::from_str("Jh").unwrap(),
            Card::from_str("Th").unwrap(),
            Card::from_str("2c").unwrap(),
        ];

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let a = estimate_win_rate(500, 4, &hole, &board, &mut rng1);
        let b = estimate_win_rate(500, 4, &hole, &board, &mut rng2);
        assert_eq!(a, b);
    }
}
