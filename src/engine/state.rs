//! Multi-player no-limit hold'em round state.
//!
//! This module implements the betting state machine the emulator drives:
//! seats, blinds and antes, street progression, per-street action histories,
//! and showdown resolution. Amounts are integer chips. The engine keeps a
//! single collective pot; side pots are not tracked.

use super::card::{Card, Deck, HoleCards, Street};
use super::hand_eval;
use rand::Rng;
use rustc_hash::FxHashMap;

/// Fixed rules for a training game.
#[derive(Debug, Clone)]
pub struct GameRule {
    /// Number of seats, learning agent included.
    pub num_players: usize,
    /// Rounds per game before the episode ends.
    pub max_round: u32,
    /// Small blind amount; the big blind is twice this.
    pub small_blind: i64,
    /// Ante posted by every seated player, 0 to disable.
    pub ante: i64,
    /// Starting stack for every seat.
    pub start_stack: i64,
}

impl GameRule {
    /// The big blind amount.
    pub fn big_blind(&self) -> i64 {
        self.small_blind * 2
    }
}

impl Default for GameRule {
    fn default() -> Self {
        Self {
            num_players: 5,
            max_round: 10,
            small_blind: 5,
            ante: 0,
            start_stack: 1500,
        }
    }
}

/// Identity and starting name for one seat.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Stable identifier used in histories and seat lookups.
    pub uuid: String,
    /// Display name.
    pub name: String,
}

/// Seat participation status within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatStatus {
    /// Dealt in and still able to act.
    Active,
    /// Folded this round.
    Folded,
    /// Committed the whole stack; in the hand but cannot act.
    AllIn,
    /// No chips; not dealt in.
    Out,
}

/// One seat at the table.
#[derive(Debug, Clone)]
pub struct Seat {
    /// Stable identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Remaining chips.
    pub stack: i64,
    /// Chips committed on the current street.
    pub street_bet: i64,
    /// Private cards, if dealt in.
    pub hole: Option<HoleCards>,
    /// Participation status.
    pub status: SeatStatus,
    /// Whether the seat has acted since the last raise this street.
    acted: bool,
}

/// Kind of a recorded table action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Fold,
    Call,
    Raise,
    SmallBlind,
    BigBlind,
    Ante,
}

/// One entry in a street's action history.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    /// Acting seat's identifier.
    pub uuid: String,
    /// What was done.
    pub kind: ActionKind,
    /// Call: total matched on the street. Raise: total raised to.
    /// Blinds and antes: the posted amount. Fold: 0.
    pub amount: i64,
}

/// Amount marker for an illegal raise in a [`ValidActions`] descriptor.
pub const RAISE_ILLEGAL: i64 = -1;

/// Legal-action descriptor for the seat to act.
///
/// Fold is always available. `call_amount` of 0 is a free check. When
/// raising is illegal, both raise bounds carry the [`RAISE_ILLEGAL`]
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidActions {
    /// Chips needed to call, capped by the acting seat's stack.
    pub call_amount: i64,
    /// Minimum legal raise-to amount, or [`RAISE_ILLEGAL`].
    pub raise_min: i64,
    /// Maximum legal raise-to amount (all-in), or [`RAISE_ILLEGAL`].
    pub raise_max: i64,
}

impl ValidActions {
    /// Whether a raise is legal at this decision point.
    pub fn raise_legal(&self) -> bool {
        self.raise_min >= 0
    }
}

/// A concrete action a player submits to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PokerAction {
    /// Give up the hand.
    Fold,
    /// Match the current bet (0 = check). The amount is advisory; the
    /// engine pays exactly what the call requires.
    Call(i64),
    /// Raise to the given street total, clamped to the legal window.
    Raise(i64),
}

/// Event emitted by state transitions, delivered to every player.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A new round was dealt.
    RoundStart {
        /// 1-based round counter.
        round_count: u32,
    },
    /// A betting street began.
    StreetStart {
        /// The street that just began.
        street: Street,
    },
    /// A seat acted.
    ActionApplied {
        /// History entry for the action.
        record: ActionRecord,
    },
    /// The round finished and the pot was awarded.
    RoundResult {
        /// Identifiers of the winning seats.
        winners: Vec<String>,
    },
}

/// Public snapshot of the round handed to players at decision points.
#[derive(Debug, Clone)]
pub struct RoundView {
    /// 1-based round counter.
    pub round_count: u32,
    /// Current street.
    pub street: Street,
    /// Community cards dealt so far.
    pub community: Vec<Card>,
    /// Total pot, blinds and antes included.
    pub pot: i64,
    /// Public per-seat information, in table order.
    pub seats: Vec<SeatView>,
    /// Completed and in-progress street histories for this round.
    pub histories: FxHashMap<Street, Vec<ActionRecord>>,
}

/// Public per-seat information.
#[derive(Debug, Clone)]
pub struct SeatView {
    /// Stable identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Remaining chips.
    pub stack: i64,
    /// Whether the seat has folded this round.
    pub folded: bool,
}

/// Complete table state, threaded through the emulator by value.
#[derive(Debug, Clone)]
pub struct GameState {
    /// 1-based round counter; 0 before the first round.
    pub round_count: u32,
    /// Current street.
    pub street: Street,
    /// Community cards dealt so far.
    pub community: Vec<Card>,
    /// Total pot.
    pub pot: i64,
    /// Seats in table order.
    pub seats: Vec<Seat>,
    /// Dealer button seat index.
    pub button: usize,
    /// Highest street total any seat has committed this street.
    pub current_bet: i64,
    /// Size of the last bet or raise, for minimum-raise sizing.
    pub min_raise_delta: i64,
    /// Seat index to act, if the round is live.
    pub to_act: Option<usize>,
    /// Per-street action histories for the current round.
    pub histories: FxHashMap<Street, Vec<ActionRecord>>,
    /// Whether the current round has been resolved.
    pub round_over: bool,
    big_blind: i64,
    deck: Deck,
    round_start_stacks: Vec<i64>,
}

impl GameState {
    /// Create the initial table state, before any round is dealt.
    pub fn new(rule: &GameRule, configs: &[PlayerConfig]) -> Self {
        let seats = configs
            .iter()
            .map(|c| Seat {
                uuid: c.uuid.clone(),
                name: c.name.clone(),
                stack: rule.start_stack,
                street_bet: 0,
                hole: None,
                status: SeatStatus::Out,
                acted: false,
            })
            .collect::<Vec<_>>();
        let round_start_stacks = seats.iter().map(|s| s.stack).collect();

        Self {
            round_count: 0,
            street: Street::Preflop,
            community: Vec::new(),
            pot: 0,
            seats,
            // First rotation puts the button on seat 0.
            button: configs.len().saturating_sub(1),
            current_bet: 0,
            min_raise_delta: 0,
            to_act: None,
            histories: FxHashMap::default(),
            round_over: true,
            big_blind: rule.big_blind(),
            deck: Deck::new(),
            round_start_stacks,
        }
    }

    /// Deal a fresh round: rotate the button, deal hole cards, post antes
    /// and blinds, and open preflop betting.
    pub fn begin_round<R: Rng>(&mut self, rule: &GameRule, rng: &mut R) -> Vec<GameEvent> {
        self.round_count += 1;
        self.community.clear();
        self.histories.clear();
        self.pot = 0;
        self.street = Street::Preflop;
        self.current_bet = 0;
        self.min_raise_delta = self.big_blind;
        self.round_over = false;

        for seat in &mut self.seats {
            seat.street_bet = 0;
            seat.hole = None;
            seat.acted = false;
            seat.status = if seat.stack > 0 {
                SeatStatus::Active
            } else {
                SeatStatus::Out
            };
        }
        self.round_start_stacks = self.seats.iter().map(|s| s.stack).collect();

        self.deck = Deck::new();
        self.deck.shuffle(rng);
        for i in 0..self.seats.len() {
            if self.seats[i].status != SeatStatus::Out {
                let c1 = self.deck.deal().expect("52 cards cover every table");
                let c2 = self.deck.deal().expect("52 cards cover every table");
                self.seats[i].hole = Some(HoleCards::new(c1, c2));
            }
        }

        self.button = self
            .next_seated(self.button)
            .expect("a round needs at least one funded seat");

        if rule.ante > 0 {
            for i in 0..self.seats.len() {
                if self.seats[i].status != SeatStatus::Out {
                    self.post(i, rule.ante, ActionKind::Ante);
                }
            }
        }

        // Heads-up: the button posts the small blind.
        let seated = self.seats.iter().filter(|s| s.status != SeatStatus::Out).count();
        let sb_seat = if seated == 2 {
            self.button
        } else {
            self.next_seated(self.button).expect("seated players exist")
        };
        let bb_seat = self.next_seated(sb_seat).expect("seated players exist");

        self.post(sb_seat, rule.small_blind, ActionKind::SmallBlind);
        self.post(bb_seat, rule.big_blind(), ActionKind::BigBlind);
        self.current_bet = rule.big_blind();

        self.to_act = self.next_actor(bb_seat);
        if self.to_act.is_none() {
            // Everyone is already all-in from the blinds; run the board out.
            let mut events = vec![
                GameEvent::RoundStart { round_count: self.round_count },
                GameEvent::StreetStart { street: Street::Preflop },
            ];
            self.finish_by_showdown(&mut events);
            return events;
        }

        vec![
            GameEvent::RoundStart { round_count: self.round_count },
            GameEvent::StreetStart { street: Street::Preflop },
        ]
    }

    /// Legal actions for the seat to act, if the round is live.
    pub fn valid_actions(&self) -> Option<ValidActions> {
        let idx = self.to_act?;
        let seat = &self.seats[idx];
        let need = self.current_bet - seat.street_bet;
        let call_amount = need.min(seat.stack);

        let raise_to_min = self.current_bet + self.min_raise_delta;
        let raise_to_max = seat.street_bet + seat.stack;
        let (raise_min, raise_max) = if raise_to_max >= raise_to_min {
            (raise_to_min, raise_to_max)
        } else {
            (RAISE_ILLEGAL, RAISE_ILLEGAL)
        };

        Some(ValidActions { call_amount, raise_min, raise_max })
    }

    /// Apply an action for the seat to act and advance the round.
    pub fn apply_action(&mut self, action: PokerAction) -> Vec<GameEvent> {
        let idx = self.to_act.expect("apply_action requires a live actor");
        let mut events = Vec::new();

        let record = match action {
            PokerAction::Fold => {
                self.seats[idx].status = SeatStatus::Folded;
                ActionRecord { uuid: self.seats[idx].uuid.clone(), kind: ActionKind::Fold, amount: 0 }
            }
            PokerAction::Call(_) => {
                let need = self.current_bet - self.seats[idx].street_bet;
                self.pay(idx, need);
                ActionRecord {
                    uuid: self.seats[idx].uuid.clone(),
                    kind: ActionKind::Call,
                    amount: self.seats[idx].street_bet,
                }
            }
            PokerAction::Raise(to) => {
                let valid = self.valid_actions().expect("actor implies valid actions");
                debug_assert!(valid.raise_legal(), "raise submitted where raising is illegal");
                if !valid.raise_legal() {
                    // Never honor an illegal raise; degrade to a call.
                    let need = self.current_bet - self.seats[idx].street_bet;
                    self.pay(idx, need);
                    ActionRecord {
                        uuid: self.seats[idx].uuid.clone(),
                        kind: ActionKind::Call,
                        amount: self.seats[idx].street_bet,
                    }
                } else {
                    let to = to.clamp(valid.raise_min, valid.raise_max);
                    let need = to - self.seats[idx].street_bet;
                    self.pay(idx, need);
                    self.min_raise_delta = to - self.current_bet;
                    self.current_bet = to;
                    // A raise reopens the action for everyone else.
                    for (i, seat) in self.seats.iter_mut().enumerate() {
                        if i != idx {
                            seat.acted = false;
                        }
                    }
                    ActionRecord {
                        uuid: self.seats[idx].uuid.clone(),
                        kind: ActionKind::Raise,
                        amount: to,
                    }
                }
            }
        };

        self.seats[idx].acted = true;
        self.histories.entry(self.street).or_default().push(record.clone());
        events.push(GameEvent::ActionApplied { record });

        self.advance(idx, &mut events);
        events
    }

    /// Public snapshot of the current round.
    pub fn view(&self) -> RoundView {
        RoundView {
            round_count: self.round_count,
            street: self.street,
            community: self.community.clone(),
            pot: self.pot,
            seats: self
                .seats
                .iter()
                .map(|s| SeatView {
                    uuid: s.uuid.clone(),
                    name: s.name.clone(),
                    stack: s.stack,
                    folded: s.status == SeatStatus::Folded,
                })
                .collect(),
            histories: self.histories.clone(),
        }
    }

    /// Stack change of a seat since the round was dealt.
    pub fn round_delta(&self, uuid: &str) -> i64 {
        match self.seat_index(uuid) {
            Some(i) => self.seats[i].stack - self.round_start_stacks[i],
            None => 0,
        }
    }

    /// Stack currently held by a seat, 0 if unknown.
    pub fn stack_of(&self, uuid: &str) -> i64 {
        self.seat_index(uuid).map_or(0, |i| self.seats[i].stack)
    }

    /// Seat index for an identifier.
    pub fn seat_index(&self, uuid: &str) -> Option<usize> {
        self.seats.iter().position(|s| s.uuid == uuid)
    }

    /// Whether the game cannot continue past the current round.
    pub fn is_last_round(&self, rule: &GameRule) -> bool {
        let funded = self.seats.iter().filter(|s| s.stack > 0).count();
        self.round_count >= rule.max_round || funded <= 1
    }

    /// Move chips from a seat into the pot, marking all-in when drained.
    fn pay(&mut self, idx: usize, amount: i64) {
        let seat = &mut self.seats[idx];
        let paid = amount.min(seat.stack).max(0);
        seat.stack -= paid;
        seat.street_bet += paid;
        self.pot += paid;
        if seat.stack == 0 && seat.status == SeatStatus::Active {
            seat.status = SeatStatus::AllIn;
        }
    }

    /// Post a forced bet (blind or ante) with its history entry.
    fn post(&mut self, idx: usize, amount: i64, kind: ActionKind) {
        let before = self.seats[idx].stack;
        let paid = amount.min(before);
        if kind == ActionKind::Ante {
            // Antes go straight to the pot without counting toward the bet.
            self.seats[idx].stack -= paid;
            self.pot += paid;
            if self.seats[idx].stack == 0 {
                self.seats[idx].status = SeatStatus::AllIn;
            }
        } else {
            self.pay(idx, paid);
        }
        let record = ActionRecord { uuid: self.seats[idx].uuid.clone(), kind, amount: paid };
        self.histories.entry(self.street).or_default().push(record);
    }

    /// Next seat after `idx` that is dealt into the round.
    fn next_seated(&self, idx: usize) -> Option<usize> {
        let n = self.seats.len();
        (1..=n)
            .map(|step| (idx + step) % n)
            .find(|&i| self.seats[i].status != SeatStatus::Out)
    }

    /// Next seat after `idx` that still owes a decision this street.
    fn next_actor(&self, idx: usize) -> Option<usize> {
        let n = self.seats.len();
        (1..=n).map(|step| (idx + step) % n).find(|&i| {
            let seat = &self.seats[i];
            seat.status == SeatStatus::Active
                && (!seat.acted || seat.street_bet < self.current_bet)
        })
    }

    /// Decide what happens after an action: next actor, next street, or
    /// round resolution.
    fn advance(&mut self, last_actor: usize, events: &mut Vec<GameEvent>) {
        let in_hand = self
            .seats
            .iter()
            .filter(|s| matches!(s.status, SeatStatus::Active | SeatStatus::AllIn))
            .count();
        if in_hand <= 1 {
            self.award_to_last(events);
            return;
        }

        if let Some(next) = self.next_actor(last_actor) {
            self.to_act = Some(next);
            return;
        }

        // Street betting is complete.
        let can_still_bet = self
            .seats
            .iter()
            .filter(|s| s.status == SeatStatus::Active)
            .count();
        if self.street == Street::River || can_still_bet < 2 {
            self.finish_by_showdown(events);
            return;
        }

        let next_street = self.street.next().expect("river handled above");
        self.enter_street(next_street, events);
        self.to_act = self.next_actor(self.button);
        debug_assert!(self.to_act.is_some(), "two active seats imply an actor");
    }

    /// Open a new betting street, dealing its community cards.
    fn enter_street(&mut self, street: Street, events: &mut Vec<GameEvent>) {
        self.street = street;
        self.current_bet = 0;
        self.min_raise_delta = self.big_blind;
        for seat in &mut self.seats {
            seat.street_bet = 0;
            seat.acted = false;
        }
        while self.community.len() < street.community_cards() {
            let card = self.deck.deal().expect("deck covers a full board");
            self.community.push(card);
        }
        events.push(GameEvent::StreetStart { street });
    }

    /// Award the pot to the only seat left in the hand.
    fn award_to_last(&mut self, events: &mut Vec<GameEvent>) {
        let winner = self
            .seats
            .iter()
            .position(|s| matches!(s.status, SeatStatus::Active | SeatStatus::AllIn))
            .expect("a round always has a survivor");
        self.seats[winner].stack += self.pot;
        self.pot = 0;
        self.to_act = None;
        self.round_over = true;
        events.push(GameEvent::RoundResult { winners: vec![self.seats[winner].uuid.clone()] });
    }

    /// Run the board out if needed and resolve the round at showdown.
    fn finish_by_showdown(&mut self, events: &mut Vec<GameEvent>) {
        let mut street = self.street;
        while self.community.len() < 5 {
            street = street.next().expect("board below five cards has a next street");
            self.enter_street(street, events);
        }

        let contenders: Vec<usize> = self
            .seats
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.status, SeatStatus::Active | SeatStatus::AllIn))
            .map(|(i, _)| i)
            .collect();

        let mut best: Option<hand_eval::HandRank> = None;
        let mut winners: Vec<usize> = Vec::new();
        for &i in &contenders {
            let hole = self.seats[i].hole.expect("contenders were dealt in");
            let cards = [
                hole.card1,
                hole.card2,
                self.community[0],
                self.community[1],
                self.community[2],
                self.community[3],
                self.community[4],
            ];
            let rank = hand_eval::evaluate_seven(&cards);
            match best {
                Some(b) if rank < b => {}
                Some(b) if rank == b => winners.push(i),
                _ => {
                    best = Some(rank);
                    winners = vec![i];
                }
            }
        }

        let share = self.pot / winners.len() as i64;
        let mut remainder = self.pot - share * winners.len() as i64;
        for &i in &winners {
            self.seats[i].stack += share;
            if remainder > 0 {
                self.seats[i].stack += 1;
                remainder -= 1;
            }
        }
        self.pot = 0;
        self.to_act = None;
        self.round_over = true;
        events.push(GameEvent::RoundResult {
            winners: winners.iter().map(|&i| self.seats[i].uuid.clone()).collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn configs(n: usize) -> Vec<PlayerConfig> {
        (0..n)
            .map(|i| PlayerConfig { uuid: format!("p{}", i), name: format!("player-{}", i) })
            .collect()
    }

    fn fresh_round(rule: &GameRule, n: usize, seed: u64) -> GameState {
        let mut state = GameState::new(rule, &configs(n));
        let mut rng = StdRng::seed_from_u64(seed);
        state.begin_round(rule, &mut rng);
        state
    }

    #[test]
    fn test_blinds_posted() {
        let rule = GameRule::default();
        let state = fresh_round(&rule, 5, 3);

        assert_eq!(state.pot, rule.small_blind + rule.big_blind());
        assert_eq!(state.current_bet, rule.big_blind());
        // Button rotated onto seat 0; blinds sit left of it.
        assert_eq!(state.button, 0);
        assert_eq!(state.seats[1].street_bet, rule.small_blind);
        assert_eq!(state.seats[2].street_bet, rule.big_blind());
        // First to act is left of the big blind.
        assert_eq!(state.to_act, Some(3));
    }

    #[test]
    fn test_heads_up_button_posts_small_blind() {
        let rule = GameRule { num_players: 2, ..GameRule::default() };
        let state = fresh_round(&rule, 2, 3);

        assert_eq!(state.seats[state.button].street_bet, rule.small_blind);
        // Button acts first preflop in heads-up play.
        assert_eq!(state.to_act, Some(state.button));
    }

    #[test]
    fn test_everyone_folds_awards_pot() {
        let rule = GameRule::default();
        let mut state = fresh_round(&rule, 5, 3);
        let total_before: i64 = state.seats.iter().map(|s| s.stack).sum::<i64>() + state.pot;

        // Fold around to the big blind.
        while !state.round_over {
            state.apply_action(PokerAction::Fold);
        }

        let total_after: i64 = state.seats.iter().map(|s| s.stack).sum();
        assert_eq!(total_before, total_after, "chips must be conserved");
        // Big blind wins the blinds without acting.
        assert_eq!(state.round_delta("p2"), rule.small_blind);
    }

    #[test]
    fn test_valid_actions_bounds() {
        let rule = GameRule::default();
        let state = fresh_round(&rule, 5, 3);
        let valid = state.valid_actions().unwrap();

        assert_eq!(valid.call_amount, rule.big_blind());
        assert_eq!(valid.raise_min, rule.big_blind() * 2);
        assert_eq!(valid.raise_max, rule.start_stack);
        assert!(valid.raise_legal());
    }

    #[test]
    fn test_raise_reopens_action() {
        let rule = GameRule::default();
        let mut state = fresh_round(&rule, 3, 3);

        // First actor raises; the blinds must get another turn.
        state.apply_action(PokerAction::Raise(40));
        assert_eq!(state.current_bet, 40);
        assert_eq!(state.min_raise_delta, 30);
        assert!(!state.round_over);
        assert!(state.to_act.is_some());

        let valid = state.valid_actions().unwrap();
        assert_eq!(valid.raise_min, 70);
    }

    #[test]
    fn test_calls_to_showdown_conserve_chips() {
        let rule = GameRule { num_players: 3, ..GameRule::default() };
        let mut state = fresh_round(&rule, 3, 9);
        let total_before: i64 = state.seats.iter().map(|s| s.stack).sum::<i64>() + state.pot;

        let mut guard = 0;
        while !state.round_over {
            let valid = state.valid_actions().unwrap();
            state.apply_action(PokerAction::Call(valid.call_amount));
            guard += 1;
            assert!(guard < 100, "round must terminate");
        }

        assert_eq!(state.community.len(), 5, "showdown needs a full board");
        let total_after: i64 = state.seats.iter().map(|s| s.stack).sum();
        assert_eq!(total_before, total_after);
        let deltas: i64 = state.seats.iter().map(|s| state.round_delta(&s.uuid)).sum();
        assert_eq!(deltas, 0, "round is zero-sum");
    }

    #[test]
    fn test_short_stack_raise_illegal() {
        let rule = GameRule { num_players: 3, start_stack: 15, ..GameRule::default() };
        let state = fresh_round(&rule, 3, 3);

        // 15 chips cannot cover a min-raise to 20.
        let valid = state.valid_actions().unwrap();
        assert!(!valid.raise_legal());
        assert_eq!(valid.raise_min, RAISE_ILLEGAL);
        assert_eq!(valid.raise_max, RAISE_ILLEGAL);
    }

    #[test]
    fn test_busted_seat_sits_out() {
        let rule = GameRule { num_players: 3, ..GameRule::default() };
        let mut state = GameState::new(&rule, &configs(3));
        state.seats[1].stack = 0;

        let mut rng = StdRng::seed_from_u64(5);
        state.begin_round(&rule, &mut rng);

        assert_eq!(state.seats[1].status, SeatStatus::Out);
        assert!(state.seats[1].hole.is_none());
        assert!(state.seats[0].hole.is_some());
    }

    #[test]
    fn test_last_round_detection() {
        let rule = GameRule { max_round: 2, ..GameRule::default() };
        let mut state = GameState::new(&rule, &configs(3));
        assert!(!state.is_last_round(&rule));

        state.round_count = 2;
        assert!(state.is_last_round(&rule));

        // One funded player left ends the game early.
        state.round_count = 1;
        state.seats[0].stack = 0;
        state.seats[1].stack = 0;
        assert!(state.is_last_round(&rule));
    }

    #[test]
    fn test_histories_record_streets() {
        let rule = GameRule { num_players: 3, ..GameRule::default() };
        let mut state = fresh_round(&rule, 3, 9);

        while !state.round_over && state.street == Street::Preflop {
            let valid = state.valid_actions().unwrap();
            state.apply_action(PokerAction::Call(valid.call_amount));
        }

        let preflop = &state.histories[&Street::Preflop];
        assert!(preflop.iter().any(|r| r.kind == ActionKind::SmallBlind));
        assert!(preflop.iter().any(|r| r.kind == ActionKind::BigBlind));
        assert!(preflop.iter().any(|r| r.kind == ActionKind::Call));
    }
}
