//! State-passing game emulator.
//!
//! The emulator drives a table of scripted opponents and yields control to
//! the caller (the trainer) at exactly two kinds of points: when the
//! learning agent must act, and when a round has been resolved. Game state
//! moves through the API by value; the caller owns it between calls.
//!
//! Events produced by a state-changing call are not delivered immediately:
//! the caller threads them into the next [`Emulator::run_until_agent_action`]
//! call, which forwards them to the opponents and re-emits them, along with
//! anything that happened since, in the returned [`EngineStep`].

use super::card::HoleCards;
use super::opponents::OpponentPolicy;
use super::state::{
    GameEvent, GameRule, GameState, PlayerConfig, PokerAction, RoundView, ValidActions,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What the emulator ran into while driving the table.
pub enum EngineStep {
    /// The learning agent must act.
    Decision {
        /// Table state, returned to the caller.
        state: GameState,
        /// Legal actions for the agent.
        valid_actions: ValidActions,
        /// The agent's private cards.
        hole_cards: HoleCards,
        /// Public round snapshot.
        view: RoundView,
        /// Events since the agent last held control, in order.
        events: Vec<GameEvent>,
    },
    /// The round was resolved.
    RoundEnd {
        /// Table state, returned to the caller.
        state: GameState,
        /// The agent's stack change over the round.
        delta: i64,
        /// Public round snapshot.
        view: RoundView,
        /// Events since the agent last held control, in order.
        events: Vec<GameEvent>,
    },
}

/// Drives rounds of poker between one external agent and a set of
/// registered scripted opponents.
pub struct Emulator {
    rule: GameRule,
    opponents: Vec<(String, Box<dyn OpponentPolicy>)>,
    rng: StdRng,
}

impl Emulator {
    /// Create an emulator for the given rules. A seed makes dealing
    /// reproducible.
    pub fn new(rule: GameRule, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rule, opponents: Vec::new(), rng }
    }

    /// The game rules in force.
    pub fn rule(&self) -> &GameRule {
        &self.rule
    }

    /// Register a scripted opponent under a seat identifier.
    pub fn register_opponent(&mut self, uuid: impl Into<String>, policy: Box<dyn OpponentPolicy>) {
        self.opponents.push((uuid.into(), policy));
    }

    /// Build the initial table state and notify opponents the game begins.
    pub fn generate_initial_state(&mut self, configs: &[PlayerConfig]) -> GameState {
        for (_, policy) in &mut self.opponents {
            policy.receive_game_start(&self.rule);
        }
        GameState::new(&self.rule, configs)
    }

    /// Deal the next round. The returned events must be threaded into the
    /// next [`Emulator::run_until_agent_action`] call.
    pub fn start_new_round(&mut self, mut state: GameState) -> (GameState, Vec<GameEvent>) {
        let events = state.begin_round(&self.rule, &mut self.rng);
        (state, events)
    }

    /// Drive scripted opponents until the agent must act or the round is
    /// resolved. `pending` carries undelivered events from the previous
    /// state-changing call.
    pub fn run_until_agent_action(
        &mut self,
        mut state: GameState,
        agent_uuid: &str,
        pending: Vec<GameEvent>,
    ) -> EngineStep {
        let mut events = pending;
        self.dispatch(&events);

        loop {
            if state.round_over {
                let delta = state.round_delta(agent_uuid);
                let view = state.view();
                return EngineStep::RoundEnd { state, delta, view, events };
            }

            let idx = state.to_act.expect("a live round always has an actor");
            let valid_actions = state
                .valid_actions()
                .expect("an actor always has legal actions");

            if state.seats[idx].uuid == agent_uuid {
                let hole_cards = state.seats[idx].hole.expect("actors are dealt in");
                let view = state.view();
                return EngineStep::Decision { state, valid_actions, hole_cards, view, events };
            }

            // A scripted opponent acts.
            let uuid = state.seats[idx].uuid.clone();
            let hole = state.seats[idx].hole.expect("actors are dealt in");
            let view = state.view();
            let action = self
                .policy_mut(&uuid)
                .expect("every non-agent seat has a registered policy")
                .declare_action(&valid_actions, &hole, &view);
            log::trace!("{} plays {:?}", uuid, action);

            let new_events = state.apply_action(action);
            self.dispatch(&new_events);
            events.extend(new_events);
        }
    }

    /// Apply the agent's action. The returned events must be threaded into
    /// the next [`Emulator::run_until_agent_action`] call.
    pub fn apply_agent_action(
        &mut self,
        mut state: GameState,
        action: PokerAction,
    ) -> (GameState, Vec<GameEvent>) {
        let events = state.apply_action(action);
        (state, events)
    }

    /// Whether the game cannot continue past the current round.
    pub fn is_last_round(&self, state: &GameState) -> bool {
        state.is_last_round(&self.rule)
    }

    /// Forward events to every registered opponent.
    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            for (_, policy) in &mut self.opponents {
                match event {
                    GameEvent::RoundStart { round_count } => {
                        policy.receive_round_start(*round_count)
                    }
                    GameEvent::StreetStart { street } => policy.receive_street_start(*street),
                    GameEvent::ActionApplied { record } => policy.receive_game_update(record),
                    GameEvent::RoundResult { winners } => policy.receive_round_result(winners),
                }
            }
        }
    }

    fn policy_mut(&mut self, uuid: &str) -> Option<&mut Box<dyn OpponentPolicy>> {
        self.opponents
            .iter_mut()
            .find(|(id, _)| id == uuid)
            .map(|(_, policy)| policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::opponents::{FishPlayer, FoldPlayer};

    const AGENT: &str = "agent";

    fn emulator_with(
        rule: GameRule,
        opponents: Vec<(&str, Box<dyn OpponentPolicy>)>,
        seed: u64,
    ) -> (Emulator, Vec<PlayerConfig>) {
        let mut configs = vec![PlayerConfig { uuid: AGENT.into(), name: "learner".into() }];
        let mut emulator = Emulator::new(rule, Some(seed));
        for (uuid, policy) in opponents {
            configs.push(PlayerConfig { uuid: uuid.into(), name: uuid.into() });
            emulator.register_opponent(uuid, policy);
        }
        (emulator, configs)
    }

    #[test]
    fn test_round_reaches_agent_decision() {
        let rule = GameRule { num_players: 3, ..GameRule::default() };
        let (mut emulator, configs) = emulator_with(
            rule,
            vec![("fish-1", Box::new(FishPlayer)), ("fish-2", Box::new(FishPlayer))],
            7,
        );

        let state = emulator.generate_initial_state(&configs);
        let (state, events) = emulator.start_new_round(state);

        match emulator.run_until_agent_action(state, AGENT, events) {
            EngineStep::Decision { valid_actions, view, events, .. } => {
                assert!(valid_actions.call_amount >= 0);
                assert_eq!(view.round_count, 1);
                assert!(events
                    .iter()
                    .any(|e| matches!(e, GameEvent::RoundStart { round_count: 1 })));
            }
            EngineStep::RoundEnd { .. } => panic!("agent should act in round 1"),
        }
    }

    #[test]
    fn test_folding_opponents_concede_rounds() {
        let rule = GameRule { num_players: 3, ..GameRule::default() };
        let (mut emulator, configs) = emulator_with(
            rule,
            vec![("fold-1", Box::new(FoldPlayer)), ("fold-2", Box::new(FoldPlayer))],
            7,
        );

        let state = emulator.generate_initial_state(&configs);
        let (state, events) = emulator.start_new_round(state);
        let mut step = emulator.run_until_agent_action(state, AGENT, events);

        // Drive the agent with calls until the round resolves.
        let mut guard = 0;
        loop {
            match step {
                EngineStep::Decision { state, valid_actions, .. } => {
                    let (state, events) = emulator
                        .apply_agent_action(state, PokerAction::Call(valid_actions.call_amount));
                    step = emulator.run_until_agent_action(state, AGENT, events);
                }
                EngineStep::RoundEnd { delta, .. } => {
                    // Two folding opponents leave their blinds at most.
                    assert!(delta >= 0);
                    break;
                }
            }
            guard += 1;
            assert!(guard < 50, "round must terminate");
        }
    }

    #[test]
    fn test_full_game_is_deterministic() {
        let rule = GameRule { num_players: 3, max_round: 3, ..GameRule::default() };

        let mut deltas = Vec::new();
        for _ in 0..2 {
            let (mut emulator, configs) = emulator_with(
                rule.clone(),
                vec![("fish-1", Box::new(FishPlayer)), ("fish-2", Box::new(FishPlayer))],
                99,
            );
            let state = emulator.generate_initial_state(&configs);
            let (mut state, mut events) = emulator.start_new_round(state);
            let mut run = Vec::new();

            loop {
                match emulator.run_until_agent_action(state, AGENT, std::mem::take(&mut events)) {
                    EngineStep::Decision { state: s, valid_actions, .. } => {
                        let (s, evs) = emulator
                            .apply_agent_action(s, PokerAction::Call(valid_actions.call_amount));
                        state = s;
                        events = evs;
                    }
                    EngineStep::RoundEnd { state: s, delta, .. } => {
                        run.push(delta);
                        if emulator.is_last_round(&s) {
                            break;
                        }
                        let (s, evs) = emulator.start_new_round(s);
                        state = s;
                        events = evs;
                    }
                }
            }
            deltas.push(run);
        }

        assert_eq!(deltas[0], deltas[1], "same seed must replay identically");
        assert_eq!(deltas[0].len(), 3, "game runs to the round limit");
    }
}
