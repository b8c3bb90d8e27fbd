//! Discrete action space and its resolution against engine descriptors.
//!
//! The Q-network emits one of seven action indices; this module maps an
//! index onto a concrete legal poker action given the engine's valid-action
//! descriptor. Resolution is a pure function with two edge substitutions
//! that must hold exactly:
//!
//! - a raise that resolves to the illegal-raise sentinel becomes a call;
//! - a fold chosen when the call is free (a check) becomes a call.

use crate::engine::state::{PokerAction, ValidActions, RAISE_ILLEGAL};
use std::fmt;

/// Size of the discrete action space.
pub const NUM_ACTIONS: usize = 7;

/// One of the seven discrete actions the agent can select.
///
/// The three raise steps sit at 1/4, 2/4 and 3/4 of the legal raise window
/// above the minimum, integer-truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionIndex {
    /// Give up the hand.
    Fold,
    /// Match the current bet.
    Call,
    /// Raise the legal minimum.
    RaiseMin,
    /// Raise the legal maximum (all-in).
    RaiseMax,
    /// Raise min + 1/4 of the window.
    RaiseStep1,
    /// Raise min + 2/4 of the window.
    RaiseStep2,
    /// Raise min + 3/4 of the window.
    RaiseStep3,
}

impl ActionIndex {
    /// All actions, positioned at their network output indices.
    pub const ALL: [ActionIndex; NUM_ACTIONS] = [
        ActionIndex::Fold,
        ActionIndex::Call,
        ActionIndex::RaiseMin,
        ActionIndex::RaiseMax,
        ActionIndex::RaiseStep1,
        ActionIndex::RaiseStep2,
        ActionIndex::RaiseStep3,
    ];

    /// The network output index of this action.
    pub fn index(&self) -> usize {
        match self {
            ActionIndex::Fold => 0,
            ActionIndex::Call => 1,
            ActionIndex::RaiseMin => 2,
            ActionIndex::RaiseMax => 3,
            ActionIndex::RaiseStep1 => 4,
            ActionIndex::RaiseStep2 => 5,
            ActionIndex::RaiseStep3 => 6,
        }
    }

    /// Look up an action by network output index.
    pub fn from_index(index: usize) -> Option<ActionIndex> {
        Self::ALL.get(index).copied()
    }
}

/// Contract violation in an engine-supplied action descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The descriptor's bounds are inconsistent with the action schema.
    InconsistentBounds {
        /// Offered call amount.
        call_amount: i64,
        /// Offered raise minimum.
        raise_min: i64,
        /// Offered raise maximum.
        raise_max: i64,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::InconsistentBounds { call_amount, raise_min, raise_max } => write!(
                f,
                "inconsistent action bounds: call {}, raise [{}, {}]",
                call_amount, raise_min, raise_max
            ),
        }
    }
}

impl std::error::Error for ActionError {}

/// Resolve a discrete action index into a concrete poker action.
///
/// # Errors
/// Fails with [`ActionError::InconsistentBounds`] when the descriptor
/// violates the action schema (negative call amount, half-illegal raise
/// window, or inverted raise bounds). This is a fatal engine-contract
/// violation, never retried.
pub fn resolve(valid: &ValidActions, index: ActionIndex) -> Result<PokerAction, ActionError> {
    let raise_illegal = valid.raise_min == RAISE_ILLEGAL && valid.raise_max == RAISE_ILLEGAL;
    let raise_consistent = raise_illegal || (valid.raise_min >= 0 && valid.raise_max >= valid.raise_min);
    if valid.call_amount < 0 || !raise_consistent {
        return Err(ActionError::InconsistentBounds {
            call_amount: valid.call_amount,
            raise_min: valid.raise_min,
            raise_max: valid.raise_max,
        });
    }

    let gap = (valid.raise_max - valid.raise_min) as f64 / 4.0;
    let step = |k: f64| (valid.raise_min as f64 + gap * k) as i64;

    let raise_amount = match index {
        ActionIndex::Fold => {
            // Never fold a free check.
            if valid.call_amount == 0 {
                return Ok(PokerAction::Call(0));
            }
            return Ok(PokerAction::Fold);
        }
        ActionIndex::Call => return Ok(PokerAction::Call(valid.call_amount)),
        ActionIndex::RaiseMin => valid.raise_min,
        ActionIndex::RaiseMax => valid.raise_max,
        ActionIndex::RaiseStep1 => step(1.0),
        ActionIndex::RaiseStep2 => step(2.0),
        ActionIndex::RaiseStep3 => step(3.0),
    };

    // An illegal raise falls back to a call.
    if raise_amount == RAISE_ILLEGAL {
        return Ok(PokerAction::Call(valid.call_amount));
    }

    Ok(PokerAction::Raise(raise_amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_window() -> ValidActions {
        ValidActions { call_amount: 10, raise_min: 20, raise_max: 1500 }
    }

    fn no_raise() -> ValidActions {
        ValidActions { call_amount: 10, raise_min: RAISE_ILLEGAL, raise_max: RAISE_ILLEGAL }
    }

    #[test]
    fn test_index_round_trip() {
        for (i, action) in ActionIndex::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(ActionIndex::from_index(i), Some(*action));
        }
        assert_eq!(ActionIndex::from_index(NUM_ACTIONS), None);
    }

    #[test]
    fn test_basic_mapping() {
        let valid = open_window();
        assert_eq!(resolve(&valid, ActionIndex::Fold).unwrap(), PokerAction::Fold);
        assert_eq!(resolve(&valid, ActionIndex::Call).unwrap(), PokerAction::Call(10));
        assert_eq!(resolve(&valid, ActionIndex::RaiseMin).unwrap(), PokerAction::Raise(20));
        assert_eq!(resolve(&valid, ActionIndex::RaiseMax).unwrap(), PokerAction::Raise(1500));
    }

    #[test]
    fn test_raise_steps_quarter_window() {
        // Window 20..1500: gap = 370.
        let valid = open_window();
        assert_eq!(resolve(&valid, ActionIndex::RaiseStep1).unwrap(), PokerAction::Raise(390));
        assert_eq!(resolve(&valid, ActionIndex::RaiseStep2).unwrap(), PokerAction::Raise(760));
        assert_eq!(resolve(&valid, ActionIndex::RaiseStep3).unwrap(), PokerAction::Raise(1130));
    }

    #[test]
    fn test_raise_steps_truncate() {
        // Window 20..25: gap = 1.25; steps truncate to whole chips.
        let valid = ValidActions { call_amount: 10, raise_min: 20, raise_max: 25 };
        assert_eq!(resolve(&valid, ActionIndex::RaiseStep1).unwrap(), PokerAction::Raise(21));
        assert_eq!(resolve(&valid, ActionIndex::RaiseStep2).unwrap(), PokerAction::Raise(22));
        assert_eq!(resolve(&valid, ActionIndex::RaiseStep3).unwrap(), PokerAction::Raise(23));
    }

    #[test]
    fn test_raise_amounts_stay_in_window() {
        let valid = ValidActions { call_amount: 35, raise_min: 70, raise_max: 813 };
        for action in ActionIndex::ALL {
            if let PokerAction::Raise(to) = resolve(&valid, action).unwrap() {
                assert!(
                    (valid.raise_min..=valid.raise_max).contains(&to),
                    "{:?} resolved outside the window: {}",
                    action,
                    to
                );
            }
        }
    }

    #[test]
    fn test_illegal_raise_substitutes_call() {
        let valid = no_raise();
        for action in [
            ActionIndex::RaiseMin,
            ActionIndex::RaiseMax,
            ActionIndex::RaiseStep1,
            ActionIndex::RaiseStep2,
            ActionIndex::RaiseStep3,
        ] {
            assert_eq!(resolve(&valid, action).unwrap(), PokerAction::Call(10));
        }
    }

    #[test]
    fn test_never_fold_a_free_check() {
        let valid = ValidActions { call_amount: 0, raise_min: 20, raise_max: 1500 };
        assert_eq!(resolve(&valid, ActionIndex::Fold).unwrap(), PokerAction::Call(0));

        // With a real bet to call, folding stays a fold.
        assert_eq!(resolve(&open_window(), ActionIndex::Fold).unwrap(), PokerAction::Fold);
    }

    #[test]
    fn test_inconsistent_bounds_rejected() {
        let inverted = ValidActions { call_amount: 10, raise_min: 100, raise_max: 50 };
        assert!(resolve(&inverted, ActionIndex::Call).is_err());

        let half_illegal = ValidActions { call_amount: 10, raise_min: RAISE_ILLEGAL, raise_max: 50 };
        assert!(resolve(&half_illegal, ActionIndex::Call).is_err());

        let negative_call = ValidActions { call_amount: -5, raise_min: 20, raise_max: 50 };
        assert!(resolve(&negative_call, ActionIndex::Call).is_err());
    }
}
