//! Action modifiers attached to block updates.
//!
//! A [`PhysicsParams`] is a small fixed list of actions (dissipate, drop,
//! finite spread) evaluated in order before an update's primary handler.
//! Params are usually built from a short text form such as
//! `"dissipate 10 drop 50"`.

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// Maximum number of actions a single update can carry.
pub const MAX_ACTIONS: usize = 8;

/// What an action does when its update comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionKind {
    /// Unused slot. Also terminates the action list.
    #[default]
    None,
    /// Randomly turns the block into air.
    Dissipate,
    /// Moves the block down while there is air below it.
    Drop,
    /// Spreads the block sideways towards nearby holes, finite-fluid style.
    Finite,
}

impl ActionKind {
    /// The name used in the text form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Dissipate => "dissipate",
            Self::Drop => "drop",
            Self::Finite => "finite",
        }
    }
}

impl FromStr for ActionKind {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("dissipate") {
            Ok(Self::Dissipate)
        } else if s.eq_ignore_ascii_case("drop") {
            Ok(Self::Drop)
        } else if s.eq_ignore_ascii_case("finite") {
            Ok(Self::Finite)
        } else {
            Err(ParamsError::UnknownAction(s.to_string()))
        }
    }
}

/// A single action slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicsAction {
    /// The action, or [`ActionKind::None`] once deactivated.
    pub kind: ActionKind,
    /// Evaluations left before the action expires. `-1` never expires.
    pub expire: i32,
    /// Action argument: dissipate chance in percent, drop delay, ...
    pub val: i16,
}

impl PhysicsAction {
    /// An empty slot.
    pub const NONE: Self = Self {
        kind: ActionKind::None,
        expire: -1,
        val: 0,
    };

    /// Creates an action.
    #[must_use]
    pub const fn new(kind: ActionKind, val: i16, expire: i32) -> Self {
        Self { kind, expire, val }
    }

    /// Returns true if the slot holds a live action.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.kind, ActionKind::None)
    }

    /// Turns the slot off.
    pub fn deactivate(&mut self) {
        self.kind = ActionKind::None;
    }
}

impl Default for PhysicsAction {
    fn default() -> Self {
        Self::NONE
    }
}

/// Errors produced while parsing the action text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// The action name is not one of `dissipate`, `drop`, `finite`.
    #[error("unknown physics action `{0}`")]
    UnknownAction(String),
    /// The argument after an action is missing.
    #[error("physics action `{0}` is missing its argument")]
    MissingArgument(String),
    /// The argument is not an integer in the `i16` range.
    #[error("invalid argument `{value}` for physics action `{action}`")]
    InvalidArgument {
        /// The action being parsed.
        action: String,
        /// The offending argument.
        value: String,
    },
    /// More than [`MAX_ACTIONS`] actions.
    #[error("too many physics actions (max {MAX_ACTIONS})")]
    TooManyActions,
}

/// An ordered list of up to [`MAX_ACTIONS`] actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysicsParams {
    actions: [PhysicsAction; MAX_ACTIONS],
}

impl PhysicsParams {
    /// Params with no actions.
    pub const EMPTY: Self = Self {
        actions: [PhysicsAction::NONE; MAX_ACTIONS],
    };

    /// Parses whitespace separated `<action> <integer>` pairs.
    ///
    /// Every parsed action gets `default_expire` as its expiry. Nothing is
    /// returned unless the whole string parses.
    pub fn build(text: &str, default_expire: i32) -> Result<Self, ParamsError> {
        let mut params = Self::EMPTY;
        let mut len = 0;
        let mut tokens = text.split_whitespace();

        while let Some(name) = tokens.next() {
            let kind = name.parse::<ActionKind>()?;
            let value = tokens
                .next()
                .ok_or_else(|| ParamsError::MissingArgument(name.to_string()))?;
            let val = value
                .parse::<i16>()
                .map_err(|_| ParamsError::InvalidArgument {
                    action: name.to_string(),
                    value: value.to_string(),
                })?;

            if len == MAX_ACTIONS {
                return Err(ParamsError::TooManyActions);
            }
            params.actions[len] = PhysicsAction::new(kind, val, default_expire);
            len += 1;
        }

        Ok(params)
    }

    /// Appends an action. Returns `false` if all slots are taken.
    pub fn push(&mut self, action: PhysicsAction) -> bool {
        match self.actions.iter_mut().find(|slot| !slot.is_active()) {
            Some(slot) => {
                *slot = action;
                true
            }
            None => false,
        }
    }

    /// All slots, including inactive ones, in evaluation order.
    #[must_use]
    pub fn slots(&self) -> &[PhysicsAction; MAX_ACTIONS] {
        &self.actions
    }

    /// Mutable access to all slots.
    pub fn slots_mut(&mut self) -> &mut [PhysicsAction; MAX_ACTIONS] {
        &mut self.actions
    }

    /// Iterates over live actions in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &PhysicsAction> {
        self.actions.iter().filter(|a| a.is_active())
    }

    /// Number of live actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no action is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.actions.iter().any(PhysicsAction::is_active)
    }
}

impl Display for PhysicsParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for action in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{} {}", action.kind.name(), action.val)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keeps_order_and_expiry() {
        let params = PhysicsParams::build("dissipate 10 drop 50", 32).expect("should parse");
        let actions: Vec<_> = params.iter().copied().collect();
        assert_eq!(
            actions,
            vec![
                PhysicsAction::new(ActionKind::Dissipate, 10, 32),
                PhysicsAction::new(ActionKind::Drop, 50, 32),
            ]
        );
        // Remaining slots are sentinels
        assert!(params.slots()[2..].iter().all(|a| !a.is_active()));
    }

    #[test]
    fn test_build_rejects_unknown_action() {
        assert_eq!(
            PhysicsParams::build("bogus 5", 32),
            Err(ParamsError::UnknownAction("bogus".to_string()))
        );
    }

    #[test]
    fn test_build_rejects_bad_arguments() {
        assert!(matches!(
            PhysicsParams::build("drop fast", -1),
            Err(ParamsError::InvalidArgument { .. })
        ));
        assert!(matches!(
            PhysicsParams::build("drop 40000", -1),
            Err(ParamsError::InvalidArgument { .. })
        ));
        assert_eq!(
            PhysicsParams::build("dissipate 10 drop", -1),
            Err(ParamsError::MissingArgument("drop".to_string()))
        );
    }

    #[test]
    fn test_build_limits_action_count() {
        let eight = "drop 1 ".repeat(MAX_ACTIONS);
        assert_eq!(
            PhysicsParams::build(&eight, -1).expect("eight fit").len(),
            MAX_ACTIONS
        );
        let nine = "drop 1 ".repeat(MAX_ACTIONS + 1);
        assert_eq!(
            PhysicsParams::build(&nine, -1),
            Err(ParamsError::TooManyActions)
        );
    }

    #[test]
    fn test_build_is_case_insensitive_and_accepts_empty() {
        let params = PhysicsParams::build("  FINITE 3\tDissipate -2 ", 5).expect("should parse");
        assert_eq!(params.to_string(), "finite 3 dissipate -2");
        assert!(PhysicsParams::build("", 5).expect("empty is fine").is_empty());
    }

    #[test]
    fn test_push_fills_first_free_slot() {
        let mut params = PhysicsParams::EMPTY;
        assert!(params.push(PhysicsAction::new(ActionKind::Drop, 50, -1)));
        params.slots_mut()[0].deactivate();
        assert!(params.is_empty());
        assert!(params.push(PhysicsAction::new(ActionKind::Finite, 1, -1)));
        assert_eq!(params.slots()[0].kind, ActionKind::Finite);
    }
}
