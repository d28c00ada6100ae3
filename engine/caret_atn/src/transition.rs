//! Typed transitions between network states.

use crate::ids::{RuleId, StateId, TokenType};
use crate::set::TokenSet;

/// A directed, typed edge of the network.
///
/// A tagged variant rather than a trait object: the closure walker
/// dispatches on the tag in its innermost loop, and a `match` keeps
/// that loop branch-predictable with no virtual dispatch.
///
/// Epsilon-like variants (`Epsilon`, `Precedence`) are consumable
/// without reading a token. `Rule` is the call edge: `follow` is the
/// state the caller resumes at once the callee's stop state is
/// reached; the callee's entry point is its rule start state, looked
/// up through the owning network.
#[derive(Clone, Debug)]
pub enum Transition {
    /// Consume nothing, move to `target`.
    Epsilon { target: StateId },
    /// Consume exactly `token`.
    Atom { target: StateId, token: TokenType },
    /// Consume any member of `set`.
    Set { target: StateId, set: TokenSet },
    /// Consume any user token NOT in `set`.
    NotSet { target: StateId, set: TokenSet },
    /// Consume any user token.
    Wildcard { target: StateId },
    /// Invoke `rule`, resuming at `follow` when it completes.
    Rule { rule: RuleId, follow: StateId },
    /// Precedence predicate. Completion never evaluates predicates;
    /// this edge is taken optimistically, like epsilon.
    Precedence { target: StateId, precedence: u32 },
}

impl Transition {
    /// Whether this edge can be taken without consuming a token.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self,
            Transition::Epsilon { .. } | Transition::Precedence { .. }
        )
    }

    /// The token types this edge consumes, if it is a consuming edge
    /// with an explicit (non-complement, non-wildcard) label.
    pub fn label(&self) -> Option<TokenSet> {
        match self {
            Transition::Atom { token, .. } => Some(TokenSet::of(*token)),
            Transition::Set { set, .. } => Some(set.clone()),
            _ => None,
        }
    }

    /// Whether this edge consumes `token`, with complement and
    /// wildcard matching bounded by `max_token`.
    pub fn matches(&self, token: TokenType, max_token: TokenType) -> bool {
        if !token.is_user() || token > max_token {
            return false;
        }
        match self {
            Transition::Atom { token: label, .. } => token == *label,
            Transition::Set { set, .. } => set.contains(token),
            Transition::NotSet { set, .. } => !set.contains(token),
            Transition::Wildcard { .. } => true,
            _ => false,
        }
    }
}
