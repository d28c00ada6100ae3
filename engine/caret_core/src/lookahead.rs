//! Deterministic lookahead extension.
//!
//! Once a candidate token is known, the grammar sometimes pins down
//! what must come next: after `var` only an identifier and then `=` can
//! follow. This module walks that unique continuation so a completion
//! result can offer the whole shape, not just the first token.
//!
//! The walk is deliberately conservative. It stops at the first branch
//! point (more than one viable continuation), at any rule boundary
//! (crossing into another rule would need its caller context
//! re-derived), at any multi-token label, and at ignored tokens. A
//! preview is therefore either the unique legal continuation or a
//! truncation of it, never a guess.

use caret_atn::{Atn, StateId, TokenType, Transition};
use rustc_hash::FxHashSet;

/// One step of the unique-continuation walk.
enum Step {
    /// Pass through without consuming.
    Through(StateId),
    /// Consume `TokenType`, continue at `StateId`.
    Token(TokenType, StateId),
    /// Viable, but not uniquely followable (rule call, multi-token
    /// label, wildcard).
    Opaque,
}

/// Collect the token types that must follow a candidate matched into
/// `start`, stopping as soon as the continuation stops being unique.
pub(crate) fn following_tokens(
    atn: &Atn,
    start: StateId,
    ignored: &FxHashSet<TokenType>,
) -> Vec<TokenType> {
    let mut preview = Vec::new();
    let mut seen: FxHashSet<StateId> = FxHashSet::default();
    let mut state = start;

    loop {
        if !seen.insert(state) {
            // State cycle without an intervening branch point.
            break;
        }
        let node = atn.state(state);
        if node.is_rule_stop() {
            break;
        }

        let mut step = None;
        let mut viable = 0usize;
        for transition in &node.transitions {
            viable += 1;
            step = Some(match transition {
                Transition::Epsilon { target } | Transition::Precedence { target, .. } => {
                    Step::Through(*target)
                }
                Transition::Atom { target, token } => Step::Token(*token, *target),
                Transition::Set { target, set } if set.len() == 1 => {
                    match set.iter().next() {
                        Some(token) => Step::Token(token, *target),
                        None => Step::Opaque,
                    }
                }
                Transition::Set { .. }
                | Transition::NotSet { .. }
                | Transition::Wildcard { .. }
                | Transition::Rule { .. } => Step::Opaque,
            });
        }
        if viable != 1 {
            // Branch point: the continuation is ambiguous, truncate.
            break;
        }

        match step {
            Some(Step::Through(target)) => state = target,
            Some(Step::Token(token, target)) => {
                if ignored.contains(&token) {
                    break;
                }
                preview.push(token);
                state = target;
            }
            Some(Step::Opaque) | None => break,
        }
    }

    preview
}
