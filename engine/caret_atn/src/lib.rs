//! Read-only augmented transition network (ATN) model.
//!
//! An ATN is the finite-state form a grammar compiler produces for a
//! context-free grammar: one start and one stop state per rule, plus
//! block/loop/decision states connected by typed transitions. The
//! completion engine in `caret_core` consumes this model; it never
//! mutates it.
//!
//! This crate also carries the two external-collaborator contracts the
//! engine needs alongside the network: an indexable [`TokenStream`] and
//! a minimal rule-node parse tree ([`RuleNode`]) used to resolve the
//! rule context enclosing a caret position.

mod atn;
mod ids;
mod set;
mod state;
mod stream;
mod transition;
mod tree;

pub use atn::{Atn, AtnBuilder, AtnError};
pub use ids::{RuleId, StateId, TokenType};
pub use set::{Interval, TokenSet};
pub use state::{AtnState, StateKind};
pub use stream::{TokenSlice, TokenStream};
pub use transition::Transition;
pub use tree::{RuleNode, TokenSpan};
