//! Network states.

use crate::ids::{RuleId, StateId};
use crate::transition::Transition;

/// The role a state plays in the network.
///
/// Rule start/stop states bracket each rule; block and loop states mark
/// the boundaries a grammar compiler emits for subrules and for the
/// rewritten loop form of left-recursive rules. The completion walker
/// only dispatches on `RuleStop` specially; the remaining kinds exist
/// so a compiled network round-trips without loss and traces stay
/// readable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StateKind {
    Basic,
    RuleStart,
    RuleStop,
    BlockStart,
    BlockEnd,
    StarLoopEntry,
    StarLoopBack,
    PlusLoopBack,
    Decision,
}

/// One node of the transition network.
///
/// Immutable once the owning [`Atn`](crate::Atn) is built.
#[derive(Clone, Debug)]
pub struct AtnState {
    /// This state's own arena index.
    pub id: StateId,
    pub kind: StateKind,
    /// The rule this state belongs to.
    pub rule: RuleId,
    /// Outgoing edges, in grammar order.
    pub transitions: Vec<Transition>,
}

impl AtnState {
    #[inline]
    pub fn is_rule_stop(&self) -> bool {
        self.kind == StateKind::RuleStop
    }
}
