//! Caret context resolution.
//!
//! Given a parse the external runtime already performed, work out which
//! rule invocations enclose the caret. The engine then explores from
//! the innermost of those rules, with the chain above it kept for
//! rule-candidate stacks and for the boundary fallback when the
//! innermost rule turns out to be completable at the caret.

use caret_atn::{RuleId, RuleNode};

/// The rule invocation context enclosing a caret position.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ResolvedContext {
    /// Every rule entered from the parse root down to the rule
    /// enclosing the caret, in root-to-leaf order. Never empty.
    pub chain: Vec<RuleId>,
    /// First token index consumed by the innermost rule; exploration
    /// replays tokens from here up to the caret.
    pub token_start: usize,
}

impl ResolvedContext {
    /// Context for exploration from a grammar's designated start rule,
    /// used when no parse result exists.
    pub fn start_rule(rule: RuleId) -> Self {
        ResolvedContext {
            chain: vec![rule],
            token_start: 0,
        }
    }

    /// The innermost rule, where exploration starts.
    #[inline]
    pub fn rule(&self) -> RuleId {
        // Construction guarantees a non-empty chain.
        self.chain.last().copied().unwrap_or(RuleId::INVALID)
    }

    /// The unresolved rules above the innermost one, root-first.
    #[inline]
    pub fn outer_chain(&self) -> &[RuleId] {
        &self.chain[..self.chain.len() - 1]
    }
}

/// Walk from `root` to the deepest rule node whose consumed-token range
/// contains `caret`, recording every rule entered along the way.
///
/// A caret beyond the last consumed token (caret at end of input)
/// selects, at each level, the child that last extended the input.
pub fn resolve_context(root: &RuleNode, caret: usize) -> ResolvedContext {
    let mut chain = Vec::new();
    let mut node = root;
    loop {
        chain.push(node.rule);
        match pick_child(node, caret) {
            Some(child) => node = child,
            None => break,
        }
    }
    ResolvedContext {
        chain,
        token_start: node.span.start.min(caret),
    }
}

fn pick_child(node: &RuleNode, caret: usize) -> Option<&RuleNode> {
    // Innermost wins when sibling spans are nested or duplicated, so
    // scan back to front.
    if let Some(child) = node
        .children
        .iter()
        .rev()
        .find(|child| child.span.contains(caret))
    {
        return Some(child);
    }
    if caret >= node.span.end() {
        // Caret past everything this node consumed: descend into the
        // child that last extended the input, if any extended it at
        // all.
        return node
            .children
            .iter()
            .rev()
            .filter(|child| !child.span.is_empty())
            .max_by_key(|child| child.span.end())
            .filter(|child| child.span.end() == node.span.end());
    }
    None
}
