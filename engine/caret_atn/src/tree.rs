//! Minimal parse-tree shape for caret context resolution.
//!
//! The engine does not own parsing; it only needs to know, for a parse
//! the external runtime already performed, which rule invocations
//! enclose a token position. A [`RuleNode`] carries exactly that: the
//! rule, the consumed-token range, and the child rule nodes. Leaf
//! tokens are not represented; they are implied by the spans.

use crate::ids::RuleId;

/// Consumed-token range of a rule node: `len` tokens starting at
/// `start`. A node that consumed nothing has `len == 0`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TokenSpan {
    pub start: usize,
    pub len: usize,
}

impl TokenSpan {
    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        TokenSpan { start, len }
    }

    /// Empty span anchored at `start`.
    #[inline]
    pub const fn empty(start: usize) -> Self {
        TokenSpan { start, len: 0 }
    }

    /// One past the last consumed token index.
    #[inline]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub const fn contains(self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// One rule invocation in a parse tree.
#[derive(Clone, Debug)]
pub struct RuleNode {
    pub rule: RuleId,
    pub span: TokenSpan,
    pub children: Vec<RuleNode>,
}

impl RuleNode {
    /// Leaf rule node with no child rules.
    pub fn leaf(rule: RuleId, span: TokenSpan) -> Self {
        RuleNode {
            rule,
            span,
            children: Vec::new(),
        }
    }

    /// Rule node with child rule invocations.
    pub fn with_children(rule: RuleId, span: TokenSpan, children: Vec<RuleNode>) -> Self {
        RuleNode {
            rule,
            span,
            children,
        }
    }
}
