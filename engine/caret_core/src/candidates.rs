//! The assembled result of a candidate collection run.

use caret_atn::{RuleId, TokenType};

/// Tokens and caller-preferred rules that could legally appear at the
/// caret position.
///
/// Both mappings preserve discovery order, which is grammar order and
/// therefore stable across runs; they are small Vec-backed maps rather
/// than hash maps so iteration order never depends on hashing.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct CandidateCollection {
    tokens: Vec<(TokenType, Vec<TokenType>)>,
    rules: Vec<(RuleId, Vec<RuleId>)>,
}

impl CandidateCollection {
    pub(crate) fn new() -> Self {
        CandidateCollection::default()
    }

    /// Token candidates in discovery order. Each entry pairs a token
    /// type with its deterministic preview sequence (possibly empty).
    #[inline]
    pub fn tokens(&self) -> &[(TokenType, Vec<TokenType>)] {
        &self.tokens
    }

    /// Preferred-rule candidates in discovery order. Each entry pairs a
    /// rule with the rule invocation stack (root-first, excluding the
    /// rule itself) active when the rule was reached.
    #[inline]
    pub fn rules(&self) -> &[(RuleId, Vec<RuleId>)] {
        &self.rules
    }

    /// The preview sequence recorded for `token`, if it is a candidate.
    pub fn token_preview(&self, token: TokenType) -> Option<&[TokenType]> {
        self.tokens
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, preview)| preview.as_slice())
    }

    /// The call stack recorded for `rule`, if it is a candidate.
    pub fn rule_stack(&self, rule: RuleId) -> Option<&[RuleId]> {
        self.rules
            .iter()
            .find(|(candidate, _)| *candidate == rule)
            .map(|(_, stack)| stack.as_slice())
    }

    #[inline]
    pub fn contains_token(&self, token: TokenType) -> bool {
        self.token_preview(token).is_some()
    }

    #[inline]
    pub fn contains_rule(&self, rule: RuleId) -> bool {
        self.rule_stack(rule).is_some()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.rules.is_empty()
    }

    /// Record a token candidate. First discovery fixes the position;
    /// a re-discovery with a different preview collapses the preview to
    /// empty, since the continuation is no longer unambiguous.
    pub(crate) fn add_token(&mut self, token: TokenType, preview: Vec<TokenType>) {
        if let Some((_, existing)) = self
            .tokens
            .iter_mut()
            .find(|(candidate, _)| *candidate == token)
        {
            if *existing != preview {
                existing.clear();
            }
        } else {
            self.tokens.push((token, preview));
        }
    }

    /// Record a preferred-rule candidate. The position is fixed by the
    /// first discovery; the stack of the latest discovery wins.
    pub(crate) fn add_rule(&mut self, rule: RuleId, stack: Vec<RuleId>) {
        if let Some((_, existing)) = self
            .rules
            .iter_mut()
            .find(|(candidate, _)| *candidate == rule)
        {
            *existing = stack;
        } else {
            self.rules.push((rule, stack));
        }
    }
}
