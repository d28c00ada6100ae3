//! Code-completion candidate collection over a compiled grammar.
//!
//! Given an immutable transition network (see `caret_atn`), a token
//! stream, and a caret position expressed as a token index, the engine
//! answers: which terminal tokens, and which caller-designated rules,
//! could legally appear at that position?
//!
//! The result is structural and grammar-derived. The engine does not
//! evaluate semantic predicates (precedence predicates are taken
//! optimistically, which can over-report candidates for grammars that
//! rely on them), does not parse, and does not rank; scoring and
//! filtering belong to the caller.
//!
//! A [`CodeCompletion`] instance is cheap to keep around: it owns a
//! lazily populated per-rule follow-set cache bound to one network, and
//! [`collect_candidates`](CodeCompletion::collect_candidates) is a pure
//! computation over `&self`, safe to call from several threads at once.

mod candidates;
mod closure;
mod context;
mod error;
mod follow;
mod lookahead;
mod stack;

pub use candidates::CandidateCollection;
pub use context::{resolve_context, ResolvedContext};
pub use error::CompletionError;

use caret_atn::{Atn, RuleId, RuleNode, TokenStream, TokenType};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::closure::ClosureWalker;
use crate::follow::FollowSetCache;

/// Construction-time configuration. Both sets default to empty.
#[derive(Clone, Default, Debug)]
pub struct CompletionConfig {
    /// Rules reported as terminal candidates instead of being expanded
    /// into their constituent tokens.
    pub preferred_rules: FxHashSet<RuleId>,
    /// Token types excluded entirely: never candidates, never part of
    /// a preview sequence.
    pub ignored_tokens: FxHashSet<TokenType>,
}

impl CompletionConfig {
    pub fn new() -> Self {
        CompletionConfig::default()
    }

    #[must_use]
    pub fn prefer_rules(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.preferred_rules.extend(rules);
        self
    }

    #[must_use]
    pub fn ignore_tokens(mut self, tokens: impl IntoIterator<Item = TokenType>) -> Self {
        self.ignored_tokens.extend(tokens);
        self
    }
}

/// The completion engine, bound to one network for its lifetime.
#[derive(Debug)]
pub struct CodeCompletion<'a> {
    atn: &'a Atn,
    config: CompletionConfig,
    follow_sets: FollowSetCache,
}

impl<'a> CodeCompletion<'a> {
    /// Engine with default (empty) configuration.
    pub fn new(atn: &'a Atn) -> Self {
        CodeCompletion::with_config(atn, CompletionConfig::default())
    }

    pub fn with_config(atn: &'a Atn, config: CompletionConfig) -> Self {
        CodeCompletion {
            atn,
            config,
            follow_sets: FollowSetCache::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Collect completion candidates at `caret`.
    ///
    /// `caret` is a token index in `0..=tokens.len()`; `tokens.len()`
    /// is the legal end-of-input position. When `context` carries the
    /// parse result, the rule chain enclosing the caret is derived from
    /// it ([`resolve_context`]); without a context, exploration starts
    /// at the grammar's designated start rule over the whole stream.
    ///
    /// Repeated calls with identical inputs return identical
    /// collections, in identical order.
    pub fn collect_candidates(
        &self,
        caret: usize,
        tokens: &dyn TokenStream,
        context: Option<&RuleNode>,
    ) -> Result<CandidateCollection, CompletionError> {
        if caret > tokens.len() {
            return Err(CompletionError::CaretOutOfRange {
                caret,
                token_count: tokens.len(),
            });
        }
        let resolved = match context {
            Some(root) => resolve_context(root, caret),
            None => ResolvedContext::start_rule(self.atn.start_rule()),
        };
        let start_rule = resolved.rule();
        if start_rule.index() >= self.atn.rule_count() {
            return Err(CompletionError::UnknownContextRule {
                rule: start_rule.raw(),
            });
        }

        let window: Vec<TokenType> = (resolved.token_start..caret)
            .filter_map(|index| tokens.get(index))
            .collect();
        debug!(
            caret,
            rule = self.atn.rule_name(start_rule),
            replayed = window.len(),
            "collect candidates"
        );

        let walker = ClosureWalker::new(
            self.atn,
            &self.config,
            &self.follow_sets,
            window,
            resolved.outer_chain().to_vec(),
        );
        Ok(walker.run(start_rule))
    }
}
