//! The closure walker: recursive exploration of the transition network
//! from a starting rule, replaying the tokens between the context start
//! and the caret, and emitting candidates at the caret frontier.
//!
//! Rule descent is genuine recursion (`process_rule` calls itself for
//! rule transitions), with three complementary guards that together
//! bound the traversal for any finite grammar, cyclic or not:
//!
//! - a call-frame repeat check cuts recursion that re-enters the same
//!   rule through the same call edge without consuming input (direct
//!   and mutual left recursion);
//! - a visited set of `(state, token offset, stack signature)` collapses
//!   re-exploration of a state under an identical caller context, where
//!   the signature is an order-preserving hash of the grammar-static
//!   `(rule, resume state)` frames;
//! - a per-rule memo of `(rule, entry offset) -> end offsets` makes
//!   re-entry from different paths a lookup instead of a re-walk. The
//!   memo only covers positions before the caret: at-caret entries are
//!   cheap (served from the follow-set cache) and must re-run so that
//!   preferred-rule candidates keep last-write-wins stacks.

use std::hash::{Hash, Hasher};

use caret_atn::{Atn, Interval, RuleId, StateId, TokenSet, TokenType, Transition};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use tracing::trace;

use crate::candidates::CandidateCollection;
use crate::follow::FollowSetCache;
use crate::lookahead::following_tokens;
use crate::stack::with_stack_headroom;
use crate::CompletionConfig;

/// One active rule invocation: the rule, the state the caller resumes
/// at, and the token offset the rule was entered at. The offset is
/// what lets the repeat check distinguish progress from a cycle.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct Frame {
    rule: RuleId,
    resume: StateId,
    offset: usize,
}

pub(crate) struct ClosureWalker<'e> {
    atn: &'e Atn,
    config: &'e CompletionConfig,
    cache: &'e FollowSetCache,
    /// The real tokens between the context start and the caret, in
    /// order. Offsets at or past `window.len()` are "at the caret".
    window: Vec<TokenType>,
    /// Unresolved rules above the starting rule, root-first.
    outer: Vec<RuleId>,
    call_stack: SmallVec<[Frame; 8]>,
    visited: FxHashSet<(StateId, usize, u64)>,
    memo: FxHashMap<(RuleId, usize), Vec<usize>>,
    candidates: CandidateCollection,
}

impl<'e> ClosureWalker<'e> {
    pub(crate) fn new(
        atn: &'e Atn,
        config: &'e CompletionConfig,
        cache: &'e FollowSetCache,
        window: Vec<TokenType>,
        outer: Vec<RuleId>,
    ) -> Self {
        ClosureWalker {
            atn,
            config,
            cache,
            window,
            outer,
            call_stack: SmallVec::new(),
            visited: FxHashSet::default(),
            memo: FxHashMap::default(),
            candidates: CandidateCollection::new(),
        }
    }

    /// Explore from `start_rule` and assemble the candidate collection.
    pub(crate) fn run(mut self, start_rule: RuleId) -> CandidateCollection {
        let ends = self.process_rule(start_rule, StateId::INVALID, 0);

        // The starting rule can complete at the caret while callers
        // above it were never resolved: whatever may follow a completed
        // invocation of this rule anywhere in the grammar is then also
        // viable at the caret.
        if !self.outer.is_empty() && ends.contains(&self.window.len()) {
            let follow =
                self.cache
                    .follow_after(self.atn, &self.config.ignored_tokens, start_rule);
            for token in follow.iter() {
                if self.is_candidate_token(token) {
                    self.candidates.add_token(token, Vec::new());
                }
            }
        }
        self.candidates
    }

    #[inline]
    fn caret_offset(&self) -> usize {
        self.window.len()
    }

    #[inline]
    fn is_candidate_token(&self, token: TokenType) -> bool {
        token.is_user() && !self.config.ignored_tokens.contains(&token)
    }

    /// Order-preserving hash of the grammar-static parts of the call
    /// stack. Finite because it is built from rule ids and resume
    /// states only, never from runtime position.
    fn stack_signature(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for frame in &self.call_stack {
            frame.rule.raw().hash(&mut hasher);
            frame.resume.raw().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Explore `rule` entered at token `offset`, returning the offsets
    /// at which the rule can complete.
    fn process_rule(&mut self, rule: RuleId, resume: StateId, offset: usize) -> Vec<usize> {
        let caret = self.caret_offset();
        let at_caret = offset >= caret;
        if !at_caret {
            if let Some(cached) = self.memo.get(&(rule, offset)) {
                return cached.clone();
            }
        }

        let entry = self
            .cache
            .entry_sets(self.atn, &self.config.ignored_tokens, rule);

        let frame = Frame {
            rule,
            resume,
            offset,
        };
        if self.call_stack.contains(&frame) {
            // Same rule, same call edge, same position: recursion with
            // no progress. Cut the cycle; a nullable rule still lets
            // the caller continue past the invocation.
            return if entry.is_nullable() {
                vec![offset]
            } else {
                Vec::new()
            };
        }
        self.call_stack.push(frame);
        trace!(rule = self.atn.rule_name(rule), offset, "enter rule");

        let mut ends: Vec<usize> = Vec::new();

        if at_caret {
            // Candidates at rule entry come from the cached entry sets;
            // the rule body is never re-walked here.
            if self.config.preferred_rules.contains(&rule) {
                self.translate_stack(&[]);
            } else {
                for set in &entry.sets {
                    if self.translate_stack(&set.path) {
                        continue;
                    }
                    for token in set.intervals.iter() {
                        if self.is_candidate_token(token) {
                            self.candidates.add_token(token, set.following.clone());
                        }
                    }
                }
            }
            if entry.is_nullable() {
                ends.push(offset);
            }
            self.call_stack.pop();
            return ends;
        }

        // Before the caret the rule must either match the next real
        // token or be skippable, or this path is not viable.
        let current = self.window[offset];
        if !entry.is_nullable() && !entry.combined.contains(current) {
            self.call_stack.pop();
            self.memo.insert((rule, offset), Vec::new());
            return Vec::new();
        }

        let atn = self.atn;
        let signature = self.stack_signature();
        let mut pipeline: Vec<(StateId, usize)> = vec![(atn.rule_start_state(rule), offset)];
        while let Some((state_id, position)) = pipeline.pop() {
            if !self.visited.insert((state_id, position, signature)) {
                continue;
            }
            let state = atn.state(state_id);
            if state.is_rule_stop() {
                if !ends.contains(&position) {
                    ends.push(position);
                }
                continue;
            }
            let position_at_caret = position >= caret;
            for transition in &state.transitions {
                match transition {
                    Transition::Rule {
                        rule: callee,
                        follow,
                    } => {
                        let sub_ends =
                            with_stack_headroom(|| self.process_rule(*callee, *follow, position));
                        for end in sub_ends {
                            pipeline.push((*follow, end));
                        }
                    }
                    Transition::Epsilon { target } | Transition::Precedence { target, .. } => {
                        pipeline.push((*target, position));
                    }
                    consuming => {
                        if position_at_caret {
                            if !self.translate_stack(&[]) {
                                self.emit_consuming(consuming);
                            }
                        } else if consuming.matches(self.window[position], atn.max_token_type()) {
                            if let Some(target) = consuming_target(consuming) {
                                pipeline.push((target, position + 1));
                            }
                        }
                    }
                }
            }
        }

        self.call_stack.pop();
        ends.sort_unstable();
        trace!(rule = self.atn.rule_name(rule), offset, ?ends, "exit rule");
        self.memo.insert((rule, offset), ends.clone());
        ends
    }

    /// Scan the active stack (plus `extra` rules below it), outermost
    /// first, for a preferred rule. The first hit is recorded as a rule
    /// candidate with the stack above it, and suppresses token
    /// candidates for this emission site.
    fn translate_stack(&mut self, extra: &[RuleId]) -> bool {
        if self.config.preferred_rules.is_empty() {
            return false;
        }
        let full: Vec<RuleId> = self
            .outer
            .iter()
            .copied()
            .chain(self.call_stack.iter().map(|frame| frame.rule))
            .chain(extra.iter().copied())
            .collect();
        for (depth, rule) in full.iter().enumerate() {
            if self.config.preferred_rules.contains(rule) {
                trace!(rule = self.atn.rule_name(*rule), "rule candidate");
                self.candidates.add_rule(*rule, full[..depth].to_vec());
                return true;
            }
        }
        false
    }

    /// Emit token candidates for a consuming transition sitting at the
    /// caret. A uniquely labelled transition carries its deterministic
    /// preview; multi-token labels and wildcards carry none.
    fn emit_consuming(&mut self, transition: &Transition) {
        let max_token = self.atn.max_token_type();
        let (label, target) = match transition {
            Transition::Atom { target, token } => (TokenSet::of(*token), Some(*target)),
            Transition::Set { target, set } => (set.clone(), Some(*target)),
            Transition::NotSet { set, .. } => (set.complement(max_token), None),
            Transition::Wildcard { .. } => {
                if max_token >= TokenType::MIN_USER {
                    (
                        TokenSet::of_interval(Interval::new(TokenType::MIN_USER, max_token)),
                        None,
                    )
                } else {
                    return;
                }
            }
            _ => return,
        };
        let unique = label.len() == 1;
        for token in label.iter() {
            if !self.is_candidate_token(token) {
                continue;
            }
            let preview = match target {
                Some(target) if unique => {
                    following_tokens(self.atn, target, &self.config.ignored_tokens)
                }
                _ => Vec::new(),
            };
            self.candidates.add_token(token, preview);
        }
    }
}

fn consuming_target(transition: &Transition) -> Option<StateId> {
    match transition {
        Transition::Atom { target, .. }
        | Transition::Set { target, .. }
        | Transition::NotSet { target, .. }
        | Transition::Wildcard { target } => Some(*target),
        _ => None,
    }
}
