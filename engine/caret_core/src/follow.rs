//! Per-rule follow-set computation and caching.
//!
//! Two per-rule properties are memoized for the lifetime of one engine
//! instance, both independent of any caller stack:
//!
//! - the *entry sets* of a rule: every token label reachable from the
//!   rule's start state without consuming input, each annotated with
//!   the rule path leading to it and its deterministic preview. These
//!   answer "what can appear here" when the closure walker enters a
//!   rule at the caret, and their combined set prunes rules that
//!   cannot match the next real token;
//! - the *follow-after* set of a rule: the token types that can
//!   legally appear once an invocation of the rule completes, derived
//!   from the grammar-global references of the rule. Used only as the
//!   correctness fallback when the walker's call stack empties beneath
//!   an unresolved outer context.
//!
//! Both tables are dashmap-backed so concurrent collections over one
//! engine share them safely; population is at-most-once per key in
//! effect, and a racing duplicate compute produces the same value.

use std::sync::Arc;

use caret_atn::{Atn, Interval, RuleId, StateId, TokenSet, TokenType, Transition};
use dashmap::DashMap;
use rustc_hash::FxHashSet;

use crate::lookahead::following_tokens;
use crate::stack::with_stack_headroom;

/// One token label reachable at a rule's entry, with the rule path
/// that leads to it. The path is what lets preferred rules nested
/// inside the entered rule surface as rule candidates.
#[derive(Clone, Debug)]
pub(crate) struct EntrySet {
    pub(crate) intervals: TokenSet,
    /// Rules descended through to reach the label, outermost first,
    /// excluding the entered rule itself.
    pub(crate) path: Vec<RuleId>,
    /// Deterministic preview following the label, when unique.
    pub(crate) following: Vec<TokenType>,
}

/// All entry sets of one rule.
#[derive(Clone, Debug)]
pub(crate) struct RuleEntrySets {
    pub(crate) sets: Vec<EntrySet>,
    /// Union of all labels, for quick viability pruning.
    pub(crate) combined: TokenSet,
    /// False iff the rule can complete without consuming a token.
    pub(crate) is_exhaustive: bool,
}

impl RuleEntrySets {
    #[inline]
    pub(crate) fn is_nullable(&self) -> bool {
        !self.is_exhaustive
    }
}

/// Engine-lifetime cache of the per-rule sets above, keyed by rule.
///
/// Never invalidated: the network is immutable for the engine's
/// lifetime. Cache hits never recompute.
#[derive(Debug, Default)]
pub(crate) struct FollowSetCache {
    entry: DashMap<RuleId, Arc<RuleEntrySets>>,
    after: DashMap<RuleId, Arc<TokenSet>>,
}

impl FollowSetCache {
    pub(crate) fn new() -> Self {
        FollowSetCache::default()
    }

    /// The entry sets of `rule`, computed lazily on first request.
    pub(crate) fn entry_sets(
        &self,
        atn: &Atn,
        ignored: &FxHashSet<TokenType>,
        rule: RuleId,
    ) -> Arc<RuleEntrySets> {
        if let Some(found) = self.entry.get(&rule) {
            return Arc::clone(&found);
        }
        // Computed outside any map lock; a concurrent duplicate compute
        // yields the same value and the first insert wins.
        let computed = Arc::new(compute_entry_sets(atn, ignored, rule));
        Arc::clone(&self.entry.entry(rule).or_insert(computed))
    }

    /// The follow-after set of `rule`, computed lazily on first request.
    pub(crate) fn follow_after(
        &self,
        atn: &Atn,
        ignored: &FxHashSet<TokenType>,
        rule: RuleId,
    ) -> Arc<TokenSet> {
        if let Some(found) = self.after.get(&rule) {
            return Arc::clone(&found);
        }
        let mut out = TokenSet::new();
        let mut visited = FxHashSet::default();
        self.collect_follow_after(atn, ignored, rule, &mut visited, &mut out);
        let computed = Arc::new(out);
        Arc::clone(&self.after.entry(rule).or_insert(computed))
    }

    /// Union the tokens viable after each grammar-global reference of
    /// `rule`; where a referencing rule can itself complete right
    /// after the reference, chain into that rule's own follow.
    fn collect_follow_after(
        &self,
        atn: &Atn,
        ignored: &FxHashSet<TokenType>,
        rule: RuleId,
        visited: &mut FxHashSet<RuleId>,
        out: &mut TokenSet,
    ) {
        if !visited.insert(rule) {
            return;
        }
        for &resume in atn.invocations_of(rule) {
            let mut seen = FxHashSet::default();
            if self.first_from(atn, ignored, resume, out, &mut seen) {
                let caller = atn.state(resume).rule;
                self.collect_follow_after(atn, ignored, caller, visited, out);
            }
        }
    }

    /// Collect the tokens consumable from `state` without any prior
    /// consumption, descending into invoked rules through their cached
    /// entry sets. Returns true when the owning rule's stop state is
    /// reachable without consuming.
    fn first_from(
        &self,
        atn: &Atn,
        ignored: &FxHashSet<TokenType>,
        state: StateId,
        out: &mut TokenSet,
        seen: &mut FxHashSet<StateId>,
    ) -> bool {
        if !seen.insert(state) {
            return false;
        }
        let node = atn.state(state);
        if node.is_rule_stop() {
            return true;
        }
        let mut completes = false;
        for transition in &node.transitions {
            match transition {
                Transition::Epsilon { target } | Transition::Precedence { target, .. } => {
                    completes |= self.first_from(atn, ignored, *target, out, seen);
                }
                Transition::Atom { token, .. } => out.insert_token(*token),
                Transition::Set { set, .. } => out.union_with(set),
                Transition::NotSet { set, .. } => {
                    out.union_with(&set.complement(atn.max_token_type()));
                }
                Transition::Wildcard { .. } => {
                    if atn.max_token_type() >= TokenType::MIN_USER {
                        out.insert(Interval::new(TokenType::MIN_USER, atn.max_token_type()));
                    }
                }
                Transition::Rule { rule, follow } => {
                    let entry = self.entry_sets(atn, ignored, *rule);
                    out.union_with(&entry.combined);
                    if entry.is_nullable() {
                        completes |= self.first_from(atn, ignored, *follow, out, seen);
                    }
                }
            }
        }
        completes
    }
}

fn compute_entry_sets(atn: &Atn, ignored: &FxHashSet<TokenType>, rule: RuleId) -> RuleEntrySets {
    let stop = atn.rule_stop_state(rule);
    let mut sets = Vec::new();
    let mut state_stack = Vec::new();
    let mut rule_stack = Vec::new();
    let nullable = collect_entry_sets(
        atn,
        ignored,
        atn.rule_start_state(rule),
        stop,
        &mut sets,
        &mut state_stack,
        &mut rule_stack,
    );

    let mut combined = TokenSet::new();
    for set in &sets {
        combined.union_with(&set.intervals);
    }
    RuleEntrySets {
        sets,
        combined,
        is_exhaustive: !nullable,
    }
}

/// Depth-first closure from `state` toward `stop` over epsilon edges
/// and rule descents, recording every consuming label encountered.
/// Token-consuming edges terminate their path, so reaching any rule
/// stop state means an epsilon-only completion; that reachability is
/// the return value.
fn collect_entry_sets(
    atn: &Atn,
    ignored: &FxHashSet<TokenType>,
    state: StateId,
    stop: StateId,
    sets: &mut Vec<EntrySet>,
    state_stack: &mut Vec<StateId>,
    rule_stack: &mut Vec<RuleId>,
) -> bool {
    let node = atn.state(state);
    if state == stop || node.is_rule_stop() {
        return true;
    }
    if state_stack.contains(&state) {
        return false;
    }
    state_stack.push(state);

    let mut completes = false;
    for transition in &node.transitions {
        match transition {
            Transition::Rule { rule, follow } => {
                if rule_stack.contains(rule) {
                    // Recursive reference: already being expanded on
                    // this path, nothing new below it.
                    continue;
                }
                rule_stack.push(*rule);
                let callee_nullable = with_stack_headroom(|| {
                    collect_entry_sets(
                        atn,
                        ignored,
                        atn.rule_start_state(*rule),
                        stop,
                        sets,
                        state_stack,
                        rule_stack,
                    )
                });
                rule_stack.pop();
                if callee_nullable {
                    completes |= collect_entry_sets(
                        atn, ignored, *follow, stop, sets, state_stack, rule_stack,
                    );
                }
            }
            Transition::Epsilon { target } | Transition::Precedence { target, .. } => {
                completes |=
                    collect_entry_sets(atn, ignored, *target, stop, sets, state_stack, rule_stack);
            }
            Transition::Atom { target, token } => sets.push(EntrySet {
                intervals: TokenSet::of(*token),
                path: rule_stack.clone(),
                following: following_tokens(atn, *target, ignored),
            }),
            Transition::Set { target, set } => {
                let following = if set.len() == 1 {
                    following_tokens(atn, *target, ignored)
                } else {
                    Vec::new()
                };
                sets.push(EntrySet {
                    intervals: set.clone(),
                    path: rule_stack.clone(),
                    following,
                });
            }
            Transition::NotSet { set, .. } => sets.push(EntrySet {
                intervals: set.complement(atn.max_token_type()),
                path: rule_stack.clone(),
                following: Vec::new(),
            }),
            Transition::Wildcard { .. } => {
                if atn.max_token_type() >= TokenType::MIN_USER {
                    sets.push(EntrySet {
                        intervals: TokenSet::of_interval(Interval::new(
                            TokenType::MIN_USER,
                            atn.max_token_type(),
                        )),
                        path: rule_stack.clone(),
                        following: Vec::new(),
                    });
                }
            }
        }
    }

    state_stack.pop();
    completes
}
