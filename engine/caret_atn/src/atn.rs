//! The network itself, plus its validating builder.

use thiserror::Error;

use crate::ids::{RuleId, StateId, TokenType};
use crate::state::{AtnState, StateKind};
use crate::transition::Transition;

/// Malformed-network configuration errors.
///
/// The network is produced by an external grammar compiler; a dangling
/// reference in it is unrecoverable and surfaced immediately at build
/// time rather than masked during traversal.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AtnError {
    #[error("network defines no rules")]
    NoRules,
    #[error("state {0} references nonexistent rule {1}")]
    UnknownRule(u32, u32),
    #[error("transition references nonexistent state {0}")]
    UnknownState(u32),
    #[error("transition source state {0} does not exist")]
    UnknownSource(u32),
    #[error("rule {0} has no start state")]
    MissingRuleStart(u32),
    #[error("rule {0} has no stop state")]
    MissingRuleStop(u32),
    #[error("rule {0} has more than one start state")]
    DuplicateRuleStart(u32),
    #[error("rule {0} has more than one stop state")]
    DuplicateRuleStop(u32),
    #[error("designated start rule {0} does not exist")]
    UnknownStartRule(u32),
}

/// An augmented transition network: the compiled, immutable form of a
/// context-free grammar.
///
/// Built once through [`AtnBuilder`], then only read. All ids handed
/// out by the builder are valid arena indices by construction.
#[derive(Clone, Debug)]
pub struct Atn {
    states: Vec<AtnState>,
    rule_start: Vec<StateId>,
    rule_stop: Vec<StateId>,
    rule_names: Vec<String>,
    /// Per rule: the follow (return) states of every invocation of that
    /// rule anywhere in the grammar. These are the grammar-global
    /// references a follow-set computation starts from.
    rule_refs: Vec<Vec<StateId>>,
    max_token_type: TokenType,
    start_rule: RuleId,
}

impl Atn {
    #[inline]
    pub fn state(&self, id: StateId) -> &AtnState {
        &self.states[id.index()]
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rule_start.len()
    }

    #[inline]
    pub fn rule_start_state(&self, rule: RuleId) -> StateId {
        self.rule_start[rule.index()]
    }

    #[inline]
    pub fn rule_stop_state(&self, rule: RuleId) -> StateId {
        self.rule_stop[rule.index()]
    }

    #[inline]
    pub fn rule_name(&self, rule: RuleId) -> &str {
        &self.rule_names[rule.index()]
    }

    /// Follow states of every invocation of `rule` across the grammar.
    #[inline]
    pub fn invocations_of(&self, rule: RuleId) -> &[StateId] {
        &self.rule_refs[rule.index()]
    }

    /// Largest user-defined token type the grammar references.
    #[inline]
    pub fn max_token_type(&self) -> TokenType {
        self.max_token_type
    }

    /// The grammar's designated entry rule.
    #[inline]
    pub fn start_rule(&self) -> RuleId {
        self.start_rule
    }
}

/// Builder for [`Atn`].
///
/// States and transitions may be added in any order; every cross
/// reference is validated in [`build`](AtnBuilder::build), which is the
/// only way to obtain an `Atn`.
#[derive(Clone, Debug)]
pub struct AtnBuilder {
    max_token_type: TokenType,
    rule_names: Vec<String>,
    states: Vec<AtnState>,
    pending: Vec<(StateId, Transition)>,
    start_rule: Option<RuleId>,
}

impl AtnBuilder {
    pub fn new(max_token_type: TokenType) -> Self {
        AtnBuilder {
            max_token_type,
            rule_names: Vec::new(),
            states: Vec::new(),
            pending: Vec::new(),
            start_rule: None,
        }
    }

    /// Declare a rule. Rules are numbered in declaration order.
    pub fn add_rule(&mut self, name: impl Into<String>) -> RuleId {
        let id = RuleId::new(u32::try_from(self.rule_names.len()).unwrap_or(u32::MAX));
        self.rule_names.push(name.into());
        id
    }

    /// Add a state owned by `rule`.
    pub fn add_state(&mut self, rule: RuleId, kind: StateKind) -> StateId {
        let id = StateId::new(u32::try_from(self.states.len()).unwrap_or(u32::MAX));
        self.states.push(AtnState {
            id,
            kind,
            rule,
            transitions: Vec::new(),
        });
        id
    }

    /// Queue an outgoing transition for `from`. Validated at build.
    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.pending.push((from, transition));
    }

    /// Designate the grammar's entry rule. Defaults to the first rule.
    pub fn set_start_rule(&mut self, rule: RuleId) {
        self.start_rule = Some(rule);
    }

    /// Validate all cross references and produce the immutable network.
    pub fn build(mut self) -> Result<Atn, AtnError> {
        let rule_count = self.rule_names.len();
        if rule_count == 0 {
            return Err(AtnError::NoRules);
        }
        let state_count = self.states.len();

        let check_state = |id: StateId| -> Result<(), AtnError> {
            if id.index() < state_count {
                Ok(())
            } else {
                Err(AtnError::UnknownState(id.raw()))
            }
        };
        let check_rule = |id: RuleId, state: StateId| -> Result<(), AtnError> {
            if id.index() < rule_count {
                Ok(())
            } else {
                Err(AtnError::UnknownRule(state.raw(), id.raw()))
            }
        };

        for state in &self.states {
            check_rule(state.rule, state.id)?;
        }

        let mut rule_refs: Vec<Vec<StateId>> = vec![Vec::new(); rule_count];
        for (from, transition) in std::mem::take(&mut self.pending) {
            if from.index() >= state_count {
                return Err(AtnError::UnknownSource(from.raw()));
            }
            match &transition {
                Transition::Epsilon { target }
                | Transition::Atom { target, .. }
                | Transition::Set { target, .. }
                | Transition::NotSet { target, .. }
                | Transition::Wildcard { target }
                | Transition::Precedence { target, .. } => check_state(*target)?,
                Transition::Rule { rule, follow } => {
                    check_rule(*rule, from)?;
                    check_state(*follow)?;
                    rule_refs[rule.index()].push(*follow);
                }
            }
            self.states[from.index()].transitions.push(transition);
        }

        // Each rule needs exactly one start and one stop state.
        let mut rule_start = vec![StateId::INVALID; rule_count];
        let mut rule_stop = vec![StateId::INVALID; rule_count];
        for state in &self.states {
            match state.kind {
                StateKind::RuleStart => {
                    let slot = &mut rule_start[state.rule.index()];
                    if slot.is_valid() {
                        return Err(AtnError::DuplicateRuleStart(state.rule.raw()));
                    }
                    *slot = state.id;
                }
                StateKind::RuleStop => {
                    let slot = &mut rule_stop[state.rule.index()];
                    if slot.is_valid() {
                        return Err(AtnError::DuplicateRuleStop(state.rule.raw()));
                    }
                    *slot = state.id;
                }
                _ => {}
            }
        }
        for rule in 0..rule_count {
            #[allow(clippy::cast_possible_truncation)]
            let raw = rule as u32;
            if !rule_start[rule].is_valid() {
                return Err(AtnError::MissingRuleStart(raw));
            }
            if !rule_stop[rule].is_valid() {
                return Err(AtnError::MissingRuleStop(raw));
            }
        }

        let start_rule = self.start_rule.unwrap_or(RuleId::new(0));
        if start_rule.index() >= rule_count {
            return Err(AtnError::UnknownStartRule(start_rule.raw()));
        }

        Ok(Atn {
            states: self.states,
            rule_start,
            rule_stop,
            rule_names: self.rule_names,
            rule_refs,
            max_token_type: self.max_token_type,
            start_rule,
        })
    }
}
