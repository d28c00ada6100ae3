#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test code — panics provide clear failure messages"
)]

//! End-to-end candidate collection over hand-built transition networks.
//!
//! Each grammar here is small enough to hold in your head, and each
//! test states the source-level grammar it encodes in a comment. The
//! networks are built the way a grammar compiler would emit them, with
//! left recursion already rewritten into loop form.

use caret_atn::{
    Atn, AtnBuilder, RuleId, RuleNode, StateKind, TokenSlice, TokenSpan, TokenType, Transition,
};
use caret_core::{CodeCompletion, CompletionConfig, CompletionError};
use pretty_assertions::assert_eq;

#[allow(dead_code)]
fn t(raw: u16) -> TokenType {
    TokenType::new(raw)
}

fn token_keys(collection: &caret_core::CandidateCollection) -> Vec<TokenType> {
    collection.tokens().iter().map(|(key, _)| *key).collect()
}

fn rule_keys(collection: &caret_core::CandidateCollection) -> Vec<RuleId> {
    collection.rules().iter().map(|(key, _)| *key).collect()
}

// ---------------------------------------------------------------------
// Sequence grammar:  a: b G;  b: A B;
// ---------------------------------------------------------------------

const A: TokenType = TokenType::new(1);
const B: TokenType = TokenType::new(2);
const G: TokenType = TokenType::new(3);

fn sequence_grammar() -> Atn {
    let mut builder = AtnBuilder::new(G);

    let rule_b = builder.add_rule("b");
    let b0 = builder.add_state(rule_b, StateKind::RuleStart);
    let b1 = builder.add_state(rule_b, StateKind::Basic);
    let b_stop = builder.add_state(rule_b, StateKind::RuleStop);
    builder.add_transition(b0, Transition::Atom { target: b1, token: A });
    builder.add_transition(b1, Transition::Atom { target: b_stop, token: B });

    let rule_a = builder.add_rule("a");
    builder.set_start_rule(rule_a);
    let a0 = builder.add_state(rule_a, StateKind::RuleStart);
    let a1 = builder.add_state(rule_a, StateKind::Basic);
    let a_stop = builder.add_state(rule_a, StateKind::RuleStop);
    builder.add_transition(a0, Transition::Rule { rule: rule_b, follow: a1 });
    builder.add_transition(a1, Transition::Atom { target: a_stop, token: G });

    builder.build().unwrap()
}

#[test]
fn sequence_start_offers_only_the_first_token() {
    let atn = sequence_grammar();
    let engine = CodeCompletion::new(&atn);
    let tokens = [A, B, G];
    let collection = engine
        .collect_candidates(0, &TokenSlice::new(&tokens), None)
        .unwrap();

    assert_eq!(token_keys(&collection), vec![A]);
    assert_eq!(collection.token_preview(A), Some(&[B][..]));
    assert!(collection.rules().is_empty());
}

#[test]
fn sequence_offers_each_token_in_turn() {
    let atn = sequence_grammar();
    let engine = CodeCompletion::new(&atn);
    let tokens = [A, B, G];
    let stream = TokenSlice::new(&tokens);

    let after_a = engine.collect_candidates(1, &stream, None).unwrap();
    assert_eq!(token_keys(&after_a), vec![B]);

    let after_b = engine.collect_candidates(2, &stream, None).unwrap();
    assert_eq!(token_keys(&after_b), vec![G]);
}

#[test]
fn sequence_complete_input_leaves_nothing_to_offer() {
    let atn = sequence_grammar();
    let engine = CodeCompletion::new(&atn);
    let tokens = [A, B, G];
    let collection = engine
        .collect_candidates(3, &TokenSlice::new(&tokens), None)
        .unwrap();
    assert!(collection.is_empty());
}

#[test]
fn caret_beyond_the_stream_is_an_error() {
    let atn = sequence_grammar();
    let engine = CodeCompletion::new(&atn);
    let tokens = [A];
    let result = engine.collect_candidates(5, &TokenSlice::new(&tokens), None);
    assert_eq!(
        result,
        Err(CompletionError::CaretOutOfRange {
            caret: 5,
            token_count: 1
        })
    );
}

// ---------------------------------------------------------------------
// Grammar-header grammar:
//   header: DOC_COMMENT | LEXER GRAMMAR | PARSER GRAMMAR | GRAMMAR;
// ---------------------------------------------------------------------

const DOC_COMMENT: TokenType = TokenType::new(1);
const LEXER: TokenType = TokenType::new(2);
const PARSER: TokenType = TokenType::new(3);
const GRAMMAR: TokenType = TokenType::new(4);

fn header_grammar() -> Atn {
    let mut builder = AtnBuilder::new(GRAMMAR);
    let header = builder.add_rule("header");
    builder.set_start_rule(header);

    let h0 = builder.add_state(header, StateKind::RuleStart);
    let after_lexer = builder.add_state(header, StateKind::Basic);
    let after_parser = builder.add_state(header, StateKind::Basic);
    let stop = builder.add_state(header, StateKind::RuleStop);

    builder.add_transition(h0, Transition::Atom { target: stop, token: DOC_COMMENT });
    builder.add_transition(h0, Transition::Atom { target: after_lexer, token: LEXER });
    builder.add_transition(after_lexer, Transition::Atom { target: stop, token: GRAMMAR });
    builder.add_transition(h0, Transition::Atom { target: after_parser, token: PARSER });
    builder.add_transition(after_parser, Transition::Atom { target: stop, token: GRAMMAR });
    builder.add_transition(h0, Transition::Atom { target: stop, token: GRAMMAR });

    builder.build().unwrap()
}

#[test]
fn header_alternatives_carry_their_unique_continuations() {
    let atn = header_grammar();
    let engine = CodeCompletion::new(&atn);
    // The stream content past the caret must not influence the result;
    // start it with a token that only one alternative accepts.
    let tokens = [GRAMMAR];
    let collection = engine
        .collect_candidates(0, &TokenSlice::new(&tokens), None)
        .unwrap();

    assert_eq!(
        token_keys(&collection),
        vec![DOC_COMMENT, LEXER, PARSER, GRAMMAR]
    );
    assert_eq!(collection.token_preview(DOC_COMMENT), Some(&[][..]));
    assert_eq!(collection.token_preview(LEXER), Some(&[GRAMMAR][..]));
    assert_eq!(collection.token_preview(PARSER), Some(&[GRAMMAR][..]));
    assert_eq!(collection.token_preview(GRAMMAR), Some(&[][..]));
    assert!(collection.rules().is_empty());
}

// ---------------------------------------------------------------------
// Expression grammar:
//   expression:       assignment | simpleExpression;
//   assignment:       (VAR | LET) ID EQUAL simpleExpression;
//   simpleExpression: operand (op operand)*;
//     where op is any of PLUS MINUS MULTIPLY DIVIDE and
//     operand: variableRef | functionRef;
//   variableRef:      ID;
//   functionRef:      ID OPEN_PAR CLOSE_PAR;
// ---------------------------------------------------------------------

const VAR: TokenType = TokenType::new(1);
const LET: TokenType = TokenType::new(2);
const ID: TokenType = TokenType::new(3);
const EQUAL: TokenType = TokenType::new(4);
const PLUS: TokenType = TokenType::new(5);
const MINUS: TokenType = TokenType::new(6);
const MULTIPLY: TokenType = TokenType::new(7);
const DIVIDE: TokenType = TokenType::new(8);
const OPEN_PAR: TokenType = TokenType::new(9);
const CLOSE_PAR: TokenType = TokenType::new(10);

struct ExprGrammar {
    atn: Atn,
    variable_ref: RuleId,
    function_ref: RuleId,
}

fn expression_grammar() -> ExprGrammar {
    let mut builder = AtnBuilder::new(CLOSE_PAR);

    let variable_ref = builder.add_rule("variableRef");
    let v0 = builder.add_state(variable_ref, StateKind::RuleStart);
    let v_stop = builder.add_state(variable_ref, StateKind::RuleStop);
    builder.add_transition(v0, Transition::Atom { target: v_stop, token: ID });

    let function_ref = builder.add_rule("functionRef");
    let f0 = builder.add_state(function_ref, StateKind::RuleStart);
    let f1 = builder.add_state(function_ref, StateKind::Basic);
    let f2 = builder.add_state(function_ref, StateKind::Basic);
    let f_stop = builder.add_state(function_ref, StateKind::RuleStop);
    builder.add_transition(f0, Transition::Atom { target: f1, token: ID });
    builder.add_transition(f1, Transition::Atom { target: f2, token: OPEN_PAR });
    builder.add_transition(f2, Transition::Atom { target: f_stop, token: CLOSE_PAR });

    let simple = builder.add_rule("simpleExpression");
    let s_start = builder.add_state(simple, StateKind::RuleStart);
    let s_operand = builder.add_state(simple, StateKind::Basic);
    let s_loop = builder.add_state(simple, StateKind::StarLoopEntry);
    let s_op = builder.add_state(simple, StateKind::Basic);
    let s_next = builder.add_state(simple, StateKind::StarLoopBack);
    let s_stop = builder.add_state(simple, StateKind::RuleStop);
    builder.add_transition(s_start, Transition::Epsilon { target: s_operand });
    builder.add_transition(s_operand, Transition::Rule { rule: variable_ref, follow: s_loop });
    builder.add_transition(s_operand, Transition::Rule { rule: function_ref, follow: s_loop });
    builder.add_transition(s_loop, Transition::Epsilon { target: s_op });
    builder.add_transition(s_loop, Transition::Epsilon { target: s_stop });
    let operators: caret_atn::TokenSet = [PLUS, MINUS, MULTIPLY, DIVIDE].into_iter().collect();
    builder.add_transition(s_op, Transition::Set { target: s_next, set: operators });
    builder.add_transition(s_next, Transition::Epsilon { target: s_operand });

    let assignment = builder.add_rule("assignment");
    let a0 = builder.add_state(assignment, StateKind::RuleStart);
    let a1 = builder.add_state(assignment, StateKind::Basic);
    let a2 = builder.add_state(assignment, StateKind::Basic);
    let a3 = builder.add_state(assignment, StateKind::Basic);
    let a_stop = builder.add_state(assignment, StateKind::RuleStop);
    builder.add_transition(a0, Transition::Atom { target: a1, token: VAR });
    builder.add_transition(a0, Transition::Atom { target: a1, token: LET });
    builder.add_transition(a1, Transition::Atom { target: a2, token: ID });
    builder.add_transition(a2, Transition::Atom { target: a3, token: EQUAL });
    builder.add_transition(a3, Transition::Rule { rule: simple, follow: a_stop });

    let expression = builder.add_rule("expression");
    builder.set_start_rule(expression);
    let x0 = builder.add_state(expression, StateKind::RuleStart);
    let x_stop = builder.add_state(expression, StateKind::RuleStop);
    builder.add_transition(x0, Transition::Rule { rule: assignment, follow: x_stop });
    builder.add_transition(x0, Transition::Rule { rule: simple, follow: x_stop });

    ExprGrammar {
        atn: builder.build().unwrap(),
        variable_ref,
        function_ref,
    }
}

/// `var c = a + b`
const EXPR_INPUT: [TokenType; 6] = [VAR, ID, EQUAL, ID, PLUS, ID];

#[test]
fn expression_start_offers_declarations_and_values() {
    let grammar = expression_grammar();
    let engine = CodeCompletion::new(&grammar.atn);
    let collection = engine
        .collect_candidates(0, &TokenSlice::new(&EXPR_INPUT), None)
        .unwrap();

    assert_eq!(token_keys(&collection), vec![VAR, LET, ID]);
    assert_eq!(collection.token_preview(VAR), Some(&[ID, EQUAL][..]));
    assert_eq!(collection.token_preview(LET), Some(&[ID, EQUAL][..]));
    // ID is reachable both as a variable reference (nothing must
    // follow) and as a function call (parentheses follow), so no
    // single continuation is certain.
    assert_eq!(collection.token_preview(ID), Some(&[][..]));
    assert!(collection.rules().is_empty());
}

fn preferred_config(grammar: &ExprGrammar) -> CompletionConfig {
    CompletionConfig::new()
        .prefer_rules([grammar.variable_ref, grammar.function_ref])
        .ignore_tokens([PLUS, MINUS, MULTIPLY, DIVIDE])
}

#[test]
fn identifier_in_value_position_yields_both_reference_rules() {
    let grammar = expression_grammar();
    let engine = CodeCompletion::with_config(&grammar.atn, preferred_config(&grammar));

    // Caret on the `a` of `var c = a + b`.
    let collection = engine
        .collect_candidates(3, &TokenSlice::new(&EXPR_INPUT), None)
        .unwrap();

    assert!(collection.tokens().is_empty());
    assert_eq!(
        rule_keys(&collection),
        vec![grammar.variable_ref, grammar.function_ref]
    );
}

#[test]
fn committed_identifier_collapses_the_rule_ambiguity() {
    let grammar = expression_grammar();
    let engine = CodeCompletion::with_config(&grammar.atn, preferred_config(&grammar));

    // Caret just past the `a`: the variable reading is already
    // complete, only the function call can still continue here.
    let collection = engine
        .collect_candidates(4, &TokenSlice::new(&EXPR_INPUT), None)
        .unwrap();

    assert!(collection.tokens().is_empty());
    assert_eq!(rule_keys(&collection), vec![grammar.function_ref]);
}

#[test]
fn ignored_operators_never_surface_as_candidates() {
    let grammar = expression_grammar();
    let engine = CodeCompletion::with_config(
        &grammar.atn,
        CompletionConfig::new().ignore_tokens([PLUS, MINUS, MULTIPLY, DIVIDE]),
    );

    // Caret right after `a`, where an operator would be legal.
    let collection = engine
        .collect_candidates(4, &TokenSlice::new(&EXPR_INPUT), None)
        .unwrap();
    for op in [PLUS, MINUS, MULTIPLY, DIVIDE] {
        assert!(!collection.contains_token(op));
    }
}

#[test]
fn repeated_collections_are_identical() {
    let grammar = expression_grammar();
    let engine = CodeCompletion::with_config(&grammar.atn, preferred_config(&grammar));
    let stream = TokenSlice::new(&EXPR_INPUT);

    for caret in 0..=EXPR_INPUT.len() {
        let first = engine.collect_candidates(caret, &stream, None).unwrap();
        let second = engine.collect_candidates(caret, &stream, None).unwrap();
        assert_eq!(first, second, "divergence at caret {caret}");
    }
}

// ---------------------------------------------------------------------
// Context-driven collection:  file: stmt SEMI stmt;  stmt: KW;
// ---------------------------------------------------------------------

const KW: TokenType = TokenType::new(1);
const SEMI: TokenType = TokenType::new(2);

#[test]
fn context_resolution_recovers_tokens_after_a_finished_rule() {
    let mut builder = AtnBuilder::new(SEMI);

    let stmt = builder.add_rule("stmt");
    let s0 = builder.add_state(stmt, StateKind::RuleStart);
    let s_stop = builder.add_state(stmt, StateKind::RuleStop);
    builder.add_transition(s0, Transition::Atom { target: s_stop, token: KW });

    let file = builder.add_rule("file");
    builder.set_start_rule(file);
    let f0 = builder.add_state(file, StateKind::RuleStart);
    let f1 = builder.add_state(file, StateKind::Basic);
    let f2 = builder.add_state(file, StateKind::Basic);
    let f_stop = builder.add_state(file, StateKind::RuleStop);
    builder.add_transition(f0, Transition::Rule { rule: stmt, follow: f1 });
    builder.add_transition(f1, Transition::Atom { target: f2, token: SEMI });
    builder.add_transition(f2, Transition::Rule { rule: stmt, follow: f_stop });

    let atn = builder.build().unwrap();
    let engine = CodeCompletion::new(&atn);

    // Parse of `KW ; KW` with the caret at the very end. Resolution
    // lands inside the trailing stmt; that rule is complete at the
    // caret, so viable candidates come from what may follow stmt
    // anywhere in the grammar.
    let tree = RuleNode::with_children(
        file,
        TokenSpan::new(0, 3),
        vec![
            RuleNode::leaf(stmt, TokenSpan::new(0, 1)),
            RuleNode::leaf(stmt, TokenSpan::new(2, 1)),
        ],
    );
    let tokens = [KW, SEMI, KW];
    let collection = engine
        .collect_candidates(3, &TokenSlice::new(&tokens), Some(&tree))
        .unwrap();

    assert_eq!(token_keys(&collection), vec![SEMI]);
}

#[test]
fn context_rule_outside_the_network_is_rejected() {
    let atn = sequence_grammar();
    let engine = CodeCompletion::new(&atn);
    let tree = RuleNode::leaf(RuleId::new(99), TokenSpan::new(0, 1));
    let tokens = [A];
    let result = engine.collect_candidates(0, &TokenSlice::new(&tokens), Some(&tree));
    assert_eq!(result, Err(CompletionError::UnknownContextRule { rule: 99 }));
}
