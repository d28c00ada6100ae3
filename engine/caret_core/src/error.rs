//! Engine error types.
//!
//! The candidate computation itself never fails for a well-formed
//! network: cycles are handled structurally and end-of-input is a legal
//! caret position. Caller-facing errors are contract violations on the
//! inputs, which are surfaced rather than clamped or ignored.

use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
pub enum CompletionError {
    /// The caret must lie in `0..=token_count`; `token_count` itself is
    /// the legal end-of-input position.
    #[error("caret token index {caret} is out of range for a stream of {token_count} tokens")]
    CaretOutOfRange { caret: usize, token_count: usize },

    /// The supplied parse tree names a rule the network does not have.
    /// The tree and the network must come from the same grammar.
    #[error("context rule index {rule} is not part of the network")]
    UnknownContextRule { rule: u32 },
}
