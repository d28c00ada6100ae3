//! Stack headroom for the recursive rule descent.
//!
//! The cycle guard bounds how often rules are re-entered, but a grammar
//! with deep (non-cyclic) nesting still produces proportionally deep
//! native recursion. Growing the stack on demand keeps that a memory
//! cost instead of an abort.

/// Remaining stack below this triggers a growth.
const RED_ZONE: usize = 64 * 1024;

/// Additional stack allocated per growth.
const STACK_GROWTH: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the red zone has been reached.
#[inline]
pub(crate) fn with_stack_headroom<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_GROWTH, f)
}
