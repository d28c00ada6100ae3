//! Arena index newtypes for the transition network.
//!
//! States and rules are held in contiguous arenas and referenced by
//! `u32` indices instead of pointers:
//! - Equality: O(1) integer compare
//! - Cycle guards hash plain integers, not object identity
//! - Cache locality: indices into contiguous arrays

use std::fmt;

/// Index of a state in the network's state arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct StateId(u32);

impl StateId {
    /// Invalid state ID (sentinel value).
    pub const INVALID: StateId = StateId(u32::MAX);

    /// Create a new `StateId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        StateId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a valid ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "StateId({})", self.0)
        } else {
            write!(f, "StateId::INVALID")
        }
    }
}

/// Index of a grammar rule.
///
/// Rule identifiers are grammar-static: they never change for the
/// lifetime of a network, which is what makes call-stack signatures
/// finite and hashable.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct RuleId(u32);

impl RuleId {
    /// Invalid rule ID (sentinel value).
    pub const INVALID: RuleId = RuleId(u32::MAX);

    /// Create a new `RuleId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        RuleId(index)
    }

    /// Get the index into the rule tables.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a valid ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "RuleId({})", self.0)
        } else {
            write!(f, "RuleId::INVALID")
        }
    }
}

/// A lexer token type.
///
/// Token type `0` is reserved for end-of-input; user-defined token
/// types start at [`TokenType::MIN_USER`] and run up to the network's
/// `max_token_type`, inclusive.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TokenType(u16);

impl TokenType {
    /// End-of-input marker.
    pub const EOF: TokenType = TokenType(0);

    /// Smallest user-defined token type.
    pub const MIN_USER: TokenType = TokenType(1);

    /// Create a new `TokenType`.
    #[inline]
    pub const fn new(raw: u16) -> Self {
        TokenType(raw)
    }

    /// Get the raw u16 value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Check whether this is a user-defined token type (not EOF).
    #[inline]
    pub const fn is_user(self) -> bool {
        self.0 >= Self::MIN_USER.0
    }
}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::EOF {
            write!(f, "TokenType::EOF")
        } else {
            write!(f, "TokenType({})", self.0)
        }
    }
}
