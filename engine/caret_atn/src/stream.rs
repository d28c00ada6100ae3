//! Token stream contract.
//!
//! The engine sees tokens only as types at integer positions; the
//! lexer that produced them, their text, and their spans stay with the
//! external runtime. Reading past the last index is the end-of-stream
//! condition, not an error.

use crate::ids::TokenType;

/// A finite sequence of token types, indexable by position.
pub trait TokenStream {
    /// Number of tokens in the stream.
    fn len(&self) -> usize;

    /// The token type at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<TokenType>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A token stream backed by a slice.
#[derive(Copy, Clone, Debug)]
pub struct TokenSlice<'a> {
    tokens: &'a [TokenType],
}

impl<'a> TokenSlice<'a> {
    #[inline]
    pub fn new(tokens: &'a [TokenType]) -> Self {
        TokenSlice { tokens }
    }
}

impl TokenStream for TokenSlice<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    fn get(&self, index: usize) -> Option<TokenType> {
        self.tokens.get(index).copied()
    }
}

impl<'a> From<&'a [TokenType]> for TokenSlice<'a> {
    fn from(tokens: &'a [TokenType]) -> Self {
        TokenSlice::new(tokens)
    }
}
