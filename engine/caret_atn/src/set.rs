//! Interval sets over token types.
//!
//! Set transitions and follow sets label whole ranges of token types
//! (`'a'..'z'`, "any keyword"), so the natural representation is a
//! sorted list of inclusive intervals rather than a hash set. Most
//! labels are one or two intervals, hence the `SmallVec` backing.

use std::fmt;

use smallvec::SmallVec;

use crate::ids::TokenType;

/// An inclusive range of token types.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Interval {
    pub start: TokenType,
    pub end: TokenType,
}

impl Interval {
    /// Create an inclusive interval. `start` must be <= `end`.
    #[inline]
    pub const fn new(start: TokenType, end: TokenType) -> Self {
        Interval { start, end }
    }

    /// Single-token interval.
    #[inline]
    pub const fn of(token: TokenType) -> Self {
        Interval {
            start: token,
            end: token,
        }
    }

    #[inline]
    pub fn contains(&self, token: TokenType) -> bool {
        self.start <= token && token <= self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.end.raw() - self.start.raw()) as usize + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.raw())
        } else {
            write!(f, "{}..={}", self.start.raw(), self.end.raw())
        }
    }
}

/// A set of token types stored as sorted, disjoint, inclusive intervals.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct TokenSet {
    intervals: SmallVec<[Interval; 2]>,
}

impl TokenSet {
    /// Empty set.
    #[inline]
    pub fn new() -> Self {
        TokenSet::default()
    }

    /// Set containing a single token type.
    pub fn of(token: TokenType) -> Self {
        let mut set = TokenSet::new();
        set.insert(Interval::of(token));
        set
    }

    /// Set containing every token in `interval`.
    pub fn of_interval(interval: Interval) -> Self {
        let mut set = TokenSet::new();
        set.insert(interval);
        set
    }

    /// Insert an interval, merging with any adjacent or overlapping
    /// intervals so the representation stays sorted and disjoint.
    pub fn insert(&mut self, interval: Interval) {
        let mut merged = interval;
        let mut result: SmallVec<[Interval; 2]> = SmallVec::new();
        let mut placed = false;

        for existing in &self.intervals {
            if merged.end.raw().saturating_add(1) < existing.start.raw() {
                // Strictly before this interval.
                if !placed {
                    result.push(merged);
                    placed = true;
                }
                result.push(*existing);
            } else if existing.end.raw().saturating_add(1) < merged.start.raw() {
                // Strictly after this interval.
                result.push(*existing);
            } else {
                // Overlapping or adjacent: absorb.
                merged = Interval::new(
                    merged.start.min(existing.start),
                    merged.end.max(existing.end),
                );
            }
        }
        if !placed {
            result.push(merged);
        }
        self.intervals = result;
    }

    /// Add a single token type.
    #[inline]
    pub fn insert_token(&mut self, token: TokenType) {
        self.insert(Interval::of(token));
    }

    /// Union with another set.
    pub fn union_with(&mut self, other: &TokenSet) {
        for interval in &other.intervals {
            self.insert(*interval);
        }
    }

    #[inline]
    pub fn contains(&self, token: TokenType) -> bool {
        // Sorted and disjoint, so binary search on start works.
        match self
            .intervals
            .binary_search_by(|iv| iv.start.cmp(&token))
        {
            Ok(_) => true,
            Err(0) => false,
            Err(pos) => self.intervals[pos - 1].contains(token),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of token types in the set.
    pub fn len(&self) -> usize {
        self.intervals.iter().map(Interval::len).sum()
    }

    /// The member intervals, sorted and disjoint.
    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Iterate every member token type in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        self.intervals
            .iter()
            .flat_map(|iv| (iv.start.raw()..=iv.end.raw()).map(TokenType::new))
    }

    /// The complement over the user token range `1..=max_token`.
    ///
    /// Used for complement-matching set transitions; EOF is never a
    /// member of a complement.
    pub fn complement(&self, max_token: TokenType) -> TokenSet {
        let mut result = TokenSet::new();
        let mut next = TokenType::MIN_USER.raw();
        for interval in &self.intervals {
            if interval.start.raw() > next {
                result.insert(Interval::new(
                    TokenType::new(next),
                    TokenType::new(interval.start.raw() - 1),
                ));
            }
            next = next.max(interval.end.raw().saturating_add(1));
        }
        if next <= max_token.raw() {
            result.insert(Interval::new(TokenType::new(next), max_token));
        }
        result
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.intervals.iter()).finish()
    }
}

impl FromIterator<TokenType> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenType>>(iter: I) -> Self {
        let mut set = TokenSet::new();
        for token in iter {
            set.insert_token(token);
        }
        set
    }
}
