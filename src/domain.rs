//! Blocks of BDD variables that carry integer values.
//!
//! A [`Domain`] is a contiguous range of variables `base..base + len`.
//! A value `v` is encoded little-endian: bit `i` of `v` lives on variable `base + i`.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Domain {
    base: u32,
    len: u32,
}

impl Domain {
    pub const fn new(base: u32, len: u32) -> Self {
        assert!(base != 0, "Variable index should not be zero");
        Self { base, len }
    }

    pub const fn base(self) -> u32 {
        self.base
    }
    pub const fn len(self) -> u32 {
        self.len
    }
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
    /// One past the last variable of the block.
    pub const fn end(self) -> u32 {
        self.base + self.len
    }

    pub fn contains(self, var: u32) -> bool {
        self.base <= var && var < self.end()
    }

    /// Variable carrying bit `i`.
    pub fn var(self, i: u32) -> u32 {
        assert!(i < self.len, "Bit {} is out of domain {}", i, self);
        self.base + i
    }

    pub fn vars(self) -> impl Iterator<Item = u32> {
        self.base..self.end()
    }

    pub fn with_len(self, len: u32) -> Self {
        Self::new(self.base, len)
    }

    /// Same width, different base.
    pub fn at(self, base: u32) -> Self {
        Self::new(base, self.len)
    }

    /// The lowest `n` bits.
    pub fn prefix(self, n: u32) -> Self {
        assert!(n <= self.len);
        Self::new(self.base, n)
    }

    /// The highest `n` bits.
    pub fn suffix(self, n: u32) -> Self {
        assert!(n <= self.len);
        Self::new(self.end() - n, n)
    }

    pub fn overlaps(self, other: Domain) -> bool {
        !self.is_empty() && !other.is_empty() && self.base < other.end() && other.base < self.end()
    }

    /// Positional renaming of the shared low bits of `self` onto `other`.
    pub fn renaming_to(self, other: Domain) -> HashMap<u32, u32> {
        self.vars().zip(other.vars()).filter(|(a, b)| a != b).collect()
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}..x{}", self.base, self.end())
    }
}

/// Number of bits needed to encode the values `0..n`.
pub fn n_vars_needed(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        64 - (n - 1).leading_zeros()
    }
}
