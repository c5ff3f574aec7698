use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// Handle to a node in the [`Bdd`][crate::bdd::Bdd] storage.
///
/// The lowest bit is the complement mark, the remaining bits are the node index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Ref(u32);

impl Ref {
    /// Placeholder for "no node yet".
    pub const INVALID: Ref = Ref(u32::MAX);

    pub const fn new(index: u32, negated: bool) -> Self {
        Self((index << 1) | negated as u32)
    }

    pub const fn positive(index: u32) -> Self {
        Self::new(index, false)
    }

    pub const fn negative(index: u32) -> Self {
        Self::new(index, true)
    }
}

impl Ref {
    /// Return the index of the referenced node.
    pub const fn index(self) -> u32 {
        self.0 >> 1
    }

    pub const fn is_negated(self) -> bool {
        self.0 & 1 != 0
    }

    /// Return the internal representation of the reference.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Return the non-negated version of this reference.
    pub const fn regular(self) -> Self {
        Self(self.0 & !1)
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index())
    }
}
