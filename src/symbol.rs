//! Symbolic subsets of the alphabet.
//!
//! Symbols are bit vectors; symbol bit `i` (1-indexed, like BDD variables) always lives
//! on the BDD variable `ALPHABET_BASE + i - 1`. Since every symbol set uses the same
//! block, two sets are equal iff their nodes are equal.

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not, Sub};
use std::rc::Rc;

use crate::bdd::Bdd;
use crate::domain::Domain;
use crate::layout::{symbol_domain, ALPHABET_BASE};
use crate::reference::Ref;

#[derive(Clone)]
pub struct SymbolSet {
    bdd: Rc<Bdd>,
    node: Ref,
}

impl SymbolSet {
    /// Wrap a function over the alphabet block.
    pub fn new(bdd: &Rc<Bdd>, node: Ref) -> Self {
        Self {
            bdd: Rc::clone(bdd),
            node,
        }
    }

    pub fn empty(bdd: &Rc<Bdd>) -> Self {
        Self::new(bdd, bdd.zero())
    }

    pub fn universal(bdd: &Rc<Bdd>) -> Self {
        Self::new(bdd, bdd.one())
    }

    /// Symbols whose bit `bit` is set.
    pub fn var(bdd: &Rc<Bdd>, bit: u32) -> Self {
        assert_ne!(bit, 0, "Symbol bits are 1-indexed");
        Self::new(bdd, bdd.mk_var(symbol_domain(Domain::new(bit, 1)).base()))
    }

    /// Symbols whose `bits` encode `value`.
    pub fn value(bdd: &Rc<Bdd>, bits: Domain, value: u64) -> Self {
        Self::new(bdd, bdd.mk_value(symbol_domain(bits), value))
    }

    pub fn values(bdd: &Rc<Bdd>, bits: Domain, values: impl IntoIterator<Item = u64>) -> Self {
        let domain = symbol_domain(bits);
        Self::new(bdd, bdd.apply_or_many(values.into_iter().map(|v| bdd.mk_value(domain, v))))
    }
}

impl SymbolSet {
    pub fn manager(&self) -> &Rc<Bdd> {
        &self.bdd
    }
    pub fn node(&self) -> Ref {
        self.node
    }

    pub fn is_empty(&self) -> bool {
        self.bdd.is_zero(self.node)
    }

    pub fn is_universal(&self) -> bool {
        self.bdd.is_one(self.node)
    }

    /// Whether some symbol with `bits` encoding `value` belongs to the set.
    pub fn contains(&self, bits: Domain, value: u64) -> bool {
        !self.intersection(&SymbolSet::value(&self.bdd, bits, value)).is_empty()
    }

    /// Membership of a concrete symbol; `symbol[i]` is bit `i + 1`, missing bits are unset.
    pub fn contains_symbol(&self, symbol: &[bool]) -> bool {
        self.bdd.evaluate(self.node, |v| {
            v >= ALPHABET_BASE && symbol.get((v - ALPHABET_BASE) as usize).copied().unwrap_or(false)
        })
    }

    pub fn union(&self, other: &SymbolSet) -> SymbolSet {
        SymbolSet::new(&self.bdd, self.bdd.apply_or(self.node, other.node))
    }

    pub fn intersection(&self, other: &SymbolSet) -> SymbolSet {
        SymbolSet::new(&self.bdd, self.bdd.apply_and(self.node, other.node))
    }

    pub fn difference(&self, other: &SymbolSet) -> SymbolSet {
        SymbolSet::new(&self.bdd, self.bdd.apply_diff(self.node, other.node))
    }

    pub fn complement(&self) -> SymbolSet {
        SymbolSet::new(&self.bdd, -self.node)
    }

    pub fn is_subset(&self, other: &SymbolSet) -> bool {
        self.bdd.is_implies(self.node, other.node)
    }

    /// Abstract the given symbol bits away.
    pub fn project(&self, bits: Domain) -> SymbolSet {
        SymbolSet::new(&self.bdd, self.bdd.exists(self.node, symbol_domain(bits)))
    }

    /// Rename symbol bits (1-indexed) simultaneously.
    pub fn rename(&self, map: &HashMap<u32, u32>) -> SymbolSet {
        SymbolSet::new(&self.bdd, self.bdd.rename_vars(self.node, &symbol_renaming(map)))
    }
}

/// Symbol-bit renaming as a renaming of BDD variables.
pub(crate) fn symbol_renaming(map: &HashMap<u32, u32>) -> HashMap<u32, u32> {
    let var = |bit: u32| symbol_domain(Domain::new(bit, 1)).base();
    map.iter().map(|(&a, &b)| (var(a), var(b))).collect()
}

impl PartialEq for SymbolSet {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for SymbolSet {}

impl Hash for SymbolSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl Display for SymbolSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "∅")
        } else if self.is_universal() {
            write!(f, "Σ")
        } else {
            write!(f, "{}", self.node)
        }
    }
}

impl Debug for SymbolSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymbolSet({})", self)
    }
}

macro_rules! symbol_binop {
    ($trait:ident, $method:ident, $impl:ident) => {
        impl $trait for &SymbolSet {
            type Output = SymbolSet;

            fn $method(self, rhs: &SymbolSet) -> SymbolSet {
                self.$impl(rhs)
            }
        }

        impl $trait for SymbolSet {
            type Output = SymbolSet;

            fn $method(self, rhs: SymbolSet) -> SymbolSet {
                self.$impl(&rhs)
            }
        }
    };
}

symbol_binop!(BitOr, bitor, union);
symbol_binop!(BitAnd, bitand, intersection);
symbol_binop!(Sub, sub, difference);

impl Not for &SymbolSet {
    type Output = SymbolSet;

    fn not(self) -> SymbolSet {
        self.complement()
    }
}

impl Not for SymbolSet {
    type Output = SymbolSet;

    fn not(self) -> SymbolSet {
        self.complement()
    }
}
