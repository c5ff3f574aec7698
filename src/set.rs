//! Symbolic sets of integers over a [`Domain`].

use std::fmt::{Debug, Display, Formatter};
use std::ops::{BitAnd, BitOr, Not, Sub};
use std::rc::Rc;

use crate::bdd::Bdd;
use crate::domain::{n_vars_needed, Domain};
use crate::reference::Ref;
use crate::relation::Relation;

/// A set of integers, encoded as a boolean function over the bits of a [`Domain`].
///
/// Sets over different domains compare by value: the narrower one is
/// widened with absent high bits.
#[derive(Clone)]
pub struct Set {
    bdd: Rc<Bdd>,
    domain: Domain,
    node: Ref,
}

/// A set of automaton states.
pub type StateSet = Set;

impl Set {
    pub fn new(bdd: &Rc<Bdd>, domain: Domain, node: Ref) -> Self {
        Self {
            bdd: Rc::clone(bdd),
            domain,
            node,
        }
    }

    pub fn empty(bdd: &Rc<Bdd>, domain: Domain) -> Self {
        Self::new(bdd, domain, bdd.zero())
    }

    /// Every value representable in `domain`.
    pub fn full(bdd: &Rc<Bdd>, domain: Domain) -> Self {
        Self::new(bdd, domain, bdd.one())
    }

    pub fn singleton(bdd: &Rc<Bdd>, domain: Domain, value: u64) -> Self {
        Self::new(bdd, domain, bdd.mk_value(domain, value))
    }

    /// Values `lo..=hi`.
    pub fn range(bdd: &Rc<Bdd>, domain: Domain, lo: u64, hi: u64) -> Self {
        Self::new(bdd, domain, bdd.mk_range(domain, lo, hi))
    }

    pub fn from_values(bdd: &Rc<Bdd>, domain: Domain, values: impl IntoIterator<Item = u64>) -> Self {
        let node = bdd.apply_or_many(values.into_iter().map(|v| bdd.mk_value(domain, v)));
        Self::new(bdd, domain, node)
    }
}

impl Set {
    pub fn manager(&self) -> &Rc<Bdd> {
        &self.bdd
    }
    pub fn domain(&self) -> Domain {
        self.domain
    }
    pub fn node(&self) -> Ref {
        self.node
    }

    pub fn is_empty(&self) -> bool {
        self.bdd.is_zero(self.node)
    }

    pub fn contains(&self, value: u64) -> bool {
        if self.domain.len() < 64 && value >> self.domain.len() != 0 {
            return false;
        }
        let base = self.domain.base();
        self.bdd.evaluate(self.node, |v| {
            self.domain.contains(v) && v - base < 64 && (value >> (v - base)) & 1 == 1
        })
    }

    /// Number of values, saturating at `u64::MAX`.
    pub fn len(&self) -> u64 {
        self.bdd.sat_count_u64(self.node, self.domain.len() as usize)
    }

    /// All values in ascending order.
    pub fn values(&self) -> Vec<u64> {
        let mut out = Vec::new();
        self.collect(self.node, 0, 0, &mut out);
        out.sort_unstable();
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> {
        self.values().into_iter()
    }

    /// The smallest value, if any.
    pub fn first(&self) -> Option<u64> {
        self.values().first().copied()
    }

    fn collect(&self, f: Ref, bit: u32, prefix: u64, out: &mut Vec<u64>) {
        if self.bdd.is_zero(f) {
            return;
        }
        if bit == self.domain.len() {
            out.push(prefix);
            return;
        }
        let (f0, f1) = self.bdd.top_cofactors(f, self.domain.var(bit));
        self.collect(f0, bit + 1, prefix, out);
        self.collect(f1, bit + 1, prefix | (1 << bit), out);
    }

    /// Both sets moved onto a common domain.
    fn aligned(&self, other: &Set) -> (Domain, Ref, Ref) {
        assert!(
            Rc::ptr_eq(&self.bdd, &other.bdd),
            "Sets must be built in the same BDD manager"
        );
        if self.domain == other.domain {
            return (self.domain, self.node, other.node);
        }
        let domain = self.domain.with_len(self.domain.len().max(other.domain.len()));
        (domain, self.with_domain(domain).node, other.with_domain(domain).node)
    }

    pub fn union(&self, other: &Set) -> Set {
        let (domain, a, b) = self.aligned(other);
        Set::new(&self.bdd, domain, self.bdd.apply_or(a, b))
    }

    pub fn intersection(&self, other: &Set) -> Set {
        let (domain, a, b) = self.aligned(other);
        Set::new(&self.bdd, domain, self.bdd.apply_and(a, b))
    }

    pub fn difference(&self, other: &Set) -> Set {
        let (domain, a, b) = self.aligned(other);
        Set::new(&self.bdd, domain, self.bdd.apply_diff(a, b))
    }

    /// Complement within the values representable in the domain.
    pub fn complement(&self) -> Set {
        Set::new(&self.bdd, self.domain, -self.node)
    }

    pub fn is_subset(&self, other: &Set) -> bool {
        let (_, a, b) = self.aligned(other);
        self.bdd.is_implies(a, b)
    }

    pub fn intersects(&self, other: &Set) -> bool {
        !self.intersection(other).is_empty()
    }

    /// The same values over another domain.
    ///
    /// Growing fills the new high bits with zeros; shrinking requires the dropped bits to be unused.
    pub fn with_domain(&self, target: Domain) -> Set {
        if target == self.domain {
            return self.clone();
        }
        let bdd = &self.bdd;
        let shared = self.domain.len().min(target.len());
        let mut node = self.node;

        if self.domain.len() > shared {
            let dropped = self.domain.suffix(self.domain.len() - shared);
            assert!(
                bdd.is_implies(node, bdd.mk_value(dropped, 0)),
                "Set {} has values that do not fit into {}",
                self,
                target
            );
            node = bdd.exists(node, dropped);
        }

        node = bdd.rename_vars(node, &self.domain.prefix(shared).renaming_to(target.prefix(shared)));

        if target.len() > shared {
            node = bdd.apply_and(node, bdd.mk_value(target.suffix(target.len() - shared), 0));
        }

        Set::new(bdd, target, node)
    }

    /// Widen to `target`, setting every added bit to `bit`.
    pub fn extend_domain(&self, target: Domain, bit: bool) -> Set {
        assert!(
            target.len() >= self.domain.len(),
            "Cannot extend {} to the narrower {}",
            self.domain,
            target
        );
        let moved = self.with_domain(target.prefix(self.domain.len()));
        let added = target.suffix(target.len() - self.domain.len());
        let fill = self
            .bdd
            .cube(added.vars().map(|v| if bit { v as i32 } else { -(v as i32) }));
        Set::new(&self.bdd, target, self.bdd.apply_and(moved.node, fill))
    }

    /// Bijection from the values of the set to `0..len`, preserving order.
    ///
    /// The result is a binary relation over `[self.domain(), index]`, where the index
    /// domain starts right after `self.domain()`.
    pub fn compress(&self) -> Relation {
        let values = self.values();
        let index = Domain::new(self.domain.end(), n_vars_needed(values.len() as u64));
        let node = self.bdd.apply_or_many(values.iter().enumerate().map(|(i, &v)| {
            self.bdd
                .apply_and(self.bdd.mk_value(self.domain, v), self.bdd.mk_value(index, i as u64))
        }));
        Relation::new(&self.bdd, vec![self.domain, index], node)
    }

    /// Image of the set under a binary relation; the result keeps the base of `self.domain()`.
    pub fn compose(&self, map: &Relation) -> Set {
        Relation::new(&self.bdd, vec![self.domain], self.node)
            .compose(0, map)
            .project_on(0)
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        let (_, a, b) = self.aligned(other);
        a == b
    }
}

impl Eq for Set {}

impl Display for Set {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Set {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let values = if self.len() <= 64 {
            self.to_string()
        } else {
            format!("<{} values>", self.len())
        };
        f.debug_struct("Set")
            .field("domain", &self.domain)
            .field("values", &values)
            .finish()
    }
}

macro_rules! set_binop {
    ($trait:ident, $method:ident, $impl:ident) => {
        impl $trait for &Set {
            type Output = Set;

            fn $method(self, rhs: &Set) -> Set {
                self.$impl(rhs)
            }
        }

        impl $trait for Set {
            type Output = Set;

            fn $method(self, rhs: Set) -> Set {
                self.$impl(&rhs)
            }
        }
    };
}

set_binop!(BitOr, bitor, union);
set_binop!(BitAnd, bitand, intersection);
set_binop!(Sub, sub, difference);

impl Not for &Set {
    type Output = Set;

    fn not(self) -> Set {
        self.complement()
    }
}

impl Not for Set {
    type Output = Set;

    fn not(self) -> Set {
        self.complement()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn setup() -> (Rc<Bdd>, Domain) {
        (Rc::new(Bdd::default()), Domain::new(1, 3))
    }

    #[test]
    fn test_values() {
        let (bdd, d) = setup();
        let s = Set::from_values(&bdd, d, [5, 1, 6]);
        assert_eq!(s.values(), vec![1, 5, 6]);
        assert_eq!(s.len(), 3);
        assert!(s.contains(5));
        assert!(!s.contains(4));
        assert!(!s.contains(9));
        assert_eq!(s.first(), Some(1));
        assert_eq!(s.to_string(), "{1, 5, 6}");
    }

    #[test]
    fn test_empty_and_full() {
        let (bdd, d) = setup();
        assert!(Set::empty(&bdd, d).is_empty());
        assert_eq!(Set::full(&bdd, d).len(), 8);
        assert_eq!(Set::empty(&bdd, d).first(), None);

        // A zero-width domain holds exactly the value 0.
        let point = Domain::new(1, 0);
        assert_eq!(Set::full(&bdd, point).values(), vec![0]);
        assert_eq!(Set::singleton(&bdd, point, 0), Set::full(&bdd, point));
    }

    #[test]
    fn test_boolean_ops() {
        let (bdd, d) = setup();
        let a = Set::range(&bdd, d, 1, 4);
        let b = Set::from_values(&bdd, d, [0, 2, 4, 6]);
        assert_eq!((&a | &b).values(), vec![0, 1, 2, 3, 4, 6]);
        assert_eq!((&a & &b).values(), vec![2, 4]);
        assert_eq!((&a - &b).values(), vec![1, 3]);
        assert_eq!((!&a).values(), vec![0, 5, 6, 7]);
        assert!((&a & &b).is_subset(&a));
        assert!(!a.is_subset(&b));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_equality_across_domains() {
        let bdd = Rc::new(Bdd::default());
        let narrow = Set::from_values(&bdd, Domain::new(1, 2), [1, 3]);
        let wide = Set::from_values(&bdd, Domain::new(1, 4), [1, 3]);
        let moved = Set::from_values(&bdd, Domain::new(20, 2), [1, 3]);
        assert_eq!(narrow, wide);
        assert_eq!(narrow, moved);
        assert_ne!(wide, Set::from_values(&bdd, Domain::new(1, 4), [1, 3, 9]));
    }

    #[test]
    fn test_with_domain() {
        let (bdd, d) = setup();
        let s = Set::from_values(&bdd, d, [2, 3]);
        let wide = s.with_domain(Domain::new(10, 5));
        assert_eq!(wide.domain(), Domain::new(10, 5));
        assert_eq!(wide.values(), vec![2, 3]);
        assert_eq!(wide.len(), 2);

        let narrow = s.with_domain(Domain::new(4, 2));
        assert_eq!(narrow.values(), vec![2, 3]);

        // Overlapping source and target blocks.
        let shifted = s.with_domain(Domain::new(2, 3));
        assert_eq!(shifted.values(), vec![2, 3]);
    }

    #[test]
    #[should_panic(expected = "do not fit")]
    fn test_with_domain_too_narrow() {
        let (bdd, d) = setup();
        Set::from_values(&bdd, d, [6]).with_domain(Domain::new(1, 2));
    }

    #[test]
    fn test_extend_domain() {
        let bdd = Rc::new(Bdd::default());
        let s = Set::from_values(&bdd, Domain::new(1, 2), [1, 2]);
        assert_eq!(s.extend_domain(Domain::new(1, 3), false).values(), vec![1, 2]);
        assert_eq!(s.extend_domain(Domain::new(1, 3), true).values(), vec![5, 6]);
        assert_eq!(s.extend_domain(Domain::new(1, 4), true).values(), vec![13, 14]);
    }

    #[test]
    fn test_compress() {
        let (bdd, d) = setup();
        let s = Set::from_values(&bdd, d, [1, 4, 6]);
        let map = s.compress();
        assert_eq!(map.domain(1).len(), 2);

        let image = s.compose(&map);
        assert_eq!(image.values(), vec![0, 1, 2]);
        assert_eq!(image.domain(), Domain::new(1, 2));

        let part = Set::from_values(&bdd, d, [4, 6, 7]);
        assert_eq!(part.compose(&map).values(), vec![1, 2]);
    }

    #[test]
    fn test_compress_empty() {
        let (bdd, d) = setup();
        let map = Set::empty(&bdd, d).compress();
        assert!(map.is_empty());
    }
}
