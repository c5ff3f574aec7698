//! Symbolic relations of arbitrary arity.
//!
//! A [`Relation`] assigns one [`Domain`] to every position. Positions never share
//! variables, so restricting, projecting and composing are plain BDD operations.

use std::fmt::{Debug, Formatter};
use std::ops::{BitAnd, BitOr, Sub};
use std::rc::Rc;

use crate::bdd::Bdd;
use crate::domain::Domain;
use crate::layout::alphabet_domain;
use crate::reference::Ref;
use crate::set::Set;
use crate::symbol::SymbolSet;

#[derive(Clone)]
pub struct Relation {
    bdd: Rc<Bdd>,
    domains: Vec<Domain>,
    node: Ref,
}

impl Relation {
    pub fn new(bdd: &Rc<Bdd>, domains: Vec<Domain>, node: Ref) -> Self {
        for (i, a) in domains.iter().enumerate() {
            for b in &domains[i + 1..] {
                assert!(!a.overlaps(*b), "Relation positions {} and {} overlap", a, b);
            }
        }
        Self {
            bdd: Rc::clone(bdd),
            domains,
            node,
        }
    }

    pub fn empty(bdd: &Rc<Bdd>, domains: Vec<Domain>) -> Self {
        Self::new(bdd, domains, bdd.zero())
    }

    /// Maps every element of `sets[i]` to `i`, encoded over `index`.
    ///
    /// The result is binary: `[element domain, index]`, with the element domain
    /// taken from the first set.
    pub fn enumeration(bdd: &Rc<Bdd>, sets: &[Set], index: Domain) -> Relation {
        assert!(!sets.is_empty(), "Cannot enumerate an empty list of sets");
        let domain = sets
            .iter()
            .map(|s| s.domain())
            .fold(sets[0].domain(), |acc, d| acc.with_len(acc.len().max(d.len())));
        let node = bdd.apply_or_many(
            sets.iter()
                .enumerate()
                .map(|(i, s)| bdd.apply_and(s.with_domain(domain).node(), bdd.mk_value(index, i as u64))),
        );
        Relation::new(bdd, vec![domain, index], node)
    }
}

impl Relation {
    pub fn manager(&self) -> &Rc<Bdd> {
        &self.bdd
    }
    pub fn node(&self) -> Ref {
        self.node
    }
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }
    pub fn domain(&self, pos: usize) -> Domain {
        self.domains[pos]
    }
    pub fn arity(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bdd.is_zero(self.node)
    }

    fn with_node(&self, node: Ref) -> Relation {
        Relation {
            bdd: Rc::clone(&self.bdd),
            domains: self.domains.clone(),
            node,
        }
    }

    fn check_compatible(&self, other: &Relation) {
        assert!(
            Rc::ptr_eq(&self.bdd, &other.bdd),
            "Relations must be built in the same BDD manager"
        );
        assert_eq!(self.domains, other.domains, "Relations must have the same domains");
    }

    pub fn union(&self, other: &Relation) -> Relation {
        self.check_compatible(other);
        self.with_node(self.bdd.apply_or(self.node, other.node))
    }

    pub fn intersection(&self, other: &Relation) -> Relation {
        self.check_compatible(other);
        self.with_node(self.bdd.apply_and(self.node, other.node))
    }

    pub fn difference(&self, other: &Relation) -> Relation {
        self.check_compatible(other);
        self.with_node(self.bdd.apply_diff(self.node, other.node))
    }

    /// Keep the tuples whose `pos`-th element belongs to `set`.
    pub fn restrict(&self, pos: usize, set: &Set) -> Relation {
        let set = set.with_domain(self.domains[pos]);
        self.with_node(self.bdd.apply_and(self.node, set.node()))
    }

    /// Keep the tuples whose `pos`-th element, a symbol, belongs to `symbols`.
    pub fn restrict_symbols(&self, pos: usize, symbols: &SymbolSet) -> Relation {
        assert_eq!(self.domains[pos], alphabet_domain(), "Position {} does not hold symbols", pos);
        self.with_node(self.bdd.apply_and(self.node, symbols.node()))
    }

    /// Quantify the `pos`-th position away; the arity is unchanged.
    pub fn project(&self, pos: usize) -> Relation {
        self.with_node(self.bdd.exists(self.node, self.domains[pos]))
    }

    /// The set of values occurring at `pos`.
    pub fn project_on(&self, pos: usize) -> Set {
        Set::new(&self.bdd, self.domains[pos], self.project_others(pos))
    }

    /// The symbols occurring at `pos`.
    pub fn symbols_on(&self, pos: usize) -> SymbolSet {
        assert_eq!(self.domains[pos], alphabet_domain(), "Position {} does not hold symbols", pos);
        SymbolSet::new(&self.bdd, self.project_others(pos))
    }

    fn project_others(&self, pos: usize) -> Ref {
        let mut node = self.node;
        for (i, &d) in self.domains.iter().enumerate() {
            if i != pos {
                node = self.bdd.exists(node, d);
            }
        }
        node
    }

    /// Move the `pos`-th position onto `target` (see [`Set::with_domain`]).
    pub fn with_domain(&self, pos: usize, target: Domain) -> Relation {
        let from = self.domains[pos];
        if from == target {
            return self.clone();
        }
        self.check_free(pos, target);

        let moved = Set::new(&self.bdd, from, self.node).with_domain(target);
        let mut res = self.with_node(moved.node());
        res.domains[pos] = target;
        res
    }

    /// Move every position onto the given domains.
    pub fn with_domains(&self, targets: &[Domain]) -> Relation {
        assert_eq!(targets.len(), self.arity(), "Arity mismatch");
        // Stage through the free variables above every block to avoid clashes.
        let top = self.domains.iter().chain(targets).map(|d| d.end()).fold(1, u32::max);
        let moving: Vec<usize> = (0..self.arity()).filter(|&pos| self.domains[pos] != targets[pos]).collect();
        let mut res = self.clone();
        let mut base = top;
        for &pos in &moving {
            res = res.with_domain(pos, Domain::new(base, targets[pos].len()));
            base += targets[pos].len();
        }
        for &pos in &moving {
            res = res.with_domain(pos, targets[pos]);
        }
        res
    }

    /// Widen the `pos`-th position to `target` (same base), setting added bits to `bit`.
    pub fn extend_domain(&self, pos: usize, target: Domain, bit: bool) -> Relation {
        let from = self.domains[pos];
        assert_eq!(from.base(), target.base(), "Extension must keep the base of {}", from);
        self.check_free(pos, target);

        let added = target.suffix(target.len() - from.len());
        let fill = self
            .bdd
            .cube(added.vars().map(|v| if bit { v as i32 } else { -(v as i32) }));
        let mut res = self.with_node(self.bdd.apply_and(self.node, fill));
        res.domains[pos] = target;
        res
    }

    /// Replace the `pos`-th element `x` by every `y` with `(x, y)` in the binary relation `map`.
    ///
    /// The new position keeps its base and takes the width of the image domain of `map`.
    pub fn compose(&self, pos: usize, map: &Relation) -> Relation {
        assert_eq!(map.arity(), 2, "Composition needs a binary relation");
        let bdd = &self.bdd;
        let from = self.domains[pos];
        let (mx, my) = (map.domains[0], map.domains[1]);
        assert_eq!(mx.len(), from.len(), "Cannot compose {} with a map from {}", from, mx);

        let target = from.with_len(my.len());
        self.check_free(pos, target);

        let top = self.domains.iter().chain(&map.domains).map(|d| d.end()).fold(1, u32::max);
        let scratch = Domain::new(top, my.len());

        let mut renaming = mx.renaming_to(from);
        renaming.extend(my.renaming_to(scratch));
        let moved = bdd.rename_vars(map.node, &renaming);
        let joined = bdd.rel_product(self.node, moved, from);
        let node = bdd.rename_vars(joined, &scratch.renaming_to(target));

        let mut res = self.with_node(node);
        res.domains[pos] = target;
        res
    }

    /// Swap the contents of positions `i` and `j`, which must have the same width.
    pub fn transpose(&self, i: usize, j: usize) -> Relation {
        let (a, b) = (self.domains[i], self.domains[j]);
        assert_eq!(a.len(), b.len(), "Cannot transpose {} and {}", a, b);
        let mut renaming = a.renaming_to(b);
        renaming.extend(b.renaming_to(a));
        self.with_node(self.bdd.rename_vars(self.node, &renaming))
    }

    fn check_free(&self, pos: usize, target: Domain) {
        for (i, d) in self.domains.iter().enumerate() {
            assert!(
                i == pos || !d.overlaps(target),
                "Domain {} overlaps position {} ({})",
                target,
                i,
                d
            );
        }
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.domains == other.domains && self.node == other.node
    }
}

impl Eq for Relation {}

impl Debug for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("domains", &self.domains)
            .field("node", &self.node)
            .finish()
    }
}

macro_rules! relation_binop {
    ($trait:ident, $method:ident, $impl:ident) => {
        impl $trait for &Relation {
            type Output = Relation;

            fn $method(self, rhs: &Relation) -> Relation {
                self.$impl(rhs)
            }
        }

        impl $trait for Relation {
            type Output = Relation;

            fn $method(self, rhs: Relation) -> Relation {
                self.$impl(&rhs)
            }
        }
    };
}

relation_binop!(BitOr, bitor, union);
relation_binop!(BitAnd, bitand, intersection);
relation_binop!(Sub, sub, difference);
