//! Regular relations: synchronous relations between words, read by one automaton.
//!
//! A [`RegularRelation`] of arity `n` assigns each of its `n` tracks a block of symbol bits.
//! A word of the automaton spells all tracks at once, letter by letter, so a tuple of equal
//! length words is in the relation iff the automaton accepts their convolution. Symbol
//! bits outside the tracks are left unconstrained.
//!
//! A [`RegularSet`] is the one-track case.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use log::debug;

use crate::automaton::WordAutomaton;
use crate::bdd::Bdd;
use crate::bnfa::BNfa;
use crate::domain::Domain;
use crate::symbol::SymbolSet;

#[derive(Clone)]
pub struct RegularRelation {
    domains: Vec<Domain>,
    automaton: BNfa,
}

impl RegularRelation {
    /// Relation over the given tracks (blocks of symbol bits) accepted by `automaton`.
    pub fn new(domains: Vec<Domain>, automaton: BNfa) -> Self {
        for (i, a) in domains.iter().enumerate() {
            for b in &domains[i + 1..] {
                assert!(!a.overlaps(*b), "Tracks {} and {} overlap", a, b);
            }
        }
        Self { domains, automaton }
    }

    pub fn empty(bdd: &Rc<Bdd>, domains: Vec<Domain>) -> Self {
        Self::new(domains, BNfa::empty(bdd))
    }

    /// Every tuple of equal length words.
    pub fn universal(bdd: &Rc<Bdd>, domains: Vec<Domain>) -> Self {
        Self::new(domains, BNfa::universal(bdd))
    }

    /// The identity between tracks `from` and `to`, restricted to `to` in `set`.
    pub fn copy(from: Domain, to: Domain, set: &RegularSet) -> Self {
        assert_eq!(from.len(), to.len(), "Cannot copy {} into {}", from, to);
        let bdd = set.manager();
        let same = from
            .vars()
            .zip(to.vars())
            .map(|(x, y)| {
                let (x, y) = (SymbolSet::var(bdd, x), SymbolSet::var(bdd, y));
                &(&x & &y) | &(&!&x & &!&y)
            })
            .fold(SymbolSet::universal(bdd), |acc, eq| &acc & &eq);

        let mut identity = BNfa::new(bdd);
        let q = identity.add_state(true, true);
        identity.add_edge(q, &same, q);
        Self::new(vec![from, to], identity).restrict(1, set)
    }

    pub fn manager(&self) -> &Rc<Bdd> {
        self.automaton.manager()
    }

    pub fn arity(&self) -> usize {
        self.domains.len()
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn automaton(&self) -> &BNfa {
        &self.automaton
    }

    pub fn is_empty(&self) -> bool {
        self.automaton.is_false()
    }

    /// The same relation with every track moved to the matching entry of `targets`.
    pub fn with_domains(&self, targets: &[Domain]) -> RegularRelation {
        assert_eq!(targets.len(), self.arity(), "Arity mismatch");
        let mut map = HashMap::new();
        for (from, to) in self.domains.iter().zip(targets) {
            assert_eq!(from.len(), to.len(), "Cannot move track {} to {}", from, to);
            map.extend(from.renaming_to(*to));
        }
        let automaton = if map.is_empty() {
            self.automaton.clone()
        } else {
            self.automaton.rename(&map)
        };
        Self::new(targets.to_vec(), automaton)
    }

    /// `other` moved onto the tracks of `self`.
    fn aligned(&self, other: &RegularRelation) -> BNfa {
        assert!(
            Rc::ptr_eq(self.manager(), other.manager()),
            "Relations must be built in the same BDD manager"
        );
        other.with_domains(&self.domains).automaton
    }

    pub fn union(&self, other: &RegularRelation) -> RegularRelation {
        Self::new(self.domains.clone(), &self.automaton | &self.aligned(other))
    }

    pub fn intersection(&self, other: &RegularRelation) -> RegularRelation {
        Self::new(self.domains.clone(), &self.automaton & &self.aligned(other))
    }

    pub fn difference(&self, other: &RegularRelation) -> RegularRelation {
        Self::new(self.domains.clone(), &self.automaton - &self.aligned(other))
    }

    /// Tuples whose `pos`-th word lies in `set`.
    pub fn restrict(&self, pos: usize, set: &RegularSet) -> RegularRelation {
        let set = set.relation.with_domains(&[self.domains[pos]]);
        Self::new(self.domains.clone(), &self.automaton & &set.automaton)
    }

    /// Drop the `pos`-th track.
    pub fn project(&self, pos: usize) -> RegularRelation {
        let mut domains = self.domains.clone();
        let dropped = domains.remove(pos);
        Self::new(domains, self.automaton.project(dropped))
    }

    /// Replace the `pos`-th word `x` by every `y` with `(x, y)` in the binary relation `map`.
    pub fn compose(&self, pos: usize, map: &RegularRelation) -> RegularRelation {
        assert_eq!(map.arity(), 2, "Composition needs a binary relation");
        let track = self.domains[pos];
        assert_eq!(map.domains[0].len(), track.len(), "Cannot compose {} with a map from {}", track, map.domains[0]);
        assert_eq!(map.domains[1].len(), track.len(), "Cannot compose {} with a map into {}", track, map.domains[1]);

        // A track above every bit either side uses.
        let top = self.domains.iter().chain(&map.domains).map(|d| d.end()).fold(1, u32::max);
        let middle = Domain::new(top, track.len());
        debug!("compose: track {} through {}", track, middle);

        let mut moved = self.domains.clone();
        moved[pos] = middle;
        let lhs = self.with_domains(&moved);
        let rhs = map.with_domains(&[middle, track]);

        let joined = &lhs.automaton & &rhs.automaton;
        Self::new(self.domains.clone(), joined.project(middle))
    }

    /// Words related to some word of `set` by a binary relation.
    pub fn image(&self, set: &RegularSet) -> RegularSet {
        assert_eq!(self.arity(), 2, "Image needs a binary relation");
        RegularSet {
            relation: self.restrict(0, set).project(0),
        }
    }

    /// Words related to some word of `set`, read backwards through a binary relation.
    pub fn preimage(&self, set: &RegularSet) -> RegularSet {
        assert_eq!(self.arity(), 2, "Preimage needs a binary relation");
        RegularSet {
            relation: self.restrict(1, set).project(1),
        }
    }

    pub fn is_subset_of(&self, other: &RegularRelation) -> bool {
        self.automaton.is_subset_of(&self.aligned(other))
    }
}

impl PartialEq for RegularRelation {
    fn eq(&self, other: &Self) -> bool {
        self.arity() == other.arity() && self.automaton == self.aligned(other)
    }
}

impl Debug for RegularRelation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegularRelation")
            .field("domains", &self.domains)
            .field("automaton", &self.automaton)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct RegularSet {
    relation: RegularRelation,
}

impl RegularSet {
    pub fn new(domain: Domain, automaton: BNfa) -> Self {
        Self {
            relation: RegularRelation::new(vec![domain], automaton),
        }
    }

    pub fn empty(bdd: &Rc<Bdd>, domain: Domain) -> Self {
        Self::new(domain, BNfa::empty(bdd))
    }

    pub fn universal(bdd: &Rc<Bdd>, domain: Domain) -> Self {
        Self::new(domain, BNfa::universal(bdd))
    }

    pub fn manager(&self) -> &Rc<Bdd> {
        self.relation.manager()
    }

    pub fn domain(&self) -> Domain {
        self.relation.domains[0]
    }

    pub fn automaton(&self) -> &BNfa {
        &self.relation.automaton
    }

    pub fn as_relation(&self) -> &RegularRelation {
        &self.relation
    }

    pub fn is_empty(&self) -> bool {
        self.relation.is_empty()
    }

    pub fn with_domain(&self, target: Domain) -> RegularSet {
        Self {
            relation: self.relation.with_domains(&[target]),
        }
    }

    pub fn union(&self, other: &RegularSet) -> RegularSet {
        Self {
            relation: self.relation.union(&other.relation),
        }
    }

    pub fn intersection(&self, other: &RegularSet) -> RegularSet {
        Self {
            relation: self.relation.intersection(&other.relation),
        }
    }

    pub fn difference(&self, other: &RegularSet) -> RegularSet {
        Self {
            relation: self.relation.difference(&other.relation),
        }
    }

    pub fn is_subset_of(&self, other: &RegularSet) -> bool {
        self.relation.is_subset_of(&other.relation)
    }
}

impl Debug for RegularSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegularSet")
            .field("domain", &self.domain())
            .field("automaton", self.automaton())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// Automaton accepting the one-letter words over `on`.
    fn letter(on: &SymbolSet) -> BNfa {
        BNfa::symbol(on.manager(), on)
    }

    #[test]
    fn test_relations_on_different_tracks_are_equal() {
        let bdd = Rc::new(Bdd::default());
        let nfa0 = letter(&SymbolSet::var(&bdd, 1));
        let nfa2 = letter(&SymbolSet::var(&bdd, 3));
        assert!(nfa0 != nfa2);

        let rel0 = RegularRelation::new(vec![Domain::new(1, 1), Domain::new(2, 1)], nfa0);
        let rel2 = RegularRelation::new(vec![Domain::new(3, 1), Domain::new(4, 1)], nfa2.clone());
        assert_eq!(rel0, rel2);

        let moved = rel0.with_domains(rel2.domains());
        assert!(*moved.automaton() == nfa2);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn test_overlapping_tracks() {
        let bdd = Rc::new(Bdd::default());
        RegularRelation::empty(&bdd, vec![Domain::new(1, 2), Domain::new(2, 2)]);
    }

    #[test]
    fn test_compose() {
        let bdd = Rc::new(Bdd::default());
        let (d1, d2) = (Domain::new(1, 2), Domain::new(3, 2));
        let pair = |x: u64, y: u64| &SymbolSet::value(&bdd, d1, x) & &SymbolSet::value(&bdd, d2, y);

        let rel01 = RegularRelation::new(vec![d1, d2], letter(&pair(0, 1)));
        let rel12 = RegularRelation::new(vec![d1, d2], letter(&pair(1, 2)));
        let rel02 = RegularRelation::new(vec![d1, d2], letter(&pair(0, 2)));

        let composed = rel01.compose(1, &rel12);
        assert_eq!(composed.domains(), &[d1, d2]);
        assert_eq!(composed, rel02);
        assert!(rel01.compose(1, &rel01).is_empty());
    }

    #[test]
    fn test_image_and_preimage() {
        let bdd = Rc::new(Bdd::default());
        let (d1, d2) = (Domain::new(1, 2), Domain::new(3, 2));
        let value = |d: Domain, v: u64| SymbolSet::value(&bdd, d, v);

        // Increment every letter of a word, modulo 4.
        let step = (0..4)
            .map(|v| &value(d1, v) & &value(d2, (v + 1) % 4))
            .fold(SymbolSet::empty(&bdd), |acc, s| &acc | &s);
        let mut inc = BNfa::new(&bdd);
        let q = inc.add_state(true, true);
        inc.add_edge(q, &step, q);
        let inc = RegularRelation::new(vec![d1, d2], inc);

        // Words of zeros on the first track, and of ones on the second.
        let zeros = RegularSet::new(d1, letter(&value(d1, 0)).kleene());
        let ones = RegularSet::new(d2, letter(&value(d2, 1)).kleene());

        let image = inc.image(&zeros);
        assert_eq!(image.domain(), d2);
        assert_eq!(image, ones);
        assert_eq!(inc.preimage(&ones), zeros);
        assert!(inc.image(&RegularSet::empty(&bdd, d1)).is_empty());
    }

    #[test]
    fn test_copy() {
        let bdd = Rc::new(Bdd::default());
        let (d1, d2) = (Domain::new(1, 1), Domain::new(2, 1));
        let x = SymbolSet::var(&bdd, 2);
        let words = RegularSet::new(d2, letter(&x).kleene());

        let copy = RegularRelation::copy(d1, d2, &words);
        assert_eq!(copy.arity(), 2);
        assert_eq!(copy.image(&words.with_domain(d1)), words);
        assert_eq!(copy.project(1), RegularRelation::new(vec![d1], letter(&SymbolSet::var(&bdd, 1)).kleene()));
    }

    #[test]
    fn test_boolean_operations() {
        let bdd = Rc::new(Bdd::default());
        let d = Domain::new(1, 1);
        let x = RegularSet::new(d, letter(&SymbolSet::var(&bdd, 1)));
        let not_x = RegularSet::new(d, letter(&!&SymbolSet::var(&bdd, 1)));
        let any = RegularSet::new(d, letter(&SymbolSet::universal(&bdd)));

        assert_eq!(x.union(&not_x), any);
        assert!(x.intersection(&not_x).is_empty());
        assert_eq!(any.difference(&x), not_x);
        assert!(x.is_subset_of(&any));
        assert!(!any.is_subset_of(&x));
    }
}
