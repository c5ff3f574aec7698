use std::cmp::Ordering;
use std::ops::{BitAnd, BitOr, Mul, Not, Sub};

use log::debug;

use super::{BNfa, Determinism};
use crate::automaton::WordAutomaton;
use crate::layout::{dest_domain, state_domain, transition_domains, MAX_STATE_VARS};
use crate::relation::Relation;
use crate::set::{Set, StateSet};
use crate::symbol::SymbolSet;

impl BNfa {
    /// The sub-automaton induced by `keep`, renumbered densely in the order of the old indices.
    pub fn filter_states(&self, keep: &StateSet) -> BNfa {
        let keep = (&self.states & keep).with_domain(self.state_domain());
        if keep.is_empty() {
            return BNfa::new(&self.bdd);
        }
        let n = keep.len() as u32;
        debug!("filter_states: keeping {} of {} states", n, self.n_states);

        let map = keep.compress();
        let mut res = BNfa::with_n_states(&self.bdd, n);
        res.starting = self.starting.compose(&map);
        res.accepting = self.accepting.compose(&map);
        res.transitions = self.transitions.compose(0, &map).compose(2, &map);
        res
    }

    pub fn filter_states_live(&self) -> BNfa {
        self.filter_states(&self.states_live())
    }

    pub fn filter_states_reachable(&self) -> BNfa {
        self.filter_states(&self.states_reachable())
    }

    pub fn filter_states_productive(&self) -> BNfa {
        self.filter_states(&self.states_productive())
    }

    /// Kleene star.
    pub fn kleene(&self) -> BNfa {
        let mut res = self.clone();
        let start = res.add_state(true, true);
        let start = Set::singleton(&res.bdd, res.state_domain(), start as u64);

        // Moves out of the old starting states, from anywhere.
        let from_starting = res.transitions.restrict(0, &res.starting).project(0);
        res.transitions = &res.transitions | &from_starting.restrict(0, &res.accepting);
        res.starting = start;
        res.invalidate();
        res.filter_states_live()
    }

    /// Concatenation of the languages.
    pub fn concatenate(&self, other: &BNfa) -> BNfa {
        if self.n_states == 0 || other.n_states == 0 {
            return BNfa::new(&self.bdd);
        }
        let k = self.n_vars().max(other.n_vars()) + 1;
        assert!(k <= MAX_STATE_VARS, "Concatenation needs {} state bits", k);

        // The highest bit tells which operand a state comes from.
        let (s1, f1, t1) = self.colored(k, false);
        let (s2, f2, t2) = other.colored(k, true);

        // States of `other` end at `2^(k-1) + other.n_states`.
        let n = (1u64 << (k - 1)) + other.n_states as u64;
        let n = u32::try_from(n).unwrap_or_else(|_| panic!("Concatenation needs {} states", n));
        let mut res = BNfa::with_n_states(&self.bdd, n);
        res.starting = s1;
        res.accepting = if other.starting.intersects(&other.accepting) {
            &f1 | &f2
        } else {
            f2
        };
        let bridge = t2.restrict(0, &s2).project(0).restrict(0, &f1);
        res.transitions = &(&t1 | &t2) | &bridge;
        res.filter_states_live()
    }

    /// Starting states, accepting states and transitions over `k` bits,
    /// with the highest bit set to `color`.
    fn colored(&self, k: u32, color: bool) -> (StateSet, StateSet, Relation) {
        let narrow = state_domain(k - 1);
        let domain = state_domain(k);
        let paint = |s: &StateSet| s.with_domain(narrow).extend_domain(domain, color);
        let transitions = self
            .transitions
            .with_domains(&transition_domains(k - 1))
            .extend_domain(0, domain, color)
            .extend_domain(2, dest_domain(k), color);
        (paint(&self.starting), paint(&self.accepting), transitions)
    }

    pub fn reverse(&self) -> BNfa {
        let mut res = self.clone();
        std::mem::swap(&mut res.starting, &mut res.accepting);
        res.transitions = self.transitions.transpose(0, 2);
        res.invalidate();
        res
    }

    /// Complement of the language.
    pub fn negate(&self) -> BNfa {
        if self.is_complete_deterministic() {
            let mut res = self.clone();
            res.accepting = &self.states - &self.accepting;
            return res;
        }
        &BNfa::universal(&self.bdd) - self
    }

    /// Exactly one starting state, and exactly one successor per state and symbol.
    pub fn is_complete_deterministic(&self) -> bool {
        match self.determinism.get() {
            Determinism::CompleteDeterministic => true,
            Determinism::Other => false,
            Determinism::Unknown => {
                let res = self.compute_complete_deterministic();
                self.determinism.set(if res {
                    Determinism::CompleteDeterministic
                } else {
                    Determinism::Other
                });
                res
            }
        }
    }

    fn compute_complete_deterministic(&self) -> bool {
        if self.starting.len() != 1 {
            return false;
        }
        let bdd = &self.bdd;
        let t = self.transitions.node();
        let dst = self.dest_domain();
        let alphabet = self.transitions.domain(1);

        let total = bdd.forall(bdd.exists(t, dst), alphabet);
        if !bdd.is_implies(self.states.node(), total) {
            return false;
        }

        // A second copy of the destinations, above every block.
        let copy = dst.at(alphabet.end());
        let t2 = bdd.rename_vars(t, &dst.renaming_to(copy));
        let same = bdd.apply_and_many(
            dst.vars()
                .zip(copy.vars())
                .map(|(a, b)| bdd.apply_eq(bdd.mk_var(a), bdd.mk_var(b))),
        );
        let ambiguous = bdd.apply_diff(bdd.apply_and(t, t2), same);
        bdd.is_zero(ambiguous)
    }

    /// Accepts every word.
    pub fn is_true(&self) -> bool {
        let det = self.deterministic();
        let reachable = det.states_reachable();
        !reachable.is_empty() && reachable.is_subset(&det.accepting)
    }

    /// Accepts no word.
    pub fn is_false(&self) -> bool {
        self.states_live().is_empty()
    }

    pub fn is_equivalent(&self, other: &BNfa) -> bool {
        BNfa::iff(self, other).is_true()
    }

    /// Language inclusion.
    pub fn is_subset_of(&self, other: &BNfa) -> bool {
        BNfa::implies(self, other).is_true()
    }
}

impl PartialEq for BNfa {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl PartialOrd for BNfa {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.is_subset_of(other), other.is_subset_of(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl BitAnd for &BNfa {
    type Output = BNfa;

    fn bitand(self, rhs: &BNfa) -> BNfa {
        BNfa::and(self, rhs)
    }
}

impl BitOr for &BNfa {
    type Output = BNfa;

    fn bitor(self, rhs: &BNfa) -> BNfa {
        BNfa::or(self, rhs)
    }
}

impl Sub for &BNfa {
    type Output = BNfa;

    fn sub(self, rhs: &BNfa) -> BNfa {
        BNfa::minus(self, rhs)
    }
}

impl Mul for &BNfa {
    type Output = BNfa;

    fn mul(self, rhs: &BNfa) -> BNfa {
        self.concatenate(rhs)
    }
}

impl Not for &BNfa {
    type Output = BNfa;

    fn not(self) -> BNfa {
        self.negate()
    }
}

impl SymbolSet {
    /// The automaton accepting exactly the one-letter words over this set.
    pub fn to_automaton(&self) -> BNfa {
        BNfa::symbol(self.manager(), self)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use test_log::test;

    use super::*;
    use crate::bdd::Bdd;

    #[test]
    fn test_concatenate_with_empty_operand() {
        let bdd = Rc::new(Bdd::default());
        let a = BNfa::symbol(&bdd, &SymbolSet::var(&bdd, 1));
        assert_eq!((&a * &BNfa::new(&bdd)).n_states(), 0);
        assert_eq!((&BNfa::new(&bdd) * &a).n_states(), 0);
    }

    #[test]
    fn test_concatenate_uses_every_state_bit() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);

        // 31 state bits on the left, so the result needs all 32.
        let wide = BNfa::with_n_states(&bdd, 1 << 31);
        let only = wide.state_set(&[0]);
        let eps = wide.with_starting_accepting(&only, &only);
        assert_eq!(eps.n_vars(), 31);

        let res = &eps * &BNfa::symbol(&bdd, &a);
        assert_eq!(res.n_states(), 2);
        assert!(res == BNfa::symbol(&bdd, &a));
    }
}
