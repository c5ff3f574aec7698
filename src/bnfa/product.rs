//! Boolean combinations of languages by the product construction.

use std::rc::Rc;

use log::debug;

use super::{BNfa, Determinism};
use crate::automaton::WordAutomaton;
use crate::domain::Domain;
use crate::layout::{dest_domain, state_domain, transition_domains, MAX_STATE_VARS};
use crate::reference::Ref;
use crate::relation::Relation;
use crate::set::Set;
use crate::symbol::SymbolSet;

/// Whether raising an input of `f` never lowers its output.
pub fn is_monotonic(f: fn(bool, bool) -> bool) -> bool {
    [(false, false), (false, true), (true, false), (true, true)]
        .into_iter()
        .all(|(x, y)| !f(x, y) || (f(x, true) && f(true, y) && f(true, true)))
}

impl BNfa {
    /// The automaton accepting `w` iff `f(a1 accepts w, a2 accepts w)`.
    ///
    /// A monotonic `f` only needs both sides to be total, which a fresh sink provides.
    /// Otherwise each side must have exactly one run per word, so both are determinized.
    pub fn product(a1: &BNfa, a2: &BNfa, f: fn(bool, bool) -> bool) -> BNfa {
        assert!(
            Rc::ptr_eq(&a1.bdd, &a2.bdd),
            "Automata must be built in the same BDD manager"
        );
        let monotonic = is_monotonic(f);
        debug!(
            "product: {} x {} states, monotonic = {}",
            a1.n_states, a2.n_states, monotonic
        );
        if monotonic {
            Self::exist_paths(a1.with_sink(), a2.with_sink(), f)
        } else {
            Self::exist_paths(a1.deterministic().totalized(), a2.deterministic().totalized(), f)
        }
    }

    pub fn and(a1: &BNfa, a2: &BNfa) -> BNfa {
        Self::product(a1, a2, |x, y| x && y)
    }

    pub fn or(a1: &BNfa, a2: &BNfa) -> BNfa {
        Self::product(a1, a2, |x, y| x || y)
    }

    pub fn minus(a1: &BNfa, a2: &BNfa) -> BNfa {
        Self::product(a1, a2, |x, y| x && !y)
    }

    pub fn iff(a1: &BNfa, a2: &BNfa) -> BNfa {
        Self::product(a1, a2, |x, y| x == y)
    }

    pub fn implies(a1: &BNfa, a2: &BNfa) -> BNfa {
        Self::product(a1, a2, |x, y| !x || y)
    }

    /// Adds a non-accepting starting sink reached from every state on every symbol.
    fn with_sink(&self) -> BNfa {
        let mut res = self.clone();
        let sink = res.add_state(false, true);
        let sink = res.state_set(&[sink]);
        let all = res.states.clone();
        res.add_edge_sets(&all, &SymbolSet::universal(&self.bdd), &sink);
        res
    }

    /// The determinization of an automaton without starting states has no states at all;
    /// give it a single rejecting sink.
    fn totalized(self) -> BNfa {
        if self.n_states > 0 {
            return self;
        }
        let mut res = BNfa::new(&self.bdd);
        let sink = res.add_state(false, true);
        res.add_edge(sink, &SymbolSet::universal(&self.bdd), sink);
        res.determinism.set(Determinism::CompleteDeterministic);
        res
    }

    /// Synchronous product; state `q1 + (q2 << k1)` stands for the pair `(q1, q2)`,
    /// where `k1` is the state width of `a1`.
    fn exist_paths(a1: BNfa, a2: BNfa, f: fn(bool, bool) -> bool) -> BNfa {
        let bdd = a1.bdd.clone();
        let (k1, k2) = (a1.n_vars(), a2.n_vars());
        assert!(k1 + k2 <= MAX_STATE_VARS, "Product needs {} state bits", k1 + k2);
        let n = (a2.n_states as u64) << k1;
        let n = u32::try_from(n).unwrap_or_else(|_| panic!("Product needs {} states", n));

        let low = state_domain(k1);
        let high = Domain::new(low.end(), k2);
        let dest_high = Domain::new(dest_domain(k1).end(), k2);

        let starting2 = a2.starting.with_domain(high);
        let accepting1 = a1.accepting.node();
        let accepting2 = a2.accepting.with_domain(high).node();
        let t2 = a2
            .transitions
            .with_domains(&[high, a2.transitions.domain(1), dest_high]);

        let mut res = BNfa::with_n_states(&bdd, n);
        let domain = res.state_domain();
        res.starting = Set::new(&bdd, domain, bdd.apply_and(a1.starting.node(), starting2.node()));

        let literal = |node: Ref, b: bool| if b { node } else { -node };
        let accepting = bdd.apply_or_many(
            [(false, false), (false, true), (true, false), (true, true)]
                .into_iter()
                .filter(|&(x, y)| f(x, y))
                .map(|(x, y)| bdd.apply_and(literal(accepting1, x), literal(accepting2, y))),
        );
        res.accepting = Set::new(&bdd, domain, accepting);

        res.transitions = Relation::new(
            &bdd,
            transition_domains(k1 + k2),
            bdd.apply_and(a1.transitions.node(), t2.node()),
        );
        res.filter_states_live()
    }
}
