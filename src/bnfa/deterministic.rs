//! Symbolic subset construction.
//!
//! A power-state is a single BDD over the scratch block, encoding a set of states of
//! the input automaton. Restricting the transitions to a power-state and projecting the
//! source away leaves a function of `(symbol, power-state)`; its sub-functions below
//! the scratch block are exactly the successor power-states, one per class of symbols.

use std::collections::HashMap;

use log::debug;

use super::{BNfa, Determinism};
use crate::layout::{scratch_domain, transition_domains, SCRATCH_BASE};
use crate::reference::Ref;
use crate::relation::Relation;
use crate::set::Set;

impl BNfa {
    /// A language-equivalent automaton that is deterministic and total, with state 0 as
    /// its only starting state.
    ///
    /// States are numbered in the order their power-states are discovered. An automaton
    /// without starting states yields the automaton without states.
    pub fn deterministic(&self) -> BNfa {
        if self.determinism.get() == Determinism::CompleteDeterministic {
            return self.clone();
        }
        if self.starting.is_empty() {
            return BNfa::new(&self.bdd);
        }

        let bdd = &self.bdd;
        let k = self.n_vars();
        let power = scratch_domain(k);
        let transitions = self.transitions.with_domain(2, power);

        let start = self.starting.with_domain(power).node();
        let mut discovered: Vec<Ref> = vec![start];
        let mut index: HashMap<Ref, u64> = HashMap::from([(start, 0)]);
        let mut moves: Vec<Ref> = Vec::new();

        while moves.len() < discovered.len() {
            let from = Set::new(bdd, power, discovered[moves.len()]).with_domain(self.state_domain());
            let step = transitions.restrict(0, &from).project(0).node();
            for target in bdd.cofactors_below(step, SCRATCH_BASE) {
                if !index.contains_key(&target) {
                    index.insert(target, discovered.len() as u64);
                    discovered.push(target);
                }
            }
            moves.push(step);
        }
        debug!(
            "deterministic: {} states -> {} power-states",
            self.n_states,
            discovered.len()
        );

        let mut res = BNfa::with_n_states(bdd, discovered.len() as u32);
        let src = res.state_domain();
        let dst = res.dest_domain();

        let combined = bdd.apply_or_many(
            moves
                .iter()
                .enumerate()
                .map(|(q, &step)| bdd.apply_and(bdd.mk_value(src, q as u64), step)),
        );
        // Unused source codes lead to the empty power-state, which may be a real state.
        let redirected = bdd.replace_below(combined, SCRATCH_BASE, &mut |target| match index.get(&target) {
            Some(&i) => bdd.mk_value(dst, i),
            None => bdd.zero(),
        });
        res.transitions = Relation::new(bdd, transition_domains(res.n_vars()), redirected).restrict(0, &res.states);

        let accepting = self.accepting.with_domain(power).node();
        res.starting = Set::singleton(bdd, src, 0);
        res.accepting = Set::from_values(
            bdd,
            src,
            discovered
                .iter()
                .enumerate()
                .filter(|&(_, &p)| !bdd.is_zero(bdd.apply_and(p, accepting)))
                .map(|(i, _)| i as u64),
        );
        res.determinism.set(Determinism::CompleteDeterministic);
        res
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use test_log::test;

    use super::*;
    use crate::automaton::WordAutomaton;
    use crate::bdd::Bdd;
    use crate::symbol::SymbolSet;

    #[test]
    fn test_deterministic_subset_construction() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);
        let b = !&a;

        // Words over {a, b} whose second-to-last letter is `a`.
        let mut nfa = BNfa::new(&bdd);
        let q0 = nfa.add_state(false, true);
        let q1 = nfa.add_state(false, false);
        let q2 = nfa.add_state(true, false);
        nfa.add_edge(q0, &(&a | &b), q0);
        nfa.add_edge(q0, &a, q1);
        nfa.add_edge(q1, &(&a | &b), q2);

        let det = nfa.deterministic();
        assert_eq!(det.n_states(), 4);
        assert_eq!(det.determinism(), Determinism::CompleteDeterministic);
        assert_eq!(det.states_starting().values(), vec![0]);
        for q in 0..det.n_states() {
            assert_eq!(det.successors(&det.state_set(&[q]), &a).len(), 1);
            assert_eq!(det.successors(&det.state_set(&[q]), &b).len(), 1);
        }

        // The flag is honest: recomputing it agrees.
        let mut copy = det.clone();
        copy.invalidate();
        assert!(copy.is_complete_deterministic());
        assert!(!nfa.is_complete_deterministic());
    }

    #[test]
    fn test_deterministic_adds_empty_power_state() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);
        let nfa = BNfa::symbol(&bdd, &a);

        let det = nfa.deterministic();
        // {q0}, {q1}, and the sink {}.
        assert_eq!(det.n_states(), 3);
        assert_eq!(det.states_accepting().len(), 1);
        assert!(det.is_complete_deterministic());
    }

    #[test]
    fn test_deterministic_without_starting_states() {
        let bdd = Rc::new(Bdd::default());
        let mut nfa = BNfa::new(&bdd);
        nfa.add_state(true, false);
        let det = nfa.deterministic();
        assert_eq!(det.n_states(), 0);
    }

    #[test]
    fn test_deterministic_short_circuits() {
        let bdd = Rc::new(Bdd::default());
        let det = BNfa::universal(&bdd).deterministic();
        assert_eq!(det.n_states(), 1);
        let again = det.deterministic();
        assert_eq!(again.n_states(), det.n_states());
        assert_eq!(again.transitions(), det.transitions());
    }
}
