//! Minimization by partition refinement.
//!
//! Each round names the blocks of the current partition twice, once for sources (partition
//! block) and once for destinations (scratch block), and computes for every state its
//! signature `(own block, symbol, destination block)`. States with equal signatures stay
//! together. Splitting the signature relation below the partition block gives the
//! distinct signatures without enumerating states.

use log::debug;

use super::{BNfa, Determinism};
use crate::automaton::WordAutomaton;
use crate::domain::n_vars_needed;
use crate::layout::{partition_domain, scratch_domain, PARTITION_BASE};
use crate::relation::Relation;
use crate::set::{Set, StateSet};
use crate::symbol::SymbolSet;

impl BNfa {
    /// Merge states with the same future behaviour.
    pub fn minimize(&self) -> BNfa {
        if self.n_states == 0 {
            return self.clone();
        }
        let bdd = &self.bdd;

        // Non-productive states all behave as one sink.
        let mut a = self.clone();
        let dead = &a.states - &a.states_productive();
        if !dead.is_empty() {
            a.add_edge_sets(&dead, &SymbolSet::universal(bdd), &dead);
        }

        let mut partition: Vec<StateSet> = [&a.states & &a.accepting, &a.states - &a.accepting]
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();

        let mut round = 0;
        loop {
            let refined = a.refine(&partition);
            debug!(
                "minimize: round {}, {} -> {} blocks",
                round,
                partition.len(),
                refined.len()
            );
            round += 1;
            if refined.len() == partition.len() {
                break;
            }
            partition = refined;
        }

        let names = Relation::enumeration(
            bdd,
            &partition,
            partition_domain(n_vars_needed(partition.len() as u64)),
        );
        let mut res = BNfa::with_n_states(bdd, partition.len() as u32);
        res.starting = a.starting.compose(&names);
        res.accepting = a.accepting.compose(&names);
        res.transitions = a.transitions.compose(0, &names).compose(2, &names);
        // A quotient of a complete deterministic automaton stays one; merging may also
        // remove nondeterminism, so anything else is recomputed on demand.
        if self.determinism.get() == Determinism::CompleteDeterministic {
            res.determinism.set(Determinism::CompleteDeterministic);
        }
        res
    }

    /// One round of refinement.
    fn refine(&self, partition: &[StateSet]) -> Vec<StateSet> {
        let bdd = &self.bdd;
        let width = n_vars_needed(partition.len() as u64);
        let source_names = Relation::enumeration(bdd, partition, partition_domain(width));
        let dest_partition: Vec<Set> = partition
            .iter()
            .map(|block| block.with_domain(self.dest_domain()))
            .collect();
        let dest_names = Relation::enumeration(bdd, &dest_partition, scratch_domain(width));

        let signatures = bdd.exists(
            bdd.apply_and_many([self.transitions.node(), source_names.node(), dest_names.node()]),
            self.dest_domain(),
        );

        // Every state lies in some block, so each state has exactly one signature.
        bdd.cofactors_below(signatures, PARTITION_BASE)
            .into_iter()
            .map(|signature| {
                let members = bdd.select_below(signatures, PARTITION_BASE, signature);
                &Set::new(bdd, self.state_domain(), members) & &self.states
            })
            .filter(|block| !block.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use test_log::test;

    use super::*;
    use crate::bdd::Bdd;

    #[test]
    fn test_minimize_merges_equivalent_states() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);
        let b = !&a;

        // Two copies of "ends with a" glued at the start.
        let mut nfa = BNfa::new(&bdd);
        let q0 = nfa.add_state(false, true);
        let q1 = nfa.add_state(false, false);
        let q2 = nfa.add_state(true, false);
        let q3 = nfa.add_state(false, false);
        let q4 = nfa.add_state(true, false);
        nfa.add_edge(q0, &a, q2);
        nfa.add_edge(q0, &b, q1);
        nfa.add_edge(q1, &a, q2);
        nfa.add_edge(q1, &b, q1);
        nfa.add_edge(q2, &a, q4);
        nfa.add_edge(q2, &b, q3);
        nfa.add_edge(q3, &a, q4);
        nfa.add_edge(q3, &b, q3);
        nfa.add_edge(q4, &a, q4);
        nfa.add_edge(q4, &b, q3);

        let min = nfa.minimize();
        assert_eq!(min.n_states(), 2);
        assert_eq!(min.states_starting().len(), 1);
        assert_eq!(min.states_accepting().len(), 1);
        assert!(min.is_equivalent(&nfa));
    }

    #[test]
    fn test_minimize_distinguishes_sink_from_accepting_leaf() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);

        // q1 accepts only the empty word, q2 accepts nothing.
        let mut nfa = BNfa::new(&bdd);
        let q0 = nfa.add_state(false, true);
        let q1 = nfa.add_state(true, false);
        let q2 = nfa.add_state(false, false);
        nfa.add_edge(q0, &a, q1);
        nfa.add_edge(q0, &!&a, q2);

        let min = nfa.minimize();
        assert_eq!(min.n_states(), 3);
        assert!(min.is_equivalent(&nfa));
    }

    #[test]
    fn test_minimize_five_to_three() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);

        // a+ with the loop and the sink duplicated.
        let mut nfa = BNfa::new(&bdd);
        let s = nfa.add_state(false, true);
        let x1 = nfa.add_state(true, false);
        let x2 = nfa.add_state(true, false);
        let y1 = nfa.add_state(false, false);
        let y2 = nfa.add_state(false, false);
        nfa.add_edge(s, &a, x1);
        nfa.add_edge(s, &!&a, y1);
        nfa.add_edge(x1, &a, x2);
        nfa.add_edge(x2, &a, x1);
        nfa.add_edge(x1, &!&a, y2);
        nfa.add_edge(x2, &!&a, y1);
        nfa.add_edge(y1, &SymbolSet::universal(&bdd), y2);
        nfa.add_edge(y2, &SymbolSet::universal(&bdd), y1);

        let min = nfa.minimize();
        // The start block, the accepting loop, the sink.
        assert_eq!(min.n_states(), 3);
        assert!(min.is_equivalent(&nfa));
        assert_eq!(min.minimize().n_states(), 3);
    }

    #[test]
    fn test_minimize_recomputes_determinism() {
        let bdd = Rc::new(Bdd::default());
        let a = SymbolSet::var(&bdd, 1);
        let sigma = SymbolSet::universal(&bdd);

        // Two equivalent accepting targets on `a`, a dead state on `b`.
        let mut nfa = BNfa::new(&bdd);
        let q0 = nfa.add_state(false, true);
        let q1 = nfa.add_state(true, false);
        let q2 = nfa.add_state(true, false);
        let q3 = nfa.add_state(false, false);
        nfa.add_edge(q0, &a, q1);
        nfa.add_edge(q0, &a, q2);
        nfa.add_edge(q0, &!&a, q3);
        nfa.add_edge(q1, &sigma, q1);
        nfa.add_edge(q2, &sigma, q2);
        assert!(!nfa.is_complete_deterministic());

        let min = nfa.minimize();
        assert_eq!(min.n_states(), 3);
        assert!(min.is_complete_deterministic());
        assert!(min.is_equivalent(&nfa));
    }

    #[test]
    fn test_minimize_empty() {
        let bdd = Rc::new(Bdd::default());
        let nfa = BNfa::new(&bdd);
        assert_eq!(nfa.minimize().n_states(), 0);
    }
}
