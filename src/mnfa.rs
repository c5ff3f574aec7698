//! Word automata stored as an explicit matrix of edge labels.
//!
//! [`MNfa`] implements only the required part of [`WordAutomaton`] plus
//! [`edge_between`][WordAutomaton::edge_between], so every other operation goes through
//! the default definitions. Its subset construction enumerates power-states explicitly
//! and splits the alphabet into atoms, independently of the symbolic one in [`BNfa`].
//!
//! [`BNfa`]: crate::bnfa::BNfa

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use log::debug;

use crate::automaton::{State, WordAutomaton};
use crate::bdd::Bdd;
use crate::domain::n_vars_needed;
use crate::layout::state_domain;
use crate::set::{Set, StateSet};
use crate::symbol::SymbolSet;

#[derive(Clone)]
pub struct MNfa {
    bdd: Rc<Bdd>,
    /// `edges[q][r]` labels the edge `q -> r`.
    edges: Vec<Vec<SymbolSet>>,
    starting: BTreeSet<State>,
    accepting: BTreeSet<State>,
}

impl MNfa {
    pub fn new(bdd: &Rc<Bdd>) -> Self {
        Self {
            bdd: Rc::clone(bdd),
            edges: Vec::new(),
            starting: BTreeSet::new(),
            accepting: BTreeSet::new(),
        }
    }

    /// Copy of an automaton in any encoding; its states must be `0..n`.
    pub fn from_automaton(a: &dyn WordAutomaton) -> Self {
        let mut res = Self::new(a.manager());
        let starting = a.states_starting();
        let accepting = a.states_accepting();
        for q in a.states().iter() {
            assert_eq!(q, res.edges.len() as u64, "States of the source automaton are not dense");
            res.add_state(accepting.contains(q), starting.contains(q));
        }
        for q in 0..res.edges.len() as State {
            for r in 0..res.edges.len() as State {
                let on = a.edge_between(q, r);
                if !on.is_empty() {
                    res.add_edge(q, &on, r);
                }
            }
        }
        res
    }

    fn state_values(&self, states: &BTreeSet<State>) -> StateSet {
        Set::from_values(&self.bdd, self.states().domain(), states.iter().map(|&q| q as u64))
    }

    /// Subset construction over explicit sets of states.
    ///
    /// The alphabet is split into atoms: the non-empty intersections of the outgoing labels
    /// and their complements. Each atom leads to exactly one power-state.
    pub fn deterministic(&self) -> MNfa {
        let mut res = MNfa::new(&self.bdd);
        if self.starting.is_empty() {
            return res;
        }

        let mut index: HashMap<BTreeSet<State>, State> = HashMap::new();
        let mut queue: VecDeque<BTreeSet<State>> = VecDeque::new();
        let start = self.starting.clone();
        let q0 = res.add_state(self.is_accepting(&start), true);
        index.insert(start.clone(), q0);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let from = index[&current];
            let labels: Vec<&SymbolSet> = current
                .iter()
                .flat_map(|&q| self.edges[q as usize].iter())
                .filter(|on| !on.is_empty())
                .collect();
            for atom in alphabet_atoms(&self.bdd, &labels) {
                let target: BTreeSet<State> = current
                    .iter()
                    .flat_map(|&q| {
                        self.edges[q as usize]
                            .iter()
                            .enumerate()
                            .filter(|(_, on)| !(*on & &atom).is_empty())
                            .map(|(r, _)| r as State)
                    })
                    .collect();
                let to = match index.get(&target) {
                    Some(&to) => to,
                    None => {
                        let to = res.add_state(self.is_accepting(&target), false);
                        index.insert(target.clone(), to);
                        queue.push_back(target);
                        to
                    }
                };
                res.add_edge(from, &atom, to);
            }
        }
        debug!(
            "MNfa::deterministic: {} states -> {} power-states",
            self.edges.len(),
            res.edges.len()
        );
        res
    }

    fn is_accepting(&self, states: &BTreeSet<State>) -> bool {
        !self.accepting.is_disjoint(states)
    }
}

/// Split the alphabet into the coarsest partition that refines every label.
fn alphabet_atoms(bdd: &Rc<Bdd>, labels: &[&SymbolSet]) -> Vec<SymbolSet> {
    let mut atoms = vec![SymbolSet::universal(bdd)];
    for &label in labels {
        atoms = atoms
            .into_iter()
            .flat_map(|atom| [&atom & label, &atom - label])
            .filter(|atom| !atom.is_empty())
            .collect();
    }
    atoms
}

impl WordAutomaton for MNfa {
    fn manager(&self) -> &Rc<Bdd> {
        &self.bdd
    }

    fn states(&self) -> StateSet {
        let n = self.edges.len() as u64;
        let domain = state_domain(n_vars_needed(n));
        if n == 0 {
            Set::empty(&self.bdd, domain)
        } else {
            Set::range(&self.bdd, domain, 0, n - 1)
        }
    }

    fn states_starting(&self) -> StateSet {
        self.state_values(&self.starting)
    }

    fn states_accepting(&self) -> StateSet {
        self.state_values(&self.accepting)
    }

    fn add_state(&mut self, accepting: bool, starting: bool) -> State {
        let q = self.edges.len() as State;
        for row in &mut self.edges {
            row.push(SymbolSet::empty(&self.bdd));
        }
        self.edges.push(vec![SymbolSet::empty(&self.bdd); q as usize + 1]);
        if accepting {
            self.accepting.insert(q);
        }
        if starting {
            self.starting.insert(q);
        }
        q
    }

    fn n_states(&self) -> usize {
        self.edges.len()
    }

    fn edge_between(&self, from: State, to: State) -> SymbolSet {
        self.edges[from as usize][to as usize].clone()
    }

    fn add_edge(&mut self, from: State, on: &SymbolSet, to: State) {
        let n = self.edges.len();
        assert!((from as usize) < n && (to as usize) < n, "Edge {} -> {} leaves 0..{}", from, to, n);
        let label = &mut self.edges[from as usize][to as usize];
        *label = &*label | on;
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::automaton::Reversed;
    use crate::bnfa::BNfa;
    use crate::domain::Domain;

    fn sample(bdd: &Rc<Bdd>) -> MNfa {
        let a = SymbolSet::var(bdd, 1);
        let b = !&a;
        let mut nfa = MNfa::new(bdd);
        let q0 = nfa.add_state(false, true);
        let q1 = nfa.add_state(false, false);
        let q2 = nfa.add_state(true, false);
        nfa.add_edge(q0, &(&a | &b), q0);
        nfa.add_edge(q0, &a, q1);
        nfa.add_edge(q1, &b, q2);
        nfa
    }

    #[test]
    fn test_default_operations() {
        let bdd = Rc::new(Bdd::default());
        let nfa = sample(&bdd);
        let a = SymbolSet::var(&bdd, 1);

        assert_eq!(nfa.n_states(), 3);
        assert_eq!(nfa.states().domain(), Domain::new(1, 2));
        assert_eq!(nfa.edge_between_sets(&nfa.state_set(&[0]), &nfa.state_set(&[1, 2])), a);
        assert_eq!(nfa.successors(&nfa.state_set(&[0]), &a).values(), vec![0, 1]);
        assert_eq!(nfa.predecessors(&nfa.state_set(&[2]), &!&a).values(), vec![1]);
        assert_eq!(nfa.states_reachable().values(), vec![0, 1, 2]);
        assert_eq!(nfa.states_productive().values(), vec![0, 1, 2]);

        let t = nfa.transitions();
        assert_eq!(t.arity(), 3);
        assert_eq!(t.restrict(0, &nfa.state_set(&[1])).project_on(2).values(), vec![2]);
    }

    #[test]
    fn test_add_transitions_through_defaults() {
        let bdd = Rc::new(Bdd::default());
        let source = sample(&bdd);
        let mut copy = MNfa::new(&bdd);
        for _ in 0..3 {
            copy.add_state(false, false);
        }
        copy.add_transitions(&source.transitions());
        for q in 0..3 {
            for r in 0..3 {
                assert_eq!(copy.edge_between(q, r), source.edge_between(q, r));
            }
        }
    }

    #[test]
    fn test_reversed_view() {
        let bdd = Rc::new(Bdd::default());
        let nfa = sample(&bdd);
        let a = SymbolSet::var(&bdd, 1);
        let rev = Reversed::new(&nfa);

        assert_eq!(rev.states_starting().values(), vec![2]);
        assert_eq!(rev.states_accepting().values(), vec![0]);
        assert_eq!(rev.edge_between(1, 0), a);
        assert_eq!(rev.successors(&nfa.state_set(&[2]), &!&a).values(), vec![1]);
        assert_eq!(rev.states_reachable().values(), vec![0, 1, 2]);
    }

    #[test]
    #[should_panic(expected = "cannot materialize")]
    fn test_reversed_view_has_no_relation() {
        let bdd = Rc::new(Bdd::default());
        let nfa = sample(&bdd);
        Reversed::new(&nfa).transitions();
    }

    #[test]
    #[should_panic(expected = "reversed view")]
    fn test_reversed_view_is_read_only() {
        let bdd = Rc::new(Bdd::default());
        let nfa = sample(&bdd);
        let mut rev = Reversed::new(&nfa);
        rev.add_state(false, false);
    }

    #[test]
    fn test_alphabet_atoms() {
        let bdd = Rc::new(Bdd::default());
        let x1 = SymbolSet::var(&bdd, 1);
        let x2 = SymbolSet::var(&bdd, 2);
        let atoms = alphabet_atoms(&bdd, &[&x1, &x2, &x1]);
        assert_eq!(atoms.len(), 4);
        let union = atoms.iter().fold(SymbolSet::empty(&bdd), |acc, atom| &acc | atom);
        assert!(union.is_universal());
    }

    #[test]
    fn test_explicit_determinization_agrees() {
        let bdd = Rc::new(Bdd::default());
        let nfa = sample(&bdd);
        let explicit = nfa.deterministic();
        let symbolic = BNfa::from_automaton(&nfa).deterministic();

        assert_eq!(explicit.n_states(), symbolic.n_states() as usize);
        assert!(BNfa::from_automaton(&explicit).is_complete_deterministic());
        assert_eq!(BNfa::from_automaton(&explicit), symbolic);
    }
}
