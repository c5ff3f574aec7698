//! The contract shared by every word-automaton encoding.
//!
//! An implementation provides its state sets, [`WordAutomaton::add_state`], and at least one
//! of [`edge_between`][WordAutomaton::edge_between],
//! [`edge_between_sets`][WordAutomaton::edge_between_sets] or
//! [`transitions`][WordAutomaton::transitions]. The three are defined in terms of each
//! other, so overriding none of them recurses forever. The same holds for
//! [`add_edge`][WordAutomaton::add_edge], [`add_edge_sets`][WordAutomaton::add_edge_sets]
//! and [`add_transitions`][WordAutomaton::add_transitions].

use std::rc::Rc;

use log::trace;

use crate::bdd::Bdd;
use crate::layout::transition_domains;
use crate::relation::Relation;
use crate::set::{Set, StateSet};
use crate::symbol::SymbolSet;

/// Index of a state, dense in `0..n_states`.
pub type State = u32;

pub trait WordAutomaton {
    fn manager(&self) -> &Rc<Bdd>;

    fn states(&self) -> StateSet;
    fn states_starting(&self) -> StateSet;
    fn states_accepting(&self) -> StateSet;

    fn add_state(&mut self, accepting: bool, starting: bool) -> State;

    fn alphabet(&self) -> SymbolSet {
        SymbolSet::universal(self.manager())
    }

    fn n_states(&self) -> usize {
        self.states().len() as usize
    }

    /// The given states as a set over the state domain.
    fn state_set(&self, states: &[State]) -> StateSet {
        Set::from_values(self.manager(), self.states().domain(), states.iter().map(|&q| q as u64))
    }

    /// Symbols labelling the edge `from -> to`.
    fn edge_between(&self, from: State, to: State) -> SymbolSet {
        self.edge_between_sets(&self.state_set(&[from]), &self.state_set(&[to]))
    }

    /// Symbols labelling some edge from `from` into `to`.
    fn edge_between_sets(&self, from: &StateSet, to: &StateSet) -> SymbolSet {
        self.transitions().restrict(0, from).restrict(2, to).symbols_on(1)
    }

    /// The ternary relation `(source, symbol, destination)`.
    ///
    /// The default asks [`edge_between`][WordAutomaton::edge_between] for every pair of states.
    fn transitions(&self) -> Relation {
        let bdd = self.manager();
        let states = self.states();
        let domains = transition_domains(states.domain().len());
        let mut node = bdd.zero();
        for q in states.iter() {
            for r in states.iter() {
                let on = self.edge_between(q as State, r as State);
                if on.is_empty() {
                    continue;
                }
                let edge = bdd.apply_and_many([
                    bdd.mk_value(domains[0], q),
                    on.node(),
                    bdd.mk_value(domains[2], r),
                ]);
                node = bdd.apply_or(node, edge);
            }
        }
        Relation::new(bdd, domains, node)
    }

    /// States reachable from `from` in one step on a symbol of `on`.
    fn successors(&self, from: &StateSet, on: &SymbolSet) -> StateSet {
        let domain = self.states().domain();
        self.transitions()
            .restrict(0, from)
            .restrict_symbols(1, on)
            .project_on(2)
            .with_domain(domain)
    }

    /// States reaching `to` in one step on a symbol of `on`.
    fn predecessors(&self, to: &StateSet, on: &SymbolSet) -> StateSet {
        let domain = self.states().domain();
        self.transitions()
            .restrict(2, to)
            .restrict_symbols(1, on)
            .project_on(0)
            .with_domain(domain)
    }

    /// `from` and every state reachable from it on symbols of `on`.
    fn reachable_successors(&self, from: &StateSet, on: &SymbolSet) -> StateSet {
        let mut reached = from.with_domain(self.states().domain());
        let mut round = 0;
        loop {
            let next = &reached | &self.successors(&reached, on);
            if next == reached {
                trace!("reachable_successors: fixpoint after {} rounds", round);
                return reached;
            }
            reached = next;
            round += 1;
        }
    }

    /// `to` and every state reaching it on symbols of `on`.
    fn reachable_predecessors(&self, to: &StateSet, on: &SymbolSet) -> StateSet {
        let mut reached = to.with_domain(self.states().domain());
        let mut round = 0;
        loop {
            let next = &reached | &self.predecessors(&reached, on);
            if next == reached {
                trace!("reachable_predecessors: fixpoint after {} rounds", round);
                return reached;
            }
            reached = next;
            round += 1;
        }
    }

    fn states_reachable(&self) -> StateSet {
        self.reachable_successors(&self.states_starting(), &self.alphabet())
    }

    fn states_productive(&self) -> StateSet {
        self.reachable_predecessors(&self.states_accepting(), &self.alphabet())
    }

    fn states_live(&self) -> StateSet {
        &self.states_reachable() & &self.states_productive()
    }

    fn add_edge(&mut self, from: State, on: &SymbolSet, to: State) {
        let from = self.state_set(&[from]);
        let to = self.state_set(&[to]);
        self.add_edge_sets(&from, on, &to);
    }

    /// Add `q -on-> r` for every `q` in `from` and `r` in `to`.
    fn add_edge_sets(&mut self, from: &StateSet, on: &SymbolSet, to: &StateSet) {
        for q in from.iter() {
            for r in to.iter() {
                self.add_edge(q as State, on, r as State);
            }
        }
    }

    /// Add every edge of a `(source, symbol, destination)` relation.
    fn add_transitions(&mut self, transitions: &Relation) {
        assert_eq!(transitions.arity(), 3, "Transitions must form a ternary relation");
        let bdd = Rc::clone(self.manager());
        let states = self.states();
        for q in states.iter() {
            let out = transitions.restrict(0, &Set::singleton(&bdd, states.domain(), q));
            if out.is_empty() {
                continue;
            }
            for r in states.iter() {
                let on = out.restrict(2, &Set::singleton(&bdd, states.domain(), r)).symbols_on(1);
                if !on.is_empty() {
                    self.add_edge(q as State, &on, r as State);
                }
            }
        }
    }
}

/// Read-only view of an automaton with every edge reversed and the roles of
/// starting and accepting states swapped.
///
/// The view cannot materialize its transition relation, and every mutator panics.
pub struct Reversed<'a> {
    inner: &'a dyn WordAutomaton,
}

impl<'a> Reversed<'a> {
    pub fn new(inner: &'a dyn WordAutomaton) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &'a dyn WordAutomaton {
        self.inner
    }
}

impl WordAutomaton for Reversed<'_> {
    fn manager(&self) -> &Rc<Bdd> {
        self.inner.manager()
    }

    fn states(&self) -> StateSet {
        self.inner.states()
    }

    fn states_starting(&self) -> StateSet {
        self.inner.states_accepting()
    }

    fn states_accepting(&self) -> StateSet {
        self.inner.states_starting()
    }

    fn add_state(&mut self, _accepting: bool, _starting: bool) -> State {
        panic!("Cannot add a state through a reversed view")
    }

    fn alphabet(&self) -> SymbolSet {
        self.inner.alphabet()
    }

    fn n_states(&self) -> usize {
        self.inner.n_states()
    }

    fn edge_between(&self, from: State, to: State) -> SymbolSet {
        self.inner.edge_between(to, from)
    }

    fn edge_between_sets(&self, from: &StateSet, to: &StateSet) -> SymbolSet {
        self.inner.edge_between_sets(to, from)
    }

    fn transitions(&self) -> Relation {
        panic!("A reversed view cannot materialize its transition relation")
    }

    fn successors(&self, from: &StateSet, on: &SymbolSet) -> StateSet {
        self.inner.predecessors(from, on)
    }

    fn predecessors(&self, to: &StateSet, on: &SymbolSet) -> StateSet {
        self.inner.successors(to, on)
    }

    fn reachable_successors(&self, from: &StateSet, on: &SymbolSet) -> StateSet {
        self.inner.reachable_predecessors(from, on)
    }

    fn reachable_predecessors(&self, to: &StateSet, on: &SymbolSet) -> StateSet {
        self.inner.reachable_successors(to, on)
    }

    fn add_edge(&mut self, _from: State, _on: &SymbolSet, _to: State) {
        panic!("Cannot add an edge through a reversed view")
    }

    fn add_edge_sets(&mut self, _from: &StateSet, _on: &SymbolSet, _to: &StateSet) {
        panic!("Cannot add an edge through a reversed view")
    }

    fn add_transitions(&mut self, _transitions: &Relation) {
        panic!("Cannot add transitions through a reversed view")
    }
}
