//! Word automata with the whole transition table in one BDD.
//!
//! A [`BNfa`] with `n` states encodes state indices on `k = ceil(log2 n)` bits. Its
//! transitions are a single ternary [`Relation`] over
//! `[state_domain(k), alphabet_domain(), dest_domain(k)]`, so sets of states, symbols and
//! edges combine by plain boolean operations.
//!
//! Growing past a power of two widens every domain; values already present keep their
//! encoding with the new high bits unset.

mod deterministic;
mod minimize;
mod ops;
mod product;

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use log::debug;

use crate::automaton::{State, WordAutomaton};
use crate::bdd::Bdd;
use crate::domain::{n_vars_needed, Domain};
use crate::layout::{dest_domain, state_domain, transition_domains};
use crate::relation::Relation;
use crate::set::{Set, StateSet};
use crate::symbol::SymbolSet;

pub use product::is_monotonic;

/// Cached answer of [`BNfa::is_complete_deterministic`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Determinism {
    Unknown,
    CompleteDeterministic,
    Other,
}

#[derive(Clone)]
pub struct BNfa {
    bdd: Rc<Bdd>,
    n_states: u32,
    states: StateSet,
    starting: StateSet,
    accepting: StateSet,
    transitions: Relation,
    determinism: Cell<Determinism>,
}

impl BNfa {
    /// Automaton without states.
    pub fn new(bdd: &Rc<Bdd>) -> Self {
        Self::with_n_states(bdd, 0)
    }

    /// `n` states, none starting or accepting, no edges.
    pub fn with_n_states(bdd: &Rc<Bdd>, n: u32) -> Self {
        let k = n_vars_needed(n as u64);
        let domain = state_domain(k);
        let states = if n == 0 {
            Set::empty(bdd, domain)
        } else {
            Set::range(bdd, domain, 0, n as u64 - 1)
        };
        Self {
            bdd: Rc::clone(bdd),
            n_states: n,
            states,
            starting: Set::empty(bdd, domain),
            accepting: Set::empty(bdd, domain),
            transitions: Relation::empty(bdd, transition_domains(k)),
            determinism: Cell::new(Determinism::Unknown),
        }
    }

    /// The empty language.
    pub fn empty(bdd: &Rc<Bdd>) -> Self {
        Self::new(bdd)
    }

    /// Every word.
    pub fn universal(bdd: &Rc<Bdd>) -> Self {
        let mut res = Self::new(bdd);
        let q = res.add_state(true, true);
        res.add_edge(q, &SymbolSet::universal(bdd), q);
        res
    }

    /// Only the empty word.
    pub fn epsilon(bdd: &Rc<Bdd>) -> Self {
        let mut res = Self::new(bdd);
        res.add_state(true, true);
        res
    }

    /// The one-letter words over `on`.
    pub fn symbol(bdd: &Rc<Bdd>, on: &SymbolSet) -> Self {
        let mut res = Self::new(bdd);
        let q0 = res.add_state(false, true);
        let q1 = res.add_state(true, false);
        res.add_edge(q0, on, q1);
        res
    }

    /// Copy of an automaton in any encoding; its states must be `0..n`.
    pub fn from_automaton(a: &dyn WordAutomaton) -> Self {
        let n = a.n_states() as u32;
        let mut res = Self::with_n_states(a.manager(), n);
        assert!(
            a.states() == res.states,
            "States of the source automaton are not dense: {}",
            a.states()
        );
        let domain = res.state_domain();
        res.starting = a.states_starting().with_domain(domain);
        res.accepting = a.states_accepting().with_domain(domain);
        res.transitions = a.transitions().with_domains(&transition_domains(res.n_vars()));
        res
    }
}

impl BNfa {
    pub fn manager(&self) -> &Rc<Bdd> {
        &self.bdd
    }

    pub fn n_states(&self) -> u32 {
        self.n_states
    }

    /// Bits of a state index.
    pub fn n_vars(&self) -> u32 {
        n_vars_needed(self.n_states as u64)
    }

    pub fn state_domain(&self) -> Domain {
        state_domain(self.n_vars())
    }

    pub fn dest_domain(&self) -> Domain {
        dest_domain(self.n_vars())
    }

    pub fn determinism(&self) -> Determinism {
        self.determinism.get()
    }

    fn invalidate(&self) {
        self.determinism.set(Determinism::Unknown);
    }

    fn check_state(&self, q: State) {
        assert!(q < self.n_states, "State {} is out of range 0..{}", q, self.n_states);
    }

    /// Widen every domain to `n_vars` bits.
    fn resize(&mut self, n_vars: u32) {
        debug!("resize: {} -> {} state bits", self.n_vars(), n_vars);
        let domain = state_domain(n_vars);
        self.states = self.states.with_domain(domain);
        self.starting = self.starting.with_domain(domain);
        self.accepting = self.accepting.with_domain(domain);
        self.transitions = self.transitions.with_domains(&transition_domains(n_vars));
        self.invalidate();
    }

    /// Add states until there are `n`, with the given flags.
    pub fn increase_to_n_states(&mut self, n: u32, accepting: bool, starting: bool) {
        if n <= self.n_states {
            return;
        }
        let k = n_vars_needed(n as u64);
        if k > self.n_vars() {
            self.resize(k);
        }
        // The width follows the new count, not the old one.
        let added = Set::range(&self.bdd, state_domain(k), self.n_states as u64, n as u64 - 1);
        self.states = &self.states | &added;
        if accepting {
            self.accepting = &self.accepting | &added;
        }
        if starting {
            self.starting = &self.starting | &added;
        }
        self.n_states = n;
        self.invalidate();
    }

    /// Same states and edges with other starting and accepting states.
    pub fn with_starting_accepting(&self, starting: &StateSet, accepting: &StateSet) -> BNfa {
        let mut res = self.clone();
        res.starting = (starting & &self.states).with_domain(self.state_domain());
        res.accepting = (accepting & &self.states).with_domain(self.state_domain());
        res.invalidate();
        res
    }

    /// Abstract the given symbol bits away from every edge.
    pub fn project(&self, bits: Domain) -> BNfa {
        let mut res = self.clone();
        let node = SymbolSet::new(&self.bdd, self.transitions.node()).project(bits).node();
        res.transitions = Relation::new(&self.bdd, self.transitions.domains().to_vec(), node);
        res.invalidate();
        res
    }

    /// Rename symbol bits (1-indexed) on every edge.
    pub fn rename(&self, map: &HashMap<u32, u32>) -> BNfa {
        let mut res = self.clone();
        let node = SymbolSet::new(&self.bdd, self.transitions.node()).rename(map).node();
        res.transitions = Relation::new(&self.bdd, self.transitions.domains().to_vec(), node);
        res.invalidate();
        res
    }
}

impl WordAutomaton for BNfa {
    fn manager(&self) -> &Rc<Bdd> {
        &self.bdd
    }

    fn states(&self) -> StateSet {
        self.states.clone()
    }

    fn states_starting(&self) -> StateSet {
        self.starting.clone()
    }

    fn states_accepting(&self) -> StateSet {
        self.accepting.clone()
    }

    fn add_state(&mut self, accepting: bool, starting: bool) -> State {
        let q = self.n_states;
        self.increase_to_n_states(q + 1, accepting, starting);
        q
    }

    fn n_states(&self) -> usize {
        self.n_states as usize
    }

    fn edge_between(&self, from: State, to: State) -> SymbolSet {
        self.check_state(from);
        self.check_state(to);
        let mut assignment = HashMap::new();
        for (i, v) in self.state_domain().vars().enumerate() {
            assignment.insert(v, (from >> i) & 1 == 1);
        }
        for (i, v) in self.dest_domain().vars().enumerate() {
            assignment.insert(v, (to >> i) & 1 == 1);
        }
        SymbolSet::new(&self.bdd, self.bdd.restrict_multi(self.transitions.node(), &assignment))
    }

    fn edge_between_sets(&self, from: &StateSet, to: &StateSet) -> SymbolSet {
        self.transitions.restrict(0, from).restrict(2, to).symbols_on(1)
    }

    fn transitions(&self) -> Relation {
        self.transitions.clone()
    }

    fn successors(&self, from: &StateSet, on: &SymbolSet) -> StateSet {
        self.transitions
            .restrict(0, from)
            .restrict_symbols(1, on)
            .project_on(2)
            .with_domain(self.state_domain())
    }

    fn predecessors(&self, to: &StateSet, on: &SymbolSet) -> StateSet {
        self.transitions
            .restrict(2, to)
            .restrict_symbols(1, on)
            .project_on(0)
    }

    fn add_edge(&mut self, from: State, on: &SymbolSet, to: State) {
        self.check_state(from);
        self.check_state(to);
        let from = Set::singleton(&self.bdd, self.state_domain(), from as u64);
        let to = Set::singleton(&self.bdd, self.state_domain(), to as u64);
        self.add_edge_sets(&from, on, &to);
    }

    fn add_edge_sets(&mut self, from: &StateSet, on: &SymbolSet, to: &StateSet) {
        let from = from.with_domain(self.state_domain());
        let to = to.with_domain(self.dest_domain());
        let edges = self.bdd.apply_and_many([from.node(), on.node(), to.node()]);
        let node = self.bdd.apply_or(self.transitions.node(), edges);
        self.transitions = Relation::new(&self.bdd, self.transitions.domains().to_vec(), node);
        self.invalidate();
    }

    fn add_transitions(&mut self, transitions: &Relation) {
        assert_eq!(transitions.arity(), 3, "Transitions must form a ternary relation");
        let moved = transitions.with_domains(&transition_domains(self.n_vars()));
        self.transitions = &self.transitions | &moved;
        self.invalidate();
    }
}

impl Debug for BNfa {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BNfa")
            .field("n_states", &self.n_states)
            .field("starting", &self.starting.to_string())
            .field("accepting", &self.accepting.to_string())
            .field("transitions", &self.transitions.node())
            .field("transitions_size", &self.bdd.size(self.transitions.node()))
            .field("determinism", &self.determinism.get())
            .finish()
    }
}
