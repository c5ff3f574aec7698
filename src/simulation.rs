//! Simulation preorders between word automata.
//!
//! The maximal simulation is the greatest fixpoint of a game on a bipartite graph. A main
//! node `(q1, q2)` claims that `q2` simulates `q1`. For every move `q1 -S-> q1'` the
//! spoiler picks a challenge node `(q1', q2, S)`, and the duplicator must answer with
//! moves of `q2` that cover all of `S` while landing in surviving main nodes.
//!
//! Challenge nodes are identified by their label as well: the same pair reached on
//! different symbol sets gives different nodes.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use log::debug;

use crate::automaton::{Reversed, State, WordAutomaton};
use crate::bdd::Bdd;
use crate::set::StateSet;
use crate::symbol::SymbolSet;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    q1: State,
    q2: State,
    on: SymbolSet,
}

impl Node {
    pub fn main(q1: State, q2: State, bdd: &Rc<Bdd>) -> Self {
        Self {
            q1,
            q2,
            on: SymbolSet::empty(bdd),
        }
    }

    pub fn challenge(q1: State, q2: State, on: SymbolSet) -> Self {
        assert!(!on.is_empty(), "Challenge node ({}, {}) needs a non-empty label", q1, q2);
        Self { q1, q2, on }
    }

    pub fn is_main(&self) -> bool {
        self.on.is_empty()
    }

    pub fn is_challenge(&self) -> bool {
        !self.is_main()
    }

    pub fn q1(&self) -> State {
        self.q1
    }

    pub fn q2(&self) -> State {
        self.q2
    }

    /// The simulation pair of a main node.
    pub fn pair(&self) -> (State, State) {
        assert!(self.is_main(), "Node {} is not a main node", self);
        (self.q1, self.q2)
    }

    /// The symbols a challenge node asks to match.
    pub fn symbols(&self) -> &SymbolSet {
        assert!(self.is_challenge(), "Node {} is not a challenge node", self);
        &self.on
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_main() {
            write!(f, "({}, {})", self.q1, self.q2)
        } else {
            write!(f, "({}, {}, {})", self.q1, self.q2, self.on)
        }
    }
}

/// The game graph between `a1` and `a2`, limited to the given states of each.
pub struct SimulationGraph<'a> {
    a1: &'a dyn WordAutomaton,
    a2: &'a dyn WordAutomaton,
    states1: StateSet,
    states2: StateSet,
}

impl<'a> SimulationGraph<'a> {
    pub fn new(a1: &'a dyn WordAutomaton, a2: &'a dyn WordAutomaton, states1: &StateSet, states2: &StateSet) -> Self {
        Self {
            a1,
            a2,
            states1: states1.with_domain(a1.states().domain()),
            states2: states2.with_domain(a2.states().domain()),
        }
    }

    pub fn successors(&self, node: &Node) -> Vec<Node> {
        if node.is_main() {
            let from = self.a1.state_set(&[node.q1]);
            let next = &self.a1.successors(&from, &self.a1.alphabet()) & &self.states1;
            next.iter()
                .map(|q| q as State)
                .filter_map(|q1| {
                    let on = self.a1.edge_between(node.q1, q1);
                    (!on.is_empty()).then(|| Node::challenge(q1, node.q2, on))
                })
                .collect()
        } else {
            let bdd = self.a1.manager();
            let from = self.a2.state_set(&[node.q2]);
            let next = &self.a2.successors(&from, &node.on) & &self.states2;
            next.iter().map(|q2| Node::main(node.q1, q2 as State, bdd)).collect()
        }
    }

    /// Main nodes over the given states and their challenge successors.
    pub fn nodes(&self) -> HashSet<Node> {
        let bdd = self.a1.manager();
        let mut nodes = HashSet::new();
        for q1 in self.states1.iter() {
            for q2 in self.states2.iter() {
                let main = Node::main(q1 as State, q2 as State, bdd);
                nodes.extend(self.successors(&main));
                nodes.insert(main);
            }
        }
        nodes
    }

    /// Greatest subset of `initial` in which every node survives.
    pub fn fixpoint(&self, initial: HashSet<Node>) -> HashSet<Node> {
        let edges: HashMap<Node, Vec<Node>> = initial
            .iter()
            .map(|node| (node.clone(), self.successors(node)))
            .collect();

        let mut current = initial;
        let mut round = 0;
        loop {
            let next: HashSet<Node> = current
                .iter()
                .filter(|node| self.survives(node, &edges[*node], &current))
                .cloned()
                .collect();
            debug!("simulation fixpoint: round {}, {} -> {} nodes", round, current.len(), next.len());
            round += 1;
            if next.len() == current.len() {
                return current;
            }
            current = next;
        }
    }

    fn survives(&self, node: &Node, successors: &[Node], alive: &HashSet<Node>) -> bool {
        if node.is_main() {
            return successors.iter().all(|s| alive.contains(s));
        }
        let mut unmatched = node.on.clone();
        for s in successors.iter().filter(|s| alive.contains(*s)) {
            unmatched = &unmatched - &self.a2.edge_between(node.q2, s.q2);
        }
        unmatched.is_empty()
    }

    /// Maximal simulation, excluding pairs with `q1` in `bad1` and `q2` in `bad2` from the start.
    fn maximal(&self, bad1: &StateSet, bad2: &StateSet) -> BTreeSet<(State, State)> {
        let initial: HashSet<Node> = self
            .nodes()
            .into_iter()
            .filter(|n| !(n.is_main() && bad1.contains(n.q1 as u64) && bad2.contains(n.q2 as u64)))
            .collect();
        self.fixpoint(initial)
            .into_iter()
            .filter(Node::is_main)
            .map(|n| n.pair())
            .collect()
    }
}

/// Pairs `(q1, q2)` such that `q2` forward-simulates `q1`.
pub fn find_simulation_forward(a1: &dyn WordAutomaton, a2: &dyn WordAutomaton) -> BTreeSet<(State, State)> {
    find_simulation_forward_within(a1, a2, &a1.states(), &a2.states())
}

pub fn find_simulation_forward_within(
    a1: &dyn WordAutomaton,
    a2: &dyn WordAutomaton,
    states1: &StateSet,
    states2: &StateSet,
) -> BTreeSet<(State, State)> {
    let graph = SimulationGraph::new(a1, a2, states1, states2);
    let rejecting2 = &a2.states() - &a2.states_accepting();
    graph.maximal(&a1.states_accepting(), &rejecting2)
}

/// Pairs `(q1, q2)` such that `q2` backward-simulates `q1`.
pub fn find_simulation_backward(a1: &dyn WordAutomaton, a2: &dyn WordAutomaton) -> BTreeSet<(State, State)> {
    find_simulation_backward_within(a1, a2, &a1.states(), &a2.states())
}

pub fn find_simulation_backward_within(
    a1: &dyn WordAutomaton,
    a2: &dyn WordAutomaton,
    states1: &StateSet,
    states2: &StateSet,
) -> BTreeSet<(State, State)> {
    let r1 = Reversed::new(a1);
    let r2 = Reversed::new(a2);
    let graph = SimulationGraph::new(&r1, &r2, states1, states2);
    let non_starting2 = &a2.states() - &a2.states_starting();
    graph.maximal(&a1.states_starting(), &non_starting2)
}
