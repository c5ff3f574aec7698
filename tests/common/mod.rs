#![allow(dead_code)]

use std::rc::Rc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use bdd_automata::automaton::WordAutomaton;
use bdd_automata::bdd::Bdd;
use bdd_automata::bnfa::BNfa;
use bdd_automata::domain::Domain;
use bdd_automata::mnfa::MNfa;
use bdd_automata::symbol::SymbolSet;

/// Symbols are 2-bit vectors: four letters.
pub const BITS: Domain = Domain::new(1, 2);

pub fn letter(bdd: &Rc<Bdd>, value: u64) -> SymbolSet {
    SymbolSet::value(bdd, BITS, value)
}

/// A non-empty set of letters.
pub fn random_symbols(bdd: &Rc<Bdd>, rng: &mut ChaCha8Rng) -> SymbolSet {
    loop {
        let letters: Vec<u64> = (0..4).filter(|_| rng.random_bool(0.5)).collect();
        if !letters.is_empty() {
            return SymbolSet::values(bdd, BITS, letters);
        }
    }
}

pub fn random_mnfa(bdd: &Rc<Bdd>, rng: &mut ChaCha8Rng, n_states: usize, density: f64) -> MNfa {
    let mut nfa = MNfa::new(bdd);
    for i in 0..n_states {
        nfa.add_state(rng.random_bool(0.3), i == 0 || rng.random_bool(0.2));
    }
    for q in 0..n_states as u32 {
        for r in 0..n_states as u32 {
            if rng.random_bool(density) {
                let on = random_symbols(bdd, rng);
                nfa.add_edge(q, &on, r);
            }
        }
    }
    nfa
}

pub fn random_bnfa(bdd: &Rc<Bdd>, rng: &mut ChaCha8Rng, n_states: usize, density: f64) -> BNfa {
    BNfa::from_automaton(&random_mnfa(bdd, rng, n_states, density))
}

/// Whether the word (a sequence of letters) is accepted, by explicit simulation of runs.
pub fn accepts(a: &dyn WordAutomaton, word: &[u64]) -> bool {
    let bdd = a.manager();
    let mut current = a.states_starting();
    for &x in word {
        current = a.successors(&current, &letter(bdd, x));
    }
    current.intersects(&a.states_accepting())
}

/// Every word over the four letters up to the given length.
pub fn words(max_len: usize) -> Vec<Vec<u64>> {
    let mut all = vec![vec![]];
    let mut layer = vec![vec![]];
    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|w: &Vec<u64>| {
                (0..4).map(move |x| {
                    let mut w = w.clone();
                    w.push(x);
                    w
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }
    all
}
