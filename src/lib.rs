//! # bdd-automata: symbolic finite automata over BDD-encoded alphabets
//!
//! **`bdd-automata`** manipulates finite word automata whose alphabets are sets of bit
//! vectors, represented as boolean functions rather than enumerated letter by letter.
//! Everything lives in one [`Bdd`][crate::bdd::Bdd] manager: symbols, sets of states and
//! whole transition tables.
//!
//! ## Key Features
//!
//! - **One contract, several encodings**: [`WordAutomaton`][crate::automaton::WordAutomaton]
//!   needs a handful of primitives and derives successors, reachability and the rest.
//! - **Canonical encoding**: [`BNfa`][crate::bnfa::BNfa] keeps its transitions in a single
//!   ternary relation, so determinization, minimization and products never enumerate states.
//! - **Simulations**: forward and backward simulation preorders over any encoding, see
//!   [`simulation`].
//! - **1-Based Indexing**: BDD variables and symbol bits are 1-indexed, as in the manager.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use bdd_automata::automaton::WordAutomaton;
//! use bdd_automata::bdd::Bdd;
//! use bdd_automata::bnfa::BNfa;
//! use bdd_automata::symbol::SymbolSet;
//!
//! let bdd = Rc::new(Bdd::default());
//! let a = SymbolSet::var(&bdd, 1);
//! let b = !&a;
//!
//! // Words ending with `a`
//! let mut nfa = BNfa::new(&bdd);
//! let q0 = nfa.add_state(false, true);
//! let q1 = nfa.add_state(true, false);
//! nfa.add_edge(q0, &(&a | &b), q0);
//! nfa.add_edge(q0, &a, q1);
//!
//! let det = nfa.deterministic();
//! assert!(det.is_complete_deterministic());
//! assert_eq!(det.minimize().n_states(), 2);
//! assert!(det == nfa);
//!
//! // Its complement is the words ending with `b`, or empty
//! let not_nfa = !&nfa;
//! assert!((&not_nfa & &nfa).is_false());
//! assert!((&not_nfa | &nfa).is_true());
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: the BDD manager, with quantification, renaming and the quotient helpers.
//! - **[`set`]**, **[`symbol`]**, **[`relation`]**: typed views of BDDs over variable [`domain`]s.
//! - **[`layout`]**: the variable blocks shared by every automaton.
//! - **[`automaton`]**, **[`bnfa`]**, **[`mnfa`]**: the contract and its encodings.
//! - **[`simulation`]**: the simulation game.
//! - **[`regular`]**: synchronous relations between words, read by a single automaton.

pub mod automaton;
pub mod bdd;
pub mod bnfa;
pub mod cache;
pub mod domain;
pub mod layout;
pub mod mnfa;
pub mod reference;
pub mod regular;
pub mod relation;
pub mod sat;
pub mod set;
pub mod simulation;
pub mod symbol;
pub mod table;
pub mod utils;
