//! Checks closure laws of regular languages on random automata.
//!
//! Run with:
//! ```bash
//! cargo run --example closure -- --states 5 --rounds 10
//! ```

use std::rc::Rc;
use std::time::Instant;

use clap::Parser;
use log::info;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use bdd_automata::automaton::WordAutomaton;
use bdd_automata::bdd::{Bdd, BddConfig};
use bdd_automata::bnfa::BNfa;
use bdd_automata::domain::Domain;
use bdd_automata::symbol::SymbolSet;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of states of each random automaton.
    #[arg(long, value_name = "INT", default_value = "4")]
    states: u32,

    /// Number of random pairs to check.
    #[arg(long, value_name = "INT", default_value = "5")]
    rounds: usize,

    /// Number of symbol bits.
    #[arg(long, value_name = "INT", default_value = "2")]
    bits: u32,

    /// Random seed.
    #[arg(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// BDD size (in bits, so the initial size is `2^size` nodes).
    #[arg(long, value_name = "INT", default_value = "20")]
    size: usize,
}

fn random_automaton(bdd: &Rc<Bdd>, rng: &mut ChaCha8Rng, n_states: u32, bits: Domain) -> BNfa {
    let letters = 1u64 << bits.len();
    let mut nfa = BNfa::new(bdd);
    for q in 0..n_states {
        nfa.add_state(rng.random_bool(0.3), q == 0);
    }
    for q in 0..n_states {
        for r in 0..n_states {
            if rng.random_bool(0.3) {
                let on = SymbolSet::value(bdd, bits, rng.random_range(0..letters));
                nfa.add_edge(q, &on, r);
            }
        }
    }
    nfa
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let bdd = Rc::new(Bdd::with_config(BddConfig::default().with_storage_bits(args.size)));
    let bits = Domain::new(1, args.bits);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for round in 0..args.rounds {
        let a = random_automaton(&bdd, &mut rng, args.states, bits);
        let b = random_automaton(&bdd, &mut rng, args.states, bits);

        let det = a.deterministic();
        let min = det.minimize();
        info!(
            "round {}: {} states, deterministic {}, minimal {}",
            round,
            a.n_states(),
            det.n_states(),
            min.n_states()
        );

        let star = (&a | &b).kleene();
        let laws = [
            ("(a* b*)* = (a | b)*", (&a.kleene() * &b.kleene()).kleene() == star),
            ("(a* | b*)* = (a | b)*", (&a.kleene() | &b.kleene()).kleene() == star),
            ("!(a | b) = !a & !b", !&(&a | &b) == &!&a & &!&b),
            ("a - b = a & !b", &a - &b == &a & &!&b),
            ("min(a) = a", min == a),
            ("rev(rev(a)) = a", a.reverse().reverse() == a),
        ];
        for (name, holds) in laws {
            println!("round {}: {:<24} {}", round, name, if holds { "ok" } else { "FAILED" });
        }
    }

    println!("bdd = {:?}", bdd);
    println!("cache hits = {}, misses = {}", bdd.cache().hits(), bdd.cache().misses());
    let time_total = time_total.elapsed();
    println!("\nAll done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
