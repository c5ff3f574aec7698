//! Variable layout shared by every automaton.
//!
//! BDD variables are ordered by index, so the blocks below are also the
//! decision order of every transition relation:
//!
//! ```text
//! source states < partition names < destination states < alphabet < scratch
//! ```
//!
//! Determinization and minimization rely on this order: they split a relation
//! at the start of a block with [`Bdd::cofactors_below`][crate::bdd::Bdd::cofactors_below].

use crate::domain::Domain;

/// Maximal number of bits of a state index.
pub const MAX_STATE_VARS: u32 = 32;

pub const SOURCE_BASE: u32 = 1;
/// Block names of source states during minimization.
pub const PARTITION_BASE: u32 = SOURCE_BASE + MAX_STATE_VARS;
pub const DEST_BASE: u32 = PARTITION_BASE + MAX_STATE_VARS;
pub const ALPHABET_BASE: u32 = DEST_BASE + MAX_STATE_VARS;

/// Number of symbol bits an alphabet may use.
pub const MAX_SYMBOL_VARS: u32 = 1 << 16;

/// Power-states, block names of destinations, renaming targets.
pub const SCRATCH_BASE: u32 = ALPHABET_BASE + MAX_SYMBOL_VARS;

/// Domain of state sets of an automaton whose indices use `n_vars` bits.
pub fn state_domain(n_vars: u32) -> Domain {
    assert!(
        n_vars <= MAX_STATE_VARS,
        "State indices need {} bits, at most {} are supported",
        n_vars,
        MAX_STATE_VARS
    );
    Domain::new(SOURCE_BASE, n_vars)
}

/// Domain of destinations with the same width.
pub fn dest_domain(n_vars: u32) -> Domain {
    state_domain(n_vars).at(DEST_BASE)
}

pub fn partition_domain(n_vars: u32) -> Domain {
    state_domain(n_vars).at(PARTITION_BASE)
}

pub fn scratch_domain(n_vars: u32) -> Domain {
    Domain::new(SCRATCH_BASE, n_vars)
}

/// The whole alphabet block.
pub fn alphabet_domain() -> Domain {
    Domain::new(ALPHABET_BASE, MAX_SYMBOL_VARS)
}

/// BDD variables carrying the given symbol bits.
pub fn symbol_domain(bits: Domain) -> Domain {
    assert!(
        bits.end() <= MAX_SYMBOL_VARS + 1,
        "Symbol bits {} exceed the alphabet block",
        bits
    );
    Domain::new(ALPHABET_BASE + bits.base() - 1, bits.len())
}

/// Domains of the positions (source, symbol, destination) of a transition relation.
pub fn transition_domains(n_vars: u32) -> Vec<Domain> {
    vec![state_domain(n_vars), alphabet_domain(), dest_domain(n_vars)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_are_disjoint_and_ordered() {
        let blocks = [
            state_domain(MAX_STATE_VARS),
            partition_domain(MAX_STATE_VARS),
            dest_domain(MAX_STATE_VARS),
            alphabet_domain(),
            scratch_domain(MAX_STATE_VARS),
        ];
        for w in blocks.windows(2) {
            assert!(!w[0].overlaps(w[1]));
            assert!(w[0].end() <= w[1].base());
        }
    }

    #[test]
    fn test_symbol_domain() {
        assert_eq!(symbol_domain(Domain::new(1, 2)), Domain::new(ALPHABET_BASE, 2));
        assert_eq!(symbol_domain(Domain::new(3, 1)).base(), ALPHABET_BASE + 2);
    }

    #[test]
    #[should_panic(expected = "at most")]
    fn test_state_domain_too_wide() {
        state_domain(MAX_STATE_VARS + 1);
    }
}
