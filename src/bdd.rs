//! The BDD manager.
//!
//! All boolean functions used by the automata live in one [`Bdd`] manager:
//! a hash-consed node table plus a computed table for the recursive operations.
//! Edges carry a complement mark (see [`Ref`]), so negation is O(1) and the
//! high edge of a stored node is never negated.
//!
//! Besides the usual apply/quantify/rename operations, the manager provides
//! three *quotient* helpers that treat a function as a decision tree over the
//! variables below some `level`, with sub-functions hanging off its leaves:
//!
//! - [`Bdd::cofactors_below`] lists the distinct sub-functions,
//! - [`Bdd::replace_below`] rebuilds the tree with each sub-function replaced,
//! - [`Bdd::select_below`] returns the assignments leading to one sub-function.
//!
//! Determinization and minimization are built on top of them.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Debug;

use log::debug;

use crate::cache::Cache;
use crate::domain::Domain;
use crate::reference::Ref;
use crate::table::Table;
use crate::utils::{pairing2, pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            variable: 0,
            low: Ref::INVALID,
            high: Ref::INVALID,
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        pairing3(self.variable as u64, self.low.raw() as u64, self.high.raw() as u64)
    }
}

type Storage = Table<Node>;

impl Storage {
    fn variable(&self, index: u32) -> u32 {
        self.value(index as usize).variable
    }
    fn low(&self, index: u32) -> Ref {
        self.value(index as usize).low
    }
    fn high(&self, index: u32) -> Ref {
        self.value(index as usize).high
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum OpKey {
    Ite(Ref, Ref, Ref),
    Exists(Ref, Domain),
}

impl MyHash for OpKey {
    fn hash(&self) -> u64 {
        match self {
            OpKey::Ite(f, g, h) => pairing3(f.raw() as u64, g.raw() as u64, h.raw() as u64),
            OpKey::Exists(f, d) => pairing2(
                pairing2(f.raw() as u64, d.base() as u64),
                pairing2(d.len() as u64, 1),
            ),
        }
    }
}

/// Sizing of a [`Bdd`] manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BddConfig {
    /// Initial node table size is `2^storage_bits`; the table grows on demand.
    pub storage_bits: usize,
    /// Computed table size is `2^cache_bits`.
    pub cache_bits: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            storage_bits: 20,
            cache_bits: 16,
        }
    }
}

impl BddConfig {
    pub fn with_storage_bits(mut self, storage_bits: usize) -> Self {
        self.storage_bits = storage_bits;
        self
    }

    pub fn with_cache_bits(mut self, cache_bits: usize) -> Self {
        self.cache_bits = cache_bits;
        self
    }
}

pub struct Bdd {
    storage: RefCell<Storage>,
    cache: RefCell<Cache<OpKey, Ref>>,
    zero: Ref,
    one: Ref,
}

impl Bdd {
    pub fn new(storage_bits: usize) -> Self {
        let cache_bits = storage_bits.min(16);
        Self::with_config(BddConfig::default().with_storage_bits(storage_bits).with_cache_bits(cache_bits))
    }

    pub fn with_config(config: BddConfig) -> Self {
        assert!(
            config.storage_bits <= 31,
            "Storage bits should be in the range 0..=31"
        );

        let mut storage = Storage::new(config.storage_bits);

        // Allocate the terminal node:
        let one = storage.alloc();
        assert_eq!(one, 1); // Make sure the terminal node is (1).
        let one = Ref::positive(one as u32);
        let zero = -one;

        Self {
            storage: RefCell::new(storage),
            cache: RefCell::new(Cache::new(config.cache_bits)),
            zero,
            one,
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::with_config(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("Bdd")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .finish()
    }
}

impl Bdd {
    pub fn zero(&self) -> Ref {
        self.zero
    }
    pub fn one(&self) -> Ref {
        self.one
    }

    pub fn cache(&self) -> std::cell::Ref<'_, Cache<OpKey, Ref>> {
        self.cache.borrow()
    }

    /// Number of allocated nodes, including the terminal.
    pub fn num_nodes(&self) -> usize {
        self.storage.borrow().size()
    }

    pub fn variable(&self, index: u32) -> u32 {
        self.storage.borrow().variable(index)
    }
    pub fn low(&self, index: u32) -> Ref {
        self.storage.borrow().low(index)
    }
    pub fn high(&self, index: u32) -> Ref {
        self.storage.borrow().high(index)
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.index());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.index());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        self.is_zero(node) || self.is_one(node)
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        debug!("mk(v = {}, low = {}, high = {})", v, low, high);

        assert_ne!(v, 0, "Variable index should not be zero");

        // Handle canonicity
        if high.is_negated() {
            debug!("mk: restoring canonicity");
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            debug!("mk: duplicates {} == {}", low, high);
            return low;
        }

        let i = self.storage.borrow_mut().put(Node { variable: v, low, high });
        Ref::positive(i as u32)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        self.mk_node(v, self.zero, self.one)
    }

    /// Conjunction of DIMACS-style literals.
    pub fn cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| v.abs());
        debug!("cube(literals = {:?})", literals);
        literals.reverse();
        let mut current = self.one;
        for lit in literals {
            assert_ne!(lit, 0, "Variable index should not be zero");
            current = if lit < 0 {
                self.mk_node(-lit as u32, current, self.zero)
            } else {
                self.mk_node(lit as u32, self.zero, current)
            };
        }
        current
    }

    /// The single assignment of `domain` encoding `value`.
    pub fn mk_value(&self, domain: Domain, value: u64) -> Ref {
        assert!(
            domain.len() >= 64 || value >> domain.len() == 0,
            "Value {} does not fit into domain {}",
            value,
            domain
        );
        self.cube(domain.vars().enumerate().map(|(i, v)| {
            let v = v as i32;
            if (value >> i) & 1 == 1 {
                v
            } else {
                -v
            }
        }))
    }

    /// All values `lo..=hi` over `domain`.
    pub fn mk_range(&self, domain: Domain, lo: u64, hi: u64) -> Ref {
        if lo > hi {
            return self.zero;
        }
        self.apply_and(
            self.mk_at_most(domain, domain.len(), hi),
            self.mk_at_least(domain, domain.len(), lo),
        )
    }

    // Values over the lowest `bits` bits of `domain` that are <= `bound`.
    fn mk_at_most(&self, domain: Domain, bits: u32, bound: u64) -> Ref {
        if bits == 0 {
            return self.one;
        }
        let i = bits - 1;
        let v = domain.var(i);
        if bits < 64 && bound >> bits != 0 {
            return self.one;
        }
        let rest = self.mk_at_most(domain, i, bound & ((1u64 << i) - 1));
        if (bound >> i) & 1 == 1 {
            // bit i = 0: anything below, bit i = 1: the rest must fit
            self.apply_ite(self.mk_var(v), rest, self.one)
        } else {
            self.apply_ite(self.mk_var(v), self.zero, rest)
        }
    }

    // Values over the lowest `bits` bits of `domain` that are >= `bound`.
    fn mk_at_least(&self, domain: Domain, bits: u32, bound: u64) -> Ref {
        if bits == 0 {
            return if bound == 0 { self.one } else { self.zero };
        }
        let i = bits - 1;
        let v = domain.var(i);
        if bits < 64 && bound >> bits != 0 {
            return self.zero;
        }
        let rest = self.mk_at_least(domain, i, bound & ((1u64 << i) - 1));
        if (bound >> i) & 1 == 1 {
            self.apply_ite(self.mk_var(v), rest, self.zero)
        } else {
            self.apply_ite(self.mk_var(v), self.one, rest)
        }
    }

    pub fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        assert_ne!(v, 0, "Variable index should not be zero");

        let i = node.index();
        if self.is_terminal(node) || v < self.variable(i) {
            return (node, node);
        }
        assert_eq!(v, self.variable(i));
        if node.is_negated() {
            (-self.low(i), -self.high(i))
        } else {
            (self.low(i), self.high(i))
        }
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use bdd_automata::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1);
    /// let y = bdd.mk_var(2);
    /// let z = bdd.mk_var(3);
    /// let f = bdd.apply_ite(x, y, z);
    /// assert_eq!(f, bdd.mk_node(bdd.variable(x.index()), z, y));
    /// let x_and_y = bdd.apply_and(x, y);
    /// let not_x_and_z = bdd.apply_and(-x, z);
    /// assert_eq!(f, bdd.apply_or(x_and_y, not_x_and_z));
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        debug!("apply_ite(f = {}, g = {}, h = {})", f, g, h);

        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }

        // From now on, F is known not to be a constant
        assert!(!self.is_terminal(f));

        // More base cases:
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        //   ite(F,1,~F) => 1
        //   ite(F,F,1) => 1
        //   ite(F,~F,0) => 0
        //   ite(F,0,F) => 0
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }
        if self.is_one(g) && h == -f {
            return self.one;
        }
        if g == f && self.is_one(h) {
            return self.one;
        }
        if g == -f && self.is_zero(h) {
            return self.zero;
        }
        if self.is_zero(g) && h == f {
            return self.zero;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        if g == f {
            return self.apply_ite(f, self.one, h);
        }
        if h == f {
            return self.apply_ite(f, g, self.zero);
        }
        if g == -f {
            return self.apply_ite(f, self.zero, h);
        }
        if h == -f {
            return self.apply_ite(f, g, self.one);
        }

        let i = self.variable(f.index());
        let j = self.variable(g.index());
        let k = self.variable(h.index());
        assert_ne!(i, 0);

        // Equivalent pairs:
        //   ite(F,1,H) == ite(H,1,F) == F ∨ H
        //   ite(F,G,0) == ite(G,F,0) == F ∧ G
        //   ite(F,G,1) == ite(~G,~F,1) == F -> G
        //   ite(F,0,H) == ite(~H,0,~F) == ~F ∧ H
        //   ite(F,G,~G) == ite(G,F,~F)
        // (choose the one with the lowest variable)
        if self.is_one(g) && k < i {
            return self.apply_ite(h, self.one, f);
        }
        if self.is_zero(h) && j < i {
            return self.apply_ite(g, f, self.zero);
        }
        if self.is_one(h) && j < i {
            return self.apply_ite(-g, -f, self.one);
        }
        if self.is_zero(g) && k < i {
            return self.apply_ite(-h, self.zero, -f);
        }
        if g == -h && j < i {
            return self.apply_ite(g, f, -f);
        }

        // Make sure the first two pointers (f and g) are regular (not negated)
        let (mut f, mut g, mut h) = (f, g, h);

        // ite(~F,G,H) => ite(F,H,G)
        if f.is_negated() {
            f = -f;
            std::mem::swap(&mut g, &mut h);
        }

        // ite(F,~G,H) => ~ite(F,G,~H)
        let mut n = false;
        if g.is_negated() {
            n = true;
            g = -g;
            h = -h;
        }

        let (f, g, h) = (f, g, h); // make immutable

        let key = OpKey::Ite(f, g, h);
        let cached = self.cache.borrow().get(&key).copied();
        if let Some(res) = cached {
            debug!("cache: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let mut m = self.variable(f.index());
        let j = self.variable(g.index());
        let k = self.variable(h.index());
        if j != 0 {
            m = m.min(j);
        }
        if k != 0 {
            m = m.min(k);
        }
        assert_ne!(m, 0);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        debug!("computed: apply_ite(f = {}, g = {}, h = {}) -> {}", f, g, h, res);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_and(u = {}, v = {})", u, v);
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_or(u = {}, v = {})", u, v);
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_xor(u = {}, v = {})", u, v);
        self.apply_ite(u, -v, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_eq(u = {}, v = {})", u, v);
        self.apply_ite(u, v, -v)
    }

    pub fn apply_imply(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_imply(u = {}, v = {})", u, v);
        self.apply_ite(u, v, self.one)
    }

    /// `u ∧ ¬v`
    pub fn apply_diff(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_diff(u = {}, v = {})", u, v);
        self.apply_ite(v, self.zero, u)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.one;
        for node in nodes.into_iter() {
            res = self.apply_and(res, node);
        }
        res
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = self.zero;
        for node in nodes.into_iter() {
            res = self.apply_or(res, node);
        }
        res
    }

    /// `true` iff `f → g` is valid.
    pub fn is_implies(&self, f: Ref, g: Ref) -> bool {
        self.is_zero(self.apply_diff(f, g))
    }

    pub fn restrict_multi(&self, f: Ref, values: &HashMap<u32, bool>) -> Ref {
        let mut cache = HashMap::new();
        self.restrict_multi_(f, values, &mut cache)
    }

    fn restrict_multi_(&self, f: Ref, values: &HashMap<u32, bool>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }

        if values.is_empty() {
            return f;
        }

        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let i = self.variable(f.index());
        let res = if let Some(&b) = values.get(&i) {
            if b {
                // `i` needs to be assigned true
                self.restrict_multi_(self.high_node(f), values, cache)
            } else {
                // `i` needs to be assigned false
                self.restrict_multi_(self.low_node(f), values, cache)
            }
        } else {
            // `i` does not need to be assigned
            let low = self.restrict_multi_(self.low_node(f), values, cache);
            let high = self.restrict_multi_(self.high_node(f), values, cache);
            self.mk_node(i, low, high)
        };
        cache.insert(f, res);
        res
    }

    /// Existential quantification over every variable of `domain`.
    pub fn exists(&self, f: Ref, domain: Domain) -> Ref {
        if self.is_terminal(f) || domain.is_empty() {
            return f;
        }

        let v = self.variable(f.index());
        if v >= domain.end() {
            // Nothing to quantify below this node
            return f;
        }

        let key = OpKey::Exists(f, domain);
        let cached = self.cache.borrow().get(&key).copied();
        if let Some(res) = cached {
            return res;
        }

        let low = self.exists(self.low_node(f), domain);
        let res = if domain.contains(v) {
            if self.is_one(low) {
                self.one
            } else {
                let high = self.exists(self.high_node(f), domain);
                self.apply_or(low, high)
            }
        } else {
            let high = self.exists(self.high_node(f), domain);
            self.mk_node(v, low, high)
        };
        debug!("computed: exists(f = {}, domain = {}) -> {}", f, domain, res);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    /// Universal quantification over every variable of `domain`.
    pub fn forall(&self, f: Ref, domain: Domain) -> Ref {
        -self.exists(-f, domain)
    }

    /// `∃ domain. f ∧ g`
    pub fn rel_product(&self, f: Ref, g: Ref, domain: Domain) -> Ref {
        debug!("rel_product(f = {}, g = {}, domain = {})", f, g, domain);
        self.exists(self.apply_and(f, g), domain)
    }

    /// Simultaneous renaming of variables; unmapped variables stay in place.
    ///
    /// The mapping need not preserve the variable order.
    pub fn rename_vars(&self, f: Ref, map: &HashMap<u32, u32>) -> Ref {
        if map.is_empty() {
            return f;
        }
        let mut cache = HashMap::new();
        self.rename_vars_(f, map, &mut cache)
    }

    fn rename_vars_(&self, f: Ref, map: &HashMap<u32, u32>, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if self.is_terminal(f) {
            return f;
        }
        if f.is_negated() {
            return -self.rename_vars_(-f, map, cache);
        }
        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let v = self.variable(f.index());
        let low = self.rename_vars_(self.low(f.index()), map, cache);
        let high = self.rename_vars_(self.high(f.index()), map, cache);
        let w = map.get(&v).copied().unwrap_or(v);
        let res = self.apply_ite(self.mk_var(w), high, low);
        cache.insert(f, res);
        res
    }

    /// Evaluate `f` under a total assignment.
    pub fn evaluate(&self, f: Ref, assignment: impl Fn(u32) -> bool) -> bool {
        let mut current = f;
        while !self.is_terminal(current) {
            let v = self.variable(current.index());
            current = if assignment(v) {
                self.high_node(current)
            } else {
                self.low_node(current)
            };
        }
        self.is_one(current)
    }

    /// Variables that `f` depends on.
    pub fn support(&self, f: Ref) -> BTreeSet<u32> {
        let mut vars = BTreeSet::new();
        for i in self.descendants([f]) {
            let v = self.variable(i);
            if v != 0 {
                vars.insert(v);
            }
        }
        vars
    }

    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        visited.insert(self.one.index());
        let mut queue = VecDeque::from_iter(nodes);

        while let Some(node) = queue.pop_front() {
            let i = node.index();
            if visited.insert(i) {
                queue.push_back(self.low(i));
                queue.push_back(self.high(i));
            }
        }

        visited
    }

    pub fn size(&self, f: Ref) -> u64 {
        self.descendants([f]).len() as u64
    }

    /// Distinct sub-functions of `f` reached once every variable below `level` is decided.
    ///
    /// Terminals count as sub-functions. The order is the (deterministic) discovery order
    /// of a depth-first walk taking low edges first.
    pub fn cofactors_below(&self, f: Ref, level: u32) -> Vec<Ref> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![f];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if self.is_terminal(node) || self.variable(node.index()) >= level {
                if seen.insert(node) {
                    found.push(node);
                }
                continue;
            }
            stack.push(self.high_node(node));
            stack.push(self.low_node(node));
        }

        debug!("cofactors_below(f = {}, level = {}) -> {} sub-functions", f, level, found.len());
        found
    }

    /// Rebuild `f` with every sub-function `s` below `level` replaced by `g(s)`.
    ///
    /// `g(s)` may depend on any variables, including ones above `level`.
    pub fn replace_below(&self, f: Ref, level: u32, g: &mut dyn FnMut(Ref) -> Ref) -> Ref {
        let mut cache = HashMap::new();
        self.replace_below_(f, level, g, &mut cache)
    }

    fn replace_below_(
        &self,
        f: Ref,
        level: u32,
        g: &mut dyn FnMut(Ref) -> Ref,
        cache: &mut HashMap<Ref, Ref>,
    ) -> Ref {
        if let Some(&res) = cache.get(&f) {
            return res;
        }

        let res = if self.is_terminal(f) || self.variable(f.index()) >= level {
            g(f)
        } else {
            let v = self.variable(f.index());
            let low = self.replace_below_(self.low_node(f), level, g, cache);
            let high = self.replace_below_(self.high_node(f), level, g, cache);
            self.apply_ite(self.mk_var(v), high, low)
        };
        cache.insert(f, res);
        res
    }

    /// Assignments to the variables below `level` that lead `f` to the sub-function `s`.
    pub fn select_below(&self, f: Ref, level: u32, s: Ref) -> Ref {
        let (zero, one) = (self.zero, self.one);
        self.replace_below(f, level, &mut |node| if node == s { one } else { zero })
    }

    pub fn to_bracket_string(&self, node: Ref) -> String {
        if self.is_zero(node) {
            return "(0)".to_string();
        } else if self.is_one(node) {
            return "(1)".to_string();
        }

        let v = self.variable(node.index());
        let low = self.low_node(node);
        let high = self.high_node(node);

        format!(
            "{}:(x{}, {}, {})",
            node,
            v,
            self.to_bracket_string(high),
            self.to_bracket_string(low)
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use test_log::test;

    use super::*;

    #[test]
    fn test_var() {
        let bdd = Bdd::default();

        let x = bdd.mk_var(1);

        assert_eq!(bdd.variable(x.index()), 1);
        assert_eq!(bdd.high_node(x), bdd.one());
        assert_eq!(bdd.low_node(x), bdd.zero());
    }

    #[test]
    fn test_not_var() {
        let bdd = Bdd::default();

        let x = bdd.mk_var(1);
        let not_x = -x;

        assert_eq!(bdd.variable(not_x.index()), 1);
        assert_eq!(bdd.high_node(not_x), bdd.zero());
        assert_eq!(bdd.low_node(not_x), bdd.one());
    }

    #[test]
    fn test_terminal() {
        let bdd = Bdd::default();

        assert!(bdd.is_terminal(bdd.zero()));
        assert!(bdd.is_zero(bdd.zero()));
        assert!(!bdd.is_one(bdd.zero()));
        assert!(bdd.is_one(bdd.one()));
        assert_eq!(bdd.variable(bdd.one().index()), 0);
    }

    #[test]
    fn test_cube() {
        let bdd = Bdd::default();

        let x1 = bdd.mk_var(1);
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);

        let f = bdd.apply_and(bdd.apply_and(x1, x2), x3);
        assert_eq!(f, bdd.cube([1, 2, 3]));

        let f = bdd.apply_and(bdd.apply_and(x1, -x2), -x3);
        assert_eq!(f, bdd.cube([1, -2, -3]));
    }

    #[test]
    fn test_de_morgan() {
        let bdd = Bdd::default();

        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);

        assert_eq!(-bdd.apply_and(x, y), bdd.apply_or(-x, -y));
        assert_eq!(-bdd.apply_or(x, y), bdd.apply_and(-x, -y));
    }

    #[test]
    fn test_xor() {
        let bdd = Bdd::default();

        let f = bdd.apply_and(bdd.mk_var(1), bdd.mk_var(2));
        assert_eq!(bdd.apply_xor(f, f), bdd.zero());
        assert_eq!(bdd.apply_xor(f, -f), bdd.one());
    }

    #[test]
    fn test_apply_ite() {
        let bdd = Bdd::default();

        // Terminal cases
        let g = bdd.mk_var(2);
        let h = bdd.mk_var(3);
        assert_eq!(bdd.apply_ite(bdd.one(), g, h), g);
        assert_eq!(bdd.apply_ite(bdd.zero(), g, h), h);

        // Functions
        let f = bdd.mk_node(4, bdd.one(), h);
        assert_eq!(bdd.apply_ite(f, f, h), bdd.apply_or(f, h));
        assert_eq!(bdd.apply_ite(f, g, f), bdd.apply_and(f, g));
        assert_eq!(bdd.apply_ite(f, -g, bdd.one()), -bdd.apply_and(f, g));
        assert_eq!(bdd.apply_ite(f, bdd.zero(), -h), -bdd.apply_or(f, h));

        // General case
        let f = bdd.mk_var(6);
        let g = bdd.mk_var(7);
        let h = bdd.mk_var(8);
        let result = bdd.mk_node(bdd.variable(f.index()), -g, -h);
        assert_eq!(bdd.apply_ite(-f, -g, -h), result);
    }

    #[test]
    fn test_diff() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        assert_eq!(bdd.apply_diff(x, y), bdd.apply_and(x, -y));
        assert!(bdd.is_implies(bdd.apply_diff(x, y), x));
        assert!(!bdd.is_implies(x, y));
    }

    #[test]
    fn test_diff_with_itself() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let f = bdd.apply_or(bdd.cube([1, -3]), bdd.mk_var(2));
        assert_eq!(bdd.apply_diff(x, x), bdd.zero());
        assert_eq!(bdd.apply_diff(f, f), bdd.zero());
        assert_eq!(bdd.apply_ite(f, bdd.zero(), f), bdd.zero());
        assert_eq!(bdd.apply_ite(-f, bdd.zero(), -f), bdd.zero());
        assert!(bdd.is_implies(f, f));
    }

    /// Truth table of `f` over the variables `1..=4`, bit `i` for the assignment `i`.
    fn truth_table(bdd: &Bdd, f: Ref) -> u16 {
        (0..16u32)
            .filter(|&i| bdd.evaluate(f, |v| (i >> (v - 1)) & 1 == 1))
            .fold(0, |acc, i| acc | (1 << i))
    }

    #[test]
    fn test_apply_ite_against_truth_tables() {
        let bdd = Bdd::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2025);

        // Terminals, literals and their complements, with their truth tables.
        let mut pool: Vec<(Ref, u16)> = vec![(bdd.zero(), 0), (bdd.one(), 0xFFFF)];
        for v in 1..=4 {
            let x = bdd.mk_var(v);
            let table = truth_table(&bdd, x);
            pool.push((x, table));
            pool.push((-x, !table));
        }

        for _ in 0..2000 {
            let (f, tf) = pool[rng.random_range(0..pool.len())];
            let (g, tg) = pool[rng.random_range(0..pool.len())];
            // Bias towards the degenerate triples.
            let (h, th) = match rng.random_range(0..4) {
                0 => (f, tf),
                1 => (-f, !tf),
                2 => (g, tg),
                _ => pool[rng.random_range(0..pool.len())],
            };
            let res = bdd.apply_ite(f, g, h);
            let expected = (tf & tg) | (!tf & th);
            assert_eq!(truth_table(&bdd, res), expected, "ite({}, {}, {})", f, g, h);
            if pool.len() < 200 {
                pool.push((res, expected));
            }
        }

        // Canonicity: equal functions are equal references.
        for &(f, tf) in &pool {
            for &(g, tg) in &pool {
                assert_eq!(f == g, tf == tg, "{} vs {}", f, g);
            }
        }
    }

    #[test]
    fn test_restrict_multi() {
        let bdd = Bdd::default();
        let f = bdd.apply_or(bdd.cube([1, 2]), bdd.cube([-1, 3]));
        let values = HashMap::from([(1, true)]);
        assert_eq!(bdd.restrict_multi(f, &values), bdd.mk_var(2));
        let values = HashMap::from([(1, false), (3, true)]);
        assert_eq!(bdd.restrict_multi(f, &values), bdd.one());
    }

    #[test]
    fn test_exists() {
        let bdd = Bdd::default();
        let f = bdd.apply_and(bdd.cube([1, -2]), bdd.mk_var(5));
        assert_eq!(bdd.exists(f, Domain::new(1, 2)), bdd.mk_var(5));
        assert_eq!(bdd.exists(f, Domain::new(5, 1)), bdd.cube([1, -2]));
        assert_eq!(bdd.exists(f, Domain::new(1, 10)), bdd.one());
        assert_eq!(bdd.exists(bdd.zero(), Domain::new(1, 10)), bdd.zero());
    }

    #[test]
    fn test_forall() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let f = bdd.apply_or(x, y);
        assert_eq!(bdd.forall(f, Domain::new(1, 1)), y);
        assert_eq!(bdd.forall(bdd.apply_or(x, -x), Domain::new(1, 1)), bdd.one());
    }

    #[test]
    fn test_rel_product() {
        let bdd = Bdd::default();
        // R(x1, x2) = x1 <-> x2, S(x1) = x1
        let r = bdd.apply_eq(bdd.mk_var(1), bdd.mk_var(2));
        let s = bdd.mk_var(1);
        assert_eq!(bdd.rel_product(r, s, Domain::new(1, 1)), bdd.mk_var(2));
    }

    #[test]
    fn test_rename_vars_swap() {
        let bdd = Bdd::default();
        // f = x1 ∧ ¬x2
        let f = bdd.cube([1, -2]);
        let map = HashMap::from([(1, 2), (2, 1)]);
        assert_eq!(bdd.rename_vars(f, &map), bdd.cube([2, -1]));
    }

    #[test]
    fn test_rename_vars_order_change() {
        let bdd = Bdd::default();
        // f = x1 ∨ x5, move x1 below x5
        let f = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(5));
        let map = HashMap::from([(1, 9)]);
        let g = bdd.rename_vars(f, &map);
        assert_eq!(g, bdd.apply_or(bdd.mk_var(9), bdd.mk_var(5)));
        assert_eq!(bdd.rename_vars(-f, &map), -g);
    }

    #[test]
    fn test_values_and_ranges() {
        let bdd = Bdd::default();
        let d = Domain::new(3, 3);
        let five = bdd.mk_value(d, 5);
        assert_eq!(five, bdd.cube([3, -4, 5]));

        let range = bdd.mk_range(d, 2, 5);
        let count = bdd.sat_count(range, 3);
        assert_eq!(count, 4u32.into());
        for v in 0..8u64 {
            let inside = bdd.evaluate(range, |x| (v >> (x - 3)) & 1 == 1);
            assert_eq!(inside, (2..=5).contains(&v), "value {}", v);
        }
        assert_eq!(bdd.mk_range(d, 0, 7), bdd.one());
        assert_eq!(bdd.mk_range(d, 3, 2), bdd.zero());
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_value_too_wide() {
        let bdd = Bdd::default();
        bdd.mk_value(Domain::new(1, 2), 4);
    }

    #[test]
    fn test_support() {
        let bdd = Bdd::default();
        let f = bdd.apply_xor(bdd.mk_var(4), bdd.mk_var(2));
        assert_eq!(bdd.support(f).into_iter().collect::<Vec<_>>(), vec![2, 4]);
        assert!(bdd.support(bdd.one()).is_empty());
    }

    #[test]
    fn test_cofactors_below() {
        let bdd = Bdd::default();
        // x1 selects between two functions over x5, x6
        let a = bdd.apply_and(bdd.mk_var(5), bdd.mk_var(6));
        let b = bdd.apply_or(bdd.mk_var(5), bdd.mk_var(6));
        let f = bdd.apply_ite(bdd.mk_var(1), a, b);
        let subs = bdd.cofactors_below(f, 5);
        println!("subs = {:?}", subs);
        assert_eq!(subs, vec![b, a]);

        // Sharing: both branches lead to the same sub-function
        let g = bdd.apply_and(bdd.apply_xor(bdd.mk_var(1), bdd.mk_var(2)), a);
        let subs = bdd.cofactors_below(g, 5);
        assert_eq!(subs.len(), 2);
        assert!(subs.contains(&a));
        assert!(subs.contains(&bdd.zero()));
    }

    #[test]
    fn test_replace_and_select_below() {
        let bdd = Bdd::default();
        let a = bdd.apply_and(bdd.mk_var(5), bdd.mk_var(6));
        let b = bdd.apply_or(bdd.mk_var(5), bdd.mk_var(6));
        let f = bdd.apply_ite(bdd.mk_var(1), a, b);

        assert_eq!(bdd.select_below(f, 5, a), bdd.mk_var(1));
        assert_eq!(bdd.select_below(f, 5, b), -bdd.mk_var(1));
        assert_eq!(bdd.select_below(f, 5, bdd.zero()), bdd.zero());

        // Replace with functions over a variable in between, breaking the original order.
        let x3 = bdd.mk_var(3);
        let g = bdd.replace_below(f, 5, &mut |s| if s == a { x3 } else { -x3 });
        assert_eq!(g, bdd.apply_eq(bdd.mk_var(1), x3));
    }

    #[test]
    fn test_table_growth() {
        let bdd = Bdd::new(2);
        let vars: Vec<Ref> = (1..=12).map(|v| bdd.mk_var(v)).collect();
        let f = bdd.apply_or_many(vars.iter().copied());
        assert!(bdd.num_nodes() > 4);
        assert_eq!(bdd.size(f), 13);
        println!("{:?}", bdd);
    }

    #[test]
    fn test_bracket_string() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        assert_eq!(bdd.to_bracket_string(x), format!("{}:(x1, (1), (0))", x));
    }
}
