use rustc_hash::FxHashMap;

use pbip_formula::{Lit, Var};
use pbip_lrat::{ClauseStore, LratError, LratSink, TAUTOLOGY_ID};

/// Index into the manager's node arena. `0` and `1` are the reserved leaves.
pub type NodeId = u32;

pub const FALSE: NodeId = 0;
pub const TRUE: NodeId = 1;

const FIRST_REAL: NodeId = 2;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct UniqueKey {
    var: Var,
    hi: NodeId,
    lo: NodeId,
}

struct Node {
    var: Var,
    hi: NodeId,
    lo: NodeId,
    /// This node's own extension variable: the boolean it "is".
    ext: Var,
    hd: Option<u64>,
    ld: Option<u64>,
    hu: Option<u64>,
    lu: Option<u64>,
}

/// A clause literal that may come from a leaf node: leaves don't have a real extension variable,
/// so including one in a defining/justification clause either makes the whole clause vacuously
/// true ([`Tautology`](ClauseLit::Tautology), skip emitting it) or contributes nothing
/// ([`Omit`](ClauseLit::Omit), drop it from the literal list).
#[derive(Clone, Copy)]
pub enum ClauseLit {
    Omit,
    Tautology,
    Lit(Lit),
}

/// Reduced ordered BDD manager with a unique table, apply/implication caches, and LRAT defining
/// clause emission for every newly allocated node.
///
/// This is the system's trusted core (see the crate's top-level docs): `find_or_make` emits its
/// four defining clauses as axioms of the fresh extension variable it introduces, which is sound
/// because that variable cannot yet appear in any earlier clause.
pub struct BddManager<S> {
    nodes: Vec<Node>,
    unique: FxHashMap<UniqueKey, NodeId>,
    and_cache: FxHashMap<(NodeId, NodeId), NodeId>,
    or_cache: FxHashMap<(NodeId, NodeId), NodeId>,
    imply_cache: FxHashMap<(NodeId, NodeId), Option<u64>>,
    equant_cache: FxHashMap<(NodeId, Var), (NodeId, u64)>,
    levels: FxHashMap<Var, usize>,
    next_var_index: usize,
    pub clauses: ClauseStore<S>,
}

impl<S: LratSink> BddManager<S> {
    /// Creates a manager whose BDD variable order follows `problem_order` (ties among extension
    /// variables created later are broken by creation order, sorting after every problem
    /// variable).
    pub fn new(problem_order: &[Var], clauses: ClauseStore<S>) -> Self {
        let mut levels = FxHashMap::default();
        for (level, &var) in problem_order.iter().enumerate() {
            levels.insert(var, level);
        }
        let next_var_index = problem_order
            .iter()
            .map(|var| var.index() + 1)
            .max()
            .unwrap_or(0);

        BddManager {
            nodes: Vec::new(),
            unique: FxHashMap::default(),
            and_cache: FxHashMap::default(),
            or_cache: FxHashMap::default(),
            imply_cache: FxHashMap::default(),
            equant_cache: FxHashMap::default(),
            levels,
            next_var_index,
            clauses,
        }
    }

    /// Registers a problem variable, assigning it the next free level if it is new to the
    /// ordering. A no-op for variables already known.
    pub fn new_variable(&mut self, var: Var) {
        if !self.levels.contains_key(&var) {
            let next_level = self.levels.len();
            self.levels.insert(var, next_level);
        }
        self.next_var_index = self.next_var_index.max(var.index() + 1);
    }

    fn level(&self, var: Var) -> usize {
        self.levels.get(&var).copied().unwrap_or(usize::MAX)
    }

    /// The BDD level of a variable, for callers (the constraint-BDD walk, the reducers) that
    /// need to order literals without reaching into a node.
    pub fn level_of(&self, var: Var) -> usize {
        self.level(var)
    }

    fn fresh_extension_var(&mut self) -> Var {
        let var = Var::from_index(self.next_var_index);
        self.next_var_index += 1;
        var
    }

    fn node(&self, n: NodeId) -> &Node {
        &self.nodes[(n - FIRST_REAL) as usize]
    }

    /// The decision variable of a node, or `None` for a leaf.
    pub fn var_of(&self, n: NodeId) -> Option<Var> {
        if n < FIRST_REAL {
            None
        } else {
            Some(self.node(n).var)
        }
    }

    fn top_level(&self, n: NodeId) -> usize {
        self.var_of(n).map(|var| self.level(var)).unwrap_or(usize::MAX)
    }

    pub fn is_leaf(&self, n: NodeId) -> bool {
        n < FIRST_REAL
    }

    /// This node's identity as a positively-occurring clause literal.
    pub fn lit_pos(&self, n: NodeId) -> ClauseLit {
        match n {
            TRUE => ClauseLit::Tautology,
            FALSE => ClauseLit::Omit,
            _ => ClauseLit::Lit(self.node(n).ext.positive()),
        }
    }

    /// This node's identity as a negatively-occurring clause literal.
    pub fn lit_neg(&self, n: NodeId) -> ClauseLit {
        match n {
            TRUE => ClauseLit::Omit,
            FALSE => ClauseLit::Tautology,
            _ => ClauseLit::Lit(self.node(n).ext.negative()),
        }
    }

    /// The literal for a real node's extension variable. Panics on a leaf; callers that might
    /// see a leaf should use [`lit_pos`](Self::lit_pos)/[`lit_neg`](Self::lit_neg) instead.
    pub fn node_lit(&self, n: NodeId) -> Lit {
        self.node(n).ext.positive()
    }

    fn cofactor(&self, n: NodeId, var: Var) -> (NodeId, NodeId) {
        if self.var_of(n) == Some(var) {
            (self.node(n).hi, self.node(n).lo)
        } else {
            (n, n)
        }
    }

    /// Builds a clause from [`ClauseLit`]s, returning `None` when any part is
    /// [`Tautology`](ClauseLit::Tautology) (the whole clause is then vacuous and should not be
    /// emitted).
    fn build_clause(parts: &[ClauseLit]) -> Option<Vec<Lit>> {
        let mut lits = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                ClauseLit::Tautology => return None,
                ClauseLit::Omit => {}
                ClauseLit::Lit(lit) => lits.push(*lit),
            }
        }
        Some(lits)
    }

    fn emit_defining(&mut self, parts: &[ClauseLit]) -> Result<Option<u64>, LratError> {
        match Self::build_clause(parts) {
            None => Ok(None),
            Some(lits) => Ok(Some(self.clauses.add_derived(&lits, &[], None)?)),
        }
    }

    /// `findOrMake(var, hi, lo)`: returns the reduced, unique node for `var ? hi : lo`,
    /// allocating a fresh extension variable and emitting its four defining clauses if the
    /// triple hasn't been built before.
    pub fn find_or_make(&mut self, var: Var, hi: NodeId, lo: NodeId) -> Result<NodeId, LratError> {
        if hi == lo {
            return Ok(hi);
        }

        let key = UniqueKey { var, hi, lo };
        if let Some(&existing) = self.unique.get(&key) {
            return Ok(existing);
        }

        let ext = self.fresh_extension_var();
        let node_id = self.nodes.len() as NodeId + FIRST_REAL;
        self.nodes.push(Node {
            var,
            hi,
            lo,
            ext,
            hd: None,
            ld: None,
            hu: None,
            lu: None,
        });
        self.unique.insert(key, node_id);

        let node_pos = ClauseLit::Lit(ext.positive());
        let node_neg = ClauseLit::Lit(ext.negative());
        let var_pos = ClauseLit::Lit(var.positive());
        let var_neg = ClauseLit::Lit(var.negative());
        let hi_pos = self.lit_pos(hi);
        let hi_neg = self.lit_neg(hi);
        let lo_pos = self.lit_pos(lo);
        let lo_neg = self.lit_neg(lo);

        let hd = self.emit_defining(&[node_neg, var_neg, hi_pos])?;
        let ld = self.emit_defining(&[node_neg, var_pos, lo_pos])?;
        let hu = self.emit_defining(&[node_pos, var_neg, hi_neg])?;
        let lu = self.emit_defining(&[node_pos, var_pos, lo_neg])?;

        let node = &mut self.nodes[(node_id - FIRST_REAL) as usize];
        node.hd = hd;
        node.ld = ld;
        node.hu = hu;
        node.lu = lu;

        log::trace!(
            "new bdd node {} at var {} (ext {}), {} nodes total",
            node_id,
            var,
            ext,
            self.nodes.len()
        );

        Ok(node_id)
    }

    pub fn literal(&mut self, var: Var, polarity: bool) -> Result<NodeId, LratError> {
        if polarity {
            self.find_or_make(var, TRUE, FALSE)
        } else {
            self.find_or_make(var, FALSE, TRUE)
        }
    }

    fn top_var(&self, f: NodeId, g: NodeId) -> Var {
        if self.top_level(f) <= self.top_level(g) {
            self.var_of(f).expect("at least one of f, g is not a leaf")
        } else {
            self.var_of(g).expect("at least one of f, g is not a leaf")
        }
    }

    /// `applyAnd(f, g)`: pure BDD construction of the conjunction, without justification.
    pub fn apply_and(&mut self, f: NodeId, g: NodeId) -> Result<NodeId, LratError> {
        if f == FALSE || g == FALSE {
            return Ok(FALSE);
        }
        if f == TRUE {
            return Ok(g);
        }
        if g == TRUE || f == g {
            return Ok(f);
        }
        let key = (f.min(g), f.max(g));
        if let Some(&h) = self.and_cache.get(&key) {
            return Ok(h);
        }

        let var = self.top_var(f, g);
        let (f_hi, f_lo) = self.cofactor(f, var);
        let (g_hi, g_lo) = self.cofactor(g, var);
        let hi = self.apply_and(f_hi, g_hi)?;
        let lo = self.apply_and(f_lo, g_lo)?;
        let h = self.find_or_make(var, hi, lo)?;

        self.and_cache.insert(key, h);
        Ok(h)
    }

    /// `applyOr(f, g)`: pure BDD construction of the disjunction.
    pub fn apply_or(&mut self, f: NodeId, g: NodeId) -> Result<NodeId, LratError> {
        if f == TRUE || g == TRUE {
            return Ok(TRUE);
        }
        if f == FALSE || f == g {
            return Ok(g);
        }
        if g == FALSE {
            return Ok(f);
        }
        let key = (f.min(g), f.max(g));
        if let Some(&h) = self.or_cache.get(&key) {
            return Ok(h);
        }

        let var = self.top_var(f, g);
        let (f_hi, f_lo) = self.cofactor(f, var);
        let (g_hi, g_lo) = self.cofactor(g, var);
        let hi = self.apply_or(f_hi, g_hi)?;
        let lo = self.apply_or(f_lo, g_lo)?;
        let h = self.find_or_make(var, hi, lo)?;

        self.or_cache.insert(key, h);
        Ok(h)
    }

    /// `justifyImply(f, g)`: `Some(cid)` proving `f ⇒ g` via a single emitted clause
    /// `(¬f.id ∨ g.id)` (built from recursively justified children), `None` if the implication
    /// does not hold.
    pub fn justify_imply(&mut self, f: NodeId, g: NodeId) -> Result<Option<u64>, LratError> {
        if f == FALSE || g == TRUE {
            return Ok(Some(TAUTOLOGY_ID));
        }
        if f == TRUE && g == FALSE {
            return Ok(None);
        }
        if f == g {
            return Ok(Some(TAUTOLOGY_ID));
        }

        let key = (f, g);
        if let Some(&cached) = self.imply_cache.get(&key) {
            return Ok(cached);
        }

        let result = self.justify_imply_uncached(f, g)?;
        self.imply_cache.insert(key, result);
        Ok(result)
    }

    fn justify_imply_uncached(&mut self, f: NodeId, g: NodeId) -> Result<Option<u64>, LratError> {
        let var = self.top_var(f, g);
        let (f_hi, f_lo) = self.cofactor(f, var);
        let (g_hi, g_lo) = self.cofactor(g, var);

        let hi_chain = self.justify_imply(f_hi, g_hi)?;
        let lo_chain = self.justify_imply(f_lo, g_lo)?;

        let (hi_chain, lo_chain) = match (hi_chain, lo_chain) {
            (Some(hi), Some(lo)) => (hi, lo),
            _ => return Ok(None),
        };

        let clause = Self::build_clause(&[self.lit_neg(f), self.lit_pos(g)]);
        match clause {
            None => Ok(Some(TAUTOLOGY_ID)),
            Some(lits) => {
                let mut antecedents = vec![hi_chain, lo_chain];
                antecedents.extend(self.defining_ids(f));
                antecedents.extend(self.defining_ids(g));
                let id = self.clauses.add_derived(&lits, &antecedents, None)?;
                Ok(Some(id))
            }
        }
    }

    fn defining_ids(&self, n: NodeId) -> Vec<u64> {
        if self.is_leaf(n) {
            return vec![];
        }
        let node = self.node(n);
        [node.hd, node.ld, node.hu, node.lu]
            .iter()
            .filter_map(|id| *id)
            .collect()
    }

    /// `applyAndJustify(f, g)`: builds the conjunction and justifies `f ∧ g ⇒ h` in one call.
    pub fn apply_and_justify(&mut self, f: NodeId, g: NodeId) -> Result<(NodeId, u64), LratError> {
        let h = self.apply_and(f, g)?;
        // `h` is literally `applyAnd(f, g)` here, so `justify_imply(h, h)`'s `f == g` fast path
        // always holds; unlike the general `apply_and_justify_imply` below, this call can never
        // observe a failed implication.
        let cid = self
            .apply_and_justify_imply(f, g, h)?
            .expect("apply_and_justify: h is applyAnd(f, g) itself, so f ∧ g ⇒ h always holds");
        Ok((h, cid))
    }

    /// `applyAndJustifyImply(f, g, h)`: proves `(f ∧ g) ⇒ h`, returning the clause
    /// `(¬f.id ∨ ¬g.id ∨ h.id)`'s id, or `None` if the implication does not actually hold.
    ///
    /// The antecedent is the implication `m ⇒ h` where `m = applyAnd(f, g)`; the structural link
    /// between `m` and `(f, g)` is already carried by `m`'s own (and its ancestors') defining
    /// clauses, emitted as part of building `m`.
    pub fn apply_and_justify_imply(
        &mut self,
        f: NodeId,
        g: NodeId,
        h: NodeId,
    ) -> Result<Option<u64>, LratError> {
        let m = self.apply_and(f, g)?;
        let m_implies_h = match self.justify_imply(m, h)? {
            Some(id) => id,
            None => return Ok(None),
        };

        let clause = Self::build_clause(&[self.lit_neg(f), self.lit_neg(g), self.lit_pos(h)]);
        match clause {
            None => Ok(Some(TAUTOLOGY_ID)),
            Some(lits) => Ok(Some(self.clauses.add_derived(&lits, &[m_implies_h], None)?)),
        }
    }

    /// `equant(f, v) = applyOr(f[v←1], f[v←0])`.
    pub fn equant(&mut self, f: NodeId, var: Var) -> Result<(NodeId, u64), LratError> {
        if let Some(&cached) = self.equant_cache.get(&(f, var)) {
            return Ok(cached);
        }

        let (hi, lo) = self.cofactor(f, var);
        let result = self.apply_or(hi, lo)?;

        // Witness: a single resolution between the restrictions' defining clauses and the
        // implication each cofactor has into the quantified result.
        let hi_implies = self.justify_imply(hi, result)?;
        let lo_implies = self.justify_imply(lo, result)?;
        let witness = match (hi_implies, lo_implies) {
            (Some(a), Some(b)) if a != TAUTOLOGY_ID || b != TAUTOLOGY_ID => {
                let lits = Self::build_clause(&[self.lit_neg(f), self.lit_pos(result)]);
                match lits {
                    None => TAUTOLOGY_ID,
                    Some(lits) => self.clauses.add_derived(&lits, &[a, b], None)?,
                }
            }
            _ => TAUTOLOGY_ID,
        };

        self.equant_cache.insert((f, var), (result, witness));
        Ok((result, witness))
    }

    /// `getSupportLevels(root)`: descending list of levels of variables that actually appear in
    /// `root`'s BDD.
    pub fn get_support_levels(&self, root: NodeId) -> Vec<usize> {
        let mut seen = std::collections::HashSet::new();
        let mut levels = Vec::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if self.is_leaf(n) || !seen.insert(n) {
                continue;
            }
            let node = self.node(n);
            levels.push(self.level(node.var));
            stack.push(node.hi);
            stack.push(node.lo);
        }
        levels.sort_unstable_by(|a, b| b.cmp(a));
        levels.dedup();
        levels
    }

    /// The distinct variables appearing in `root`'s BDD, in descending level order (deepest
    /// first) — what the bucket and SDP reducers bucket their terms by.
    pub fn support_vars(&self, root: NodeId) -> Vec<Var> {
        let mut seen = std::collections::HashSet::new();
        let mut vars = Vec::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if self.is_leaf(n) || !seen.insert(n) {
                continue;
            }
            let node = self.node(n);
            vars.push(node.var);
            stack.push(node.hi);
            stack.push(node.lo);
        }
        vars.sort_by_key(|&var| std::cmp::Reverse(self.level(var)));
        vars.dedup();
        vars
    }

    /// `generateClauses(root, up)`: a clause set whose conjunction is logically equivalent to
    /// `root = true`. With `up = false` this is the usual BDD-to-CNF clause set (one clause per
    /// non-`true` path to the `false` leaf, i.e. the "upward" clauses `HU`/`LU` chain collapsed
    /// into direct path-blocking clauses); `up = true` additionally asserts `root.id` itself.
    pub fn generate_clauses(&self, root: NodeId, up: bool) -> Vec<Vec<Lit>> {
        let mut clauses = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if self.is_leaf(n) || !seen.insert(n) {
                continue;
            }
            let node = self.node(n);
            let var = node.var;

            // Every "false-reaching" path through this node is blocked: if hi leads to false,
            // the path (var, ¬node) must be excluded; symmetrically for lo.
            if node.hi == FALSE {
                clauses.push(vec![!node.ext.positive(), !var.positive()]);
            }
            if node.lo == FALSE {
                clauses.push(vec![!node.ext.positive(), var.positive()]);
            }
            if node.hi == TRUE {
                clauses.push(vec![node.ext.positive(), !var.positive()]);
            }
            if node.lo == TRUE {
                clauses.push(vec![node.ext.positive(), var.positive()]);
            }
            if !self.is_leaf(node.hi) {
                clauses.push(vec![!node.ext.positive(), !var.positive(), self.node(node.hi).ext.positive()]);
                clauses.push(vec![node.ext.positive(), !var.positive(), !self.node(node.hi).ext.positive()]);
                stack.push(node.hi);
            }
            if !self.is_leaf(node.lo) {
                clauses.push(vec![!node.ext.positive(), var.positive(), self.node(node.lo).ext.positive()]);
                clauses.push(vec![node.ext.positive(), var.positive(), !self.node(node.lo).ext.positive()]);
                stack.push(node.lo);
            }
        }
        if up && !self.is_leaf(root) {
            clauses.push(vec![self.node(root).ext.positive()]);
        }
        clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_formula::var;
    use pbip_lrat::{ClauseStore, MemoryLratWriter};
    use proptest::prelude::*;

    fn manager(vars: &[Var]) -> BddManager<MemoryLratWriter> {
        BddManager::new(vars, ClauseStore::new(0, MemoryLratWriter::default()))
    }

    /// A manager over variables 1..=4, plus that same range as a literal-index strategy, for the
    /// algebraic properties below.
    fn small_manager() -> BddManager<MemoryLratWriter> {
        manager(&[var![1], var![2], var![3], var![4]])
    }

    fn literal_index() -> impl Strategy<Value = (u32, bool)> {
        (1u32..=4, any::<bool>())
    }

    proptest! {
        #[test]
        fn apply_and_is_commutative((ai, ap) in literal_index(), (bi, bp) in literal_index()) {
            let mut mgr = small_manager();
            let a = mgr.literal(Var::from_dimacs(ai as isize), ap).unwrap();
            let b = mgr.literal(Var::from_dimacs(bi as isize), bp).unwrap();
            prop_assert_eq!(mgr.apply_and(a, b).unwrap(), mgr.apply_and(b, a).unwrap());
        }

        #[test]
        fn apply_or_is_commutative_prop((ai, ap) in literal_index(), (bi, bp) in literal_index()) {
            let mut mgr = small_manager();
            let a = mgr.literal(Var::from_dimacs(ai as isize), ap).unwrap();
            let b = mgr.literal(Var::from_dimacs(bi as isize), bp).unwrap();
            prop_assert_eq!(mgr.apply_or(a, b).unwrap(), mgr.apply_or(b, a).unwrap());
        }

        #[test]
        fn apply_and_is_associative(
            (ai, ap) in literal_index(), (bi, bp) in literal_index(), (ci, cp) in literal_index(),
        ) {
            let mut mgr = small_manager();
            let a = mgr.literal(Var::from_dimacs(ai as isize), ap).unwrap();
            let b = mgr.literal(Var::from_dimacs(bi as isize), bp).unwrap();
            let c = mgr.literal(Var::from_dimacs(ci as isize), cp).unwrap();

            let ab = mgr.apply_and(a, b).unwrap();
            let left = mgr.apply_and(ab, c).unwrap();
            let bc = mgr.apply_and(b, c).unwrap();
            let right = mgr.apply_and(a, bc).unwrap();
            prop_assert_eq!(left, right);
        }

        #[test]
        fn apply_and_is_idempotent_prop((ai, ap) in literal_index()) {
            let mut mgr = small_manager();
            let a = mgr.literal(Var::from_dimacs(ai as isize), ap).unwrap();
            prop_assert_eq!(mgr.apply_and(a, a).unwrap(), a);
        }

        #[test]
        fn find_or_make_is_unique_prop((ai, _) in literal_index(), (bi, _) in literal_index()) {
            let mut mgr = small_manager();
            let hi = mgr.literal(Var::from_dimacs(ai as isize), true).unwrap();
            let lo = mgr.literal(Var::from_dimacs(bi as isize), false).unwrap();
            prop_assume!(hi != lo);
            let var = var![1];
            let first = mgr.find_or_make(var, hi, lo).unwrap();
            let second = mgr.find_or_make(var, hi, lo).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn find_or_make_reduces_equal_children_prop((ai, ap) in literal_index()) {
            let mut mgr = small_manager();
            let child = mgr.literal(Var::from_dimacs(ai as isize), ap).unwrap();
            prop_assert_eq!(mgr.find_or_make(var![1], child, child).unwrap(), child);
        }
    }

    #[test]
    fn find_or_make_reduces_equal_children() {
        let mut mgr = manager(&[var![1]]);
        let node = mgr.find_or_make(var![1], TRUE, TRUE).unwrap();
        assert_eq!(node, TRUE);
    }

    #[test]
    fn find_or_make_is_unique() {
        let mut mgr = manager(&[var![1]]);
        let a = mgr.find_or_make(var![1], TRUE, FALSE).unwrap();
        let b = mgr.find_or_make(var![1], TRUE, FALSE).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn literal_nodes_are_distinct_for_each_polarity() {
        let mut mgr = manager(&[var![1]]);
        let pos = mgr.literal(var![1], true).unwrap();
        let neg = mgr.literal(var![1], false).unwrap();
        assert_ne!(pos, neg);
    }

    #[test]
    fn apply_and_with_false_is_false() {
        let mut mgr = manager(&[var![1]]);
        let x = mgr.literal(var![1], true).unwrap();
        assert_eq!(mgr.apply_and(x, FALSE).unwrap(), FALSE);
    }

    #[test]
    fn apply_or_is_commutative() {
        let mut mgr = manager(&[var![1], var![2]]);
        let x = mgr.literal(var![1], true).unwrap();
        let y = mgr.literal(var![2], true).unwrap();
        let fwd = mgr.apply_or(x, y).unwrap();
        let bwd = mgr.apply_or(y, x).unwrap();
        assert_eq!(fwd, bwd);
    }

    #[test]
    fn apply_and_is_idempotent() {
        let mut mgr = manager(&[var![1]]);
        let x = mgr.literal(var![1], true).unwrap();
        assert_eq!(mgr.apply_and(x, x).unwrap(), x);
    }

    #[test]
    fn justify_imply_holds_for_identical_nodes() {
        let mut mgr = manager(&[var![1]]);
        let x = mgr.literal(var![1], true).unwrap();
        assert!(mgr.justify_imply(x, x).unwrap().is_some());
    }

    #[test]
    fn justify_imply_fails_for_contradiction() {
        let mut mgr = manager(&[var![1]]);
        let x = mgr.literal(var![1], true).unwrap();
        let not_x = mgr.literal(var![1], false).unwrap();
        assert!(mgr.justify_imply(x, not_x).unwrap().is_none());
    }

    #[test]
    fn support_levels_cover_every_branching_variable() {
        let mut mgr = manager(&[var![1], var![2]]);
        let x = mgr.literal(var![1], true).unwrap();
        let y = mgr.literal(var![2], true).unwrap();
        let conj = mgr.apply_and(x, y).unwrap();
        let levels = mgr.get_support_levels(conj);
        assert_eq!(levels.len(), 2);
    }
}
