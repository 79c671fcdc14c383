//! Bucket elimination (C5): conjoin a set of input clause BDDs and existentially quantify every
//! variable that isn't in the target constraint's support, producing a single root BDD plus a
//! validation chain proving the conjunction implies it.
use std::collections::{HashSet, VecDeque};

use rustc_hash::FxHashMap;

use pbip_bdd::{BddManager, NodeId};
use pbip_formula::Var;
use pbip_lrat::{LratError, LratSink, TAUTOLOGY_ID};

/// A BDD paired with the clause id that validates it, i.e. a TBDD.
pub type Term = (NodeId, u64);

/// Variable `0` is reserved for the bucket holding terms whose support is entirely external
/// (members of the target constraint's own variable set).
const FINAL_BUCKET: u64 = 0;

fn bucket_key(var: Var) -> u64 {
    var.to_dimacs() as u64
}

struct Buckets {
    queues: FxHashMap<u64, VecDeque<Term>>,
}

impl Buckets {
    fn new() -> Self {
        let mut queues = FxHashMap::default();
        queues.insert(FINAL_BUCKET, VecDeque::new());
        Buckets { queues }
    }

    fn ensure(&mut self, key: u64) {
        self.queues.entry(key).or_insert_with(VecDeque::new);
    }

    /// `placeInBucket`: files a term under the deepest variable in its support that is *not* in
    /// `external`; falls back to the final bucket if no such variable exists.
    fn place<S: LratSink>(&mut self, manager: &BddManager<S>, external: &HashSet<Var>, term: Term) {
        let (root, _) = term;
        for var in manager.support_vars(root) {
            if !external.contains(&var) {
                let key = bucket_key(var);
                self.ensure(key);
                self.queues.get_mut(&key).unwrap().push_back(term);
                return;
            }
        }
        self.queues.get_mut(&FINAL_BUCKET).unwrap().push_back(term);
    }
}

/// `conjunctTerms`: `applyAndJustify`s two terms, collapsing the validation to whichever input's
/// validation already covers the result when the conjunction didn't need a fresh clause.
fn conjunct_terms<S: LratSink>(
    manager: &mut BddManager<S>,
    (r1, v1): Term,
    (r2, v2): Term,
) -> Result<Term, LratError> {
    let (new_root, implication) = manager.apply_and_justify(r1, r2)?;

    let validation = if implication == TAUTOLOGY_ID {
        if new_root == r1 {
            v1
        } else if new_root == r2 {
            v2
        } else {
            emit_conjunction(manager, new_root, &[v1, v2])?
        }
    } else {
        emit_conjunction(manager, new_root, &[v1, v2, implication])?
    };

    Ok((new_root, validation))
}

fn emit_conjunction<S: LratSink>(
    manager: &mut BddManager<S>,
    root: NodeId,
    antecedents: &[u64],
) -> Result<u64, LratError> {
    match manager.lit_pos(root) {
        pbip_bdd::ClauseLit::Tautology => Ok(TAUTOLOGY_ID),
        pbip_bdd::ClauseLit::Omit => manager.clauses.add_derived(&[], antecedents, None),
        pbip_bdd::ClauseLit::Lit(lit) => manager.clauses.add_derived(&[lit], antecedents, None),
    }
}

/// `quantifyRoot`: existentially quantifies `var` out of `root`, justifying `root ⇒ nroot`.
fn quantify_root<S: LratSink>(
    manager: &mut BddManager<S>,
    (root, validation): Term,
    var: Var,
) -> Result<Term, LratError> {
    let (new_root, witness) = manager.equant(root, var)?;
    let implication = manager
        .justify_imply(root, new_root)?
        .expect("existential quantification always widens the model set");

    let mut antecedents = vec![validation];
    if implication != TAUTOLOGY_ID {
        antecedents.push(implication);
    }
    if witness != TAUTOLOGY_ID {
        antecedents.push(witness);
    }

    let cid = emit_conjunction(manager, new_root, &antecedents)?;
    Ok((new_root, cid))
}

/// `bucketReduce`: drains every bucket from deepest to shallowest, pairwise conjoining within a
/// bucket and quantifying out a lone survivor's variable, finishing with the final bucket (whose
/// members are already over only external variables).
pub fn bucket_reduce<S: LratSink>(
    manager: &mut BddManager<S>,
    external: &HashSet<Var>,
    members: Vec<Term>,
) -> Result<Term, LratError> {
    let mut buckets = Buckets::new();
    for term in members {
        buckets.place(manager, external, term);
    }

    loop {
        // Bucket keys are the DIMACS ids of *problem* variables (the only ones ever bucketed);
        // these are assigned in ascending id-equals-level order, so descending id order is
        // descending level order.
        let mut keys: Vec<u64> = buckets
            .queues
            .keys()
            .copied()
            .filter(|&k| k != FINAL_BUCKET && !buckets.queues[&k].is_empty())
            .collect();
        keys.sort_by_key(|&k| std::cmp::Reverse(k));

        let key = match keys.first() {
            Some(&k) => k,
            None => break,
        };

        let queue = buckets.queues.get_mut(&key).unwrap();
        if queue.len() > 1 {
            let a = queue.pop_front().unwrap();
            let b = queue.pop_front().unwrap();
            let combined = conjunct_terms(manager, a, b)?;
            buckets.place(manager, external, combined);
        } else if queue.len() == 1 {
            let term = queue.pop_front().unwrap();
            let var = Var::from_dimacs(key as isize);
            let quantified = quantify_root(manager, term, var)?;
            buckets.place(manager, external, quantified);
        }
    }

    let finals = buckets.queues.get_mut(&FINAL_BUCKET).unwrap();
    while finals.len() > 1 {
        let a = finals.pop_front().unwrap();
        let b = finals.pop_front().unwrap();
        let combined = conjunct_terms(manager, a, b)?;
        finals.push_back(combined);
    }

    finals.pop_front().ok_or_else(|| {
        LratError::Invariant("bucket reduction received no clauses to reduce".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_bdd::{BddManager, FALSE, TRUE};
    use pbip_formula::var;
    use pbip_lrat::{ClauseStore, MemoryLratWriter};

    fn manager() -> BddManager<MemoryLratWriter> {
        BddManager::new(&[var![1], var![2], var![3]], ClauseStore::new(0, MemoryLratWriter::default()))
    }

    #[test]
    fn single_member_final_bucket_is_returned_unchanged() {
        let mut mgr = manager();
        let lit = mgr.literal(var![1], true).unwrap();
        let external = HashSet::from([var![1]]);
        let (root, _) = bucket_reduce(&mut mgr, &external, vec![(lit, TAUTOLOGY_ID)]).unwrap();
        assert_eq!(root, lit);
    }

    #[test]
    fn contradictory_clauses_reduce_to_false() {
        let mut mgr = manager();
        let x = mgr.literal(var![1], true).unwrap();
        let not_x = mgr.literal(var![1], false).unwrap();
        let external: HashSet<Var> = HashSet::new();
        let (root, _) = bucket_reduce(&mut mgr, &external, vec![(x, TAUTOLOGY_ID), (not_x, TAUTOLOGY_ID)]).unwrap();
        assert_eq!(root, FALSE);
    }

    #[test]
    fn quantifying_out_a_tautology_leaves_true() {
        let mut mgr = manager();
        let x = mgr.literal(var![2], true).unwrap();
        let not_x = mgr.literal(var![2], false).unwrap();
        let disjunction = mgr.apply_or(x, not_x).unwrap();
        assert_eq!(disjunction, TRUE);
    }
}
