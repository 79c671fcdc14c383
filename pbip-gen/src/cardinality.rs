//! Sequential-counter-like cardinality encoder, used by the generator's cardinality pass.
//!
//! Grounded on `Manager`/`Constraint` in the source's cardinality tool, which builds a threshold
//! witness out of fresh extension variables rather than going through the BDD package. Here the
//! witness is a register grid `reg[i][c]` meaning "at least `c` of the first `i` literals hold",
//! defined by a small, fixed clause template per cell and treated as a trusted Tseitin extension
//! axiom set, the same epistemic status the BDD manager gives its own defining clauses.
use pbip_bdd::ClauseLit;
use pbip_formula::{CnfFormula, Lit, Var};

/// Allocates fresh variable indices above whatever a CNF formula already uses.
pub struct FreshVars {
    next: usize,
}

impl FreshVars {
    pub fn starting_after(cnf: &CnfFormula) -> Self {
        FreshVars { next: cnf.var_count() }
    }

    pub fn alloc(&mut self) -> Var {
        let var = Var::from_index(self.next);
        self.next += 1;
        var
    }
}

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

/// `reg[i][c]` as a clause literal, honoring the boundary sentinels `reg[i][0] = true` and
/// `reg[0][c>0] = false` without allocating variables for them.
fn cell(reg: &[Vec<Option<Lit>>], i: usize, c: usize, positive: bool) -> ClauseLit {
    if c == 0 {
        return if positive { ClauseLit::Tautology } else { ClauseLit::Omit };
    }
    if i == 0 || c > i {
        return if positive { ClauseLit::Omit } else { ClauseLit::Tautology };
    }
    let lit = reg[i][c].expect("cell requested within the populated region of the grid");
    ClauseLit::Lit(if positive { lit } else { !lit })
}

/// Emits a register grid proving "at least `k` of `literals` are true", returning the root
/// literal (the threshold register `reg[n][k]`) and the ids of every clause emitted.
///
/// Each cell gets a definitional `y ↔ (reg[i-1][c] ∨ (x_i ∧ reg[i-1][c-1]))` — the full
/// biconditional, not just the sufficiency direction, since a later bucket/SDP reduction needs to
/// existentially quantify the registers back out and recover exactly the cardinality relation.
pub fn cardinality_clauses(
    cnf: &mut CnfFormula,
    fresh: &mut FreshVars,
    literals: &[Lit],
    k: u64,
) -> (Lit, Vec<u64>) {
    let n = literals.len();
    let k = k as usize;
    assert!(k >= 1 && k <= n, "cardinality threshold out of range");

    let mut hints = Vec::new();
    let mut reg: Vec<Vec<Option<Lit>>> = vec![vec![None; k + 1]; n + 1];

    let mut emit = |cnf: &mut CnfFormula, hints: &mut Vec<u64>, parts: &[ClauseLit]| {
        if let Some(lits) = build_clause(parts) {
            cnf.add_clause(lits);
            hints.push(cnf.len() as u64);
        }
    };

    for i in 1..=n {
        let xi = literals[i - 1];
        let max_c = k.min(i);
        for c in 1..=max_c {
            let y = fresh.alloc().positive();
            reg[i][c] = Some(y);

            let prev_same = cell(&reg, i - 1, c, true);
            let prev_lower = cell(&reg, i - 1, c - 1, true);

            // sufficiency: reg[i-1][c] ∨ (x_i ∧ reg[i-1][c-1]) → y
            emit(cnf, &mut hints, &[negate(prev_same), ClauseLit::Lit(y)]);
            emit(
                cnf,
                &mut hints,
                &[ClauseLit::Lit(!xi), negate(prev_lower), ClauseLit::Lit(y)],
            );
            // necessity: y → reg[i-1][c] ∨ (x_i ∧ reg[i-1][c-1]), split across the conjunction
            emit(
                cnf,
                &mut hints,
                &[ClauseLit::Lit(!y), prev_same, ClauseLit::Lit(xi)],
            );
            emit(cnf, &mut hints, &[ClauseLit::Lit(!y), prev_same, prev_lower]);
        }
    }

    let root = match cell(&reg, n, k, true) {
        ClauseLit::Lit(lit) => lit,
        _ => unreachable!("k is in range 1..=n so reg[n][k] is always a real cell"),
    };
    (root, hints)
}

fn negate(part: ClauseLit) -> ClauseLit {
    match part {
        ClauseLit::Tautology => ClauseLit::Omit,
        ClauseLit::Omit => ClauseLit::Tautology,
        ClauseLit::Lit(lit) => ClauseLit::Lit(!lit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_formula::var;

    #[test]
    fn at_least_one_of_three_reduces_to_a_single_register() {
        let mut cnf = CnfFormula::new();
        cnf.set_var_count(3);
        let mut fresh = FreshVars::starting_after(&cnf);
        let literals = [var!(1).positive(), var!(2).positive(), var!(3).positive()];

        let (root, hints) = cardinality_clauses(&mut cnf, &mut fresh, &literals, 1);

        assert!(!hints.is_empty());
        assert_eq!(root.var().index(), 3);
        assert_eq!(cnf.len(), hints.len());
    }

    #[test]
    fn majority_of_five_allocates_one_register_per_cell() {
        let mut cnf = CnfFormula::new();
        cnf.set_var_count(5);
        let mut fresh = FreshVars::starting_after(&cnf);
        let literals: Vec<Lit> = (1..=5).map(|i| var!(i).positive()).collect();

        let (_root, hints) = cardinality_clauses(&mut cnf, &mut fresh, &literals, 3);

        // i in 1..=5, c in 1..=min(i,3): 3 + 3 + 3 + 3 + 3 = cells for i=3..5 capped at 3, i=1,2
        // contribute 1 and 2 cells respectively: 1 + 2 + 3 + 3 + 3 = 12 cells, 4 clauses each.
        assert_eq!(hints.len(), 12 * 4);
    }
}
