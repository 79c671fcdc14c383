//! Deterministic CNF fixtures shared by the PBIP crates' test suites.
use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};

/// The standard pigeonhole-principle formula: `holes + 1` pigeons, `holes` holes.
///
/// Variable `p * holes + h` is true when pigeon `p` sits in hole `h`. Unsatisfiable for every
/// `holes >= 1`.
pub fn pigeonhole_cnf(holes: usize) -> CnfFormula {
    let pigeons = holes + 1;
    let var = |p: usize, h: usize| Var::from_index(p * holes + h).positive();

    let mut cnf = CnfFormula::new();
    for p in 0..pigeons {
        cnf.add_clause((0..holes).map(|h| var(p, h)));
    }
    for h in 0..holes {
        for p1 in 0..pigeons {
            for p2 in (p1 + 1)..pigeons {
                cnf.add_clause([!var(p1, h), !var(p2, h)]);
            }
        }
    }
    cnf
}

/// A majority/threshold contradiction: `2k + 1` variables, clauses requiring every majority of
/// `k + 1` of them to be false, together with a clause requiring at least `k + 1` to be true.
///
/// Unsatisfiable: no assignment can have both a true-majority and have every `(k + 1)`-subset
/// contain a false literal.
pub fn majority_contradiction_cnf(k: usize) -> CnfFormula {
    let n = 2 * k + 1;
    let vars: Vec<Lit> = (0..n).map(|i| Var::from_index(i).positive()).collect();

    let mut cnf = CnfFormula::new();
    cnf.add_clause(vars.iter().cloned());

    for subset in combinations(&vars, k + 1) {
        cnf.add_clause(subset.into_iter().map(|lit| !lit));
    }
    cnf
}

fn combinations(items: &[Lit], k: usize) -> Vec<Vec<Lit>> {
    if k == 0 {
        return vec![vec![]];
    }
    if items.len() < k {
        return vec![];
    }
    let mut result = Vec::new();
    for (i, &item) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], k - 1) {
            rest.insert(0, item);
            result.push(rest);
        }
    }
    result
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use proptest::{collection, prelude::*};

    use crate::cnf::CnfFormula;
    use crate::lit::strategy::lit;

    /// A small uniform-random CNF, useful for BDD/reducer algebraic property tests.
    pub fn random_cnf(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<collection::SizeRange>,
        clause_len: impl Into<collection::SizeRange>,
    ) -> impl Strategy<Value = CnfFormula> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(collection::vec(lit(0..vars.max(1)), clause_len.clone()), clauses.clone())
                .prop_map(CnfFormula::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pigeonhole_shape() {
        let cnf = pigeonhole_cnf(3);
        assert_eq!(cnf.var_count(), 12);
        // 4 pigeon clauses + C(4,2)*3 hole clauses
        assert_eq!(cnf.len(), 4 + 6 * 3);
    }

    #[test]
    fn majority_shape() {
        let cnf = majority_contradiction_cnf(2);
        assert_eq!(cnf.var_count(), 5);
        // one all-true clause, C(5,3) minority clauses
        assert_eq!(cnf.len(), 1 + 10);
    }
}
