//! Optional post-pass: renumbers extension variables to follow the lowest problem variable they
//! ever appear alongside, so a later BDD build over the renamed CNF gets better variable
//! locality without having to reorder from scratch.
use std::collections::HashMap;

use pbip_formula::{CnfFormula, Lit, Var};

/// Renumbers every variable at or above `problem_var_count` in `cnf`, in place, following the
/// rule: an extension variable's new position is right after the lowest problem variable it
/// co-occurs with in some clause. Extension variables that never co-occur with a problem
/// variable keep their relative order, placed after all renamed ones.
pub fn rename_extension_vars(cnf: &mut CnfFormula, problem_var_count: usize) -> HashMap<Var, Var> {
    let is_extension = |v: Var| v.index() >= problem_var_count;

    let mut lowest_partner: HashMap<Var, usize> = HashMap::new();
    for clause in cnf.iter() {
        let problem_min = clause
            .iter()
            .map(|lit| lit.var())
            .filter(|&v| !is_extension(v))
            .map(|v| v.index())
            .min();
        if let Some(partner) = problem_min {
            for lit in clause {
                let var = lit.var();
                if is_extension(var) {
                    lowest_partner
                        .entry(var)
                        .and_modify(|best| *best = (*best).min(partner))
                        .or_insert(partner);
                }
            }
        }
    }

    let mut extension_vars: Vec<Var> = (problem_var_count..cnf.var_count()).map(Var::from_index).collect();
    extension_vars.sort_by_key(|&v| (lowest_partner.get(&v).copied().unwrap_or(usize::MAX), v.index()));

    let mapping: HashMap<Var, Var> = extension_vars
        .iter()
        .enumerate()
        .map(|(offset, &old)| (old, Var::from_index(problem_var_count + offset)))
        .collect();

    let renamed: Vec<Vec<Lit>> = cnf
        .iter()
        .map(|clause| {
            clause
                .iter()
                .map(|&lit| {
                    let var = lit.var();
                    match mapping.get(&var) {
                        Some(&new_var) => Lit::from_var(new_var, lit.is_positive()),
                        None => lit,
                    }
                })
                .collect()
        })
        .collect();

    let mut fresh = CnfFormula::new();
    fresh.set_var_count(cnf.var_count());
    for clause in renamed {
        fresh.add_clause(clause);
    }
    *cnf = fresh;

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_formula::var;

    #[test]
    fn extension_var_moves_next_to_its_lowest_partner() {
        let mut cnf = CnfFormula::new();
        cnf.set_var_count(4);
        // extension var 3 co-occurs only with problem var 0; extension var 2 co-occurs with
        // problem var 1 (higher), so after renaming, var 3 should sort before var 2.
        cnf.add_clause(vec![var!(1).positive(), var!(4).positive()]);
        cnf.add_clause(vec![var!(2).positive(), var!(3).positive()]);

        let mapping = rename_extension_vars(&mut cnf, 2);

        assert!(mapping[&var!(4)].index() < mapping[&var!(3)].index());
    }
}
