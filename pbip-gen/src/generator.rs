//! The two-pass PBIP->CNF generator (C8): fills in hints for a hint-free PBIP proof.
use std::collections::HashMap;
use std::io::Read;

use pbip_bdd::BddManager;
use pbip_dimacs::{HintList, PbipCommand, PbipLine, PbipParser, PbipReadError};
use pbip_formula::{CnfFormula, Lit, Var};
use pbip_lrat::{ClauseStore, MemoryLratWriter};
use pbip_pb::PbConstraint;
use thiserror::Error;

use crate::cardinality::{cardinality_clauses, FreshVars};

#[derive(Debug, Error)]
pub enum GenError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: PbipReadError,
    },
    #[error("step {step}: `i` lines accepted by the generator must carry no hints")]
    AlreadyHinted { step: usize },
}

/// One output PBIP step: the original command and constraints, plus the hints the generator
/// worked out (for commands other than `i`, this just echoes the input hints through unchanged).
pub struct GeneratedLine {
    pub command: PbipCommand,
    pub constraints: Vec<PbConstraint>,
    pub hints: HintList,
}

/// Runs both generator passes over every line of `pbip`, producing a fresh CNF and the
/// hint-filled PBIP steps to pair with it.
///
/// The whole file is read up front (not streamed clause-by-clause into the output) because fresh
/// extension variables must be allocated *above* every problem variable the proof ever mentions;
/// the PBIP format carries no variable-count header to learn that bound from in advance.
pub fn generate<R: Read>(pbip: &mut PbipParser<R>) -> Result<(CnfFormula, Vec<GeneratedLine>), GenError> {
    let mut lines = Vec::new();
    while let Some(line) = pbip
        .next_line()
        .map_err(|source| GenError::Parse { line: 0, source })?
    {
        lines.push(line);
    }

    let max_problem_var = lines
        .iter()
        .flat_map(|line| line.constraints.iter())
        .flat_map(|c| c.support())
        .map(|v| v.index())
        .max();

    let mut cnf = CnfFormula::new();
    if let Some(max_var) = max_problem_var {
        cnf.set_var_count(max_var + 1);
    }
    let mut fresh = FreshVars::starting_after(&cnf);
    let mut out = Vec::new();

    for line in lines {
        let hints = match line.command {
            PbipCommand::Input => generate_input_hints(&mut cnf, &mut fresh, &line)?,
            _ => line.hints.clone(),
        };
        out.push(GeneratedLine {
            command: line.command,
            constraints: line.constraints.into_vec(),
            hints,
        });
    }

    Ok((cnf, out))
}

fn generate_input_hints(
    cnf: &mut CnfFormula,
    fresh: &mut FreshVars,
    line: &PbipLine,
) -> Result<HintList, GenError> {
    if let HintList::Ids(ids) = &line.hints {
        if !ids.is_empty() {
            return Err(GenError::AlreadyHinted { step: line.step_id });
        }
    }

    let mut hints = Vec::new();
    for constraint in &line.constraints {
        hints.extend(generate_one_constraint(cnf, fresh, constraint));
    }
    Ok(HintList::Ids(hints))
}

fn generate_one_constraint(cnf: &mut CnfFormula, fresh: &mut FreshVars, constraint: &PbConstraint) -> Vec<u64> {
    if let Some(clause) = constraint.as_clause() {
        cnf.add_clause(clause);
        return vec![cnf.len() as u64];
    }

    if constraint.is_cardinality() {
        let literals: Vec<Lit> = constraint.terms().iter().map(|&(_, lit)| lit).collect();
        let (_root, hints) = cardinality_clauses(cnf, fresh, &literals, constraint.rhs() as u64);
        return hints;
    }

    bdd_pass(cnf, fresh, constraint)
}

/// For a non-cardinality input, build the constraint's BDD in a scratch manager and replay
/// `generateClauses` into the growing CNF, remapping the manager's local extension variables to
/// freshly allocated ones so they don't collide with earlier passes' allocations.
fn bdd_pass(cnf: &mut CnfFormula, fresh: &mut FreshVars, constraint: &PbConstraint) -> Vec<u64> {
    let problem_vars: Vec<Var> = constraint.support().collect();
    let local_boundary = problem_vars.iter().map(|v| v.index() + 1).max().unwrap_or(0);

    let store = ClauseStore::new(0, MemoryLratWriter::default());
    let mut manager = BddManager::new(&problem_vars, store);
    let root = manager
        .constraint_bdd(constraint)
        .expect("scratch manager never fails to build a constraint BDD");
    let clauses = manager.generate_clauses(root, true);

    let mut rename: HashMap<Var, Var> = HashMap::new();
    let mut hints = Vec::new();
    for clause in clauses {
        let remapped: Vec<Lit> = clause
            .into_iter()
            .map(|lit| {
                let var = lit.var();
                if var.index() < local_boundary {
                    lit
                } else {
                    let renamed = *rename.entry(var).or_insert_with(|| fresh.alloc());
                    Lit::from_var(renamed, lit.is_positive())
                }
            })
            .collect();
        cnf.add_clause(remapped);
        hints.push(cnf.len() as u64);
    }
    hints
}
