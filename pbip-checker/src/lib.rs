//! PBIP proof checking (C7): wires the BDD manager and reducers together to replay a Pseudo-
//! Boolean Implication proof against its CNF and report whether it derives the empty clause.
mod config;
mod driver;
mod error;

pub use config::CheckerConfig;
pub use driver::{CheckStatus, Checker, StepRecord};
pub use error::CheckerError;

use pbip_dimacs::PbipParser;
use pbip_formula::CnfFormula;
use pbip_lrat::LratSink;
use std::io::Read;

/// Runs every step of `pbip` through `checker`, stopping as soon as the proof derives the empty
/// clause. Returns the final status; a proof that runs out of steps without reaching `Unsat`
/// leaves the check result `Unknown`, per the format's refutation-only semantics.
pub fn run<S: LratSink, R: Read>(
    checker: &mut Checker<S>,
    pbip: &mut PbipParser<R>,
) -> Result<CheckStatus, CheckerError> {
    while let Some(line) = pbip.next_line().map_err(|e| CheckerError::Parse {
        line: 0,
        detail: e.to_string(),
    })? {
        if checker.process(&line)? {
            break;
        }
    }
    Ok(checker.status())
}

/// Convenience entry point: builds a [`Checker`] over `cnf` and drives it to completion against
/// `pbip`, writing LRAT output to `sink`.
pub fn check<S: LratSink, R: Read>(
    cnf: &CnfFormula,
    pbip: &mut PbipParser<R>,
    config: CheckerConfig,
    sink: S,
) -> Result<(CheckStatus, S), CheckerError> {
    let mut checker = Checker::new(cnf, config, sink);
    let status = run(&mut checker, pbip)?;
    Ok((status, checker.into_sink()))
}
