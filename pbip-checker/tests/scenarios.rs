//! End-to-end checker scenarios, driven straight off PBIP proof text rather than hand-built
//! driver calls, the way `varisat-checker`'s own tests drive a `Checker` from DIMACS + proof text.
use pbip_checker::{check, CheckStatus, CheckerConfig, CheckerError};
use pbip_dimacs::{PbipCommand, PbipParser};
use pbip_formula::{cnf_formula, CnfFormula};
use pbip_lrat::MemoryLratWriter;

fn run(cnf: &CnfFormula, proof: &str) -> Result<CheckStatus, CheckerError> {
    let mut pbip = PbipParser::new(proof.as_bytes());
    check(cnf, &mut pbip, CheckerConfig::default(), MemoryLratWriter::default()).map(|(status, _)| status)
}

#[test]
fn two_unrelated_input_clauses_stay_unknown() {
    // Scenario: trivial tautology chain. Two input steps, each exactly matching an existing CNF
    // clause (the clause-shortcut path), with no contradiction between them.
    let cnf = cnf_formula![1, 2; -1, -2;];
    let proof = "\
i 1 x1 1 x2 >= 1 ; 1
i 1 ~x1 1 ~x2 >= 1 ; 2
";
    assert_eq!(run(&cnf, proof).unwrap(), CheckStatus::Unknown);
}

#[test]
fn rup_chain_over_contradictory_units_reaches_empty_clause() {
    // Scenario: RUP chain. x3 and ¬x3 are both asserted as unit input clauses; a final RUP step
    // with no terms (an unsatisfiable "0 >= 1") resolves them to the empty clause.
    let cnf = cnf_formula![3; -3;];
    let proof = "\
i 1 x3 >= 1 ; 1
i 1 ~x3 >= 1 ; 2
u >= 1 ; [1 x3] [2 ~x3]
";
    assert_eq!(run(&cnf, proof).unwrap(), CheckStatus::Unsat);
}

#[test]
fn input_step_rejects_hint_to_unknown_clause() {
    let cnf = cnf_formula![1, 2;];
    let proof = "i 1 x1 1 x2 >= 1 ; 7\n";
    match run(&cnf, proof) {
        Err(CheckerError::Reference { step: 1, reference: 7 }) => {}
        other => panic!("expected a reference error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn target_lines_are_rejected() {
    let cnf = cnf_formula![1;];
    let proof = "k 1 x1 >= 1 ;\n";
    match run(&cnf, proof) {
        Err(CheckerError::Mode { step: 1, .. }) => {}
        other => panic!("expected a mode error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn checker_config_defaults_match_documented_values() {
    let config = CheckerConfig::default();
    assert_eq!(config.bdd_only, false);
    assert_eq!(config.reorder, true);
    assert_eq!(config.sdp_reduce, true);
    assert_eq!(config.verbosity, 1);
    assert_eq!(config.gc_threshold, 100_000);
}

#[test]
fn parsed_target_line_carries_no_hints() {
    let mut pbip = PbipParser::new("k 1 x1 >= 1 ;\n".as_bytes());
    let line = pbip.next_line().unwrap().unwrap();
    assert_eq!(line.command, PbipCommand::Target);
}
