//! Text format parsers and writers: CNF DIMACS, OPB constraint syntax and PBIP proof lines.
//!
//! These are the "external collaborator" formats: the checker core only ever consumes
//! [`pbip_pb::PbConstraint`] values and [`pbip_formula::CnfFormula`]/[`pbip_formula::Lit`] lists,
//! never raw text.
pub mod cnf;
pub mod opb;
pub mod pbip;

pub use cnf::{
    write_dimacs, write_dimacs_clauses, write_dimacs_header, DimacsHeader, DimacsParser,
    ParserError,
};
pub use opb::{parse_opb_line, OpbError};
pub use pbip::{write_pbip_line, HintList, PbipCommand, PbipLine, PbipParser, PbipReadError};
