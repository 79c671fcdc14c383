//! PBIP->CNF generation (C8): turns a hint-free PBIP proof into a CNF plus a fully-hinted PBIP.
mod cardinality;
mod generator;
mod rename;

pub use cardinality::{cardinality_clauses, FreshVars};
pub use generator::{generate, GenError, GeneratedLine};
pub use rename::rename_extension_vars;
