//! Trusted reduced-ordered-BDD manager (C3) and implication justifier (C4).
//!
//! The manager is the system's trusted core: every new node's four defining clauses (`HD`,
//! `LD`, `HU`, `LU`) are emitted as axioms of the fresh extension variable the node introduces,
//! the way a Tseitin-style extension step is always sound regardless of what else has been
//! derived so far, because the variable cannot yet appear anywhere else. Everything built on top
//! of the manager (`apply`, `justifyImply`, bucket/SDP reduction) only ever combines these
//! axioms and previously-derived clauses through ordinary antecedented steps.
mod constraint;
mod manager;

pub use manager::{BddManager, ClauseLit, NodeId, FALSE, TRUE};
