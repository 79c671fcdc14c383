//! The checker's error sum type (see the crate's top-level docs on replacing typed exceptions).
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("line {line}: {detail}")]
    Parse { line: usize, detail: String },

    #[error("step {step}: hint refers to unknown id {reference}")]
    Reference { step: usize, reference: u64 },

    #[error("step {step}: justification failed, constraint does not follow from its hints")]
    Implication { step: usize },

    #[error("step {step}: {detail}")]
    Mode { step: usize, detail: String },

    #[error("step {step}: internal invariant violated: {detail}")]
    Invariant { step: usize, detail: String },

    #[error(transparent)]
    Lrat(#[from] pbip_lrat::LratError),
}
