//! Symbolic elimination reducers (C5, C6): given a set of input clause ids and the variable set
//! of the PB constraint they're meant to justify, prove that the clauses' conjunction implies the
//! constraint's BDD.
mod bucket;
mod sdp;

pub use bucket::{bucket_reduce, Term};
pub use sdp::sdp_reduce;
