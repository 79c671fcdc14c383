//! Append-only clause store and LRAT text emission (component C1).
//!
//! [`ClauseStore`] assigns monotonically increasing clause ids and forwards every derived clause
//! to an [`LratSink`], the same split the upstream solver uses between proof *bookkeeping* and
//! proof *text emission* (see `checker::write_lrat` in the solver this was adapted from).
//! [`TextLratWriter`] is the sink used by the CLI; anything implementing [`LratSink`] can replace
//! it (e.g. an in-memory sink for tests).
use std::io::{self, Write};

use thiserror::Error;

use pbip_formula::Lit;

/// Sentinel clause id representing a tautology that required no justification.
///
/// Antecedent lists are filtered of this id before being handed to a sink, so a sink never
/// observes it.
pub const TAUTOLOGY_ID: u64 = 0;

#[derive(Debug, Error)]
pub enum LratError {
    #[error("I/O error while writing LRAT proof: {0}")]
    Io(#[from] io::Error),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Destination for emitted LRAT lines.
///
/// A sink only ever sees clause additions, never deletions: this checker derives one monotone
/// refutation and has no use for the incremental delete commands LRAT also supports.
pub trait LratSink {
    fn add(&mut self, id: u64, literals: &[Lit], antecedents: &[u64]) -> io::Result<()>;

    fn comment(&mut self, text: &str) -> io::Result<()> {
        let _ = text;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A clause, already collapsed and checked for tautology, ready for LRAT emission.
fn is_tautology(literals: &[Lit]) -> bool {
    literals
        .iter()
        .any(|&lit| literals.contains(&!lit))
}

/// Collapses duplicate literals, preserving first-occurrence order.
fn dedup_literals(literals: &[Lit]) -> Vec<Lit> {
    let mut seen = Vec::with_capacity(literals.len());
    for &lit in literals {
        if !seen.contains(&lit) {
            seen.push(lit);
        }
    }
    seen
}

/// The append-only clause store: assigns ids and drives an [`LratSink`].
///
/// Input clause ids are assigned by [`ClauseStore::new`] (matching their 1-based position in the
/// CNF file); every subsequent [`add_derived`](Self::add_derived) call continues the same id
/// space, so antecedents can reference either kind of clause uniformly.
pub struct ClauseStore<S> {
    next_id: u64,
    sink: S,
}

impl<S: LratSink> ClauseStore<S> {
    /// Create a store whose first derived clause id follows the given number of input clauses.
    pub fn new(input_clause_count: usize, sink: S) -> Self {
        ClauseStore {
            next_id: input_clause_count as u64 + 1,
            sink,
        }
    }

    /// Number of clauses recorded so far (input + derived), i.e. the next id minus one.
    pub fn len(&self) -> u64 {
        self.next_id - 1
    }

    /// Record an LRAT comment, gated by the caller on the configured verbosity.
    pub fn comment(&mut self, text: &str) -> Result<(), LratError> {
        self.sink.comment(text)?;
        Ok(())
    }

    /// Emit a derived clause with its antecedent chain.
    ///
    /// Collapses duplicate literals, drops the clause entirely (returning
    /// [`TAUTOLOGY_ID`]) when it is a tautology derived without antecedents, and filters
    /// [`TAUTOLOGY_ID`] out of the antecedent list before emission.
    pub fn add_derived(
        &mut self,
        literals: &[Lit],
        antecedents: &[u64],
        comment: Option<&str>,
    ) -> Result<u64, LratError> {
        let literals = dedup_literals(literals);

        if antecedents.is_empty() && is_tautology(&literals) {
            return Ok(TAUTOLOGY_ID);
        }

        let filtered_antecedents: Vec<u64> = antecedents
            .iter()
            .copied()
            .filter(|&id| id != TAUTOLOGY_ID)
            .collect();

        let id = self.next_id;
        self.next_id += 1;

        if let Some(text) = comment {
            self.sink.comment(text)?;
        }
        self.sink.add(id, &literals, &filtered_antecedents)?;

        Ok(id)
    }

    pub fn flush(&mut self) -> Result<(), LratError> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Writes clause additions as conventional textual LRAT: `id literal* 0 antecedent* 0`.
///
/// Input clauses are never written (the verifier is expected to already hold the CNF); only
/// derived clauses produce a line.
pub struct TextLratWriter<W: Write> {
    target: io::BufWriter<W>,
}

impl<W: Write> TextLratWriter<W> {
    pub fn new(target: W) -> Self {
        TextLratWriter {
            target: io::BufWriter::new(target),
        }
    }

    fn write_ids(&mut self, ids: &[u64]) -> io::Result<()> {
        for &id in ids {
            itoa::write(&mut self.target, id)?;
            self.target.write_all(b" ")?;
        }
        Ok(())
    }

    fn write_lits(&mut self, lits: &[Lit]) -> io::Result<()> {
        for &lit in lits {
            itoa::write(&mut self.target, lit.to_dimacs())?;
            self.target.write_all(b" ")?;
        }
        Ok(())
    }
}

impl<W: Write> LratSink for TextLratWriter<W> {
    fn add(&mut self, id: u64, literals: &[Lit], antecedents: &[u64]) -> io::Result<()> {
        self.write_ids(&[id])?;
        self.write_lits(literals)?;
        self.target.write_all(b"0 ")?;
        self.write_ids(antecedents)?;
        self.target.write_all(b"0\n")
    }

    fn comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.target, "c {}", text)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target.flush()
    }
}

/// Sink that keeps every emitted line in memory, for use in tests that want to inspect the
/// resulting LRAT text without touching the filesystem.
#[derive(Default)]
pub struct MemoryLratWriter {
    pub lines: Vec<String>,
}

impl LratSink for MemoryLratWriter {
    fn add(&mut self, id: u64, literals: &[Lit], antecedents: &[u64]) -> io::Result<()> {
        let mut line = format!("{} ", id);
        for lit in literals {
            line.push_str(&format!("{} ", lit.to_dimacs()));
        }
        line.push_str("0 ");
        for a in antecedents {
            line.push_str(&format!("{} ", a));
        }
        line.push('0');
        self.lines.push(line);
        Ok(())
    }

    fn comment(&mut self, text: &str) -> io::Result<()> {
        self.lines.push(format!("c {}", text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_formula::lit;

    #[test]
    fn derived_clause_gets_sequential_id_after_inputs() {
        let mut store = ClauseStore::new(3, MemoryLratWriter::default());
        let id = store
            .add_derived(&[lit![1], lit![2]], &[1, 2], None)
            .unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn antecedent_free_tautology_is_not_emitted() {
        let mut store = ClauseStore::new(0, MemoryLratWriter::default());
        let id = store.add_derived(&[lit![1], lit![-1]], &[], None).unwrap();
        assert_eq!(id, TAUTOLOGY_ID);
        assert!(store.into_sink().lines.is_empty());
    }

    #[test]
    fn tautology_id_filtered_from_antecedents() {
        let mut store = ClauseStore::new(0, MemoryLratWriter::default());
        let id = store
            .add_derived(&[lit![1]], &[TAUTOLOGY_ID, 1], None)
            .unwrap();
        assert_eq!(id, 1);
        let sink = store.into_sink();
        assert_eq!(sink.lines[0], "1 1 0 1 0");
    }

    #[test]
    fn duplicate_literals_collapse() {
        let mut store = ClauseStore::new(0, MemoryLratWriter::default());
        store
            .add_derived(&[lit![1], lit![1], lit![2]], &[], None)
            .unwrap();
        let sink = store.into_sink();
        assert_eq!(sink.lines[0], "1 1 2 0 0");
    }

    #[test]
    fn empty_clause_ends_the_refutation() {
        let mut store = ClauseStore::new(0, MemoryLratWriter::default());
        let id = store.add_derived(&[], &[1, 2], None).unwrap();
        assert_eq!(id, 1);
    }
}
