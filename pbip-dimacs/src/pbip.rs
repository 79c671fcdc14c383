//! PBIP proof file syntax: one command per non-comment line.
use std::io::{self, BufRead, Write};

use smallvec::SmallVec;
use thiserror::Error;

use pbip_formula::Lit;
use pbip_pb::PbConstraint;

use crate::opb::{parse_literal_token, parse_opb_line, OpbError};

#[derive(Debug, Error)]
pub enum PbipReadError {
    #[error("line {line}: I/O error: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: {source}")]
    Constraint {
        line: usize,
        #[source]
        source: OpbError,
    },
    #[error("line {line}: malformed hint list: {detail}")]
    BadHints { line: usize, detail: String },
    #[error("line {line}: empty line")]
    EmptyLine { line: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PbipCommand {
    Input,
    Assert,
    Rup,
    Target,
}

/// The hint list attached to a step, shaped differently per command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HintList {
    /// `i`/`a`: a flat whitespace list of input-clause or earlier-step ids.
    Ids(Vec<u64>),
    /// `u`: bracket-grouped `(stepId, propagated literal)` pairs; `None` literal means the
    /// referenced step's clausal representation is used directly.
    Rup(Vec<(u64, Option<Lit>)>),
    /// `k`: no hints, just the target constraint.
    None,
}

/// One parsed, non-comment line of a PBIP file.
#[derive(Clone, Debug)]
pub struct PbipLine {
    pub step_id: usize,
    pub line_number: usize,
    pub command: PbipCommand,
    pub constraints: SmallVec<[PbConstraint; 2]>,
    pub hints: HintList,
}

/// Streaming parser over a PBIP file.
pub struct PbipParser<R> {
    lines: std::io::Lines<std::io::BufReader<R>>,
    line_number: usize,
    step_id: usize,
}

impl<R: std::io::Read> PbipParser<R> {
    pub fn new(input: R) -> Self {
        PbipParser {
            lines: std::io::BufReader::new(input).lines(),
            line_number: 0,
            step_id: 0,
        }
    }

    /// Parse the next non-comment line, or `Ok(None)` at end of file.
    pub fn next_line(&mut self) -> Result<Option<PbipLine>, PbipReadError> {
        loop {
            let raw = match self.lines.next() {
                None => return Ok(None),
                Some(line) => line,
            };
            self.line_number += 1;
            let line_number = self.line_number;

            let text = raw.map_err(|source| PbipReadError::Io {
                line: line_number,
                source,
            })?;
            let trimmed = text.trim();

            if trimmed.is_empty() || trimmed.starts_with('*') {
                continue;
            }

            self.step_id += 1;
            return Ok(Some(parse_line(trimmed, line_number, self.step_id)?));
        }
    }
}

fn parse_line(line: &str, line_number: usize, step_id: usize) -> Result<PbipLine, PbipReadError> {
    let (command_tok, rest) = line
        .split_once(char::is_whitespace)
        .ok_or(PbipReadError::EmptyLine { line: line_number })?;

    let command = match command_tok {
        "i" => PbipCommand::Input,
        "a" => PbipCommand::Assert,
        "u" => PbipCommand::Rup,
        "k" => PbipCommand::Target,
        other => {
            return Err(PbipReadError::UnknownCommand {
                line: line_number,
                command: other.to_string(),
            })
        }
    };

    let (raw, hint_text) =
        parse_opb_line(rest).map_err(|source| PbipReadError::Constraint {
            line: line_number,
            source,
        })?;
    let constraints = raw.normalise();

    let hints = match command {
        PbipCommand::Target => HintList::None,
        PbipCommand::Rup => HintList::Rup(parse_rup_hints(hint_text, line_number)?),
        PbipCommand::Input | PbipCommand::Assert => {
            HintList::Ids(parse_id_hints(hint_text, line_number)?)
        }
    };

    Ok(PbipLine {
        step_id,
        line_number,
        command,
        constraints,
        hints,
    })
}

fn parse_id_hints(text: &str, line_number: usize) -> Result<Vec<u64>, PbipReadError> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse().map_err(|_| PbipReadError::BadHints {
                line: line_number,
                detail: format!("expected clause/step id, got {:?}", tok),
            })
        })
        .collect()
}

/// Bracket parsing for RUP hints: `[stepId literal]` or `[stepId]`, space separated. A bracket
/// group with more than one trailing literal is pair-split, the head (`stepId`) shared across
/// the resulting pairs — `[2 x1 x2]` becomes `(2, x1), (2, x2)`.
fn parse_rup_hints(text: &str, line_number: usize) -> Result<Vec<(u64, Option<Lit>)>, PbipReadError> {
    let mut result = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if !rest.starts_with('[') {
            return Err(PbipReadError::BadHints {
                line: line_number,
                detail: format!("expected '[' in RUP hint list, found {:?}", rest),
            });
        }
        let end = rest.find(']').ok_or_else(|| PbipReadError::BadHints {
            line: line_number,
            detail: "unterminated '[' in RUP hint list".to_string(),
        })?;

        let body = &rest[1..end];
        let mut tokens = body.split_whitespace();
        let head_tok = tokens.next().ok_or_else(|| PbipReadError::BadHints {
            line: line_number,
            detail: "empty bracket group in RUP hint list".to_string(),
        })?;
        let head: u64 = head_tok.parse().map_err(|_| PbipReadError::BadHints {
            line: line_number,
            detail: format!("expected step id, got {:?}", head_tok),
        })?;

        let literals: Vec<&str> = tokens.collect();
        if literals.is_empty() {
            result.push((head, None));
        } else {
            for lit_tok in literals {
                let lit = parse_literal_or_dimacs(lit_tok).map_err(|_| PbipReadError::BadHints {
                    line: line_number,
                    detail: format!("expected literal, got {:?}", lit_tok),
                })?;
                result.push((head, Some(lit)));
            }
        }

        rest = &rest[end + 1..];
    }

    Ok(result)
}

/// Writes one PBIP step: `<command> <constraint opb text> <hint list>`.
///
/// One constraint per line, matching what the parser accepts — a normalised `=` constraint
/// (which splits into two [`PbConstraint`]s) must be written as two separate steps by the caller.
pub fn write_pbip_line(
    target: &mut impl io::Write,
    command: PbipCommand,
    constraint: &PbConstraint,
    hints: &HintList,
) -> io::Result<()> {
    let command_char = match command {
        PbipCommand::Input => "i",
        PbipCommand::Assert => "a",
        PbipCommand::Rup => "u",
        PbipCommand::Target => "k",
    };
    write!(target, "{} {}", command_char, constraint.opb_string())?;
    match hints {
        HintList::Ids(ids) => {
            for id in ids {
                write!(target, " {}", id)?;
            }
        }
        HintList::Rup(pairs) => {
            for (step, lit) in pairs {
                match lit {
                    Some(l) => write!(target, " [{} {}]", step, l.to_dimacs())?,
                    None => write!(target, " [{}]", step)?,
                }
            }
        }
        HintList::None => {}
    }
    writeln!(target)
}

fn parse_literal_or_dimacs(tok: &str) -> Result<Lit, ()> {
    if let Ok(n) = tok.parse::<isize>() {
        if n != 0 {
            return Ok(Lit::from_dimacs(n));
        }
    }
    parse_literal_token(tok).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_input_step() {
        let mut parser = PbipParser::new("i 1 x1 1 x2 >= 1 ; 4 5\n".as_bytes());
        let line = parser.next_line().unwrap().unwrap();
        assert_eq!(line.command, PbipCommand::Input);
        assert_eq!(line.step_id, 1);
        assert_eq!(line.hints, HintList::Ids(vec![4, 5]));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let mut parser = PbipParser::new("* a comment\n\ni 1 x1 >= 1 ;\n".as_bytes());
        let line = parser.next_line().unwrap().unwrap();
        assert_eq!(line.step_id, 1);
        assert_eq!(line.line_number, 3);
    }

    #[test]
    fn parses_rup_hints_with_dimacs_literals() {
        let mut parser = PbipParser::new("u 1 x3 >= 1 ; [2 3] [3 -3]\n".as_bytes());
        let line = parser.next_line().unwrap().unwrap();
        match line.hints {
            HintList::Rup(hints) => {
                assert_eq!(hints.len(), 2);
                assert_eq!(hints[0].0, 2);
                assert!(hints[0].1.unwrap().is_positive());
                assert!(hints[1].1.unwrap().is_negative());
            }
            _ => panic!("expected RUP hints"),
        }
    }

    #[test]
    fn splits_bracket_group_with_shared_head() {
        let mut parser = PbipParser::new("u 1 x1 >= 1 ; [2 1 2]\n".as_bytes());
        let line = parser.next_line().unwrap().unwrap();
        match line.hints {
            HintList::Rup(hints) => {
                assert_eq!(hints, vec![(2, Some(Lit::from_dimacs(1))), (2, Some(Lit::from_dimacs(2)))]);
            }
            _ => panic!("expected RUP hints"),
        }
    }

    #[test]
    fn parses_bracket_with_no_literal() {
        let mut parser = PbipParser::new("u 1 x1 >= 1 ; [2]\n".as_bytes());
        let line = parser.next_line().unwrap().unwrap();
        assert_eq!(line.hints, HintList::Rup(vec![(2, None)]));
    }

    #[test]
    fn target_command_has_no_hints() {
        let mut parser = PbipParser::new("k 1 x1 >= 1 ;\n".as_bytes());
        let line = parser.next_line().unwrap().unwrap();
        assert_eq!(line.command, PbipCommand::Target);
        assert_eq!(line.hints, HintList::None);
    }
}
