//! Pseudo-Boolean constraint normal form and normalisation.
//!
//! A [`PbConstraint`] always represents `Σ aᵢ·lᵢ ≥ k` with every `aᵢ > 0`, i.e. the form
//! required by the BDD construction walk and by bucket/SDP reduction. Constraints are values:
//! every normalisation step below consumes its input and returns a new constraint rather than
//! mutating one in place.
use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

use pbip_formula::{Lit, Var};

/// The relation of an as-written OPB/PBIP inequality, before normalisation to `≥`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Relation {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

/// A single as-written term: a signed coefficient applied to a literal.
///
/// The coefficient sign and the literal's polarity are independent: `-3 ~x1` is coefficient
/// `-3` applied to the literal `¬x1`.
pub type RawTerm = (i64, Lit);

/// An as-parsed, not yet normalised inequality.
#[derive(Clone, Debug)]
pub struct RawPbConstraint {
    pub terms: Vec<RawTerm>,
    pub relation: Relation,
    pub rhs: i64,
}

impl RawPbConstraint {
    /// Normalise relation, variables and coefficients, producing one canonical constraint, or
    /// two when the relation is `=` (split into `≥ k` and `≤ k`, the latter negated to `≥ −k`).
    pub fn normalise(&self) -> SmallVec<[PbConstraint; 2]> {
        let mut out = SmallVec::new();
        match self.relation {
            Relation::Ge => out.push(PbConstraint::from_raw(&self.terms, self.rhs)),
            Relation::Gt => out.push(PbConstraint::from_raw(&self.terms, self.rhs + 1)),
            Relation::Le => out.push(PbConstraint::from_raw(&negate_terms(&self.terms), -self.rhs)),
            Relation::Lt => {
                out.push(PbConstraint::from_raw(&negate_terms(&self.terms), -self.rhs + 1))
            }
            Relation::Eq => {
                out.push(PbConstraint::from_raw(&self.terms, self.rhs));
                out.push(PbConstraint::from_raw(&negate_terms(&self.terms), -self.rhs));
            }
        }
        out
    }
}

fn negate_terms(terms: &[RawTerm]) -> Vec<RawTerm> {
    terms.iter().map(|&(c, l)| (-c, l)).collect()
}

/// A canonical pseudo-Boolean constraint `Σ aᵢ·lᵢ ≥ k`, `aᵢ > 0`.
///
/// Terms are kept sorted by variable index with at most one term per variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PbConstraint {
    terms: Vec<(u64, Lit)>,
    rhs: i64,
}

impl PbConstraint {
    /// Build a canonical constraint from as-written terms already known to mean `Σ ≥ rhs`.
    ///
    /// This fuses the two normalisation phases described for the pseudo-Boolean solver this is
    /// ported from: first *variable normalisation* (folding `¬x` terms into a signed coefficient
    /// on `x`, adjusting the right-hand side), then *coefficient normalisation* (flipping any
    /// remaining negative coefficient back onto the negated literal so every `aᵢ` is positive).
    pub fn from_raw(terms: &[RawTerm], rhs: i64) -> PbConstraint {
        let VarNormalised {
            coeffs,
            rhs: var_rhs,
        } = variable_normalise(terms, rhs);
        coeff_normalise(coeffs, var_rhs)
    }

    /// Build directly from an already-canonical term list (all coefficients positive, one term
    /// per variable). Used by the BDD-construction and reduction code once a constraint is
    /// fully normalised.
    pub fn from_canonical(mut terms: Vec<(u64, Lit)>, rhs: i64) -> PbConstraint {
        terms.sort_by_key(|&(_, lit)| lit.var().index());
        PbConstraint { terms, rhs }
    }

    pub fn terms(&self) -> &[(u64, Lit)] {
        &self.terms
    }

    pub fn rhs(&self) -> i64 {
        self.rhs
    }

    /// Variables appearing in the constraint, in ascending index order.
    pub fn support(&self) -> impl Iterator<Item = Var> + '_ {
        self.terms.iter().map(|&(_, lit)| lit.var())
    }

    pub fn max_coefficient(&self) -> u64 {
        self.terms.iter().map(|&(c, _)| c).max().unwrap_or(0)
    }

    /// True when every coefficient is 1 (after coefficient normalisation).
    pub fn is_cardinality(&self) -> bool {
        self.terms.iter().all(|&(c, _)| c == 1)
    }

    /// True when the constraint is logically a clause: every coefficient is 1 and `k = 1`.
    pub fn is_clause(&self) -> bool {
        self.rhs == 1 && self.is_cardinality()
    }

    /// The clause equivalent to this constraint, if [`is_clause`](Self::is_clause).
    pub fn as_clause(&self) -> Option<Vec<Lit>> {
        if self.is_clause() {
            Some(self.terms.iter().map(|&(_, lit)| lit).collect())
        } else {
            None
        }
    }

    /// Sum of all remaining coefficients; used as the starting point of the BDD-construction
    /// walk (`sum_remaining_coeffs` in the component design).
    pub fn coefficient_sum(&self) -> u64 {
        self.terms.iter().map(|&(c, _)| c).sum()
    }

    /// The constraint with the given literal's term removed, for the BDD-construction recursion.
    pub fn without_first_term(&self) -> Option<(u64, Lit, PbConstraint)> {
        let (&(coeff, lit), rest) = self.terms.split_first()?;
        Some((
            coeff,
            lit,
            PbConstraint {
                terms: rest.to_vec(),
                rhs: self.rhs,
            },
        ))
    }

    /// Re-render in OPB constraint syntax, `coeff lit coeff lit ... >= rhs ;`.
    pub fn opb_string(&self) -> String {
        let mut s = String::new();
        for &(coeff, lit) in &self.terms {
            if lit.is_negative() {
                s.push_str(&format!("{} ~x{} ", coeff, lit.var().to_dimacs()));
            } else {
                s.push_str(&format!("{} x{} ", coeff, lit.var().to_dimacs()));
            }
        }
        s.push_str(&format!(">= {} ;", self.rhs));
        s
    }
}

impl fmt::Display for PbConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opb_string())
    }
}

struct VarNormalised {
    coeffs: Vec<(i64, Var)>,
    rhs: i64,
}

/// Fold every `¬x` term into a signed coefficient on the positive variable, adjusting the
/// right-hand side: `c·¬x = c·(1−x) = c − c·x`, so each negated term moves `c` onto the other
/// side and contributes `−c` to `x`'s net coefficient. Terms on the same variable accumulate,
/// which also cancels opposing-literal pairs naturally (`c·x` and `c·¬x` on the same variable
/// net to a `0` coefficient and a constant rhs shift).
fn variable_normalise(terms: &[RawTerm], rhs: i64) -> VarNormalised {
    let mut net: BTreeMap<Var, i64> = BTreeMap::new();
    let mut rhs = rhs;
    for &(coeff, lit) in terms {
        let entry = net.entry(lit.var()).or_insert(0);
        if lit.is_positive() {
            *entry += coeff;
        } else {
            *entry -= coeff;
            rhs -= coeff;
        }
    }
    VarNormalised {
        coeffs: net.into_iter().map(|(v, c)| (c, v)).collect(),
        rhs,
    }
}

/// Flip every negative net coefficient back onto the negated literal: `−c·x = c·¬x − c`, so a
/// negative coefficient moves its magnitude onto the literal and adds it back to the rhs.
fn coeff_normalise(coeffs: Vec<(i64, Var)>, rhs: i64) -> PbConstraint {
    let mut rhs = rhs;
    let mut terms = Vec::with_capacity(coeffs.len());
    for (c, var) in coeffs {
        if c == 0 {
            continue;
        } else if c > 0 {
            terms.push((c as u64, var.positive()));
        } else {
            terms.push(((-c) as u64, var.negative()));
            rhs += -c;
        }
    }
    PbConstraint { terms, rhs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbip_formula::lit;

    #[test]
    fn ge_passthrough() {
        let raw = RawPbConstraint {
            terms: vec![(1, lit![1]), (1, lit![2])],
            relation: Relation::Ge,
            rhs: 1,
        };
        let normalised = raw.normalise();
        assert_eq!(normalised.len(), 1);
        assert_eq!(normalised[0].rhs(), 1);
        assert!(normalised[0].is_clause());
    }

    #[test]
    fn negated_literal_moves_to_rhs() {
        // 2 ~x1 >= 1  <=>  2 - 2x1 >= 1  <=>  -2x1 >= -1  <=>  2 ¬x1 >= 1 (coeff normalised)
        let raw = RawPbConstraint {
            terms: vec![(2, lit![-1])],
            relation: Relation::Ge,
            rhs: 1,
        };
        let c = &raw.normalise()[0];
        assert_eq!(c.terms(), &[(2, lit![-1])]);
        assert_eq!(c.rhs(), 1);
    }

    #[test]
    fn le_flips_to_ge() {
        // x1 + x2 <= 1  <=>  -x1 - x2 >= -1  <=>  ¬x1 + ¬x2 >= 1
        let raw = RawPbConstraint {
            terms: vec![(1, lit![1]), (1, lit![2])],
            relation: Relation::Le,
            rhs: 1,
        };
        let c = &raw.normalise()[0];
        assert_eq!(c.terms(), &[(1, lit![-1]), (1, lit![-2])]);
        assert_eq!(c.rhs(), 1);
    }

    #[test]
    fn eq_splits_in_two() {
        let raw = RawPbConstraint {
            terms: vec![(1, lit![1]), (1, lit![2])],
            relation: Relation::Eq,
            rhs: 1,
        };
        let both = raw.normalise();
        assert_eq!(both.len(), 2);
        assert!(both[0].rhs() >= 1);
        assert!(both[1].is_clause());
    }

    #[test]
    fn cancelling_literals() {
        // x1 + ~x1 + x2 >= 1  <=>  (cancels to) 1 + x2 >= 1  <=> x2 >= 0 (always true after drop)
        let raw = RawPbConstraint {
            terms: vec![(1, lit![1]), (1, lit![-1]), (1, lit![2])],
            relation: Relation::Ge,
            rhs: 1,
        };
        let c = &raw.normalise()[0];
        assert_eq!(c.terms(), &[(1, lit![2])]);
        assert_eq!(c.rhs(), 0);
    }

    proptest::proptest! {
        // `pbip-pb` doesn't depend on the OPB parser (`pbip-dimacs` depends on `pbip-pb`, not the
        // other way around), so this only checks `opb_string`'s own shape is well-formed for any
        // rhs; the actual parse-and-renormalise round trip is tested in `pbip-dimacs::opb`.
        #[test]
        fn opb_string_is_well_formed(rhs in -5i64..5) {
            let c = PbConstraint::from_canonical(vec![(2, lit![1]), (1, lit![-2])], rhs);
            let s = c.opb_string();
            proptest::prop_assert!(s.contains(">="));
            proptest::prop_assert!(s.ends_with(';'));
            proptest::prop_assert!(s.contains("~x2"));
        }
    }
}
