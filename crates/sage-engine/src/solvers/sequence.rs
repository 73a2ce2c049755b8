//! Integer sequences extrapolated through their finite-difference table.
//!
//! Differences are taken until a row is constant; that depth is the
//! polynomial degree. Extending the table from the constant row upward
//! gives the next terms of exactly the fitted polynomial, in integers.

use sage_shared::{Problem, RuleOutcome};
use tracing::debug;

use super::text::signed_integers;
use super::{RuleChain, RuleContext, RuleError, RuleResult, Rule, SolveAttempt, Solver};
use crate::matcher;

/// Minimum number of terms needed to detect a pattern
const MIN_TERMS: usize = 3;

/// Phrases that introduce the terms; numbers before them are ignored
const TRIGGERS: [&str; 2] = ["sequence of numbers", "sequence:"];

/// Forward-difference table, top row first, ending at a constant row
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceTable {
    rows: Vec<Vec<i64>>,
}

impl DifferenceTable {
    pub fn build(terms: &[i64]) -> Result<Self, RuleError> {
        let mut rows = vec![terms.to_vec()];
        loop {
            let last = &rows[rows.len() - 1];
            if last.len() < 2 {
                break;
            }
            let next = last
                .windows(2)
                .map(|w| w[1].checked_sub(w[0]))
                .collect::<Option<Vec<i64>>>()
                .ok_or(RuleError::Overflow("difference table"))?;
            let constant = next.windows(2).all(|w| w[0] == w[1]);
            rows.push(next);
            if constant {
                break;
            }
        }
        Ok(Self { rows })
    }

    /// Degree of the polynomial through the terms
    pub fn degree(&self) -> usize {
        self.rows.len() - 1
    }

    /// The next `count` terms
    pub fn extrapolate(&self, count: usize) -> Result<Vec<i64>, RuleError> {
        let mut tails: Vec<i64> = self
            .rows
            .iter()
            .map(|row| row.last().copied().unwrap_or_default())
            .collect();
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            for k in (0..tails.len() - 1).rev() {
                tails[k] = tails[k]
                    .checked_add(tails[k + 1])
                    .ok_or(RuleError::Overflow("extrapolation"))?;
            }
            out.push(tails[0]);
        }
        Ok(out)
    }
}

fn polynomial_sequence(ctx: &RuleContext<'_>) -> RuleResult {
    let Some(start) = TRIGGERS
        .iter()
        .filter_map(|t| ctx.lower.find(t).map(|i| i + t.len()))
        .min()
    else {
        return Ok(None);
    };
    let terms = signed_integers(&ctx.lower[start..]);
    if terms.len() < MIN_TERMS {
        return Ok(None);
    }

    let table = DifferenceTable::build(&terms)?;
    let wants_two = ctx.lower.contains("next two numbers");
    let next = table.extrapolate(if wants_two { 2 } else { 1 })?;
    debug!(
        "Sequence {:?}: degree {}, next {:?}",
        terms,
        table.degree(),
        next
    );

    let answer = match next.as_slice() {
        [a, b] => format!("{} and {}", a, b),
        [a] => a.to_string(),
        _ => return Ok(None),
    };
    Ok(Some(RuleOutcome::certain(answer)))
}

pub struct SequenceSolver {
    chain: RuleChain,
}

impl SequenceSolver {
    pub fn new() -> Self {
        Self {
            chain: RuleChain::new("SequenceSolver")
                .binder(matcher::match_pair)
                .rule(Rule::new("polynomial_sequence", polynomial_sequence)),
        }
    }
}

impl Default for SequenceSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for SequenceSolver {
    fn name(&self) -> &'static str {
        "SequenceSolver"
    }

    fn attempt(&self, problem: &Problem) -> SolveAttempt {
        self.chain.run(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_degree() {
        let table = DifferenceTable::build(&[1, 5, 12, 22, 35]).unwrap();
        assert_eq!(table.degree(), 2);
        assert_eq!(table.extrapolate(2).unwrap(), vec![51, 70]);
    }

    #[test]
    fn test_constant_sequence() {
        let table = DifferenceTable::build(&[7, 7, 7]).unwrap();
        assert_eq!(table.degree(), 1);
        assert_eq!(table.extrapolate(1).unwrap(), vec![7]);
    }

    #[test]
    fn test_negative_terms() {
        let table = DifferenceTable::build(&[3, -1, -5, -9]).unwrap();
        assert_eq!(table.extrapolate(1).unwrap(), vec![-13]);
    }

    #[test]
    fn test_cubic() {
        // n³
        let table = DifferenceTable::build(&[1, 8, 27, 64, 125]).unwrap();
        assert_eq!(table.degree(), 3);
        assert_eq!(table.extrapolate(1).unwrap(), vec![216]);
    }

    #[test]
    fn test_overflow_is_rule_error() {
        assert!(DifferenceTable::build(&[i64::MIN, i64::MAX, 0]).is_err());
    }

    #[test]
    fn test_too_few_terms_defaults() {
        let problem = Problem::new(
            "A sequence of numbers: 2, 4",
            ["5", "6", "8", "10", "Another answer"],
        );
        let result = SequenceSolver::new().solve(&problem).unwrap();
        assert_eq!(result.answer, 5);
    }

    #[test]
    fn test_numbers_without_trigger_default() {
        let problem = Problem::new(
            "Tickets cost 1, 5, 12, 22 and 35 dollars. Which is the cheapest?",
            ["1", "51", "12", "35", "Another answer"],
        );
        let attempt = SequenceSolver::new().attempt(&problem);
        assert_eq!(attempt.rule(), None);
        assert_eq!(attempt.result().unwrap().answer, 5);
    }

    #[test]
    fn test_numbers_before_trigger_ignored() {
        let problem = Problem::new(
            "Question 7. Continue the sequence: 2, 4, 6, 8",
            ["9", "10", "12", "14", "Another answer"],
        );
        let attempt = SequenceSolver::new().attempt(&problem);
        assert_eq!(attempt.rule(), Some("polynomial_sequence"));
        assert_eq!(attempt.result().unwrap().answer, 2);
    }

    #[test]
    fn test_next_two_numbers() {
        let problem = Problem::new(
            "Find the next two numbers in the sequence of numbers: 2, 5, 10, 17, 26",
            ["37 and 48", "35 and 50", "37 and 50", "36 and 49", "Another answer"],
        );
        let attempt = SequenceSolver::new().attempt(&problem);
        // 37 and 50: option 1 has only the first token
        assert_eq!(attempt.result().unwrap().answer, 3);
        assert_eq!(attempt.rule(), Some("polynomial_sequence"));
    }
}
