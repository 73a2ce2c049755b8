//! Logical traps: constraint systems that look solvable but are not.

use sage_shared::{Problem, RuleOutcome};

use super::geometry::{self, Placement, UNIT_SQUARE};
use super::{RuleChain, RuleContext, RuleResult, Rule, SolveAttempt, Solver};

/// Canonical answer for an unsatisfiable placement
pub const TRAP_ANSWER: &str = "Nowhere, because it's a logical trap";

/// Multiplier named by a "<n> the distance" phrase
fn distance_ratio(lower: &str) -> Option<f64> {
    [
        ("twice the distance", 2.0),
        ("double the distance", 2.0),
        ("three times the distance", 3.0),
        ("triple the distance", 3.0),
    ]
    .iter()
    .find(|(phrase, _)| lower.contains(phrase))
    .map(|(_, ratio)| *ratio)
}

/// Lamp puzzle: a point equidistant from three corners of a unit square
/// that must also be `ratio` times as far from the fourth corner.
fn equidistant_corners(ctx: &RuleContext<'_>) -> RuleResult {
    if !ctx.contains_all(&["equidistant from", "corner"]) {
        return Ok(None);
    }
    let Some(ratio) = distance_ratio(&ctx.lower) else {
        return Ok(None);
    };

    let [a, b, c, d] = UNIT_SQUARE;
    let outcome = match geometry::equidistant_with_ratio(a, b, c, d, ratio, (0.0, 1.0)) {
        Placement::Unsatisfiable => RuleOutcome::certain(TRAP_ANSWER),
        Placement::Found(p) => RuleOutcome::certain(format!(
            "({}, {})",
            geometry::format_coord(p.x),
            geometry::format_coord(p.y)
        )),
    };
    Ok(Some(outcome))
}

pub struct LogicalSolver {
    chain: RuleChain,
}

impl LogicalSolver {
    pub fn new() -> Self {
        Self {
            chain: RuleChain::new("LogicalSolver")
                .rule(Rule::new("equidistant_corners", equidistant_corners)),
        }
    }
}

impl Default for LogicalSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for LogicalSolver {
    fn name(&self) -> &'static str {
        "LogicalSolver"
    }

    fn attempt(&self, problem: &Problem) -> SolveAttempt {
        self.chain.run(problem)
    }
}
