//! Lateral-thinking puzzles answered from a fixed knowledge base.

use sage_shared::Problem;
use tracing::info;

use super::{KnownPuzzle, RuleChain, SolveAttempt, Solver};

pub const PUZZLES: [KnownPuzzle; 1] = [KnownPuzzle {
    name: "photography_puzzle",
    keywords: &["shoots her husband", "underwater", "hangs him"],
    answer: "photo development process",
}];

pub struct LateralSolver {
    chain: RuleChain,
}

impl LateralSolver {
    pub fn new() -> Self {
        let chain = PUZZLES
            .iter()
            .cloned()
            .fold(RuleChain::new("LateralSolver"), |chain, puzzle| {
                chain.rule(puzzle.into_rule())
            });
        info!("LateralSolver initialized with {} known puzzles", chain.len());
        Self { chain }
    }
}

impl Default for LateralSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for LateralSolver {
    fn name(&self) -> &'static str {
        "LateralSolver"
    }

    fn attempt(&self, problem: &Problem) -> SolveAttempt {
        self.chain.run(problem)
    }
}
