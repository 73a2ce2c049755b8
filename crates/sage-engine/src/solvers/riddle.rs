//! Classic riddles answered from a fixed knowledge base.

use sage_shared::Problem;
use tracing::info;

use super::{KnownPuzzle, RuleChain, SolveAttempt, Solver};

/// Riddles the solver recognises, in lookup order
pub const RIDDLES: [KnownPuzzle; 3] = [
    KnownPuzzle {
        name: "race_position",
        keywords: &["in a race", "overtake", "second person"],
        answer: "Second",
    },
    KnownPuzzle {
        name: "photography_lateral",
        keywords: &["shoots her husband", "underwater", "hangs him"],
        answer: "photo development process",
    },
    KnownPuzzle {
        name: "inheritance_coins",
        keywords: &["17 gold coins", "one-ninth", "one-third"],
        answer: "Borrow 1 coin",
    },
];

pub struct RiddleSolver {
    chain: RuleChain,
}

impl RiddleSolver {
    pub fn new() -> Self {
        let chain = RIDDLES
            .iter()
            .cloned()
            .fold(RuleChain::new("RiddleSolver"), |chain, riddle| {
                chain.rule(riddle.into_rule())
            });
        info!("RiddleSolver initialized with {} known riddles", chain.len());
        Self { chain }
    }
}

impl Default for RiddleSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for RiddleSolver {
    fn name(&self) -> &'static str {
        "RiddleSolver"
    }

    fn attempt(&self, problem: &Problem) -> SolveAttempt {
        self.chain.run(problem)
    }
}
