//! Topic router: one registered solver per normalised topic label.
//!
//! Lookup is exact after trimming and lower-casing. A topic without a solver
//! is a normal outcome; those problems rely on the heuristic path alone.

use std::collections::BTreeMap;

use sage_shared::topic::{
    CLASSIC_RIDDLES, LATERAL_THINKING, LOGICAL_TRAPS, MECHANISMS, OPTIMIZATION,
    SEQUENCE_SOLVING, SPATIAL_REASONING,
};
use sage_shared::{normalize_topic, Problem, SolverResult};
use tracing::{debug, info};

use crate::solvers::{
    LateralSolver, LogicalSolver, MechanismSolver, OptimizationSolver, RiddleSolver,
    SequenceSolver, Solver, SpatialSolver,
};

/// Registry of topic solvers
pub struct TopicRouter {
    solvers: BTreeMap<String, Box<dyn Solver>>,
}

impl TopicRouter {
    /// Empty router
    pub fn new() -> Self {
        Self {
            solvers: BTreeMap::new(),
        }
    }

    /// Router with the seven built-in solvers
    pub fn with_defaults() -> Self {
        let router = Self::new()
            .register(SPATIAL_REASONING, SpatialSolver::new())
            .register(OPTIMIZATION, OptimizationSolver::new())
            .register(MECHANISMS, MechanismSolver::new())
            .register(CLASSIC_RIDDLES, RiddleSolver::new())
            .register(SEQUENCE_SOLVING, SequenceSolver::new())
            .register(LATERAL_THINKING, LateralSolver::new())
            .register(LOGICAL_TRAPS, LogicalSolver::new());
        info!("TopicRouter ready with {} solvers", router.solvers.len());
        router
    }

    /// Register a solver, replacing any earlier one for the same topic
    pub fn register(mut self, topic: &str, solver: impl Solver + 'static) -> Self {
        self.solvers.insert(normalize_topic(topic), Box::new(solver));
        self
    }

    pub fn solver_for(&self, topic: &str) -> Option<&dyn Solver> {
        self.solvers.get(&normalize_topic(topic)).map(|s| s.as_ref())
    }

    /// Dispatch a problem to the solver registered for `topic`.
    ///
    /// `None` when no solver is registered or the problem fails validation.
    pub fn route(&self, problem: &Problem, topic: &str) -> Option<SolverResult> {
        let key = normalize_topic(topic);
        let Some(solver) = self.solvers.get(&key) else {
            info!("No symbolic solver for topic '{}'", key);
            return None;
        };
        debug!("Routing topic '{}' to {}", key, solver.name());
        solver.solve(problem)
    }

    pub fn topics(&self) -> Vec<&str> {
        self.solvers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }
}

impl Default for TopicRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
