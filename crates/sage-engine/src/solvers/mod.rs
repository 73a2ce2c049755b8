//! Topic solvers.
//!
//! Every solver is an ordered chain of independent rules. A rule inspects the
//! problem and either declines or proposes a candidate answer; the first
//! candidate that binds to an option slot wins. Rule errors are isolated:
//! a failing rule counts as a declined one.

mod geometry;
mod text;
pub mod lateral;
pub mod logical;
pub mod mechanism;
pub mod optimization;
pub mod riddle;
pub mod sequence;
pub mod spatial;

use sage_shared::{Problem, RuleOutcome, SolverResult};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::matcher;

pub use lateral::LateralSolver;
pub use logical::LogicalSolver;
pub use mechanism::MechanismSolver;
pub use optimization::OptimizationSolver;
pub use riddle::RiddleSolver;
pub use sequence::SequenceSolver;
pub use spatial::SpatialSolver;

/// Confidence of the abstain-to-option-5 default
pub const DEFAULT_CONFIDENCE: f64 = 0.10;

/// Failure inside a single rule
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("could not parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    #[error("{0}")]
    Unsupported(String),
}

pub type RuleResult = Result<Option<RuleOutcome>, RuleError>;

/// What a rule sees: the problem plus its lower-cased statement.
pub struct RuleContext<'a> {
    pub problem: &'a Problem,
    pub statement: &'a str,
    pub lower: String,
}

impl<'a> RuleContext<'a> {
    fn new(problem: &'a Problem, statement: &'a str) -> Self {
        Self {
            problem,
            statement,
            lower: statement.to_lowercase(),
        }
    }

    /// True when every phrase occurs in the lower-cased statement
    pub fn contains_all(&self, phrases: &[&str]) -> bool {
        phrases.iter().all(|p| self.lower.contains(p))
    }

    pub fn contains_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.lower.contains(p))
    }
}

type RuleFn = Box<dyn Fn(&RuleContext<'_>) -> RuleResult + Send + Sync>;

/// Binds a candidate answer to a slot
pub type Binder = fn(&str, &Problem) -> Option<u8>;

/// Last-resort matcher run after every rule declined
pub type Fallback = fn(&RuleContext<'_>) -> Option<SolverResult>;

/// A named rule
pub struct Rule {
    pub name: &'static str,
    apply: RuleFn,
}

impl Rule {
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync + 'static,
    {
        Self {
            name,
            apply: Box::new(apply),
        }
    }

    pub fn apply(&self, ctx: &RuleContext<'_>) -> RuleResult {
        (self.apply)(ctx)
    }
}

/// Outcome of one solve call, keeping the two "no answer" causes apart
#[derive(Debug, Clone, PartialEq)]
pub enum SolveAttempt {
    /// Input-validity gate rejected the problem
    Invalid(&'static str),
    /// A rule (or the fallback matcher) bound an answer
    Answered { rule: &'static str, result: SolverResult },
    /// Nothing bound; abstained toward option 5
    Defaulted(SolverResult),
}

impl SolveAttempt {
    pub fn result(&self) -> Option<SolverResult> {
        match self {
            SolveAttempt::Invalid(_) => None,
            SolveAttempt::Answered { result, .. } | SolveAttempt::Defaulted(result) => Some(*result),
        }
    }

    pub fn rule(&self) -> Option<&'static str> {
        match self {
            SolveAttempt::Answered { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

/// The single capability every topic solver offers
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the solver and report how the answer came about
    fn attempt(&self, problem: &Problem) -> SolveAttempt;

    fn solve(&self, problem: &Problem) -> Option<SolverResult> {
        self.attempt(problem).result()
    }
}

/// Ordered rule list plus the binding and default policy around it
pub struct RuleChain {
    solver: &'static str,
    rules: Vec<Rule>,
    binder: Binder,
    fallback: Option<Fallback>,
    min_confidence: f64,
    default_confidence: f64,
}

impl RuleChain {
    pub fn new(solver: &'static str) -> Self {
        Self {
            solver,
            rules: Vec::new(),
            binder: matcher::match_option,
            fallback: None,
            min_confidence: 0.0,
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn binder(mut self, binder: Binder) -> Self {
        self.binder = binder;
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Candidates at or below this confidence are ignored
    pub fn min_confidence(mut self, min: f64) -> Self {
        self.min_confidence = min;
        self
    }

    pub fn default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = confidence;
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn run(&self, problem: &Problem) -> SolveAttempt {
        if let Err(e) = problem.validate() {
            let field = match e {
                sage_shared::SageError::MissingField(field) => field,
                _ => "unknown",
            };
            error!(
                solver = self.solver,
                reason = "invalid_input",
                field,
                "Input data is incomplete"
            );
            return SolveAttempt::Invalid(field);
        }

        // validate() guarantees the statement is present
        let statement = problem.statement().unwrap_or_default();
        let ctx = RuleContext::new(problem, statement);
        info!("{}: attempting {} rules", self.solver, self.rules.len());

        for rule in &self.rules {
            let outcome = match rule.apply(&ctx) {
                Ok(Some(outcome)) => outcome,
                Ok(None) => continue,
                Err(e) => {
                    debug!("{}: rule {} failed: {}", self.solver, rule.name, e);
                    continue;
                }
            };
            if outcome.confidence <= self.min_confidence {
                debug!(
                    "{}: rule {} below threshold ({:.2})",
                    self.solver, rule.name, outcome.confidence
                );
                continue;
            }
            match (self.binder)(&outcome.answer, problem) {
                Some(slot) => {
                    info!(
                        "{}: rule {} answered '{}' -> option {}",
                        self.solver, rule.name, outcome.answer, slot
                    );
                    return SolveAttempt::Answered {
                        rule: rule.name,
                        result: SolverResult::new(slot, outcome.confidence),
                    };
                }
                None => debug!(
                    "{}: rule {} candidate '{}' matched no option",
                    self.solver, rule.name, outcome.answer
                ),
            }
        }

        if let Some(fallback) = self.fallback {
            if let Some(result) = fallback(&ctx) {
                info!("{}: fallback matched option {}", self.solver, result.answer);
                return SolveAttempt::Answered {
                    rule: "fallback",
                    result,
                };
            }
        }

        warn!(
            solver = self.solver,
            reason = "no_rule_matched",
            "No rule matched, defaulting to option 5"
        );
        SolveAttempt::Defaulted(SolverResult::abstain(self.default_confidence))
    }
}

/// A keyword-set entry: fires when every keyword is in the statement
#[derive(Debug, Clone)]
pub struct KnownPuzzle {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub answer: &'static str,
}

impl KnownPuzzle {
    /// Rule that answers at full confidence when all keywords appear
    pub fn into_rule(self) -> Rule {
        let KnownPuzzle { name, keywords, answer } = self;
        Rule::new(name, move |ctx| {
            Ok(ctx
                .contains_all(keywords)
                .then(|| RuleOutcome::certain(answer)))
        })
    }
}
