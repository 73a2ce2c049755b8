//! Shared types for the Sage reasoning engine.
//!
//! Problem rows, solver and parser results, topic labels, the per-problem
//! run record, and the offline trust-weight optimizer.

pub mod error;
pub mod problem;
pub mod record;
pub mod topic;
pub mod weights;

pub use error::SageError;
pub use problem::{ParsedAnswer, Problem, RuleOutcome, SolverResult, ESCAPE_HATCH_SLOT, OPTION_COUNT};
pub use record::ReasoningRecord;
pub use topic::normalize_topic;
pub use weights::{optimize_weights, PerformanceTable, ReasonerWeights, WeightsArtifact};
