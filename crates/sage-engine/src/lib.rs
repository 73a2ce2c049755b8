//! Sage engine: hybrid symbolic + language-model reasoning over
//! multiple-choice problems.
//!
//! The symbolic path routes a problem to a topic solver that runs an ordered
//! chain of pattern rules. The heuristic path renders a topic prompt, calls a
//! language model through a provider factory with permanent local fallback,
//! and parses the reply.

pub mod config;
pub mod llm;
pub mod matcher;
pub mod parser;
pub mod prompts;
pub mod reasoner;
pub mod router;
pub mod solvers;

pub use config::Config;
pub use llm::{FakeLlmClient, LlmError, LlmFactory, LlmProvider, ProviderState};
pub use parser::ResponseParser;
pub use prompts::PromptRouter;
pub use reasoner::{HeuristicReasoner, Reasoner, SymbolicReasoner};
pub use router::TopicRouter;
pub use solvers::Solver;
