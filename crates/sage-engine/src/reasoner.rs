//! The two reasoning paths and the facade that runs both.

use sage_shared::{normalize_topic, ParsedAnswer, Problem, ReasoningRecord, SolverResult};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::llm::{LlmError, LlmFactory};
use crate::parser::ResponseParser;
use crate::prompts::PromptRouter;
use crate::router::TopicRouter;

/// Rule-based path: a thin layer over the topic router
pub struct SymbolicReasoner {
    router: TopicRouter,
}

impl SymbolicReasoner {
    pub fn new() -> Self {
        info!("Initializing symbolic reasoner");
        Self::with_router(TopicRouter::with_defaults())
    }

    pub fn with_router(router: TopicRouter) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &TopicRouter {
        &self.router
    }

    pub fn solve(&self, problem: &Problem, topic: &str) -> Option<SolverResult> {
        self.router.route(problem, topic)
    }
}

impl Default for SymbolicReasoner {
    fn default() -> Self {
        Self::new()
    }
}

/// Language-model path: render prompt, call model, parse reply
pub struct HeuristicReasoner {
    factory: LlmFactory,
    prompts: PromptRouter,
    parser: ResponseParser,
}

impl HeuristicReasoner {
    pub fn new(factory: LlmFactory, prompts: PromptRouter, parser: ResponseParser) -> Self {
        Self {
            factory,
            prompts,
            parser,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        info!("Initializing heuristic reasoner");
        Self::new(
            LlmFactory::from_config(config),
            PromptRouter::new(),
            ResponseParser::new(config.heuristic.confidence),
        )
    }

    pub fn factory(&self) -> &LlmFactory {
        &self.factory
    }

    /// `Ok(None)` when the prompt cannot be rendered or the reply has no
    /// usable option. Errors only if the local provider is unavailable.
    pub fn solve(&self, problem: &Problem, topic: &str) -> Result<Option<ParsedAnswer>, LlmError> {
        let prompt = self.prompts.get_prompt(topic, problem);
        if prompt.is_empty() {
            return Ok(None);
        }
        let raw = self.factory.generate_response(&prompt)?;
        Ok(self.parser.parse(&raw))
    }
}

/// Runs both paths and records their answers side by side
pub struct Reasoner {
    symbolic: SymbolicReasoner,
    heuristic: Option<HeuristicReasoner>,
}

impl Reasoner {
    /// `heuristic` may be `None` for a symbolic-only run
    pub fn new(symbolic: SymbolicReasoner, heuristic: Option<HeuristicReasoner>) -> Self {
        Self {
            symbolic,
            heuristic,
        }
    }

    pub fn from_config(config: &Config, symbolic_only: bool) -> Self {
        let heuristic = (!symbolic_only).then(|| HeuristicReasoner::from_config(config));
        Self::new(SymbolicReasoner::new(), heuristic)
    }

    /// Solve one problem.
    ///
    /// `topic` overrides the problem's own label. Without any topic the
    /// symbolic path is skipped and the base prompt is used.
    pub fn reason(&self, problem: &Problem, topic: Option<&str>) -> ReasoningRecord {
        let topic = topic
            .or(problem.topic.as_deref())
            .map(normalize_topic)
            .filter(|t| !t.is_empty());

        let symbolic = match &topic {
            Some(t) => self.symbolic.solve(problem, t),
            None => {
                warn!("Problem has no topic; skipping symbolic path");
                None
            }
        };

        let heuristic = self.heuristic.as_ref().and_then(|h| {
            match h.solve(problem, topic.as_deref().unwrap_or_default()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!("Heuristic path failed: {}", e);
                    None
                }
            }
        });

        ReasoningRecord::from_results(topic.as_deref(), symbolic, heuristic)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::factory::local_builder;
    use crate::llm::{FakeLlmClient, LlmProvider};
    use sage_shared::topic::CLASSIC_RIDDLES;

    fn race() -> Problem {
        Problem::new(
            "You are in a race and you overtake the second person. What position are you in now?",
            ["First", "Second", "Third", "Fourth", "Another answer"],
        )
    }

    fn heuristic_with(fake: &Arc<FakeLlmClient>) -> HeuristicReasoner {
        let fake = Arc::clone(fake);
        let factory = LlmFactory::new(
            Ok(Box::new(fake) as Box<dyn LlmProvider>),
            local_builder(|| Err(LlmError::NotAvailable)),
        );
        HeuristicReasoner::new(factory, PromptRouter::new(), ResponseParser::default())
    }

    #[test]
    fn test_symbolic_solves_riddle() {
        let result = SymbolicReasoner::new().solve(&race(), "Classic Riddles").unwrap();
        assert_eq!(result.answer, 2);
        assert!((result.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_heuristic_uses_topic_prompt() {
        let fake = Arc::new(FakeLlmClient::always(
            "<scratchpad>Take their place.</scratchpad><answer>2</answer>",
        ));
        let parsed = heuristic_with(&fake).solve(&race(), CLASSIC_RIDDLES).unwrap().unwrap();
        assert_eq!(parsed.answer, 2);
        assert_eq!(parsed.solution, "Take their place.");
        assert!(fake.prompts()[0].contains("expert riddle solver"));
    }

    #[test]
    fn test_heuristic_skips_call_for_invalid_problem() {
        let fake = Arc::new(FakeLlmClient::always("<answer>1</answer>"));
        let problem = race().with_option(1, None);
        assert_eq!(heuristic_with(&fake).solve(&problem, CLASSIC_RIDDLES), Ok(None));
        assert_eq!(fake.call_count(), 0);
    }

    #[test]
    fn test_record_with_both_paths() {
        let fake = Arc::new(FakeLlmClient::always("answer is 3"));
        let reasoner = Reasoner::new(SymbolicReasoner::new(), Some(heuristic_with(&fake)));
        let record = reasoner.reason(&race().with_topic("Classic Riddles"), None);
        assert_eq!(record.topic.as_deref(), Some(CLASSIC_RIDDLES));
        assert_eq!(record.symbolic_answer, Some(2));
        assert_eq!(record.heuristic_answer, Some(3));
        assert_eq!(record.heuristic_solution.as_deref(), Some(crate::parser::NO_REASONING));
    }

    #[test]
    fn test_record_nulls_when_local_unavailable() {
        let factory = LlmFactory::new(
            Err(LlmError::MissingCredential("KEY".to_string())),
            local_builder(|| Err(LlmError::NotAvailable)),
        );
        let heuristic =
            HeuristicReasoner::new(factory, PromptRouter::new(), ResponseParser::default());
        let reasoner = Reasoner::new(SymbolicReasoner::new(), Some(heuristic));
        let record = reasoner.reason(&race(), Some("astrology"));
        assert!(record.is_empty());
        assert_eq!(record.heuristic_confidence, None);
    }

    #[test]
    fn test_symbolic_only_without_topic() {
        let reasoner = Reasoner::new(SymbolicReasoner::new(), None);
        let record = reasoner.reason(&race(), None);
        assert_eq!(record.topic, None);
        assert!(record.is_empty());
    }
}
