//! End-to-end: problem rows in, reasoning records out.

use std::sync::Arc;

use sage_engine::llm::factory::local_builder;
use sage_engine::{
    FakeLlmClient, HeuristicReasoner, LlmError, LlmFactory, LlmProvider, PromptRouter, Reasoner,
    ResponseParser, SymbolicReasoner,
};
use sage_shared::{Problem, ReasoningRecord};

const ROWS: &str = r#"[
  {
    "topic": "Classic Riddles",
    "problem_statement": "You are in a race and you overtake the second person. What position are you in now?",
    "answer_option_1": "First",
    "answer_option_2": "Second",
    "answer_option_3": "Third",
    "answer_option_4": "Fourth",
    "answer_option_5": "Another answer"
  },
  {
    "topic": "history",
    "problem_statement": "Which year came first?",
    "answer_option_1": "1066",
    "answer_option_2": "1492",
    "answer_option_3": "1815",
    "answer_option_4": "1914",
    "answer_option_5": null
  },
  {
    "topic": "sequence solving",
    "problem_statement": "A sequence of numbers: 1, 5, 12, 22, 35, ?",
    "answer_option_1": "42",
    "answer_option_2": "49",
    "answer_option_4": "56",
    "answer_option_5": "Another answer"
  }
]"#;

fn reasoner(hosted: &Arc<FakeLlmClient>) -> Reasoner {
    let factory = LlmFactory::new(
        Ok(Box::new(Arc::clone(hosted)) as Box<dyn LlmProvider>),
        local_builder(|| Err(LlmError::NotAvailable)),
    );
    let heuristic = HeuristicReasoner::new(factory, PromptRouter::new(), ResponseParser::new(0.85));
    Reasoner::new(SymbolicReasoner::new(), Some(heuristic))
}

fn run(hosted: &Arc<FakeLlmClient>) -> Vec<ReasoningRecord> {
    let problems: Vec<Problem> = serde_json::from_str(ROWS).unwrap();
    let reasoner = reasoner(hosted);
    problems.iter().map(|p| reasoner.reason(p, None)).collect()
}

#[test]
fn test_pipeline_records() {
    let hosted = Arc::new(FakeLlmClient::new(vec![
        Ok("<scratchpad>Overtaking second makes me second.</scratchpad><answer>2</answer>".to_string()),
        Ok("<scratchpad>1066 is earliest.</scratchpad><answer>1</answer>".to_string()),
    ]));
    let records = run(&hosted);
    assert_eq!(records.len(), 3);

    // Riddle: both paths agree
    assert_eq!(records[0].topic.as_deref(), Some("classic riddles"));
    assert_eq!(records[0].symbolic_answer, Some(2));
    assert_eq!(records[0].symbolic_confidence, Some(1.0));
    assert_eq!(records[0].heuristic_answer, Some(2));
    assert_eq!(
        records[0].heuristic_solution.as_deref(),
        Some("Overtaking second makes me second.")
    );

    // No solver for the topic: heuristic only, base prompt
    assert_eq!(records[1].symbolic_answer, None);
    assert_eq!(records[1].heuristic_answer, Some(1));
    let prompts = hosted.prompts();
    assert!(prompts[1].contains("5: Another answer"));
    assert!(prompts[1].contains("You reason carefully"));

    // Option 3 missing: both paths decline, the model is not called
    assert!(records[2].is_empty());
    assert_eq!(hosted.call_count(), 2);
}

#[test]
fn test_records_serialize_with_nulls() {
    let hosted = Arc::new(FakeLlmClient::always("no digits at all"));
    let records = run(&hosted);

    let json = serde_json::to_value(&records[1]).unwrap();
    assert_eq!(json["topic"], "history");
    assert!(json["symbolic_answer"].is_null());
    assert!(json["heuristic_answer"].is_null());
    assert!(json["heuristic_solution"].is_null());

    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["symbolic_answer"], 2);
    assert!(json["heuristic_confidence"].is_null());
}

#[test]
fn test_topic_override() {
    let hosted = Arc::new(FakeLlmClient::always("<answer>3</answer>"));
    let reasoner = reasoner(&hosted);
    let problem = Problem::new(
        "A sequence of numbers: 1, 5, 12, 22, 35, ?",
        ["42", "49", "51", "56", "Another answer"],
    )
    .with_topic("classic riddles");

    let record = reasoner.reason(&problem, Some("Sequence Solving"));
    assert_eq!(record.topic.as_deref(), Some("sequence solving"));
    assert_eq!(record.symbolic_answer, Some(3));
    assert!(hosted.prompts()[0].contains("mathematician"));
}
