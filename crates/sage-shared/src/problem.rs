//! Problem rows and the results produced for them.
//!
//! A problem is one multiple-choice row: a statement plus five answer slots.
//! Slot 5 is conventionally "another answer" and may be absent.

use serde::{Deserialize, Serialize};

use crate::error::SageError;

/// Number of answer slots every problem offers
pub const OPTION_COUNT: usize = 5;

/// Slot a solver abstains toward when it cannot bind an answer
pub const ESCAPE_HATCH_SLOT: u8 = 5;

/// Field names as they appear in problem rows
const OPTION_FIELDS: [&str; OPTION_COUNT] = [
    "answer_option_1",
    "answer_option_2",
    "answer_option_3",
    "answer_option_4",
    "answer_option_5",
];

/// One multiple-choice problem row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub problem_statement: Option<String>,
    #[serde(default)]
    pub answer_option_1: Option<String>,
    #[serde(default)]
    pub answer_option_2: Option<String>,
    #[serde(default)]
    pub answer_option_3: Option<String>,
    #[serde(default)]
    pub answer_option_4: Option<String>,
    /// Nullable: usually the "another answer" sentinel
    #[serde(default)]
    pub answer_option_5: Option<String>,
    /// Upstream-supplied topic label, if the row carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Problem {
    /// Create a complete problem from a statement and five option texts
    pub fn new(statement: impl Into<String>, options: [&str; OPTION_COUNT]) -> Self {
        Self {
            problem_statement: Some(statement.into()),
            answer_option_1: Some(options[0].to_string()),
            answer_option_2: Some(options[1].to_string()),
            answer_option_3: Some(options[2].to_string()),
            answer_option_4: Some(options[3].to_string()),
            answer_option_5: Some(options[4].to_string()),
            topic: None,
        }
    }

    /// Attach a topic label
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Replace (or clear) the text of one slot. Out-of-range slots are ignored.
    pub fn with_option(mut self, slot: u8, text: Option<&str>) -> Self {
        let text = text.map(str::to_string);
        match slot {
            1 => self.answer_option_1 = text,
            2 => self.answer_option_2 = text,
            3 => self.answer_option_3 = text,
            4 => self.answer_option_4 = text,
            5 => self.answer_option_5 = text,
            _ => {}
        }
        self
    }

    pub fn statement(&self) -> Option<&str> {
        self.problem_statement.as_deref()
    }

    /// Text of a 1-based slot
    pub fn option(&self, slot: u8) -> Option<&str> {
        match slot {
            1 => self.answer_option_1.as_deref(),
            2 => self.answer_option_2.as_deref(),
            3 => self.answer_option_3.as_deref(),
            4 => self.answer_option_4.as_deref(),
            5 => self.answer_option_5.as_deref(),
            _ => None,
        }
    }

    /// All five slots in order
    pub fn options(&self) -> [Option<&str>; OPTION_COUNT] {
        [
            self.option(1),
            self.option(2),
            self.option(3),
            self.option(4),
            self.option(5),
        ]
    }

    /// Slot number paired with its text, skipping absent slots
    pub fn present_options(&self) -> impl Iterator<Item = (u8, &str)> + '_ {
        (1..=OPTION_COUNT as u8).filter_map(move |slot| self.option(slot).map(|text| (slot, text)))
    }

    /// Input-validity gate: statement and options 1-4 must be present.
    pub fn validate(&self) -> Result<(), SageError> {
        if self.problem_statement.is_none() {
            return Err(SageError::MissingField("problem_statement"));
        }
        for slot in 1..=4u8 {
            if self.option(slot).is_none() {
                return Err(SageError::MissingField(OPTION_FIELDS[usize::from(slot) - 1]));
            }
        }
        Ok(())
    }
}

/// Option index plus self-reported confidence from a solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// 1-based option slot
    pub answer: u8,
    /// In [0.0, 1.0]
    pub confidence: f64,
}

impl SolverResult {
    /// Slot is clamped into 1..=5 and confidence into [0, 1].
    pub fn new(answer: u8, confidence: f64) -> Self {
        Self {
            answer: answer.clamp(1, ESCAPE_HATCH_SLOT),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Abstain toward the escape-hatch slot
    pub fn abstain(confidence: f64) -> Self {
        Self::new(ESCAPE_HATCH_SLOT, confidence)
    }
}

/// A rule's candidate answer before it is bound to an option slot
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub answer: String,
    pub confidence: f64,
}

impl RuleOutcome {
    pub fn new(answer: impl Into<String>, confidence: f64) -> Self {
        Self {
            answer: answer.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Candidate at full confidence
    pub fn certain(answer: impl Into<String>) -> Self {
        Self::new(answer, 1.0)
    }
}

/// Structured result extracted from a language-model response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAnswer {
    /// 1-based option slot
    pub answer: u8,
    /// Model's rationale text
    pub solution: String,
    /// Fixed heuristic-path confidence, not derived from the text
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Problem {
        Problem::new("What comes next?", ["1", "2", "3", "4", "Another answer"])
    }

    #[test]
    fn test_validate_complete_problem() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_allows_missing_option_5() {
        let problem = sample().with_option(5, None);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_option() {
        let problem = sample().with_option(3, None);
        match problem.validate() {
            Err(SageError::MissingField(field)) => assert_eq!(field, "answer_option_3"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_validate_reports_missing_statement() {
        let mut problem = sample();
        problem.problem_statement = None;
        assert!(matches!(
            problem.validate(),
            Err(SageError::MissingField("problem_statement"))
        ));
    }

    #[test]
    fn test_option_out_of_range() {
        let problem = sample();
        assert_eq!(problem.option(0), None);
        assert_eq!(problem.option(6), None);
        assert_eq!(problem.option(5), Some("Another answer"));
    }

    #[test]
    fn test_solver_result_clamps() {
        let r = SolverResult::new(9, 1.7);
        assert_eq!(r.answer, 5);
        assert_eq!(r.confidence, 1.0);
        let r = SolverResult::new(0, -0.2);
        assert_eq!(r.answer, 1);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn test_deserialize_row_with_null_option_5() {
        let json = r#"{
            "problem_statement": "Riddle",
            "answer_option_1": "a",
            "answer_option_2": "b",
            "answer_option_3": "c",
            "answer_option_4": "d",
            "answer_option_5": null,
            "topic": "Classic riddles"
        }"#;
        let problem: Problem = serde_json::from_str(json).unwrap();
        assert_eq!(problem.option(5), None);
        assert_eq!(problem.topic.as_deref(), Some("Classic riddles"));
        assert!(problem.validate().is_ok());
    }
}
