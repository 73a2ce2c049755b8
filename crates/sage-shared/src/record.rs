//! Per-problem run record.

use serde::{Deserialize, Serialize};

use crate::problem::{ParsedAnswer, SolverResult};

/// Both reasoning paths' outputs for one problem, side by side.
///
/// A path that produced nothing is serialised as explicit `null`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningRecord {
    pub topic: Option<String>,
    pub symbolic_answer: Option<u8>,
    pub symbolic_confidence: Option<f64>,
    pub heuristic_answer: Option<u8>,
    pub heuristic_confidence: Option<f64>,
    pub heuristic_solution: Option<String>,
}

impl ReasoningRecord {
    pub fn from_results(
        topic: Option<&str>,
        symbolic: Option<SolverResult>,
        heuristic: Option<ParsedAnswer>,
    ) -> Self {
        let (heuristic_answer, heuristic_confidence, heuristic_solution) = match heuristic {
            Some(parsed) => (
                Some(parsed.answer),
                Some(parsed.confidence),
                Some(parsed.solution),
            ),
            None => (None, None, None),
        };
        Self {
            topic: topic.map(str::to_string),
            symbolic_answer: symbolic.map(|r| r.answer),
            symbolic_confidence: symbolic.map(|r| r.confidence),
            heuristic_answer,
            heuristic_confidence,
            heuristic_solution,
        }
    }

    /// True when neither path produced an answer
    pub fn is_empty(&self) -> bool {
        self.symbolic_answer.is_none() && self.heuristic_answer.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_explicit_nulls() {
        let record = ReasoningRecord::from_results(Some("classic riddles"), None, None);
        assert!(record.is_empty());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["symbolic_answer"].is_null());
        assert!(json["heuristic_solution"].is_null());
        assert_eq!(json["topic"], "classic riddles");
    }

    #[test]
    fn test_record_from_both_paths() {
        let parsed = ParsedAnswer {
            answer: 3,
            solution: "because".to_string(),
            confidence: 0.85,
        };
        let record = ReasoningRecord::from_results(
            None,
            Some(SolverResult::new(2, 1.0)),
            Some(parsed),
        );
        assert_eq!(record.symbolic_answer, Some(2));
        assert_eq!(record.heuristic_answer, Some(3));
        assert_eq!(record.heuristic_solution.as_deref(), Some("because"));
        assert!(!record.is_empty());
    }
}
