//! Extracts an option number and rationale from raw model output.
//!
//! The option is found by the first strategy that yields a digit in 1..=5:
//! the first digit after `<answer>`, then an "answer is N" style phrase,
//! then the last digit anywhere in the text.

use std::sync::LazyLock;

use regex::Regex;
use sage_shared::ParsedAnswer;
use tracing::{debug, error, info, warn};

pub const ANSWER_MARKER: &str = "<answer>";

/// Rationale used when the scratchpad markers are missing
pub const NO_REASONING: &str = "[No reasoning provided by LLM]";

/// Default heuristic-path confidence
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

static SCRATCHPAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<scratchpad>(.*?)</scratchpad>").unwrap());
static ANSWER_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:option|answer is|correct answer is:?)\s*(\d)").unwrap()
});
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

/// Option slot for a single digit, if it is in 1..=5
fn slot(digit: &str) -> Option<u8> {
    digit.parse::<u8>().ok().filter(|n| (1..=5).contains(n))
}

pub struct ResponseParser {
    confidence: f64,
}

impl ResponseParser {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Parse raw model text, or `None` when no strategy finds an option
    pub fn parse(&self, raw: &str) -> Option<ParsedAnswer> {
        let solution = solution(raw);
        match answer_index(raw) {
            Some(answer) => {
                info!("LLM response parsed successfully. Found option: {}", answer);
                Some(ParsedAnswer {
                    answer,
                    solution,
                    confidence: self.confidence,
                })
            }
            None => {
                error!("Failed to parse a valid option number from LLM response: '{}'", raw);
                None
            }
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE)
    }
}

/// Trimmed scratchpad contents, or the placeholder
pub fn solution(raw: &str) -> String {
    match SCRATCHPAD.captures(raw) {
        Some(caps) => caps[1].trim().to_string(),
        None => {
            warn!("Could not find <scratchpad> tags in LLM response");
            NO_REASONING.to_string()
        }
    }
}

pub fn answer_index(raw: &str) -> Option<u8> {
    from_marker(raw)
        .or_else(|| from_phrase(raw))
        .or_else(|| from_last_digit(raw))
}

fn from_marker(raw: &str) -> Option<u8> {
    let start = raw.find(ANSWER_MARKER)? + ANSWER_MARKER.len();
    let found = DIGIT.find(&raw[start..]).and_then(|m| slot(m.as_str()));
    debug!("Answer marker strategy: {:?}", found);
    found
}

fn from_phrase(raw: &str) -> Option<u8> {
    ANSWER_PHRASE.captures(raw).and_then(|caps| slot(&caps[1]))
}

fn from_last_digit(raw: &str) -> Option<u8> {
    DIGIT.find_iter(raw).last().and_then(|m| slot(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_and_scratchpad() {
        let raw = "<scratchpad>\n  Second place is taken.\n</scratchpad>\n<answer>\n2\n</answer>";
        let parsed = ResponseParser::default().parse(raw).unwrap();
        assert_eq!(parsed.answer, 2);
        assert_eq!(parsed.solution, "Second place is taken.");
        assert!((parsed.confidence - DEFAULT_CONFIDENCE).abs() < 1e-12);
    }

    #[test]
    fn test_marker_wins_over_phrase() {
        assert_eq!(answer_index("option 1 looks wrong. <answer>4</answer>"), Some(4));
    }

    #[test]
    fn test_out_of_range_marker_falls_through() {
        // 7 after the marker is rejected; the phrase strategy finds 3
        assert_eq!(answer_index("The answer is 3. <answer>7</answer>"), Some(3));
    }

    #[test]
    fn test_phrase_strategy() {
        assert_eq!(answer_index("the correct answer is: 2"), Some(2));
        assert_eq!(answer_index("I pick OPTION 5 here, not 1"), Some(5));
    }

    #[test]
    fn test_last_digit_strategy() {
        assert_eq!(answer_index("after thinking it over: 4"), Some(4));
        assert_eq!(answer_index("12 apples then 9"), None);
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(ResponseParser::default().parse("I have no idea."), None);
    }

    #[test]
    fn test_missing_scratchpad_placeholder() {
        let parsed = ResponseParser::new(0.6).parse("4").unwrap();
        assert_eq!(parsed.solution, NO_REASONING);
        assert_eq!(parsed.answer, 4);
        assert!((parsed.confidence - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_multiline_scratchpad() {
        let raw = "<scratchpad>line one\nline two</scratchpad> answer is 1";
        assert_eq!(solution(raw), "line one\nline two");
    }
}
