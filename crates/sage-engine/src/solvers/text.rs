//! Number extraction helpers for rule trigger text.

use std::sync::LazyLock;

use regex::Regex;

static SIGNED_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+").unwrap());
static UNSIGNED_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// "A to B ... 12": an edge between single-letter nodes and its length
pub static LETTER_EDGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z])\b\s*(?:to|and|-|–)\s*\b([A-Z])\b\D{0,20}?(\d+(?:\.\d+)?)").unwrap()
});

const NUMBER_WORDS: [(&str, u64); 12] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
];

/// Every integer token, negatives included. Tokens that overflow are skipped.
pub fn signed_integers(text: &str) -> Vec<i64> {
    SIGNED_INT
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

pub fn unsigned_integers(text: &str) -> Vec<u64> {
    UNSIGNED_INT
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

pub fn decimals(text: &str) -> Vec<f64> {
    DECIMAL
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Parse "4" or "four"
pub fn parse_count(token: &str) -> Option<u64> {
    let token = token.trim().to_lowercase();
    token.parse().ok().or_else(|| {
        NUMBER_WORDS
            .iter()
            .find(|(word, _)| *word == token)
            .map(|(_, n)| *n)
    })
}

/// Alternation matching digits or a number word, for building regexes
pub const COUNT_PATTERN: &str =
    r"(\d+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

/// First number within a small window around `context`
pub fn number_near(text: &str, context: &str) -> Option<u64> {
    let pos = text.find(context)?;
    let start = floor_char_boundary(text, pos.saturating_sub(20));
    let end = floor_char_boundary(text, (pos + context.len() + 20).min(text.len()));
    let window = &text[start..end];
    UNSIGNED_INT
        .find_iter(window)
        .filter_map(|m| m.as_str().parse().ok())
        .next()
        .or_else(|| {
            window
                .split(|c: char| !c.is_alphanumeric())
                .find_map(parse_count)
        })
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_integers() {
        assert_eq!(signed_integers("3, -1, -5, and 10"), vec![3, -1, -5, 10]);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("Four"), Some(4));
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("many"), None);
    }

    #[test]
    fn test_number_near() {
        assert_eq!(number_near("a point equidistant from 3 corners", "corner"), Some(3));
        assert_eq!(number_near("equidistant from three corners", "corner"), Some(3));
        assert_eq!(number_near("no digits here at all", "corner"), None);
    }
}
