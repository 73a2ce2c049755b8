//! Binds a solver's candidate answer to one of the five option slots.
//!
//! Strategies run in order and the first one that binds wins:
//! exact text, then substring containment either way, then equality of the
//! sets of digit runs. Each strategy scans slots 1..=5 before the next one
//! is tried. Absent or blank options are skipped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use sage_shared::{Problem, ESCAPE_HATCH_SLOT};
use tracing::debug;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Candidate phrases that mean "none of the concrete options"
const IMPOSSIBILITY_MARKERS: [&str; 5] = ["impossible", "no solution", "nowhere", "cannot", "trap"];

fn digit_runs(text: &str) -> BTreeSet<&str> {
    DIGIT_RUN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Lower-cased, trimmed, non-blank options with their slot numbers
fn normalized_options(problem: &Problem) -> Vec<(u8, String)> {
    problem
        .present_options()
        .map(|(slot, text)| (slot, text.trim().to_lowercase()))
        .filter(|(_, text)| !text.is_empty())
        .collect()
}

/// Map a candidate answer to a slot, or `None` when nothing binds.
pub fn match_option(candidate: &str, problem: &Problem) -> Option<u8> {
    let candidate = candidate.trim().to_lowercase();
    if candidate.is_empty() {
        return None;
    }
    let options = normalized_options(problem);

    if let Some((slot, _)) = options.iter().find(|(_, text)| *text == candidate) {
        debug!("Exact match '{}' -> option {}", candidate, slot);
        return Some(*slot);
    }

    if let Some((slot, _)) = options
        .iter()
        .find(|(_, text)| text.contains(candidate.as_str()) || candidate.contains(text.as_str()))
    {
        debug!("Substring match '{}' -> option {}", candidate, slot);
        return Some(*slot);
    }

    let wanted = digit_runs(&candidate);
    if wanted.is_empty() {
        return None;
    }
    let found = options
        .iter()
        .find(|(_, text)| digit_runs(text) == wanted)
        .map(|(slot, _)| *slot);
    if let Some(slot) = found {
        debug!("Numeric match '{}' -> option {}", candidate, slot);
    }
    found
}

/// Two-number variant for candidates phrased "X and Y".
///
/// Binds only an option that contains both tokens. A candidate without
/// exactly one " and " separator falls back to [`match_option`].
pub fn match_pair(candidate: &str, problem: &Problem) -> Option<u8> {
    let parts: Vec<&str> = candidate.split(" and ").map(str::trim).collect();
    let [first, second] = parts.as_slice() else {
        return match_option(candidate, problem);
    };
    if first.is_empty() || second.is_empty() {
        return None;
    }
    let first = first.to_lowercase();
    let second = second.to_lowercase();

    normalized_options(problem)
        .into_iter()
        .find(|(_, text)| text.contains(&first) && text.contains(&second))
        .map(|(slot, text)| {
            debug!("Pair match '{}' -> option {} ({})", candidate, slot, text);
            slot
        })
}

/// Like [`match_option`], but candidates declaring impossibility bind to the
/// escape-hatch slot when no option text matched.
pub fn match_with_escape_hatch(candidate: &str, problem: &Problem) -> Option<u8> {
    match_option(candidate, problem).or_else(|| {
        let lower = candidate.to_lowercase();
        IMPOSSIBILITY_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
            .then_some(ESCAPE_HATCH_SLOT)
    })
}
