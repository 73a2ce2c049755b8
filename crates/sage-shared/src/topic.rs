//! Topic labels.
//!
//! Labels arrive from an upstream classifier with inconsistent casing and
//! stray whitespace. They are normalised once, here, before any lookup.

pub const SPATIAL_REASONING: &str = "spatial reasoning";
pub const OPTIMIZATION: &str = "optimization of actions and planning";
pub const MECHANISMS: &str = "operation of mechanisms";
pub const CLASSIC_RIDDLES: &str = "classic riddles";
pub const SEQUENCE_SOLVING: &str = "sequence solving";
pub const LATERAL_THINKING: &str = "lateral thinking";
pub const LOGICAL_TRAPS: &str = "logical traps";

/// Key of the default prompt template
pub const BASE_TEMPLATE_KEY: &str = "base";

/// Every topic that has a symbolic solver, in registration order
pub const KNOWN_TOPICS: [&str; 7] = [
    SPATIAL_REASONING,
    OPTIMIZATION,
    MECHANISMS,
    CLASSIC_RIDDLES,
    SEQUENCE_SOLVING,
    LATERAL_THINKING,
    LOGICAL_TRAPS,
];

/// Trim and lower-case a topic label.
pub fn normalize_topic(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_topic() {
        assert_eq!(normalize_topic("  Classic Riddles \n"), CLASSIC_RIDDLES);
        assert_eq!(normalize_topic("LOGICAL TRAPS"), LOGICAL_TRAPS);
    }

    #[test]
    fn test_known_topics_are_normalized() {
        // Registration keys must survive normalisation unchanged
        for topic in KNOWN_TOPICS {
            assert_eq!(normalize_topic(topic), topic);
        }
    }
}
