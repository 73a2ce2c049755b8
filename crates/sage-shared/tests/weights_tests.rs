//! Weight optimizer and artifact tests

use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use sage_shared::{optimize_weights, PerformanceTable, SageError, WeightsArtifact};
use tempfile::tempdir;

fn sample_table() -> PerformanceTable {
    let mut perf = PerformanceTable::new();
    perf.insert(
        "spatial reasoning".to_string(),
        BTreeMap::from([
            ("symbolic".to_string(), 0.81),
            ("heuristic".to_string(), 0.37),
            ("analogy".to_string(), 0.12),
        ]),
    );
    perf.insert(
        "classic riddles".to_string(),
        BTreeMap::from([
            ("symbolic".to_string(), 1.0),
            ("heuristic".to_string(), 0.9),
        ]),
    );
    perf.insert(
        "lateral thinking".to_string(),
        BTreeMap::from([
            ("symbolic".to_string(), 0.0),
            ("heuristic".to_string(), 0.0),
            ("analogy".to_string(), 0.0),
            ("vote".to_string(), 0.0),
        ]),
    );
    perf
}

#[test]
fn test_every_topic_sums_to_one() {
    let weights = optimize_weights(&sample_table()).unwrap();
    assert_eq!(weights.len(), 3);
    for (topic, strategies) in weights.iter() {
        let sum: f64 = strategies.values().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
        assert!(!topic.is_empty());
    }
}

#[test]
fn test_zero_accuracy_topic_is_uniform() {
    let weights = optimize_weights(&sample_table()).unwrap();
    let row = weights.topic("lateral thinking").unwrap();
    assert_eq!(row.len(), 4);
    for weight in row.values() {
        assert_abs_diff_eq!(*weight, 0.25, epsilon = 1e-12);
    }
}

#[test]
fn test_empty_strategy_map_is_rejected() {
    let mut perf = sample_table();
    perf.insert("history".to_string(), BTreeMap::new());
    match optimize_weights(&perf) {
        Err(SageError::InvalidPerformance(msg)) => assert!(msg.contains("history")),
        other => panic!("expected InvalidPerformance, got {:?}", other),
    }
}

#[test]
fn test_out_of_range_accuracy_is_rejected() {
    // Two huge values would overflow the topic total to infinity
    let mut perf = PerformanceTable::new();
    perf.insert(
        "huge".to_string(),
        BTreeMap::from([("a".to_string(), 1e308), ("b".to_string(), 1e308)]),
    );
    assert!(matches!(
        optimize_weights(&perf),
        Err(SageError::InvalidPerformance(_))
    ));
}

#[test]
fn test_boundary_accuracies_are_accepted() {
    let mut perf = PerformanceTable::new();
    perf.insert(
        "edge".to_string(),
        BTreeMap::from([("a".to_string(), 1.0), ("b".to_string(), 0.0)]),
    );
    let weights = optimize_weights(&perf).unwrap();
    assert_abs_diff_eq!(weights.get("edge", "a").unwrap(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(weights.get("edge", "b").unwrap(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_weights_preserve_topic_keys() {
    let mut perf = sample_table();
    perf.insert(
        "Operation of Mechanisms".to_string(),
        BTreeMap::from([("symbolic".to_string(), 0.5)]),
    );
    let weights = optimize_weights(&perf).unwrap();
    assert!(weights.topics().any(|t| t == "Operation of Mechanisms"));
    assert_abs_diff_eq!(
        weights.get("Operation of Mechanisms", "symbolic").unwrap(),
        1.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_artifact_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meta").join("weights.json");

    let weights = optimize_weights(&sample_table()).unwrap();
    let artifact = WeightsArtifact::new(weights.clone());
    artifact.save(&path).unwrap();

    let loaded = WeightsArtifact::load(&path).unwrap();
    assert_eq!(loaded.weights, weights);
    assert_eq!(loaded.generated_at, artifact.generated_at);
}

#[test]
fn test_artifact_load_missing_file() {
    let dir = tempdir().unwrap();
    assert!(WeightsArtifact::load(&dir.path().join("absent.json")).is_err());
}
