//! End-to-end lookups through the public API.

use codefix::{
    Calibration, Engine, Gate, HashingEmbedder, KnowledgeBase, LoadOptions, MatchPolicy,
    NewRecord, NoMatchReason, RecordId, Solution, Verdict, default_solutions,
};

fn solution(title: &str) -> Solution {
    Solution {
        title: title.into(),
        solution: format!("apply {title}"),
        code_example: "// code".into(),
        source: "handbook".into(),
        ..Default::default()
    }
}

fn two_axis_engine(policy: MatchPolicy) -> Engine {
    let kb = KnowledgeBase::load(
        vec![
            NewRecord::new(vec![1.0, 0.0], solution("x-axis")),
            NewRecord::new(vec![0.0, 1.0], solution("y-axis")),
        ],
        LoadOptions::default(),
    )
    .expect("load");
    Engine::new(kb, policy).expect("engine")
}

#[test]
fn close_query_surfaces_the_solution() {
    let engine = two_axis_engine(MatchPolicy::default());
    let verdict = engine.find_solution(&[0.9, 0.1]);

    let hit = verdict.solution().expect("accepted");
    assert_eq!(hit.id, RecordId(0));
    assert_eq!(hit.solution.title, "x-axis");
    assert!((hit.similarity - 0.99388).abs() < 1e-4);
    assert!((hit.confidence - 0.99290).abs() < 1e-4);

    let json = serde_json::to_value(verdict).unwrap();
    assert_eq!(json["status"], "solution");
    assert_eq!(json["id"], 0);
    assert_eq!(json["solution"]["source"], "handbook");
}

#[test]
fn orthogonal_query_is_not_answered() {
    let engine = two_axis_engine(MatchPolicy::default());
    let verdict = engine.find_solution(&[0.0, 0.0]);

    match verdict {
        Verdict::NoSolution {
            reason,
            best_candidate,
            confidence,
        } => {
            assert_eq!(reason, NoMatchReason::BelowThreshold);
            assert_eq!(best_candidate, Some(RecordId(0)));
            let c = confidence.expect("scored");
            assert!((c - 0.0066929).abs() < 1e-5);
        }
        other => panic!("expected no solution, got {other:?}"),
    }

    let json = serde_json::to_value(verdict).unwrap();
    assert_eq!(json["status"], "no_solution");
    assert_eq!(json["reason"], "below_threshold");
    assert!(json.get("solution").is_none());
}

#[test]
fn empty_store_answers_every_query_with_no_solution() {
    let kb = KnowledgeBase::load(Vec::new(), LoadOptions::allow_empty()).expect("opt-in");
    let engine = Engine::new(kb, MatchPolicy::default()).expect("engine");

    for query in [vec![1.0], vec![0.3, 0.4, 0.5], vec![]] {
        match engine.find_solution(&query) {
            Verdict::NoSolution { reason, .. } => {
                assert_eq!(reason, NoMatchReason::EmptyKnowledgeBase)
            }
            other => panic!("expected no solution, got {other:?}"),
        }
    }
    let status = engine.status();
    assert!(!status.ready);
    assert_eq!(status.records, 0);
}

#[test]
fn threshold_change_flips_the_verdict_without_reload() {
    let engine = two_axis_engine(MatchPolicy::default());
    // cos([0.6, 0.8], y-axis) = 0.8, confidence ~0.9526 under the defaults.
    let query = [0.6, 0.8];
    assert_eq!(
        engine.find_solution(&query).solution().map(|hit| hit.id),
        Some(RecordId(1))
    );

    engine
        .set_policy(MatchPolicy {
            calibration: Calibration::default(),
            gate: Gate::new(0.99),
        })
        .unwrap();
    assert!(!engine.find_solution(&query).is_solution());

    engine
        .set_policy(MatchPolicy {
            calibration: Calibration::new(0.9, 10.0),
            gate: Gate::new(0.2),
        })
        .unwrap();
    // Shifted midpoint: confidence(0.8) = 1 / (1 + e^1) ~ 0.269.
    let hit = engine.find_solution(&query);
    let hit = hit.solution().expect("accepted at 0.2");
    assert!((hit.confidence - 0.26894).abs() < 1e-4);
    assert_eq!(engine.knowledge().len(), 2);
}

#[test]
fn default_catalog_recognises_its_own_reports() {
    let embedder = HashingEmbedder::default();
    let docs = default_solutions();
    let kb = KnowledgeBase::build(docs.clone(), &embedder, LoadOptions::default())
        .expect("build");
    let engine = Engine::new(kb, MatchPolicy::default()).expect("engine");

    for (i, doc) in docs.iter().enumerate() {
        let verdict = engine.analyze(&doc.description, &embedder);
        let hit = verdict.solution().expect("self match is accepted");
        assert_eq!(hit.id, RecordId(i as u64));
        assert_eq!(hit.solution.title, doc.title);
        assert!(hit.confidence > 0.99);
    }
}

#[test]
fn unrelated_report_gets_no_solution() {
    let embedder = HashingEmbedder::default();
    let kb = KnowledgeBase::build(default_solutions(), &embedder, LoadOptions::default())
        .expect("build");
    let engine = Engine::new(kb, MatchPolicy::default()).expect("engine");

    let verdict = engine.analyze("Postgres vacuum stalls on a partitioned table", &embedder);
    assert!(!verdict.is_solution());

    let snap = engine.metrics();
    assert_eq!(snap.total_requests, 1);
    assert_eq!(snap.accepted_requests, 0);
    assert!(snap.avg_confidence < 0.5);
}

#[test]
fn metrics_reflect_mixed_traffic() {
    let engine = two_axis_engine(MatchPolicy::default());
    engine.find_solution(&[1.0, 0.0]);
    engine.find_solution(&[0.0, 1.0]);
    engine.find_solution(&[0.0, 0.0]);
    engine.find_solution(&[1.0, 2.0, 3.0]);

    let snap = engine.metrics();
    assert_eq!(snap.total_requests, 4);
    assert_eq!(snap.accepted_requests, 2);
    assert_eq!(snap.degraded_requests, 1);
    assert!(snap.avg_latency >= 0.0);
    let expected = (2.0 * 0.9933071 + 0.0066929) / 4.0;
    assert!((snap.avg_confidence - expected).abs() < 1e-5);
}
