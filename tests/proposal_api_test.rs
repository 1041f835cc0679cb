// ==========================================
// Proposal API integration tests
// ==========================================
// Target: submission + stage-9 validation at write time
// Coverage: decision tree branches, 1.2 boundary, write-once verdicts
// ==========================================

mod common;

use common::*;
use school_infra_dss::api::ProposalApi;
use school_infra_dss::domain::proposal::ProposalRequest;
use school_infra_dss::domain::types::{DecisionStatus, ReasonCode};
use std::sync::Arc;

fn request(school_id: &str, classrooms: i64, teachers: i64) -> ProposalRequest {
    ProposalRequest {
        school_id: school_id.to_string(),
        academic_year: "2023-24".to_string(),
        classrooms_requested: classrooms,
        teachers_requested: teachers,
        justification: Some("enrolment pressure".to_string()),
        submitted_by: Some("HM".to_string()),
    }
}

/// One school with classroom gap 5 and teacher gap 10.
fn seed_and_compute(db_path: &str) {
    let repos = repositories(db_path);
    seed_school(&repos, "S1", "EAST", 1);
    seed_facts(&repos, "S1", "2023-24", 900, 25, 20);

    let orch = orchestrator(db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    orch.run_teacher_adequacy("2023-24").unwrap();
}

#[test]
fn test_within_tolerance_accepted() {
    let (_dir, db_path) = setup_db();
    seed_and_compute(&db_path);

    let api = ProposalApi::new(Arc::new(repositories(&db_path)));
    let response = api.submit(&request("S1", 5, 10)).unwrap();

    assert_eq!(response.decision_status, DecisionStatus::Accepted);
    assert_eq!(response.reason_code, ReasonCode::WithinTolerance);
    assert_eq!(response.confidence_score, 1.0);
    assert_eq!(response.actual_classroom_gap, 5);
    assert_eq!(response.actual_teacher_gap, 10);
}

#[test]
fn test_ratio_exactly_12_is_flagged() {
    let (_dir, db_path) = setup_db();
    seed_and_compute(&db_path);

    // 6 classrooms against a gap of 5: ratio exactly 1.2
    let api = ProposalApi::new(Arc::new(repositories(&db_path)));
    let response = api.submit(&request("S1", 6, 10)).unwrap();

    assert_eq!(response.decision_status, DecisionStatus::Flagged);
    assert_eq!(response.reason_code, ReasonCode::ClassroomModerateOver);
    assert_eq!(response.classroom_ratio, Some(1.2));
}

#[test]
fn test_severe_over_request_rejected() {
    let (_dir, db_path) = setup_db();
    seed_and_compute(&db_path);

    // 8 against a gap of 5: ratio 1.6 > 1.5
    let api = ProposalApi::new(Arc::new(repositories(&db_path)));
    let response = api.submit(&request("S1", 8, 10)).unwrap();

    assert_eq!(response.decision_status, DecisionStatus::Rejected);
    assert_eq!(response.reason_code, ReasonCode::ClassroomOverRequest);
}

#[test]
fn test_under_request_flagged() {
    let (_dir, db_path) = setup_db();
    seed_and_compute(&db_path);

    // 2 against a gap of 5: ratio 0.4 < 0.5
    let api = ProposalApi::new(Arc::new(repositories(&db_path)));
    let response = api.submit(&request("S1", 2, 10)).unwrap();

    assert_eq!(response.decision_status, DecisionStatus::Flagged);
    assert_eq!(response.reason_code, ReasonCode::ClassroomUnderRequest);
}

#[test]
fn test_no_deficit_request_rejected() {
    let (_dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    // fully adequate school
    seed_school(&repos, "S_OK", "EAST", 1);
    seed_facts(&repos, "S_OK", "2023-24", 900, 30, 30);
    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    orch.run_teacher_adequacy("2023-24").unwrap();

    let api = ProposalApi::new(Arc::new(repositories(&db_path)));
    let response = api.submit(&request("S_OK", 3, 0)).unwrap();

    assert_eq!(response.decision_status, DecisionStatus::Rejected);
    assert_eq!(response.reason_code, ReasonCode::NoDeficit);
    // the ratio against a zero gap is the infinity sentinel
    assert!(response.classroom_ratio.is_none());
}

#[test]
fn test_unknown_school_rejected_as_not_found() {
    let (_dir, db_path) = setup_db();
    seed_and_compute(&db_path);

    let api = ProposalApi::new(Arc::new(repositories(&db_path)));
    let response = api.submit(&request("S_MISSING", 2, 2)).unwrap();

    assert_eq!(response.decision_status, DecisionStatus::Rejected);
    assert_eq!(response.reason_code, ReasonCode::SchoolNotFound);
    assert_eq!(response.confidence_score, 0.0);
}

#[test]
fn test_verdict_is_not_recomputed_when_gaps_change() {
    let (_dir, db_path) = setup_db();
    seed_and_compute(&db_path);

    let repos = Arc::new(repositories(&db_path));
    let api = ProposalApi::new(repos.clone());
    let response = api.submit(&request("S1", 5, 10)).unwrap();
    assert_eq!(response.decision_status, DecisionStatus::Accepted);

    // the school builds 20 rooms and the pipeline re-runs: gap drops to 0
    seed_facts(&repos, "S1", "2023-24", 900, 45, 45);
    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    orch.run_teacher_adequacy("2023-24").unwrap();

    // the stored verdict still reflects submission time
    let stored = api.list_for_school("S1").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].decision_status, DecisionStatus::Accepted);
    assert_eq!(stored[0].reason_code, ReasonCode::WithinTolerance);
    assert_eq!(stored[0].actual_classroom_gap, 5);
}
