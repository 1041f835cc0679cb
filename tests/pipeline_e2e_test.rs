// ==========================================
// Full pipeline end-to-end tests
// ==========================================
// Target: the ordered nine-stage run over a multi-year dataset
// Coverage: every derived table populated, cross-table invariants,
//           full-run idempotency, dashboard reads
// ==========================================

mod common;

use common::*;
use school_infra_dss::api::DashboardApi;
use school_infra_dss::domain::types::PriorityBucket;
use std::sync::Arc;

const YEARS: [&str; 3] = ["2021-22", "2022-23", "2023-24"];

/// A small mixed dataset: two districts, schools ranging from healthy
/// to fully deficient, one school with a missing teacher row.
fn seed_dataset(db_path: &str) {
    let repos = repositories(db_path);

    let profiles: [(&str, &str, i64, i64, i64); 5] = [
        // (school, district, category, usable rooms, teachers)
        ("S_OK", "EAST", 1, 30, 30),
        ("S_MID", "EAST", 2, 20, 22),
        ("S_BAD", "EAST", 1, 5, 4),
        ("S_WORST", "WEST", 8, 0, 0),
        ("S_GROW", "WEST", 4, 12, 12),
    ];

    for (school, district, category, rooms, teachers) in profiles {
        seed_school(&repos, school, district, category);
        for (i, year) in YEARS.iter().enumerate() {
            // S_GROW grows 20% a year; everyone else stays flat
            let enrolment = if school == "S_GROW" {
                (500.0 * 1.2f64.powi(i as i32)).round() as i64
            } else {
                900
            };
            seed_facts(&repos, school, year, enrolment, rooms, teachers);
        }
    }

    // a school-year without a teacher counterpart
    seed_school(&repos, "S_NO_TEACH", "WEST", 1);
    for year in YEARS {
        seed_facts_without_teachers(&repos, "S_NO_TEACH", year, 600, 10);
    }
}

#[test]
fn test_full_run_populates_every_derived_table() {
    let (_dir, db_path) = setup_db();
    seed_dataset(&db_path);

    let orch = orchestrator(&db_path);
    let result = orch.run_full().unwrap();
    assert!(!result.run_id.is_empty());
    assert!(result.total_rows() > 0);

    let repos = repositories(&db_path);

    // stage 1-3 columns on the latest year
    let infra = repos.infrastructure.find_by_year("2023-24").unwrap();
    assert_eq!(infra.len(), 6);
    for record in &infra {
        assert!(record.required_class_rooms.is_some(), "{}", record.school_id);
        let score = record.risk_score.expect("risk score");
        assert!((0.0..=1.0).contains(&score));
        assert!(record.classroom_gap.unwrap() >= 0);
    }

    // stage 4: one priority row per scored school-year, buckets total
    let priorities = repos.priorities.find_by_year_ranked("2023-24").unwrap();
    assert_eq!(priorities.len(), 6);
    let bucketed = priorities
        .iter()
        .filter(|p| {
            matches!(
                p.priority_bucket,
                PriorityBucket::Top5
                    | PriorityBucket::Top10
                    | PriorityBucket::Top20
                    | PriorityBucket::Standard
            )
        })
        .count();
    assert_eq!(bucketed, 6);

    // stage 5: a trend row for every scored school-year
    assert_eq!(repos.trends.count().unwrap(), 18);

    // stage 6: scorecards for both districts, ranks assigned
    let cards = repos.districts.find_by_year_ranked("2023-24").unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.district_rank.is_some()));

    // stage 7: allocation rows under the caps
    let (classrooms, teachers) = repos.budgets.allocation_totals("2023-24").unwrap();
    assert!(classrooms <= 1000); // default budget: 1000 classrooms
    assert!(teachers <= 10_000);

    // stage 8: three horizons per school observed in the base year
    assert_eq!(repos.forecasts.count().unwrap(), 18);
}

#[test]
fn test_full_run_is_idempotent() {
    let (_dir, db_path) = setup_db();
    seed_dataset(&db_path);

    let orch = orchestrator(&db_path);
    orch.run_full().unwrap();

    let repos = repositories(&db_path);
    let infra_first = repos.infrastructure.find_all_ordered().unwrap();
    let priorities_first = repos.priorities.find_by_year_ranked("2023-24").unwrap();
    let budget_first = repos
        .budgets
        .find_by_year_in_priority_order("2023-24")
        .unwrap();

    orch.run_full().unwrap();

    let infra_second = repos.infrastructure.find_all_ordered().unwrap();
    for (a, b) in infra_first.iter().zip(infra_second.iter()) {
        assert_eq!(a.risk_score, b.risk_score);
        assert_eq!(a.risk_level, b.risk_level);
        assert_eq!(a.classroom_gap, b.classroom_gap);
    }

    let priorities_second = repos.priorities.find_by_year_ranked("2023-24").unwrap();
    for (a, b) in priorities_first.iter().zip(priorities_second.iter()) {
        assert_eq!(a.school_id, b.school_id);
        assert_eq!(a.state_rank, b.state_rank);
        assert_eq!(a.persistent_high_risk_flag, b.persistent_high_risk_flag);
    }

    let budget_second = repos
        .budgets
        .find_by_year_in_priority_order("2023-24")
        .unwrap();
    for (a, b) in budget_first.iter().zip(budget_second.iter()) {
        assert_eq!(a.allocation_priority, b.allocation_priority);
        assert_eq!(a.classrooms_allocated, b.classrooms_allocated);
    }
}

#[test]
fn test_growth_school_carries_growth_signal() {
    let (_dir, db_path) = setup_db();
    seed_dataset(&db_path);

    let orch = orchestrator(&db_path);
    orch.run_full().unwrap();

    let repos = repositories(&db_path);
    let grow = repos
        .infrastructure
        .find_by_key("S_GROW", "2023-24")
        .unwrap()
        .unwrap();
    assert!((grow.enrolment_growth_rate.unwrap() - 0.2).abs() < 0.01);

    // its forecast keeps growing
    let forecasts = repos.forecasts.find_by_school("S_GROW").unwrap();
    assert!(forecasts[2].projected_enrolment > forecasts[0].projected_enrolment);
    assert!(forecasts[0].projected_enrolment > forecasts[0].base_enrolment);
}

#[test]
fn test_dashboard_reads_after_full_run() {
    let (_dir, db_path) = setup_db();
    seed_dataset(&db_path);

    let orch = orchestrator(&db_path);
    orch.run_full().unwrap();

    let api = DashboardApi::new(Arc::new(repositories(&db_path)));

    let overview = api.state_overview(None).unwrap();
    assert_eq!(overview.academic_year, "2023-24");
    assert_eq!(overview.total_schools, 6);
    assert!(overview.total_classroom_gap > 0);

    let school = api.school_overview("S_BAD").unwrap();
    let latest = school.latest.expect("latest snapshot");
    assert_eq!(latest.academic_year, "2023-24");
    assert!(latest.risk_score.unwrap() > 0.0);
    assert!(school.priority.is_some());
    assert!(school.trend.is_some());

    let history = api.school_history("S_MID").unwrap();
    assert_eq!(history.len(), 3);

    let forecast = api.school_forecast("S_OK").unwrap();
    assert_eq!(forecast.len(), 3);
}
