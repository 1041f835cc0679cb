// ==========================================
// Shared test fixtures
// ==========================================
// Builders for a temporary database with a small multi-year dataset.
// Each test opens its own tempfile-backed SQLite database.
// ==========================================

#![allow(dead_code)]

use school_infra_dss::db;
use school_infra_dss::domain::budget::BudgetConfig;
use school_infra_dss::domain::metrics::{InfrastructureRecord, TeacherMetric, YearlyMetric};
use school_infra_dss::domain::school::School;
use school_infra_dss::engine::{PipelineOrchestrator, PipelineRepositories};
use tempfile::TempDir;

/// Temporary database with the schema bootstrapped. The TempDir must
/// stay alive for the duration of the test.
pub fn setup_db() -> (TempDir, String) {
    let dir = TempDir::new().expect("create temp dir");
    let db_path = dir
        .path()
        .join("dss_test.db")
        .to_string_lossy()
        .into_owned();

    let conn = db::open_sqlite_connection(&db_path).expect("open db");
    db::bootstrap_schema(&conn).expect("bootstrap schema");

    (dir, db_path)
}

pub fn repositories(db_path: &str) -> PipelineRepositories {
    PipelineRepositories::new(db_path).expect("open repositories")
}

pub fn orchestrator(db_path: &str) -> PipelineOrchestrator {
    PipelineOrchestrator::new(repositories(db_path), BudgetConfig::default())
}

pub fn orchestrator_with_budget(db_path: &str, config: BudgetConfig) -> PipelineOrchestrator {
    PipelineOrchestrator::new(repositories(db_path), config)
}

/// Reference row for one school.
pub fn seed_school(
    repos: &PipelineRepositories,
    school_id: &str,
    district: &str,
    category: i64,
) {
    seed_school_in_block(repos, school_id, district, "BLOCK-1", category);
}

pub fn seed_school_in_block(
    repos: &PipelineRepositories,
    school_id: &str,
    district: &str,
    block: &str,
    category: i64,
) {
    let school = School {
        school_id: school_id.to_string(),
        school_name: format!("Test School {}", school_id),
        district: district.to_string(),
        block: Some(block.to_string()),
        school_category: category,
        management_type: Some("Local Body".to_string()),
    };
    repos.schools.batch_upsert(&[school]).expect("seed school");
}

/// Fact rows for one school-year: enrolment + usable classrooms +
/// teacher headcount.
pub fn seed_facts(
    repos: &PipelineRepositories,
    school_id: &str,
    academic_year: &str,
    enrolment: i64,
    usable_rooms: i64,
    teachers: i64,
) {
    repos
        .yearly
        .batch_upsert(&[YearlyMetric {
            school_id: school_id.to_string(),
            academic_year: academic_year.to_string(),
            total_enrolment: enrolment,
        }])
        .expect("seed enrolment");

    let infra = InfrastructureRecord::from_facts(
        school_id,
        academic_year,
        Some(usable_rooms + 2),
        Some(usable_rooms),
    );
    repos
        .infrastructure
        .batch_upsert_facts(&[infra])
        .expect("seed infrastructure");

    repos
        .teachers
        .batch_upsert_facts(&[TeacherMetric::from_facts(
            school_id,
            academic_year,
            Some(teachers),
        )])
        .expect("seed teachers");
}

/// Fact rows without a teacher counterpart (left-join coverage).
pub fn seed_facts_without_teachers(
    repos: &PipelineRepositories,
    school_id: &str,
    academic_year: &str,
    enrolment: i64,
    usable_rooms: i64,
) {
    repos
        .yearly
        .batch_upsert(&[YearlyMetric {
            school_id: school_id.to_string(),
            academic_year: academic_year.to_string(),
            total_enrolment: enrolment,
        }])
        .expect("seed enrolment");

    let infra = InfrastructureRecord::from_facts(
        school_id,
        academic_year,
        Some(usable_rooms),
        Some(usable_rooms),
    );
    repos
        .infrastructure
        .batch_upsert_facts(&[infra])
        .expect("seed infrastructure");
}
