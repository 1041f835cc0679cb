// ==========================================
// School Infrastructure Compliance DSS - Demo Database Seeder
// ==========================================
// Builds a small synthetic multi-year dataset, runs the full pipeline
// against it, and prints headline numbers. Deterministic: the same
// invocation always produces the same database.
//
// Usage: seed_demo_db <db_path> [schools_per_district]
// ==========================================

use anyhow::{Context, Result};
use school_infra_dss::db;
use school_infra_dss::domain::budget::BudgetConfig;
use school_infra_dss::domain::metrics::{InfrastructureRecord, TeacherMetric, YearlyMetric};
use school_infra_dss::domain::school::School;
use school_infra_dss::engine::{PipelineOrchestrator, PipelineRepositories};

const DISTRICTS: [&str; 4] = ["ANANTAPUR", "CHITTOOR", "GUNTUR", "KRISHNA"];
const YEARS: [&str; 5] = ["2019-20", "2020-21", "2021-22", "2022-23", "2023-24"];

/// Small deterministic generator (xorshift); no external randomness so
/// re-seeding reproduces the database byte for byte.
struct DemoRng(u64);

impl DemoRng {
    fn next(&mut self, bound: u64) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x % bound
    }
}

fn main() -> Result<()> {
    school_infra_dss::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let db_path = args.get(1).cloned().unwrap_or_else(|| "demo.db".to_string());
    let per_district: usize = args
        .get(2)
        .map(|s| s.parse())
        .transpose()
        .context("schools_per_district must be a number")?
        .unwrap_or(50);

    let conn = db::open_sqlite_connection(&db_path)?;
    db::bootstrap_schema(&conn)?;
    drop(conn);

    let repos = PipelineRepositories::new(&db_path)?;
    seed_facts(&repos, per_district)?;

    let orchestrator = PipelineOrchestrator::new(repos, BudgetConfig::default());
    let result = orchestrator.run_full()?;

    tracing::info!(
        run_id = %result.run_id,
        stages = result.stages.len(),
        rows = result.total_rows(),
        db = %db_path,
        "demo database ready"
    );
    Ok(())
}

fn seed_facts(repos: &PipelineRepositories, per_district: usize) -> Result<()> {
    let mut rng = DemoRng(0x5EED_CAFE);

    let mut schools = Vec::new();
    let mut yearly = Vec::new();
    let mut infrastructure = Vec::new();
    let mut teachers = Vec::new();

    for (d, district) in DISTRICTS.iter().enumerate() {
        for i in 0..per_district {
            let school_id = format!("AP{:02}{:05}", d + 1, i + 1);
            let category = [1, 2, 3, 4, 5, 6, 7, 8, 10, 11][rng.next(10) as usize];
            schools.push(School {
                school_id: school_id.clone(),
                school_name: format!("{} ZP School {}", district, i + 1),
                district: district.to_string(),
                block: Some(format!("BLOCK-{}", i % 5 + 1)),
                school_category: category,
                management_type: Some("Local Body".to_string()),
            });

            // enrolment follows a per-school base with mild drift
            let base = 120 + rng.next(900) as i64;
            let mut enrolment = base;
            for year in YEARS {
                let drift = rng.next(21) as i64 - 10; // -10..=10 percent
                enrolment = (enrolment + enrolment * drift / 100).max(20);

                yearly.push(YearlyMetric {
                    school_id: school_id.clone(),
                    academic_year: year.to_string(),
                    total_enrolment: enrolment,
                });

                let rooms_needed = enrolment / 32;
                let usable = (rooms_needed - rng.next(6) as i64 + 2).max(1);
                let mut infra = InfrastructureRecord::from_facts(
                    &school_id,
                    year,
                    Some(usable + rng.next(3) as i64),
                    Some(usable),
                );
                infra.classroom_condition_score = Some(2.0 + rng.next(30) as f64 / 10.0);
                infra.drinking_water_available = Some(rng.next(10) > 1);
                infra.electricity_available = Some(rng.next(10) > 0);
                infra.internet_available = Some(rng.next(10) > 6);
                infra.separate_girls_toilet = Some(rng.next(10) > 2);
                infra.ramp_available = Some(rng.next(10) > 4);
                infra.building_condition = Some("GOOD".to_string());
                infrastructure.push(infra);

                let staff_needed = enrolment / 31;
                let staffed = (staff_needed - rng.next(5) as i64 + 1).max(1);
                teachers.push(TeacherMetric::from_facts(&school_id, year, Some(staffed)));
            }
        }
    }

    repos.schools.batch_upsert(&schools)?;
    repos.yearly.batch_upsert(&yearly)?;
    repos.infrastructure.batch_upsert_facts(&infrastructure)?;
    repos.teachers.batch_upsert_facts(&teachers)?;

    tracing::info!(
        schools = schools.len(),
        school_years = yearly.len(),
        "synthetic facts seeded"
    );
    Ok(())
}
