// ==========================================
// School Infrastructure Compliance DSS - Budget Simulation API
// ==========================================
// Non-destructive allocation dry run: same algorithm as the committed
// budget stage, arbitrary parameters, nothing written back.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::budget::BudgetConfig;
use crate::engine::budget::{BudgetAllocationEngine, ShortfallRow};
use crate::engine::repositories::PipelineRepositories;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

// ==========================================
// Response DTOs
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct SimulationParams {
    pub academic_year: String,
    pub classroom_budget: i64,
    pub cost_per_classroom: i64,
    pub max_classrooms: i64,
    pub teacher_posts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub total_schools: i64,
    pub funded: i64,
    pub partially_funded: i64,
    pub unfunded: i64,
    pub classrooms_allocated: i64,
    pub teachers_allocated: i64,
    pub total_cost: i64,
    pub budget_utilisation_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistrictAllocation {
    pub district: String,
    pub classrooms: i64,
    pub teachers: i64,
    pub cost: i64,
    pub schools_served: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSimulationReport {
    pub params: SimulationParams,
    pub summary: SimulationSummary,
    pub by_district: Vec<DistrictAllocation>,
}

// ==========================================
// BudgetApi
// ==========================================
pub struct BudgetApi {
    repos: Arc<PipelineRepositories>,
    engine: BudgetAllocationEngine,
}

impl BudgetApi {
    pub fn new(repos: Arc<PipelineRepositories>) -> Self {
        Self {
            repos,
            engine: BudgetAllocationEngine::new(),
        }
    }

    /// Run the allocation algorithm against arbitrary parameters
    /// without committing anything.
    pub fn simulate(
        &self,
        academic_year: Option<&str>,
        config: &BudgetConfig,
    ) -> ApiResult<BudgetSimulationReport> {
        if config.cost_per_classroom <= 0 {
            return Err(ApiError::InvalidInput(
                "cost_per_classroom must be positive".to_string(),
            ));
        }

        let year = match academic_year {
            Some(y) => y.to_string(),
            None => self
                .repos
                .infrastructure
                .latest_year()?
                .ok_or_else(|| ApiError::NoData("no infrastructure facts loaded".to_string()))?,
        };

        let rows = self.shortfall_rows(&year)?;
        let total_schools = rows.len() as i64;
        let allocations = self.engine.allocate_year(rows, config);

        let mut summary = SimulationSummary {
            total_schools,
            funded: 0,
            partially_funded: 0,
            unfunded: 0,
            classrooms_allocated: 0,
            teachers_allocated: 0,
            total_cost: 0,
            budget_utilisation_pct: 0.0,
        };
        let mut district_alloc: BTreeMap<String, DistrictAllocation> = BTreeMap::new();
        let districts: std::collections::HashMap<String, String> = self
            .repos
            .schools
            .find_all()?
            .into_iter()
            .map(|s| (s.school_id, s.district))
            .collect();

        for alloc in &allocations {
            summary.classrooms_allocated += alloc.classrooms_allocated;
            summary.teachers_allocated += alloc.teachers_allocated;
            let cost = alloc.classrooms_allocated * config.cost_per_classroom;
            summary.total_cost += cost;

            if alloc.classrooms_allocated > 0 || alloc.teachers_allocated > 0 {
                if alloc.classroom_resolved && alloc.teacher_resolved {
                    summary.funded += 1;
                } else {
                    summary.partially_funded += 1;
                }
            } else {
                summary.unfunded += 1;
            }

            let district = districts
                .get(&alloc.school_id)
                .cloned()
                .unwrap_or_else(|| "UNKNOWN".to_string());
            let entry = district_alloc
                .entry(district.clone())
                .or_insert_with(|| DistrictAllocation {
                    district,
                    classrooms: 0,
                    teachers: 0,
                    cost: 0,
                    schools_served: 0,
                });
            entry.classrooms += alloc.classrooms_allocated;
            entry.teachers += alloc.teachers_allocated;
            entry.cost += cost;
            if alloc.classrooms_allocated > 0 || alloc.teachers_allocated > 0 {
                entry.schools_served += 1;
            }
        }

        if config.classroom_budget > 0 {
            summary.budget_utilisation_pct = (summary.total_cost as f64
                / config.classroom_budget as f64
                * 1000.0)
                .round()
                / 10.0;
        }

        let mut by_district: Vec<DistrictAllocation> = district_alloc.into_values().collect();
        by_district.sort_by(|a, b| b.classrooms.cmp(&a.classrooms).then(a.district.cmp(&b.district)));
        by_district.truncate(15);

        Ok(BudgetSimulationReport {
            params: SimulationParams {
                academic_year: year,
                classroom_budget: config.classroom_budget,
                cost_per_classroom: config.cost_per_classroom,
                max_classrooms: config.max_classrooms(),
                teacher_posts: config.teacher_posts,
            },
            summary,
            by_district,
        })
    }

    /// Same input assembly as the committed budget stage: risk-scored
    /// rows with left-joined teacher gaps.
    fn shortfall_rows(&self, academic_year: &str) -> ApiResult<Vec<ShortfallRow>> {
        let records = self.repos.infrastructure.find_by_year(academic_year)?;
        let teachers = self.repos.teachers.find_by_year(academic_year)?;
        let teacher_gap_by_school: std::collections::HashMap<String, i64> = teachers
            .into_iter()
            .map(|t| (t.school_id.clone(), t.teacher_gap.unwrap_or(0)))
            .collect();

        let mut rows = Vec::new();
        for record in records {
            let (score, level) = match (record.risk_score, record.risk_level) {
                (Some(s), Some(l)) => (s, l),
                _ => continue,
            };
            rows.push(ShortfallRow {
                school_id: record.school_id.clone(),
                academic_year: academic_year.to_string(),
                risk_level: level,
                risk_score: score,
                classroom_gap: record.classroom_gap.unwrap_or(0),
                teacher_gap: teacher_gap_by_school.get(&record.school_id).copied().unwrap_or(0),
            });
        }

        if rows.is_empty() {
            return Err(ApiError::NoData(format!(
                "no risk-scored rows for {} — run the pipeline first",
                academic_year
            )));
        }
        Ok(rows)
    }
}
