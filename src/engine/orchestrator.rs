// ==========================================
// School Infrastructure Compliance DSS - Pipeline Orchestrator
// ==========================================
// Drives the stages in their fixed dependency order:
//   1. classroom gap      2. teacher adequacy   3. risk scoring
//   4. prioritisation     5. risk trend         6. district scorecards
//   7. budget allocation  8. forecasting
// Each stage runs for every fact year before the next stage starts,
// because downstream stages read the complete output of their
// predecessors (persistent flags and trends span all years).
//
// Stage 9 (proposal validation) is not part of the batch run: verdicts
// are stamped per submission through the proposal API and never
// recomputed retroactively.
// ==========================================

use crate::domain::budget::BudgetConfig;
use crate::domain::types::RiskLevel;
use crate::engine::budget::{BudgetAllocationEngine, ShortfallRow};
use crate::engine::classroom_gap::ClassroomGapEngine;
use crate::engine::district::DistrictComplianceEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::forecast::ForecastEngine;
use crate::engine::prioritisation::PrioritisationEngine;
use crate::engine::repositories::PipelineRepositories;
use crate::engine::risk::RiskEngine;
use crate::engine::risk_trend::RiskTrendEngine;
use crate::engine::teacher_adequacy::TeacherAdequacyEngine;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// PipelineRunResult
// ==========================================

#[derive(Debug, Clone)]
pub struct StageSummary {
    pub stage: &'static str,
    pub academic_year: String,
    pub rows_written: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    pub run_id: String,
    pub stages: Vec<StageSummary>,
}

impl PipelineRunResult {
    pub fn total_rows(&self) -> usize {
        self.stages.iter().map(|s| s.rows_written).sum()
    }
}

// ==========================================
// PipelineOrchestrator
// ==========================================
pub struct PipelineOrchestrator {
    repos: PipelineRepositories,
    budget_config: BudgetConfig,
    gap_engine: ClassroomGapEngine,
    adequacy_engine: TeacherAdequacyEngine,
    risk_engine: RiskEngine,
    prioritisation_engine: PrioritisationEngine,
    trend_engine: RiskTrendEngine,
    district_engine: DistrictComplianceEngine,
    budget_engine: BudgetAllocationEngine,
    forecast_engine: ForecastEngine,
}

impl PipelineOrchestrator {
    pub fn new(repos: PipelineRepositories, budget_config: BudgetConfig) -> Self {
        Self {
            repos,
            budget_config,
            gap_engine: ClassroomGapEngine::new(),
            adequacy_engine: TeacherAdequacyEngine::new(),
            risk_engine: RiskEngine::new(),
            prioritisation_engine: PrioritisationEngine::new(),
            trend_engine: RiskTrendEngine::new(),
            district_engine: DistrictComplianceEngine::new(),
            budget_engine: BudgetAllocationEngine::new(),
            forecast_engine: ForecastEngine::new(),
        }
    }

    pub fn repositories(&self) -> &PipelineRepositories {
        &self.repos
    }

    pub fn budget_config(&self) -> &BudgetConfig {
        &self.budget_config
    }

    // ==========================================
    // Full run
    // ==========================================

    /// Run all eight batch stages for every year present in the fact
    /// tables. Idempotent: a second run reproduces the same rows.
    pub fn run_full(&self) -> EngineResult<PipelineRunResult> {
        let run_id = Uuid::new_v4().to_string();
        let years = self.repos.yearly.distinct_years()?;
        if years.is_empty() {
            return Err(EngineError::NoData(
                "no academic years present in yearly_metrics".to_string(),
            ));
        }

        info!(run_id = %run_id, years = years.len(), "pipeline run started");

        let mut stages = Vec::new();

        for year in &years {
            stages.push(self.run_classroom_gap(year)?);
        }
        for year in &years {
            stages.push(self.run_teacher_adequacy(year)?);
        }
        for year in &years {
            stages.push(self.run_risk(year)?);
        }

        let risk_years = self.risk_years_or_fail("prioritisation")?;
        for year in &risk_years {
            stages.push(self.run_prioritisation(year)?);
        }

        stages.push(self.run_risk_trend()?);
        stages.push(self.run_district_compliance()?);

        for year in &risk_years {
            stages.push(self.run_budget_allocation(year, &self.budget_config)?);
        }

        stages.push(self.run_forecast()?);

        let result = PipelineRunResult { run_id, stages };
        info!(
            run_id = %result.run_id,
            total_rows = result.total_rows(),
            "pipeline run finished"
        );
        Ok(result)
    }

    // ==========================================
    // Stage 1: classroom gap
    // ==========================================
    pub fn run_classroom_gap(&self, academic_year: &str) -> EngineResult<StageSummary> {
        debug!(year = academic_year, "classroom gap stage");

        let records = self.repos.infrastructure.find_by_year(academic_year)?;
        let enrolments = self.enrolments_for_year(academic_year)?;
        let categories = self.categories()?;

        let updates = self.gap_engine.compute_year(&records, &enrolments, &categories);
        let written = self.repos.infrastructure.update_gap_fields(academic_year, &updates)?;

        info!(year = academic_year, rows = written, "classroom gaps computed");
        Ok(StageSummary {
            stage: "classroom_gap",
            academic_year: academic_year.to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 2: teacher adequacy
    // ==========================================
    pub fn run_teacher_adequacy(&self, academic_year: &str) -> EngineResult<StageSummary> {
        debug!(year = academic_year, "teacher adequacy stage");

        let metrics = self.repos.teachers.find_by_year(academic_year)?;
        let enrolments = self.enrolments_for_year(academic_year)?;
        let categories = self.categories()?;

        let updates = self.adequacy_engine.compute_year(&metrics, &enrolments, &categories);
        let written = self.repos.teachers.update_gap_fields(academic_year, &updates)?;

        info!(year = academic_year, rows = written, "teacher gaps computed");
        Ok(StageSummary {
            stage: "teacher_adequacy",
            academic_year: academic_year.to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 3: composite risk
    // ==========================================
    pub fn run_risk(&self, academic_year: &str) -> EngineResult<StageSummary> {
        debug!(year = academic_year, "risk stage");

        let records = self.repos.infrastructure.find_by_year(academic_year)?;
        let teacher_metrics = self.teachers_for_year(academic_year)?;
        let enrolment_series = self.enrolment_series()?;

        let updates = self.risk_engine.compute_year(
            academic_year,
            &records,
            &teacher_metrics,
            &enrolment_series,
        )?;
        let written = self.repos.infrastructure.update_risk_fields(academic_year, &updates)?;

        info!(year = academic_year, rows = written, "risk scores computed");
        Ok(StageSummary {
            stage: "risk",
            academic_year: academic_year.to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 4: prioritisation
    // ==========================================
    pub fn run_prioritisation(&self, academic_year: &str) -> EngineResult<StageSummary> {
        debug!(year = academic_year, "prioritisation stage");

        let records = self.repos.infrastructure.find_by_year(academic_year)?;
        let districts = self.districts()?;
        let level_history = self.level_history()?;

        let rows = self.prioritisation_engine.compute_year(
            academic_year,
            &records,
            &districts,
            &level_history,
        )?;
        let written = self.repos.priorities.replace_year(academic_year, &rows)?;

        info!(year = academic_year, rows = written, "priority index computed");
        Ok(StageSummary {
            stage: "prioritisation",
            academic_year: academic_year.to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 5: risk trend (full history in one pass)
    // ==========================================
    pub fn run_risk_trend(&self) -> EngineResult<StageSummary> {
        debug!("risk trend stage");

        let records = self.repos.infrastructure.find_all_ordered()?;
        let trends = self.trend_engine.compute_all(&records)?;
        let written = self.repos.trends.replace_all(&trends)?;

        info!(rows = written, "risk trends computed");
        Ok(StageSummary {
            stage: "risk_trend",
            academic_year: "*".to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 6: district compliance
    // ==========================================
    pub fn run_district_compliance(&self) -> EngineResult<StageSummary> {
        debug!("district compliance stage");

        let years = self.risk_years_or_fail("district_compliance")?;
        let districts = self.districts()?;

        let mut scorecards = Vec::new();
        for year in &years {
            let records = self.repos.infrastructure.find_by_year(year)?;
            let teacher_metrics = self.teachers_for_year(year)?;
            let enrolments = self.enrolments_for_year(year)?;
            let mut cards = self.district_engine.aggregate_year(
                year,
                &records,
                &teacher_metrics,
                &enrolments,
                &districts,
            )?;
            scorecards.append(&mut cards);
        }

        // rank + YoY need the fully populated set
        self.district_engine.finalize(&mut scorecards);
        let written = self.repos.districts.replace_all(&scorecards)?;

        info!(rows = written, "district scorecards computed");
        Ok(StageSummary {
            stage: "district_compliance",
            academic_year: "*".to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 7: budget allocation
    // ==========================================
    pub fn run_budget_allocation(
        &self,
        academic_year: &str,
        config: &BudgetConfig,
    ) -> EngineResult<StageSummary> {
        debug!(year = academic_year, "budget allocation stage");

        let rows = self.shortfall_rows(academic_year)?;
        let simulations = self.budget_engine.allocate_year(rows, config);
        let written = self.repos.budgets.replace_year(academic_year, &simulations)?;

        info!(
            year = academic_year,
            rows = written,
            max_classrooms = config.max_classrooms(),
            teacher_posts = config.teacher_posts,
            "budget allocation computed"
        );
        Ok(StageSummary {
            stage: "budget_allocation",
            academic_year: academic_year.to_string(),
            rows_written: written,
        })
    }

    // ==========================================
    // Stage 8: forecasting
    // ==========================================
    pub fn run_forecast(&self) -> EngineResult<StageSummary> {
        debug!("forecast stage");

        let base_year = self
            .repos
            .yearly
            .latest_year()?
            .ok_or_else(|| EngineError::NoData("no enrolment facts to forecast from".to_string()))?;

        let enrolment_series = self.enrolment_series()?;
        let categories = self.categories()?;

        let mut current_classrooms = HashMap::new();
        for record in self.repos.infrastructure.find_by_year(&base_year)? {
            current_classrooms
                .insert(record.school_id.clone(), record.usable_class_rooms.unwrap_or(0));
        }
        let mut current_teachers = HashMap::new();
        for metric in self.repos.teachers.find_by_year(&base_year)? {
            current_teachers.insert(metric.school_id.clone(), metric.total_teachers.unwrap_or(0));
        }

        let forecasts = self.forecast_engine.compute_from_latest(
            &base_year,
            &enrolment_series,
            &current_classrooms,
            &current_teachers,
            &categories,
        );
        let written = self.repos.forecasts.replace_all(&forecasts)?;

        info!(base_year = %base_year, rows = written, "forecasts computed");
        Ok(StageSummary {
            stage: "forecast",
            academic_year: base_year,
            rows_written: written,
        })
    }

    // ==========================================
    // Shared input assembly
    // ==========================================

    fn categories(&self) -> EngineResult<HashMap<String, i64>> {
        Ok(self
            .repos
            .schools
            .find_all()?
            .into_iter()
            .map(|s| (s.school_id, s.school_category))
            .collect())
    }

    fn districts(&self) -> EngineResult<HashMap<String, String>> {
        Ok(self
            .repos
            .schools
            .find_all()?
            .into_iter()
            .map(|s| (s.school_id, s.district))
            .collect())
    }

    fn enrolments_for_year(&self, academic_year: &str) -> EngineResult<HashMap<String, i64>> {
        Ok(self
            .repos
            .yearly
            .find_by_year(academic_year)?
            .into_iter()
            .map(|m| (m.school_id, m.total_enrolment))
            .collect())
    }

    fn teachers_for_year(
        &self,
        academic_year: &str,
    ) -> EngineResult<HashMap<String, crate::domain::metrics::TeacherMetric>> {
        Ok(self
            .repos
            .teachers
            .find_by_year(academic_year)?
            .into_iter()
            .map(|m| (m.school_id.clone(), m))
            .collect())
    }

    /// school_id -> chronological (year, enrolment) series.
    fn enrolment_series(&self) -> EngineResult<HashMap<String, Vec<(String, i64)>>> {
        let mut series: HashMap<String, Vec<(String, i64)>> = HashMap::new();
        for m in self.repos.yearly.find_all_ordered()? {
            series
                .entry(m.school_id)
                .or_default()
                .push((m.academic_year, m.total_enrolment));
        }
        Ok(series)
    }

    /// school_id -> chronological (year, risk_level) series.
    fn level_history(&self) -> EngineResult<HashMap<String, Vec<(String, RiskLevel)>>> {
        let mut history: HashMap<String, Vec<(String, RiskLevel)>> = HashMap::new();
        for record in self.repos.infrastructure.find_all_ordered()? {
            if let Some(level) = record.risk_level {
                history
                    .entry(record.school_id)
                    .or_default()
                    .push((record.academic_year, level));
            }
        }
        Ok(history)
    }

    /// Shortfall rows for one year (left-join: a missing teacher row is
    /// a zero teacher gap). Fails fast if the year has rows but no risk
    /// scores yet.
    pub fn shortfall_rows(&self, academic_year: &str) -> EngineResult<Vec<ShortfallRow>> {
        let records = self.repos.infrastructure.find_by_year(academic_year)?;
        let teacher_metrics = self.teachers_for_year(academic_year)?;

        let mut rows = Vec::new();
        for record in &records {
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
                teacher_gap: teacher_metrics
                    .get(&record.school_id)
                    .and_then(|t| t.teacher_gap)
                    .unwrap_or(0),
            });
        }

        if rows.is_empty() && !records.is_empty() {
            return Err(EngineError::StageOrderingViolation {
                stage: "budget_allocation",
                academic_year: academic_year.to_string(),
                missing: "risk_score (run the risk stage first)",
            });
        }
        Ok(rows)
    }

    fn risk_years_or_fail(&self, stage: &'static str) -> EngineResult<Vec<String>> {
        let risk_years = self.repos.infrastructure.years_with_risk()?;
        if risk_years.is_empty() && !self.repos.infrastructure.distinct_years()?.is_empty() {
            return Err(EngineError::StageOrderingViolation {
                stage,
                academic_year: "*".to_string(),
                missing: "risk_score (run the risk stage first)",
            });
        }
        Ok(risk_years)
    }
}
