// ==========================================
// School Infrastructure Compliance DSS - Dashboard API
// ==========================================
// Read-only query surface over the derived tables: state overview,
// district scorecards, block panels, per-school cards and series.
// Architecture: API layer -> repositories; no recomputation here.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::district::DistrictScorecard;
use crate::domain::forecast::EnrolmentForecast;
use crate::domain::metrics::InfrastructureRecord;
use crate::domain::priority::PriorityIndex;
use crate::domain::school::School;
use crate::domain::trend::RiskTrend;
use crate::domain::types::RiskLevel;
use crate::engine::repositories::PipelineRepositories;
use serde::Serialize;
use std::sync::Arc;

// ==========================================
// Response DTOs
// ==========================================

/// State-wide KPI block for one year.
#[derive(Debug, Clone, Serialize)]
pub struct StateOverview {
    pub academic_year: String,
    pub total_schools: i64,
    pub critical_count: i64,
    pub high_count: i64,
    pub moderate_count: i64,
    pub low_count: i64,
    pub avg_risk_score: f64,
    pub total_classroom_gap: i64,
    pub total_teacher_gap: i64,
}

/// One row of a school's history series.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolYearSnapshot {
    pub academic_year: String,
    pub total_enrolment: Option<i64>,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub classroom_gap: Option<i64>,
    pub teacher_gap: Option<i64>,
    pub total_teachers: Option<i64>,
    pub usable_class_rooms: Option<i64>,
}

/// Risk card + gap analysis for a school's latest year.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolOverview {
    pub school: School,
    pub latest: Option<SchoolYearSnapshot>,
    pub trend: Option<RiskTrend>,
    pub priority: Option<PriorityIndex>,
}

/// Block-level KPI block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    pub academic_year: String,
    pub district: String,
    pub block: String,
    pub total_schools: i64,
    pub critical_count: i64,
    pub high_count: i64,
    pub avg_risk_score: f64,
    pub total_classroom_gap: i64,
    pub total_teacher_gap: i64,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    repos: Arc<PipelineRepositories>,
}

impl DashboardApi {
    pub fn new(repos: Arc<PipelineRepositories>) -> Self {
        Self { repos }
    }

    /// Latest fact year, the default for every year-scoped panel.
    pub fn latest_year(&self) -> ApiResult<String> {
        self.repos
            .infrastructure
            .latest_year()?
            .ok_or_else(|| ApiError::NoData("no infrastructure facts loaded".to_string()))
    }

    fn resolve_year(&self, academic_year: Option<&str>) -> ApiResult<String> {
        match academic_year {
            Some(y) => Ok(y.to_string()),
            None => self.latest_year(),
        }
    }

    // ==========================================
    // State-level panels
    // ==========================================

    pub fn state_overview(&self, academic_year: Option<&str>) -> ApiResult<StateOverview> {
        let year = self.resolve_year(academic_year)?;
        let records = self.repos.infrastructure.find_by_year(&year)?;
        let teachers = self.repos.teachers.find_by_year(&year)?;

        let mut overview = StateOverview {
            academic_year: year,
            total_schools: 0,
            critical_count: 0,
            high_count: 0,
            moderate_count: 0,
            low_count: 0,
            avg_risk_score: 0.0,
            total_classroom_gap: 0,
            total_teacher_gap: 0,
        };

        let mut risk_sum = 0.0;
        for record in &records {
            let score = match record.risk_score {
                Some(s) => s,
                None => continue,
            };
            overview.total_schools += 1;
            risk_sum += score;
            match record.risk_level {
                Some(RiskLevel::Critical) => overview.critical_count += 1,
                Some(RiskLevel::High) => overview.high_count += 1,
                Some(RiskLevel::Moderate) => overview.moderate_count += 1,
                _ => overview.low_count += 1,
            }
            overview.total_classroom_gap += record.classroom_gap.unwrap_or(0);
        }
        for teacher in &teachers {
            overview.total_teacher_gap += teacher.teacher_gap.unwrap_or(0);
        }
        if overview.total_schools > 0 {
            overview.avg_risk_score =
                (risk_sum / overview.total_schools as f64 * 10_000.0).round() / 10_000.0;
        }

        Ok(overview)
    }

    /// District scorecards for one year, riskiest first.
    pub fn district_scorecards(
        &self,
        academic_year: Option<&str>,
    ) -> ApiResult<Vec<DistrictScorecard>> {
        let year = self.resolve_year(academic_year)?;
        Ok(self.repos.districts.find_by_year_ranked(&year)?)
    }

    /// One district's scorecard series across years.
    pub fn district_history(&self, district: &str) -> ApiResult<Vec<DistrictScorecard>> {
        if district.trim().is_empty() {
            return Err(ApiError::InvalidInput("district must not be empty".to_string()));
        }
        Ok(self.repos.districts.find_by_district(district)?)
    }

    // ==========================================
    // Block-level panels
    // ==========================================

    pub fn block_summary(
        &self,
        district: &str,
        block: &str,
        academic_year: Option<&str>,
    ) -> ApiResult<BlockSummary> {
        let year = self.resolve_year(academic_year)?;
        let block_schools = self.block_schools(district, block)?;

        let mut summary = BlockSummary {
            academic_year: year.clone(),
            district: district.to_string(),
            block: block.to_string(),
            total_schools: 0,
            critical_count: 0,
            high_count: 0,
            avg_risk_score: 0.0,
            total_classroom_gap: 0,
            total_teacher_gap: 0,
        };

        let mut risk_sum = 0.0;
        for school in &block_schools {
            let record = match self.repos.infrastructure.find_by_key(&school.school_id, &year)? {
                Some(r) => r,
                None => continue,
            };
            let score = match record.risk_score {
                Some(s) => s,
                None => continue,
            };
            summary.total_schools += 1;
            risk_sum += score;
            match record.risk_level {
                Some(RiskLevel::Critical) => summary.critical_count += 1,
                Some(RiskLevel::High) => summary.high_count += 1,
                _ => {}
            }
            summary.total_classroom_gap += record.classroom_gap.unwrap_or(0);
            if let Some(t) = self.repos.teachers.find_by_key(&school.school_id, &year)? {
                summary.total_teacher_gap += t.teacher_gap.unwrap_or(0);
            }
        }
        if summary.total_schools > 0 {
            summary.avg_risk_score =
                (risk_sum / summary.total_schools as f64 * 10_000.0).round() / 10_000.0;
        }

        Ok(summary)
    }

    /// Chronic and volatile schools for a year (block/district panel).
    pub fn chronic_and_volatile(
        &self,
        academic_year: Option<&str>,
    ) -> ApiResult<(Vec<RiskTrend>, Vec<RiskTrend>)> {
        let year = self.resolve_year(academic_year)?;
        let chronic = self.repos.trends.find_chronic_by_year(&year)?;
        let volatile = self.repos.trends.find_volatile_by_year(&year)?;
        Ok((chronic, volatile))
    }

    // ==========================================
    // School-level panels
    // ==========================================

    /// Risk card, gap analysis, trend and ranking for the latest year.
    pub fn school_overview(&self, school_id: &str) -> ApiResult<SchoolOverview> {
        let school = self
            .repos
            .schools
            .find_by_id(school_id)?
            .ok_or_else(|| ApiError::NotFound(format!("school {}", school_id)))?;

        let history = self.school_history(school_id)?;
        let latest = history.into_iter().last();

        let (trend, priority) = match &latest {
            Some(snapshot) => (
                self.repos.trends.find_by_key(school_id, &snapshot.academic_year)?,
                self.repos.priorities.find_by_key(school_id, &snapshot.academic_year)?,
            ),
            None => (None, None),
        };

        Ok(SchoolOverview {
            school,
            latest,
            trend,
            priority,
        })
    }

    /// Enrolment and risk history for trend charts, oldest first.
    pub fn school_history(&self, school_id: &str) -> ApiResult<Vec<SchoolYearSnapshot>> {
        let records = self.repos.infrastructure.find_by_school(school_id)?;
        let mut snapshots = Vec::with_capacity(records.len());

        for record in records {
            let enrolment = self
                .repos
                .yearly
                .find_by_key(school_id, &record.academic_year)?
                .map(|m| m.total_enrolment);
            let teacher = self.repos.teachers.find_by_key(school_id, &record.academic_year)?;

            snapshots.push(SchoolYearSnapshot {
                academic_year: record.academic_year.clone(),
                total_enrolment: enrolment,
                risk_score: record.risk_score,
                risk_level: record.risk_level,
                classroom_gap: record.classroom_gap,
                teacher_gap: teacher.as_ref().and_then(|t| t.teacher_gap),
                total_teachers: teacher.as_ref().and_then(|t| t.total_teachers),
                usable_class_rooms: record.usable_class_rooms,
            });
        }

        Ok(snapshots)
    }

    /// Forecast rows (T+1..T+3) for one school.
    pub fn school_forecast(&self, school_id: &str) -> ApiResult<Vec<EnrolmentForecast>> {
        Ok(self.repos.forecasts.find_by_school(school_id)?)
    }

    /// Latest facility checklist row for one school.
    pub fn school_facilities(&self, school_id: &str) -> ApiResult<Option<InfrastructureRecord>> {
        let records = self.repos.infrastructure.find_by_school(school_id)?;
        Ok(records.into_iter().last())
    }

    pub fn search_schools(&self, query: &str, limit: i64) -> ApiResult<Vec<School>> {
        if query.trim().is_empty() {
            return Err(ApiError::InvalidInput("search query must not be empty".to_string()));
        }
        Ok(self.repos.schools.search(query.trim(), limit.max(1))?)
    }

    fn block_schools(&self, district: &str, block: &str) -> ApiResult<Vec<School>> {
        let schools = self.repos.schools.find_by_district(district)?;
        Ok(schools
            .into_iter()
            .filter(|s| s.block.as_deref().unwrap_or("UNKNOWN") == block)
            .collect())
    }
}
