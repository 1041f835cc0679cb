// ==========================================
// School Infrastructure Compliance DSS - Pipeline Repository Bundle
// ==========================================
// One shared SQLite connection behind every repository the pipeline
// touches, so a run sees a single consistent database.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::repository::{
    BudgetSimulationRepository, DistrictScorecardRepository, EnrolmentForecastRepository,
    InfrastructureRepository, PriorityIndexRepository, ProposalRepository, RepositoryResult,
    RiskTrendRepository, SchoolRepository, TeacherMetricRepository, YearlyMetricRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// PipelineRepositories
// ==========================================
pub struct PipelineRepositories {
    pub schools: SchoolRepository,
    pub yearly: YearlyMetricRepository,
    pub infrastructure: InfrastructureRepository,
    pub teachers: TeacherMetricRepository,
    pub trends: RiskTrendRepository,
    pub priorities: PriorityIndexRepository,
    pub districts: DistrictScorecardRepository,
    pub budgets: BudgetSimulationRepository,
    pub forecasts: EnrolmentForecastRepository,
    pub proposals: ProposalRepository,
}

impl PipelineRepositories {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = Arc::new(Mutex::new(open_sqlite_connection(db_path)?));
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            schools: SchoolRepository::from_connection(conn.clone()),
            yearly: YearlyMetricRepository::from_connection(conn.clone()),
            infrastructure: InfrastructureRepository::from_connection(conn.clone()),
            teachers: TeacherMetricRepository::from_connection(conn.clone()),
            trends: RiskTrendRepository::from_connection(conn.clone()),
            priorities: PriorityIndexRepository::from_connection(conn.clone()),
            districts: DistrictScorecardRepository::from_connection(conn.clone()),
            budgets: BudgetSimulationRepository::from_connection(conn.clone()),
            forecasts: EnrolmentForecastRepository::from_connection(conn.clone()),
            proposals: ProposalRepository::from_connection(conn),
        }
    }
}
