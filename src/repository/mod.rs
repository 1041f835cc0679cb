// ==========================================
// School Infrastructure Compliance DSS - Repository Layer
// ==========================================
// Responsibility: data access only, no business rules
// Constraint: every query is parameterised
// ==========================================

pub mod budget_repo;
pub mod district_repo;
pub mod error;
pub mod forecast_repo;
pub mod infrastructure_repo;
pub mod priority_repo;
pub mod proposal_repo;
pub mod school_repo;
pub mod teacher_metric_repo;
pub mod trend_repo;
pub mod yearly_metric_repo;

// Core re-exports
pub use budget_repo::BudgetSimulationRepository;
pub use district_repo::DistrictScorecardRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use forecast_repo::EnrolmentForecastRepository;
pub use infrastructure_repo::InfrastructureRepository;
pub use priority_repo::PriorityIndexRepository;
pub use proposal_repo::ProposalRepository;
pub use school_repo::SchoolRepository;
pub use teacher_metric_repo::TeacherMetricRepository;
pub use trend_repo::RiskTrendRepository;
pub use yearly_metric_repo::YearlyMetricRepository;
