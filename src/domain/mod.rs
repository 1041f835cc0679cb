// ==========================================
// School Infrastructure Compliance DSS - Domain Layer
// ==========================================
// Responsibility: entities, classification types, row-level helpers
// Rule: no data access logic, no engine logic
// ==========================================

pub mod budget;
pub mod district;
pub mod forecast;
pub mod metrics;
pub mod priority;
pub mod proposal;
pub mod school;
pub mod trend;
pub mod types;

// Core re-exports
pub use budget::{BudgetConfig, BudgetSimulation};
pub use district::DistrictScorecard;
pub use forecast::EnrolmentForecast;
pub use metrics::{InfrastructureRecord, TeacherMetric, YearlyMetric};
pub use priority::PriorityIndex;
pub use proposal::{DemandProposal, ProposalRequest};
pub use school::School;
pub use trend::RiskTrend;
pub use types::{
    ComplianceGrade, DecisionStatus, PriorityBucket, ReasonCode, RiskLevel, TrendDirection,
};
