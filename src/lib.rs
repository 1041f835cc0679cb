// ==========================================
// School Infrastructure Compliance DSS - Core Library
// ==========================================
// Stack: Rust + SQLite
// Positioning: decision support system (derived-metrics pipeline)
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - pipeline business rules
pub mod engine;

// Importer layer - external fact data
pub mod importer;

// Database infrastructure (connection init / PRAGMA / schema bootstrap)
pub mod db;

// Logging
pub mod logging;

// API layer - read-only query surface
pub mod api;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::types::{
    ComplianceGrade, DecisionStatus, PriorityBucket, ReasonCode, RiskLevel, TrendDirection,
};

// Domain entities
pub use domain::{
    BudgetConfig, BudgetSimulation, DemandProposal, DistrictScorecard, EnrolmentForecast,
    InfrastructureRecord, PriorityIndex, ProposalRequest, RiskTrend, School, TeacherMetric,
    YearlyMetric,
};

// Engines
pub use engine::{
    BudgetAllocationEngine, ClassroomGapEngine, DistrictComplianceEngine, ForecastEngine,
    PipelineOrchestrator, PrioritisationEngine, ProposalValidationEngine, RiskEngine,
    RiskTrendEngine, TeacherAdequacyEngine,
};

// API
pub use api::{BudgetApi, DashboardApi, ProposalApi};

// ==========================================
// Constants
// ==========================================

// System version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "School Infrastructure Compliance DSS";

// Schema version written by db::bootstrap_schema
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// Compile-time smoke tests
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
