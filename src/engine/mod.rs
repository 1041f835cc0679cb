// ==========================================
// School Infrastructure Compliance DSS - Engine Layer
// ==========================================
// Responsibility: pipeline business rules as pure set-transformations.
// Engines never assemble SQL; repositories never apply rules.
// Every engine's output is a deterministic function of its inputs plus
// the compiled norm/weight constants.
// ==========================================

pub mod budget;
pub mod classroom_gap;
pub mod district;
pub mod error;
pub mod forecast;
pub mod norms;
pub mod orchestrator;
pub mod prioritisation;
pub mod proposal;
pub mod repositories;
pub mod risk;
pub mod risk_trend;
pub mod teacher_adequacy;

// Core engine re-exports
pub use budget::{BudgetAllocationEngine, ShortfallRow};
pub use classroom_gap::ClassroomGapEngine;
pub use district::DistrictComplianceEngine;
pub use error::{EngineError, EngineResult};
pub use forecast::{ForecastEngine, GrowthEstimator, WmaGrowthEstimator};
pub use orchestrator::{PipelineOrchestrator, PipelineRunResult, StageSummary};
pub use prioritisation::PrioritisationEngine;
pub use proposal::{ProposalValidationEngine, ValidationVerdict};
pub use repositories::PipelineRepositories;
pub use risk::RiskEngine;
pub use risk_trend::RiskTrendEngine;
pub use teacher_adequacy::TeacherAdequacyEngine;
