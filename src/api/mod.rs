// ==========================================
// School Infrastructure Compliance DSS - API Layer
// ==========================================
// Responsibility: the read-only query surface for downstream clients,
// proposal submission, and the budget dry run.
// API structs hold repositories only; all rules live in the engines.
// ==========================================

pub mod budget_api;
pub mod dashboard_api;
pub mod error;
pub mod proposal_api;

// Core re-exports
pub use budget_api::{BudgetApi, BudgetSimulationReport};
pub use dashboard_api::{BlockSummary, DashboardApi, SchoolOverview, SchoolYearSnapshot, StateOverview};
pub use error::{ApiError, ApiResult};
pub use proposal_api::{ProposalApi, SubmitProposalResponse};
