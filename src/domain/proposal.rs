// ==========================================
// School Infrastructure Compliance DSS - Demand Proposal Entities
// ==========================================

use crate::domain::types::{DecisionStatus, ReasonCode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ProposalRequest - submission input
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub school_id: String,
    pub academic_year: String,
    pub classrooms_requested: i64,
    pub teachers_requested: i64,
    pub justification: Option<String>,
    pub submitted_by: Option<String>,
}

// ==========================================
// DemandProposal - stored, validated proposal
// ==========================================
// Decision and reason are stamped once at submission time against the
// gaps computed at that moment; they are not recomputed if the
// underlying gaps change later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandProposal {
    pub proposal_id: String,
    pub school_id: String,
    pub academic_year: String,
    pub classrooms_requested: i64,
    pub teachers_requested: i64,
    pub justification: Option<String>,
    pub submitted_by: Option<String>,
    pub submitted_at: NaiveDateTime,

    // ===== validation outcome =====
    pub actual_classroom_gap: i64,
    pub actual_teacher_gap: i64,
    // None when the ratio is the +infinity sentinel (no deficit but a
    // non-zero request); the decision tree has already consumed it
    pub classroom_ratio: Option<f64>,
    pub teacher_ratio: Option<f64>,
    pub decision_status: DecisionStatus,
    pub reason_code: ReasonCode,
    pub confidence_score: f64,
    pub validated_at: NaiveDateTime,
}
