// ==========================================
// School Infrastructure Compliance DSS - Priority Index Entity
// ==========================================

use crate::domain::types::PriorityBucket;
use serde::{Deserialize, Serialize};

// ==========================================
// PriorityIndex - state/district ranking per school-year
// ==========================================
// state_rank / district_rank use RANK semantics: equal risk scores share
// a rank and the next rank skips accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityIndex {
    pub school_id: String,
    pub academic_year: String,
    pub risk_score: f64,
    pub state_rank: i64,
    pub district_rank: i64,
    pub priority_bucket: PriorityBucket,
    pub persistent_high_risk_flag: bool,
}
