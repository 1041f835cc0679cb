// ==========================================
// School Infrastructure Compliance DSS - Risk Trend Entity
// ==========================================

use crate::domain::types::TrendDirection;
use serde::{Deserialize, Serialize};

// ==========================================
// RiskTrend - longitudinal risk movement per school-year
// ==========================================
// Derived entirely from InfrastructureRecord history; the whole table is
// recomputed on every pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTrend {
    pub school_id: String,
    pub academic_year: String,
    pub risk_score: f64,
    pub prev_risk_score: Option<f64>,
    // None for a school's first observed year (BASELINE)
    pub risk_delta: Option<f64>,
    pub trend_direction: TrendDirection,
    // 1-based position within the school's own observed history;
    // strictly increases with academic_year
    pub year_over_year_count: i64,
    pub chronic_risk_flag: bool,
    pub volatile_flag: bool,
    pub cumulative_avg_risk: f64,
}
