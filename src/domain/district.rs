// ==========================================
// School Infrastructure Compliance DSS - District Scorecard Entity
// ==========================================

use crate::domain::types::ComplianceGrade;
use serde::{Deserialize, Serialize};

// ==========================================
// DistrictScorecard - district-year compliance aggregate
// ==========================================
// district_rank and yoy_risk_improvement are filled by a second pass
// once every year has been aggregated (both need the full peer /
// historical set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictScorecard {
    pub district: String,
    pub academic_year: String,
    pub total_schools: i64,
    pub avg_risk_score: f64,
    pub pct_high_critical: f64,
    pub total_classroom_deficit: i64,
    pub total_teacher_deficit: i64,
    pub total_enrolment: i64,
    pub avg_classroom_condition: Option<f64>,
    // None for a district's first observed year
    pub yoy_risk_improvement: Option<f64>,
    pub district_rank: Option<i64>,
    pub compliance_grade: ComplianceGrade,
}
