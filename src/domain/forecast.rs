// ==========================================
// School Infrastructure Compliance DSS - Enrolment Forecast Entity
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// EnrolmentForecast - projected school-year demand
// ==========================================
// One row per school per horizon (years_ahead in 1..=3), projected from
// the school's latest observed year by compounding a single clipped
// growth estimate. Gaps compare projected requirements against the
// *current* capacity, not a projected one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolmentForecast {
    pub school_id: String,
    pub base_year: String,
    pub forecast_year: String,
    pub years_ahead: i64,
    pub base_enrolment: i64,
    // recency-weighted growth estimate, already clipped to [-0.30, 0.30]
    pub avg_growth_rate: f64,
    pub projected_enrolment: i64,
    pub projected_classrooms_req: i64,
    pub projected_teachers_req: i64,
    pub current_classrooms: i64,
    pub current_teachers: i64,
    pub projected_classroom_gap: i64,
    pub projected_teacher_gap: i64,
    pub school_category: i64,
}
