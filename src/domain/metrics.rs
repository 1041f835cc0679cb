// ==========================================
// School Infrastructure Compliance DSS - Fact Row Entities
// ==========================================
// yearly_metrics / infrastructure_details / teacher_metrics.
// Fact fields come from ingestion; computed fields are overwritten by
// the pipeline on every run and are never hand-edited.
// ==========================================

use crate::domain::types::RiskLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// YearlyMetric - enrolment fact
// ==========================================
// One row per school-year, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyMetric {
    pub school_id: String,
    pub academic_year: String,
    pub total_enrolment: i64,
}

// ==========================================
// InfrastructureRecord - classroom facts + computed risk fields
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfrastructureRecord {
    pub school_id: String,
    pub academic_year: String,

    // ===== facts =====
    pub total_class_rooms: Option<i64>,
    pub usable_class_rooms: Option<i64>,
    pub classroom_condition_score: Option<f64>,
    pub drinking_water_available: Option<bool>,
    pub electricity_available: Option<bool>,
    pub internet_available: Option<bool>,
    pub separate_girls_toilet: Option<bool>,
    pub ramp_available: Option<bool>,
    pub building_condition: Option<String>,

    // ===== computed (stage 1) =====
    pub required_class_rooms: Option<i64>,
    pub classroom_gap: Option<i64>,

    // ===== computed (stage 3) =====
    pub classroom_deficit_ratio: Option<f64>,
    pub teacher_deficit_ratio: Option<f64>,
    pub enrolment_growth_rate: Option<f64>,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
}

impl InfrastructureRecord {
    /// Fact-only row, as ingestion produces it.
    pub fn from_facts(
        school_id: &str,
        academic_year: &str,
        total_class_rooms: Option<i64>,
        usable_class_rooms: Option<i64>,
    ) -> Self {
        Self {
            school_id: school_id.to_string(),
            academic_year: academic_year.to_string(),
            total_class_rooms,
            usable_class_rooms,
            classroom_condition_score: None,
            drinking_water_available: None,
            electricity_available: None,
            internet_available: None,
            separate_girls_toilet: None,
            ramp_available: None,
            building_condition: None,
            required_class_rooms: None,
            classroom_gap: None,
            classroom_deficit_ratio: None,
            teacher_deficit_ratio: None,
            enrolment_growth_rate: None,
            risk_score: None,
            risk_level: None,
        }
    }
}

// ==========================================
// TeacherMetric - teacher facts + computed adequacy fields
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherMetric {
    pub school_id: String,
    pub academic_year: String,

    // ===== facts =====
    pub total_teachers: Option<i64>,

    // ===== computed (stage 2) =====
    pub required_teachers: Option<i64>,
    pub teacher_gap: Option<i64>,
}

impl TeacherMetric {
    pub fn from_facts(school_id: &str, academic_year: &str, total_teachers: Option<i64>) -> Self {
        Self {
            school_id: school_id.to_string(),
            academic_year: academic_year.to_string(),
            total_teachers,
            required_teachers: None,
            teacher_gap: None,
        }
    }
}
