// ==========================================
// School Infrastructure Compliance DSS - Compliance Risk Engine
// ==========================================
// Stage 3 of the pipeline.
// Input: one year's infrastructure rows (with stage-1 columns), the
//        year's teacher metrics (with stage-2 columns), and each
//        school's full enrolment series
// Output: deficit ratios, growth rate, composite risk score + level
//
// risk_score = 0.45 * teacher_deficit_ratio
//            + 0.35 * classroom_deficit_ratio
//            + 0.20 * min(|growth_rate|, 0.50)
// rounded to 4 decimals; classification applies to the rounded score.
// ==========================================

use crate::domain::metrics::{InfrastructureRecord, TeacherMetric};
use crate::domain::types::RiskLevel;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::infrastructure_repo::RiskFieldUpdate;
use std::collections::HashMap;

// ===== score weights =====
pub const TEACHER_WEIGHT: f64 = 0.45;
pub const CLASSROOM_WEIGHT: f64 = 0.35;
pub const GROWTH_WEIGHT: f64 = 0.20;

// ===== growth magnitude cap =====
pub const GROWTH_SCALE_CAP: f64 = 0.50;

// ===== classification thresholds (exclusive lower bounds) =====
pub const CRITICAL_THRESHOLD: f64 = 0.75;
pub const HIGH_THRESHOLD: f64 = 0.50;
pub const MODERATE_THRESHOLD: f64 = 0.20;

// ==========================================
// RiskEngine
// ==========================================
pub struct RiskEngine {
    // stateless: weights and thresholds are pipeline constants
}

impl RiskEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Compute stage-3 columns for every infrastructure row of one year.
    ///
    /// # Arguments
    /// - `records`: the year's infrastructure rows
    /// - `teacher_metrics`: school_id -> the year's teacher row
    /// - `enrolment_series`: school_id -> full (year, enrolment) history
    ///   in chronological order; growth uses the chronological
    ///   predecessor within this series
    ///
    /// Fails fast when a row that has fact coverage reaches this stage
    /// without its stage-1/stage-2 columns populated.
    pub fn compute_year(
        &self,
        academic_year: &str,
        records: &[InfrastructureRecord],
        teacher_metrics: &HashMap<String, TeacherMetric>,
        enrolment_series: &HashMap<String, Vec<(String, i64)>>,
    ) -> EngineResult<Vec<RiskFieldUpdate>> {
        let mut updates = Vec::with_capacity(records.len());

        for record in records {
            let has_enrolment = enrolment_series
                .get(&record.school_id)
                .map(|series| series.iter().any(|(y, _)| y == academic_year))
                .unwrap_or(false);

            // Stage-ordering guard: fact coverage exists but the gap
            // stages never wrote their columns for this year.
            if has_enrolment && record.required_class_rooms.is_none() {
                return Err(EngineError::StageOrderingViolation {
                    stage: "risk",
                    academic_year: academic_year.to_string(),
                    missing: "required_class_rooms (run the classroom gap stage first)",
                });
            }
            let teacher = teacher_metrics.get(&record.school_id);
            if has_enrolment {
                if let Some(t) = teacher {
                    if t.required_teachers.is_none() {
                        return Err(EngineError::StageOrderingViolation {
                            stage: "risk",
                            academic_year: academic_year.to_string(),
                            missing: "required_teachers (run the teacher adequacy stage first)",
                        });
                    }
                }
            }

            let classroom_ratio = deficit_ratio(
                record.classroom_gap.unwrap_or(0),
                record.required_class_rooms.unwrap_or(0),
            );
            let teacher_ratio = match teacher {
                Some(t) => deficit_ratio(t.teacher_gap.unwrap_or(0), t.required_teachers.unwrap_or(0)),
                None => 0.0,
            };

            let growth = enrolment_series
                .get(&record.school_id)
                .map(|series| growth_rate(series, academic_year))
                .unwrap_or(0.0);

            let score = self.composite_score(teacher_ratio, classroom_ratio, growth);
            let level = classify(score);

            updates.push(RiskFieldUpdate {
                school_id: record.school_id.clone(),
                classroom_deficit_ratio: classroom_ratio,
                teacher_deficit_ratio: teacher_ratio,
                enrolment_growth_rate: growth,
                risk_score: score,
                risk_level: level,
            });
        }

        Ok(updates)
    }

    /// Weighted composite, rounded to 4 decimals.
    pub fn composite_score(
        &self,
        teacher_deficit_ratio: f64,
        classroom_deficit_ratio: f64,
        growth_rate: f64,
    ) -> f64 {
        let growth_scaled = growth_rate.abs().min(GROWTH_SCALE_CAP);
        let raw = TEACHER_WEIGHT * teacher_deficit_ratio
            + CLASSROOM_WEIGHT * classroom_deficit_ratio
            + GROWTH_WEIGHT * growth_scaled;
        round4(raw)
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Component functions
// ==========================================

/// `min(gap / required, 1.0)`; zero when the requirement is zero or
/// unknown (division guard).
pub fn deficit_ratio(gap: i64, required: i64) -> f64 {
    if required <= 0 {
        return 0.0;
    }
    (gap as f64 / required as f64).min(1.0)
}

/// Year-over-year growth against the school's chronological predecessor
/// within its own observed series. Zero for the first observed year, a
/// zero predecessor, or a year not present in the series.
pub fn growth_rate(series: &[(String, i64)], academic_year: &str) -> f64 {
    let idx = match series.iter().position(|(y, _)| y == academic_year) {
        Some(i) => i,
        None => return 0.0,
    };
    if idx == 0 {
        return 0.0;
    }
    let prev = series[idx - 1].1;
    if prev == 0 {
        return 0.0;
    }
    let current = series[idx].1;
    (current - prev) as f64 / prev as f64
}

/// Classify a (rounded) composite score. Boundaries are exclusive on
/// the lower side: exactly 0.75 is HIGH, not CRITICAL.
pub fn classify(score: f64) -> RiskLevel {
    if score > CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if score > HIGH_THRESHOLD {
        RiskLevel::High
    } else if score > MODERATE_THRESHOLD {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

// ==========================================
// Unit tests
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example_moderate() {
        let engine = RiskEngine::new();

        // teacher 10/30, classroom 5/30, growth 0:
        // 0.45*0.3333... + 0.35*0.1666... = 0.2083
        let t = deficit_ratio(10, 30);
        let c = deficit_ratio(5, 30);
        let score = engine.composite_score(t, c, 0.0);

        assert_eq!(score, 0.2083);
        assert_eq!(classify(score), RiskLevel::Moderate);
    }

    #[test]
    fn test_boundary_exactly_075_is_high() {
        assert_eq!(classify(0.7500), RiskLevel::High);
        assert_eq!(classify(0.7501), RiskLevel::Critical);
        assert_eq!(classify(0.5000), RiskLevel::Moderate);
        assert_eq!(classify(0.5001), RiskLevel::High);
        assert_eq!(classify(0.2000), RiskLevel::Low);
        assert_eq!(classify(0.2001), RiskLevel::Moderate);
    }

    #[test]
    fn test_deficit_ratio_guards() {
        assert_eq!(deficit_ratio(5, 0), 0.0);
        assert_eq!(deficit_ratio(50, 10), 1.0); // capped
        assert!((deficit_ratio(1, 3) - 0.3333333).abs() < 1e-6);
    }

    #[test]
    fn test_growth_rate_first_year_is_zero() {
        let series = vec![("2021-22".to_string(), 500)];
        assert_eq!(growth_rate(&series, "2021-22"), 0.0);
    }

    #[test]
    fn test_growth_rate_uses_chronological_predecessor() {
        let series = vec![
            ("2021-22".to_string(), 400),
            ("2022-23".to_string(), 500),
        ];
        assert_eq!(growth_rate(&series, "2022-23"), 0.25);
    }

    #[test]
    fn test_growth_rate_zero_predecessor_guard() {
        let series = vec![
            ("2021-22".to_string(), 0),
            ("2022-23".to_string(), 500),
        ];
        assert_eq!(growth_rate(&series, "2022-23"), 0.0);
    }

    #[test]
    fn test_growth_magnitude_is_capped() {
        let engine = RiskEngine::new();

        // |growth| = 2.0 caps at 0.50 -> contribution 0.10
        let score = engine.composite_score(0.0, 0.0, -2.0);
        assert_eq!(score, 0.1000);
    }

    #[test]
    fn test_score_range() {
        let engine = RiskEngine::new();

        let max = engine.composite_score(1.0, 1.0, 10.0);
        assert_eq!(max, 0.9);
        let min = engine.composite_score(0.0, 0.0, 0.0);
        assert_eq!(min, 0.0);
    }
}
