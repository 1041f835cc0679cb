// ==========================================
// School Infrastructure Compliance DSS - Enrolment Forecasting Engine
// ==========================================
// Stage 8 of the pipeline.
// Input: every school's enrolment series plus current capacity facts
// Output: enrolment_forecast rows for horizons T+1..T+3
//
// One growth estimate per school, compounded across the horizons (not a
// fresh estimate per step). Requirements reuse the stage-1/stage-2 norm
// tables against the projected enrolment; gaps compare against the
// *current* capacity.
//
// The estimator sits behind a trait so an alternative growth model can
// plug in without touching the projection path.
// ==========================================

use crate::domain::forecast::EnrolmentForecast;
use crate::engine::norms::{capacity_gap, classroom_norm, ptr_norm, required_capacity};
use std::collections::HashMap;

// ===== projection parameters =====
pub const GROWTH_CLIP: f64 = 0.30;
pub const FORECAST_HORIZONS: [i64; 3] = [1, 2, 3];

// ===== recency weights, most recent transition first =====
const TRANSITION_WEIGHTS: [f64; 3] = [3.0, 2.0, 1.0];

// ==========================================
// GrowthEstimator - estimator seam
// ==========================================
pub trait GrowthEstimator {
    /// Growth-rate estimate from a chronological (year, enrolment)
    /// series ending at the base year. Implementations return the final,
    /// already-clipped estimate.
    fn estimate(&self, series: &[(String, i64)]) -> f64;
}

// ==========================================
// WmaGrowthEstimator - recency-weighted moving average
// ==========================================
// Weighted mean of the last three year-over-year rates (weights 3:2:1,
// most recent first), each rate normalized by the enrolment at the
// start of its transition. A transition that is missing, or whose start
// is zero, contributes nothing to numerator or denominator, so the
// estimator degrades gracefully for schools with short histories.
pub struct WmaGrowthEstimator;

impl GrowthEstimator for WmaGrowthEstimator {
    fn estimate(&self, series: &[(String, i64)]) -> f64 {
        let n = series.len();
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (k, weight) in TRANSITION_WEIGHTS.iter().enumerate() {
            // transition k steps back: start = n-2-k, end = n-1-k
            if n < k + 2 {
                break;
            }
            let start = series[n - 2 - k].1;
            let end = series[n - 1 - k].1;
            if start <= 0 {
                continue;
            }
            let rate = (end - start) as f64 / start as f64;
            numerator += weight * rate;
            denominator += weight;
        }

        if denominator == 0.0 {
            return 0.0;
        }
        (numerator / denominator).clamp(-GROWTH_CLIP, GROWTH_CLIP)
    }
}

// ==========================================
// ForecastEngine
// ==========================================
pub struct ForecastEngine<E = WmaGrowthEstimator> {
    estimator: E,
}

impl ForecastEngine<WmaGrowthEstimator> {
    pub fn new() -> Self {
        Self {
            estimator: WmaGrowthEstimator,
        }
    }
}

impl Default for ForecastEngine<WmaGrowthEstimator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GrowthEstimator> ForecastEngine<E> {
    /// Build the engine around an alternative growth model.
    pub fn with_estimator(estimator: E) -> Self {
        Self { estimator }
    }

    /// Project every school observed in `base_year` three years ahead.
    ///
    /// # Arguments
    /// - `base_year`: the latest fact year (projection origin)
    /// - `enrolment_series`: school_id -> chronological (year, enrolment)
    /// - `current_classrooms` / `current_teachers`: school_id -> current
    ///   usable capacity (missing rows count as zero)
    /// - `categories`: school_id -> school_category
    pub fn compute_from_latest(
        &self,
        base_year: &str,
        enrolment_series: &HashMap<String, Vec<(String, i64)>>,
        current_classrooms: &HashMap<String, i64>,
        current_teachers: &HashMap<String, i64>,
        categories: &HashMap<String, i64>,
    ) -> Vec<EnrolmentForecast> {
        let mut school_ids: Vec<&String> = enrolment_series.keys().collect();
        school_ids.sort();

        let mut forecasts = Vec::new();

        for school_id in school_ids {
            let series = &enrolment_series[school_id];
            let base_idx = match series.iter().position(|(y, _)| y == base_year) {
                Some(i) => i,
                None => continue, // not observed in the base year
            };
            let history = &series[..=base_idx];
            let base_enrolment = history[base_idx].1;

            let growth = self.estimator.estimate(history);
            let category = categories.get(school_id).copied().unwrap_or(0);
            let classrooms = current_classrooms.get(school_id).copied().unwrap_or(0);
            let teachers = current_teachers.get(school_id).copied().unwrap_or(0);

            for years_ahead in FORECAST_HORIZONS {
                let projected = project_enrolment(base_enrolment, growth, years_ahead);
                let classrooms_req = required_capacity(projected, classroom_norm(category));
                let teachers_req = required_capacity(projected, ptr_norm(category));

                forecasts.push(EnrolmentForecast {
                    school_id: school_id.clone(),
                    base_year: base_year.to_string(),
                    forecast_year: advance_academic_year(base_year, years_ahead),
                    years_ahead,
                    base_enrolment,
                    avg_growth_rate: growth,
                    projected_enrolment: projected,
                    projected_classrooms_req: classrooms_req,
                    projected_teachers_req: teachers_req,
                    current_classrooms: classrooms,
                    current_teachers: teachers,
                    projected_classroom_gap: capacity_gap(classrooms_req, classrooms),
                    projected_teacher_gap: capacity_gap(teachers_req, teachers),
                    school_category: category,
                });
            }
        }

        forecasts
    }
}

// ==========================================
// Projection helpers
// ==========================================

/// `max(0, round(base * (1 + g)^k))`
pub fn project_enrolment(base_enrolment: i64, growth: f64, years_ahead: i64) -> i64 {
    let projected = base_enrolment as f64 * (1.0 + growth).powi(years_ahead as i32);
    (projected.round() as i64).max(0)
}

/// Advance a "YYYY-YY" label by `k` years: "2023-24" + 1 = "2024-25".
pub fn advance_academic_year(base_year: &str, k: i64) -> String {
    let mut parts = base_year.splitn(2, '-');
    let start: Option<i64> = parts.next().and_then(|p| p.parse().ok());
    let end: Option<i64> = parts.next().and_then(|p| p.parse().ok());

    match (start, end) {
        (Some(start), Some(end)) => format!("{}-{:02}", start + k, (end + k) % 100),
        _ => base_year.to_string(),
    }
}

// ==========================================
// Unit tests
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[i64]) -> Vec<(String, i64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("{}-{:02}", 2018 + i as i64, (19 + i as i64) % 100), *v))
            .collect()
    }

    #[test]
    fn test_zero_growth_round_trip() {
        // flat history: growth 0, projection == base for every horizon
        let estimator = WmaGrowthEstimator;
        let s = series(&[400, 400, 400, 400]);
        let g = estimator.estimate(&s);
        assert_eq!(g, 0.0);
        for k in FORECAST_HORIZONS {
            assert_eq!(project_enrolment(400, g, k), 400);
        }
    }

    #[test]
    fn test_weights_favor_recent_transition() {
        let estimator = WmaGrowthEstimator;
        // rates oldest->newest: 0.0, 0.0, +0.30
        // estimate = 3*0.30 / 6 = 0.15
        let s = series(&[100, 100, 100, 130]);
        let g = estimator.estimate(&s);
        assert!((g - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_short_history_drops_missing_transitions() {
        let estimator = WmaGrowthEstimator;
        // only one transition: its rate carries full weight
        let s = series(&[100, 110]);
        let g = estimator.estimate(&s);
        assert!((g - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_single_year_school_estimates_zero() {
        let estimator = WmaGrowthEstimator;
        assert_eq!(estimator.estimate(&series(&[250])), 0.0);
    }

    #[test]
    fn test_zero_start_transition_is_skipped() {
        let estimator = WmaGrowthEstimator;
        // the 0 -> 90 transition has no defined rate; only 90 -> 99
        // (rate 0.1, weight 3) survives
        let s = series(&[0, 90, 99]);
        let g = estimator.estimate(&s);
        assert!((g - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_growth_clipped_to_pm_030() {
        let estimator = WmaGrowthEstimator;
        let up = estimator.estimate(&series(&[100, 300]));
        assert_eq!(up, GROWTH_CLIP);
        let down = estimator.estimate(&series(&[300, 30]));
        assert_eq!(down, -GROWTH_CLIP);
    }

    #[test]
    fn test_projection_compounds_single_estimate() {
        // 1000 * 1.1^3 = 1331
        assert_eq!(project_enrolment(1000, 0.10, 3), 1331);
        // shrinking school floors at zero
        assert_eq!(project_enrolment(10, -1.5, 2), 2); // round(10*0.25)
        assert_eq!(project_enrolment(0, 0.3, 3), 0);
    }

    #[test]
    fn test_advance_academic_year_label() {
        assert_eq!(advance_academic_year("2023-24", 1), "2024-25");
        assert_eq!(advance_academic_year("2023-24", 3), "2026-27");
    }

    #[test]
    fn test_compute_from_latest_three_rows_per_school() {
        let engine = ForecastEngine::new();
        let mut enrolment_series = HashMap::new();
        enrolment_series.insert("S1".to_string(), series(&[400, 400, 400]));
        let mut classrooms = HashMap::new();
        classrooms.insert("S1".to_string(), 10i64);
        let mut teachers = HashMap::new();
        teachers.insert("S1".to_string(), 10i64);
        let mut categories = HashMap::new();
        categories.insert("S1".to_string(), 1i64);

        let base_year = "2020-21"; // last of the three generated labels
        let forecasts = engine.compute_from_latest(
            base_year,
            &enrolment_series,
            &classrooms,
            &teachers,
            &categories,
        );

        assert_eq!(forecasts.len(), 3);
        for (i, f) in forecasts.iter().enumerate() {
            assert_eq!(f.years_ahead, i as i64 + 1);
            assert_eq!(f.projected_enrolment, 400);
            // ceil(400/30) = 14 required, 10 current -> gap 4
            assert_eq!(f.projected_classrooms_req, 14);
            assert_eq!(f.projected_classroom_gap, 4);
        }
    }

    #[test]
    fn test_schools_missing_base_year_are_excluded() {
        let engine = ForecastEngine::new();
        let mut enrolment_series = HashMap::new();
        enrolment_series.insert("S_OLD".to_string(), series(&[400, 400]));

        let forecasts = engine.compute_from_latest(
            "2030-31",
            &enrolment_series,
            &HashMap::new(),
            &HashMap::new(),
            &HashMap::new(),
        );
        assert!(forecasts.is_empty());
    }
}
