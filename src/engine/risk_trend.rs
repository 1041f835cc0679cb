// ==========================================
// School Infrastructure Compliance DSS - Risk Trend Engine
// ==========================================
// Stage 5 of the pipeline.
// Input: every risk-scored infrastructure row, grouped per school in
//        chronological order
// Output: the full risk_trend table
//
// Order matters inside a school's series: deltas, directions and
// cumulative averages are computed over the whole history first; the
// chronic and volatile flags are derived afterwards because they read
// values the first pass produced for earlier years.
// ==========================================

use crate::domain::metrics::InfrastructureRecord;
use crate::domain::trend::RiskTrend;
use crate::domain::types::{RiskLevel, TrendDirection};
use crate::engine::error::{EngineError, EngineResult};

// ===== trend direction thresholds =====
pub const IMPROVING_DELTA: f64 = -0.10;
pub const DETERIORATING_DELTA: f64 = 0.10;

// ===== volatility threshold (absolute delta) =====
pub const VOLATILE_DELTA: f64 = 0.25;

// ==========================================
// RiskTrendEngine
// ==========================================
pub struct RiskTrendEngine {
    // stateless
}

impl RiskTrendEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Rebuild the full trend table from risk-scored history.
    ///
    /// `records` must be ordered (school_id, academic_year); rows
    /// without a risk score are not part of any school's series. Fails
    /// fast when rows exist but none are scored.
    pub fn compute_all(&self, records: &[InfrastructureRecord]) -> EngineResult<Vec<RiskTrend>> {
        let scored: Vec<&InfrastructureRecord> =
            records.iter().filter(|r| r.risk_score.is_some()).collect();

        if scored.is_empty() {
            if records.is_empty() {
                return Ok(Vec::new());
            }
            return Err(EngineError::StageOrderingViolation {
                stage: "risk_trend",
                academic_year: "*".to_string(),
                missing: "risk_score (run the risk stage first)",
            });
        }

        let mut trends = Vec::with_capacity(scored.len());

        let mut start = 0;
        while start < scored.len() {
            let school_id = &scored[start].school_id;
            let mut end = start;
            while end < scored.len() && scored[end].school_id == *school_id {
                end += 1;
            }
            self.compute_school_series(&scored[start..end], &mut trends);
            start = end;
        }

        Ok(trends)
    }

    /// One school's chronological series.
    fn compute_school_series(&self, series: &[&InfrastructureRecord], out: &mut Vec<RiskTrend>) {
        // First pass: deltas, directions, running mean.
        let scores: Vec<f64> = series.iter().map(|r| r.risk_score.unwrap_or(0.0)).collect();
        let levels: Vec<Option<RiskLevel>> = series.iter().map(|r| r.risk_level).collect();

        let mut deltas: Vec<Option<f64>> = Vec::with_capacity(series.len());
        let mut running_sum = 0.0;
        let base = out.len();

        for (i, record) in series.iter().enumerate() {
            let prev_score = if i > 0 { Some(scores[i - 1]) } else { None };
            let delta = prev_score.map(|p| scores[i] - p);
            deltas.push(delta);
            running_sum += scores[i];

            out.push(RiskTrend {
                school_id: record.school_id.clone(),
                academic_year: record.academic_year.clone(),
                risk_score: scores[i],
                prev_risk_score: prev_score,
                risk_delta: delta,
                trend_direction: direction_for(delta),
                year_over_year_count: i as i64 + 1,
                chronic_risk_flag: false,
                volatile_flag: false,
                cumulative_avg_risk: running_sum / (i as f64 + 1.0),
            });
        }

        // Second pass: flags that look back at first-pass values.
        for i in 0..series.len() {
            let chronic = i >= 2
                && levels[i].map(|l| l.is_elevated()).unwrap_or(false)
                && levels[i - 1].map(|l| l.is_elevated()).unwrap_or(false)
                && levels[i - 2].map(|l| l.is_elevated()).unwrap_or(false);

            // Sticky for one extra year: the previous transition's swing
            // keeps the school volatile.
            let current_swing = deltas[i].map(|d| d.abs() > VOLATILE_DELTA).unwrap_or(false);
            let prev_swing = if i > 0 {
                deltas[i - 1].map(|d| d.abs() > VOLATILE_DELTA).unwrap_or(false)
            } else {
                false
            };

            out[base + i].chronic_risk_flag = chronic;
            out[base + i].volatile_flag = current_swing || prev_swing;
        }
    }
}

impl Default for RiskTrendEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// BASELINE for a first year; otherwise the +/-0.10 bands.
fn direction_for(delta: Option<f64>) -> TrendDirection {
    match delta {
        None => TrendDirection::Baseline,
        Some(d) if d < IMPROVING_DELTA => TrendDirection::Improving,
        Some(d) if d > DETERIORATING_DELTA => TrendDirection::Deteriorating,
        Some(_) => TrendDirection::Stable,
    }
}
