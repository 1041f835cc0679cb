// ==========================================
// School Infrastructure Compliance DSS - District Compliance Engine
// ==========================================
// Stage 6 of the pipeline.
// Input: one year's risk-scored rows + counterpart facts, grouped by
//        district
// Output: district-year scorecards
//
// Two-phase by necessity: the per-year grouping produces the aggregates
// and grade; rank and YoY improvement are a second pass over the fully
// populated scorecard set because both need peer / historical rows.
// ==========================================

use crate::domain::district::DistrictScorecard;
use crate::domain::metrics::{InfrastructureRecord, TeacherMetric};
use crate::domain::types::ComplianceGrade;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, HashMap};

// ==========================================
// DistrictComplianceEngine
// ==========================================
pub struct DistrictComplianceEngine {
    // stateless
}

impl DistrictComplianceEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Aggregate one year's school rows into district scorecards.
    /// `district_rank` and `yoy_risk_improvement` stay empty until
    /// `finalize` runs over every year.
    ///
    /// # Arguments
    /// - `records`: the year's infrastructure rows
    /// - `teacher_metrics`: school_id -> the year's teacher row
    /// - `enrolments`: school_id -> the year's enrolment
    /// - `districts`: school_id -> district
    pub fn aggregate_year(
        &self,
        academic_year: &str,
        records: &[InfrastructureRecord],
        teacher_metrics: &HashMap<String, TeacherMetric>,
        enrolments: &HashMap<String, i64>,
        districts: &HashMap<String, String>,
    ) -> EngineResult<Vec<DistrictScorecard>> {
        let scored: Vec<&InfrastructureRecord> =
            records.iter().filter(|r| r.risk_score.is_some()).collect();

        if scored.is_empty() {
            if records.is_empty() {
                return Ok(Vec::new());
            }
            return Err(EngineError::StageOrderingViolation {
                stage: "district_compliance",
                academic_year: academic_year.to_string(),
                missing: "risk_score (run the risk stage first)",
            });
        }

        // BTreeMap keeps district output order stable.
        let mut groups: BTreeMap<&str, DistrictAccumulator> = BTreeMap::new();

        for record in scored {
            let district = districts
                .get(&record.school_id)
                .map(|d| d.as_str())
                .unwrap_or("UNKNOWN");
            let acc = groups.entry(district).or_default();

            acc.school_count += 1;
            acc.risk_sum += record.risk_score.unwrap_or(0.0);
            if record.risk_level.map(|l| l.is_elevated()).unwrap_or(false) {
                acc.elevated_count += 1;
            }
            acc.classroom_deficit += record.classroom_gap.unwrap_or(0).max(0);
            if let Some(t) = teacher_metrics.get(&record.school_id) {
                acc.teacher_deficit += t.teacher_gap.unwrap_or(0).max(0);
            }
            acc.enrolment += enrolments.get(&record.school_id).copied().unwrap_or(0);
            if let Some(condition) = record.classroom_condition_score {
                acc.condition_sum += condition;
                acc.condition_count += 1;
            }
        }

        let scorecards = groups
            .into_iter()
            .map(|(district, acc)| acc.into_scorecard(district, academic_year))
            .collect();

        Ok(scorecards)
    }

    /// Second pass over the complete scorecard set: YoY improvement via
    /// each district's own prior year, then per-year RANK by mean risk
    /// descending.
    pub fn finalize(&self, scorecards: &mut [DistrictScorecard]) {
        // YoY: prior-year mean per district.
        let mut prior: HashMap<(String, String), f64> = HashMap::new();
        for card in scorecards.iter() {
            prior.insert(
                (card.district.clone(), card.academic_year.clone()),
                card.avg_risk_score,
            );
        }

        let mut years: Vec<String> = scorecards.iter().map(|c| c.academic_year.clone()).collect();
        years.sort();
        years.dedup();

        for card in scorecards.iter_mut() {
            let year_idx = years.iter().position(|y| *y == card.academic_year);
            card.yoy_risk_improvement = year_idx.and_then(|i| {
                // the district's own immediately preceding observed year
                years[..i].iter().rev().find_map(|prev_year| {
                    prior
                        .get(&(card.district.clone(), prev_year.clone()))
                        .map(|prev_avg| card.avg_risk_score - prev_avg)
                })
            });
        }

        // Rank per year, mean risk descending, ties share a rank.
        for year in &years {
            let mut indices: Vec<usize> = scorecards
                .iter()
                .enumerate()
                .filter(|(_, c)| c.academic_year == *year)
                .map(|(i, _)| i)
                .collect();
            indices.sort_by(|&a, &b| {
                scorecards[b]
                    .avg_risk_score
                    .total_cmp(&scorecards[a].avg_risk_score)
                    .then_with(|| scorecards[a].district.cmp(&scorecards[b].district))
            });

            let mut prev_score = f64::NAN;
            let mut prev_rank = 0i64;
            for (pos, &idx) in indices.iter().enumerate() {
                let score = scorecards[idx].avg_risk_score;
                let rank = if pos > 0 && score == prev_score {
                    prev_rank
                } else {
                    pos as i64 + 1
                };
                scorecards[idx].district_rank = Some(rank);
                prev_score = score;
                prev_rank = rank;
            }
        }
    }
}

impl Default for DistrictComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Aggregation accumulator
// ==========================================

#[derive(Default)]
struct DistrictAccumulator {
    school_count: i64,
    risk_sum: f64,
    elevated_count: i64,
    classroom_deficit: i64,
    teacher_deficit: i64,
    enrolment: i64,
    condition_sum: f64,
    condition_count: i64,
}

impl DistrictAccumulator {
    fn into_scorecard(self, district: &str, academic_year: &str) -> DistrictScorecard {
        let n = self.school_count as f64;
        let avg_risk = self.risk_sum / n;
        DistrictScorecard {
            district: district.to_string(),
            academic_year: academic_year.to_string(),
            total_schools: self.school_count,
            avg_risk_score: round4(avg_risk),
            pct_high_critical: round2(self.elevated_count as f64 * 100.0 / n),
            total_classroom_deficit: self.classroom_deficit,
            total_teacher_deficit: self.teacher_deficit,
            total_enrolment: self.enrolment,
            avg_classroom_condition: if self.condition_count > 0 {
                Some(round4(self.condition_sum / self.condition_count as f64))
            } else {
                None
            },
            yoy_risk_improvement: None,
            district_rank: None,
            // grade thresholds apply to the unrounded mean
            compliance_grade: ComplianceGrade::from_avg_risk(avg_risk),
        }
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
