// ==========================================
// School Infrastructure Compliance DSS - Prioritisation Engine
// ==========================================
// Stage 4 of the pipeline.
// Input: one year's risk-scored infrastructure rows + district lookup
//        + each school's risk-level history
// Output: state/district RANK, percentile bucket, persistent flag
//
// RANK semantics: equal scores share a rank, the next rank skips.
// Percentile position follows PERCENT_RANK: (rank - 1) / (N - 1),
// 0 = highest risk; buckets are first-match-wins over 5% / 10% / 20%
// inclusive boundaries.
// ==========================================

use crate::domain::metrics::InfrastructureRecord;
use crate::domain::priority::PriorityIndex;
use crate::domain::types::{PriorityBucket, RiskLevel};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;

// ===== bucket boundaries (inclusive) =====
pub const TOP_5_PERCENTILE: f64 = 0.05;
pub const TOP_10_PERCENTILE: f64 = 0.10;
pub const TOP_20_PERCENTILE: f64 = 0.20;

// ==========================================
// PrioritisationEngine
// ==========================================
pub struct PrioritisationEngine {
    // stateless
}

impl PrioritisationEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Rank one year's risk-scored schools.
    ///
    /// # Arguments
    /// - `records`: the year's infrastructure rows (rows without a risk
    ///   score are excluded from the ranked set)
    /// - `districts`: school_id -> district
    /// - `level_history`: school_id -> chronological (year, risk_level)
    ///   series across all years, used for the persistent flag
    ///
    /// Fails fast when the year has rows but none carry a risk score
    /// (the risk stage has not run).
    pub fn compute_year(
        &self,
        academic_year: &str,
        records: &[InfrastructureRecord],
        districts: &HashMap<String, String>,
        level_history: &HashMap<String, Vec<(String, RiskLevel)>>,
    ) -> EngineResult<Vec<PriorityIndex>> {
        let mut scored: Vec<(&str, f64)> = records
            .iter()
            .filter_map(|r| r.risk_score.map(|s| (r.school_id.as_str(), s)))
            .collect();

        if scored.is_empty() {
            if records.is_empty() {
                return Ok(Vec::new());
            }
            return Err(EngineError::StageOrderingViolation {
                stage: "prioritisation",
                academic_year: academic_year.to_string(),
                missing: "risk_score (run the risk stage first)",
            });
        }

        // Risk descending; school_id keeps full ties deterministic.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let state_ranks = competition_ranks(&scored);
        let n = scored.len();

        // District ranks: same ranking partitioned by district. The
        // partition preserves the state-wide sort order, so ranking each
        // slice independently is enough.
        let mut by_district: HashMap<&str, Vec<(&str, f64)>> = HashMap::new();
        for &(school_id, score) in &scored {
            let district = districts
                .get(school_id)
                .map(|d| d.as_str())
                .unwrap_or("UNKNOWN");
            by_district.entry(district).or_default().push((school_id, score));
        }
        let mut district_rank_by_school: HashMap<&str, i64> = HashMap::new();
        for group in by_district.values() {
            let ranks = competition_ranks(group);
            for (&(school_id, _), rank) in group.iter().zip(ranks) {
                district_rank_by_school.insert(school_id, rank);
            }
        }

        let mut result = Vec::with_capacity(n);
        for (i, &(school_id, score)) in scored.iter().enumerate() {
            let state_rank = state_ranks[i];
            let percentile = percent_rank(state_rank, n);

            result.push(PriorityIndex {
                school_id: school_id.to_string(),
                academic_year: academic_year.to_string(),
                risk_score: score,
                state_rank,
                district_rank: district_rank_by_school.get(school_id).copied().unwrap_or(1),
                priority_bucket: bucket_for(percentile),
                persistent_high_risk_flag: is_persistent_high_risk(
                    level_history.get(school_id).map(|v| v.as_slice()),
                    academic_year,
                ),
            });
        }

        Ok(result)
    }
}

impl Default for PrioritisationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Ranking helpers
// ==========================================

/// Competition ranks over a descending-sorted score list: ties share a
/// rank, the rank after a tie group skips past it.
fn competition_ranks(sorted: &[(&str, f64)]) -> Vec<i64> {
    let mut ranks = Vec::with_capacity(sorted.len());
    for (i, (_, score)) in sorted.iter().enumerate() {
        if i > 0 && *score == sorted[i - 1].1 {
            ranks.push(ranks[i - 1]);
        } else {
            ranks.push(i as i64 + 1);
        }
    }
    ranks
}

/// PERCENT_RANK position: (rank - 1) / (N - 1), zero for a single row.
fn percent_rank(rank: i64, n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    (rank - 1) as f64 / (n - 1) as f64
}

/// First-match-wins over the inclusive 5/10/20 boundaries.
fn bucket_for(percentile: f64) -> PriorityBucket {
    if percentile <= TOP_5_PERCENTILE {
        PriorityBucket::Top5
    } else if percentile <= TOP_10_PERCENTILE {
        PriorityBucket::Top10
    } else if percentile <= TOP_20_PERCENTILE {
        PriorityBucket::Top20
    } else {
        PriorityBucket::Standard
    }
}

/// HIGH/CRITICAL on the current year and its two immediately preceding
/// observed years in the school's own history. Fewer than three
/// observations can never flag.
fn is_persistent_high_risk(history: Option<&[(String, RiskLevel)]>, academic_year: &str) -> bool {
    let history = match history {
        Some(h) => h,
        None => return false,
    };
    let idx = match history.iter().position(|(y, _)| y == academic_year) {
        Some(i) => i,
        None => return false,
    };
    if idx < 2 {
        return false;
    }
    history[idx].1.is_elevated()
        && history[idx - 1].1.is_elevated()
        && history[idx - 2].1.is_elevated()
}

// ==========================================
// Unit tests
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn record(school_id: &str, score: Option<f64>) -> InfrastructureRecord {
        let mut r = InfrastructureRecord::from_facts(school_id, "2023-24", None, None);
        r.risk_score = score;
        r
    }

    #[test]
    fn test_rank_ties_share_and_skip() {
        let sorted = vec![("A", 0.9), ("B", 0.9), ("C", 0.5)];
        assert_eq!(competition_ranks(&sorted), vec![1, 1, 3]);
    }

    #[test]
    fn test_percent_rank_single_row() {
        assert_eq!(percent_rank(1, 1), 0.0);
    }

    #[test]
    fn test_buckets_are_mutually_exclusive() {
        assert_eq!(bucket_for(0.05), PriorityBucket::Top5);
        assert_eq!(bucket_for(0.0500001), PriorityBucket::Top10);
        assert_eq!(bucket_for(0.10), PriorityBucket::Top10);
        assert_eq!(bucket_for(0.20), PriorityBucket::Top20);
        assert_eq!(bucket_for(0.21), PriorityBucket::Standard);
    }

    #[test]
    fn test_persistent_needs_three_observed_years() {
        let history = vec![
            ("2021-22".to_string(), RiskLevel::High),
            ("2022-23".to_string(), RiskLevel::Critical),
        ];
        // only two observed years: never persistent
        assert!(!is_persistent_high_risk(Some(&history), "2022-23"));

        let history3 = vec![
            ("2020-21".to_string(), RiskLevel::High),
            ("2021-22".to_string(), RiskLevel::High),
            ("2022-23".to_string(), RiskLevel::Critical),
        ];
        assert!(is_persistent_high_risk(Some(&history3), "2022-23"));
        // middle year breaks the chain
        let broken = vec![
            ("2020-21".to_string(), RiskLevel::High),
            ("2021-22".to_string(), RiskLevel::Moderate),
            ("2022-23".to_string(), RiskLevel::Critical),
        ];
        assert!(!is_persistent_high_risk(Some(&broken), "2022-23"));
    }

    #[test]
    fn test_compute_year_fails_fast_without_risk_scores() {
        let engine = PrioritisationEngine::new();
        let records = vec![record("S1", None)];

        let err = engine
            .compute_year("2023-24", &records, &HashMap::new(), &HashMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::StageOrderingViolation { stage: "prioritisation", .. }
        ));
    }

    #[test]
    fn test_compute_year_ranks_and_partitions() {
        let engine = PrioritisationEngine::new();
        let records = vec![
            record("S1", Some(0.9)),
            record("S2", Some(0.7)),
            record("S3", Some(0.7)),
            record("S4", Some(0.1)),
        ];
        let mut districts = HashMap::new();
        districts.insert("S1".to_string(), "EAST".to_string());
        districts.insert("S2".to_string(), "EAST".to_string());
        districts.insert("S3".to_string(), "WEST".to_string());
        districts.insert("S4".to_string(), "WEST".to_string());

        let rows = engine
            .compute_year("2023-24", &records, &districts, &HashMap::new())
            .unwrap();

        let by_id: HashMap<&str, &PriorityIndex> =
            rows.iter().map(|p| (p.school_id.as_str(), p)).collect();

        assert_eq!(by_id["S1"].state_rank, 1);
        assert_eq!(by_id["S2"].state_rank, 2);
        assert_eq!(by_id["S3"].state_rank, 2); // tie shares rank
        assert_eq!(by_id["S4"].state_rank, 4); // next rank skips

        assert_eq!(by_id["S1"].district_rank, 1);
        assert_eq!(by_id["S2"].district_rank, 2);
        assert_eq!(by_id["S3"].district_rank, 1);
        assert_eq!(by_id["S4"].district_rank, 2);
    }
}
