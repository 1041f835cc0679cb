// ==========================================
// School Infrastructure Compliance DSS - Teacher Adequacy Engine
// ==========================================
// Stage 2 of the pipeline.
// Input: one year's teacher fact rows + enrolment + categories
// Output: required_teachers / teacher_gap per school-year
//
// Same shape as stage 1 but against the PTR norm table, which maps
// only category 4 to 35.
// ==========================================

use crate::domain::metrics::TeacherMetric;
use crate::engine::norms::{capacity_gap, ptr_norm, required_capacity};
use crate::repository::teacher_metric_repo::TeacherGapUpdate;
use std::collections::HashMap;

// ==========================================
// TeacherAdequacyEngine
// ==========================================
pub struct TeacherAdequacyEngine {
    // stateless
}

impl TeacherAdequacyEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Compute stage-2 columns for every teacher row of one year.
    ///
    /// Rows without an enrolment counterpart are skipped. A missing
    /// total_teachers fact counts as zero staffing.
    pub fn compute_year(
        &self,
        metrics: &[TeacherMetric],
        enrolments: &HashMap<String, i64>,
        categories: &HashMap<String, i64>,
    ) -> Vec<TeacherGapUpdate> {
        let mut updates = Vec::with_capacity(metrics.len());

        for metric in metrics {
            let enrolment = match enrolments.get(&metric.school_id) {
                Some(e) => *e,
                None => continue,
            };
            let category = categories.get(&metric.school_id).copied().unwrap_or(0);
            let staffed = metric.total_teachers.unwrap_or(0);

            let (required, gap) = self.compute_single(enrolment, category, staffed);
            updates.push(TeacherGapUpdate {
                school_id: metric.school_id.clone(),
                required_teachers: required,
                teacher_gap: gap,
            });
        }

        updates
    }

    /// (required, gap) for one school-year.
    pub fn compute_single(&self, enrolment: i64, school_category: i64, staffed: i64) -> (i64, i64) {
        let norm = ptr_norm(school_category);
        let required = required_capacity(enrolment, norm);
        let gap = capacity_gap(required, staffed);
        (required, gap)
    }
}

impl Default for TeacherAdequacyEngine {
    fn default() -> Self {
        Self::new()
    }
}
