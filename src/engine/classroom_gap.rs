// ==========================================
// School Infrastructure Compliance DSS - Classroom Gap Engine
// ==========================================
// Stage 1 of the pipeline.
// Input: one year's infrastructure fact rows + enrolment + categories
// Output: required_class_rooms / classroom_gap per school-year
// ==========================================

use crate::domain::metrics::InfrastructureRecord;
use crate::engine::norms::{capacity_gap, classroom_norm, required_capacity};
use crate::repository::infrastructure_repo::ClassroomGapUpdate;
use std::collections::HashMap;

// ==========================================
// ClassroomGapEngine
// ==========================================
pub struct ClassroomGapEngine {
    // stateless: norms are compiled constants, data is injected
}

impl ClassroomGapEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Compute stage-1 columns for every infrastructure row of one year.
    ///
    /// # Arguments
    /// - `records`: the year's infrastructure rows
    /// - `enrolments`: school_id -> total_enrolment for the same year
    /// - `categories`: school_id -> school_category
    ///
    /// Rows without an enrolment counterpart are skipped (their computed
    /// columns stay empty and the risk stage treats them as zero
    /// deficit). A missing usable-classroom fact counts as zero usable
    /// capacity; an unknown category uses the conservative norm.
    pub fn compute_year(
        &self,
        records: &[InfrastructureRecord],
        enrolments: &HashMap<String, i64>,
        categories: &HashMap<String, i64>,
    ) -> Vec<ClassroomGapUpdate> {
        let mut updates = Vec::with_capacity(records.len());

        for record in records {
            let enrolment = match enrolments.get(&record.school_id) {
                Some(e) => *e,
                None => continue,
            };
            let category = categories.get(&record.school_id).copied().unwrap_or(0);
            let usable = record.usable_class_rooms.unwrap_or(0);

            let (required, gap) = self.compute_single(enrolment, category, usable);
            updates.push(ClassroomGapUpdate {
                school_id: record.school_id.clone(),
                required_class_rooms: required,
                classroom_gap: gap,
            });
        }

        updates
    }

    /// (required, gap) for one school-year.
    pub fn compute_single(&self, enrolment: i64, school_category: i64, usable: i64) -> (i64, i64) {
        let norm = classroom_norm(school_category);
        let required = required_capacity(enrolment, norm);
        let gap = capacity_gap(required, usable);
        (required, gap)
    }
}

impl Default for ClassroomGapEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Unit tests
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::InfrastructureRecord;

    #[test]
    fn test_compute_single_category_1() {
        let engine = ClassroomGapEngine::new();

        // category 1, enrolment 900, 25 usable rooms:
        // required = ceil(900/30) = 30, gap = 5
        let (required, gap) = engine.compute_single(900, 1, 25);
        assert_eq!(required, 30);
        assert_eq!(gap, 5);
    }

    #[test]
    fn test_compute_single_surplus_capacity() {
        let engine = ClassroomGapEngine::new();

        let (required, gap) = engine.compute_single(100, 8, 10);
        assert_eq!(required, 3); // ceil(100/40)
        assert_eq!(gap, 0); // never negative
    }

    #[test]
    fn test_compute_single_unknown_category_uses_conservative_norm() {
        let engine = ClassroomGapEngine::new();

        let (required, _) = engine.compute_single(90, 99, 0);
        assert_eq!(required, 3); // ceil(90/30), not 90/40
    }

    #[test]
    fn test_compute_year_skips_rows_without_enrolment() {
        let engine = ClassroomGapEngine::new();

        let records = vec![
            InfrastructureRecord::from_facts("S1", "2023-24", Some(30), Some(25)),
            InfrastructureRecord::from_facts("S2", "2023-24", Some(10), Some(10)),
        ];
        let mut enrolments = HashMap::new();
        enrolments.insert("S1".to_string(), 900);
        let mut categories = HashMap::new();
        categories.insert("S1".to_string(), 1);
        categories.insert("S2".to_string(), 1);

        let updates = engine.compute_year(&records, &enrolments, &categories);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].school_id, "S1");
        assert_eq!(updates[0].required_class_rooms, 30);
        assert_eq!(updates[0].classroom_gap, 5);
    }

    #[test]
    fn test_missing_usable_rooms_counts_as_zero() {
        let engine = ClassroomGapEngine::new();

        let records = vec![InfrastructureRecord::from_facts("S1", "2023-24", None, None)];
        let mut enrolments = HashMap::new();
        enrolments.insert("S1".to_string(), 60);
        let mut categories = HashMap::new();
        categories.insert("S1".to_string(), 1);

        let updates = engine.compute_year(&records, &enrolments, &categories);
        assert_eq!(updates[0].classroom_gap, 2); // required 2, usable 0
    }
}
