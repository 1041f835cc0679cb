// ==========================================
// School Infrastructure Compliance DSS - Budget Allocation Engine
// ==========================================
// Stage 7 of the pipeline, also reused verbatim by the dry-run API.
// Input: one year's shortfall rows + a budget configuration
// Output: per school-year allocation results
//
// The walk order is computed once (risk-level tier, then risk score
// descending, then school_id) and persisted as allocation_priority.
// Allocation itself is a pure prefix-sum scan along that order,
// evaluated independently per resource type; a school can be fully
// resolved on classrooms and receive nothing on teachers.
// ==========================================

use crate::domain::budget::{BudgetConfig, BudgetSimulation};
use crate::domain::types::RiskLevel;

// ==========================================
// ShortfallRow - allocation input
// ==========================================
#[derive(Debug, Clone)]
pub struct ShortfallRow {
    pub school_id: String,
    pub academic_year: String,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub classroom_gap: i64,
    pub teacher_gap: i64,
}

// ==========================================
// BudgetAllocationEngine
// ==========================================
pub struct BudgetAllocationEngine {
    // stateless: allocation is a pure function of (order, caps)
}

impl BudgetAllocationEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Allocate one year's shortfalls under the configured caps.
    ///
    /// Re-running with different parameters reproduces the result purely
    /// from (priority order, caps); nothing from a previous run feeds
    /// back in.
    pub fn allocate_year(
        &self,
        mut rows: Vec<ShortfallRow>,
        config: &BudgetConfig,
    ) -> Vec<BudgetSimulation> {
        self.sort_by_priority(&mut rows);

        let classroom_gaps: Vec<i64> = rows.iter().map(|r| r.classroom_gap.max(0)).collect();
        let teacher_gaps: Vec<i64> = rows.iter().map(|r| r.teacher_gap.max(0)).collect();

        let classroom_alloc = prefix_sum_allocate(&classroom_gaps, config.max_classrooms());
        let teacher_alloc = prefix_sum_allocate(&teacher_gaps, config.teacher_posts);

        rows.into_iter()
            .enumerate()
            .map(|(i, row)| BudgetSimulation {
                school_id: row.school_id,
                academic_year: row.academic_year,
                risk_level: row.risk_level,
                classroom_gap: classroom_gaps[i],
                teacher_gap: teacher_gaps[i],
                classrooms_allocated: classroom_alloc[i],
                teachers_allocated: teacher_alloc[i],
                classroom_resolved: classroom_alloc[i] >= classroom_gaps[i],
                teacher_resolved: teacher_alloc[i] >= teacher_gaps[i],
                allocation_priority: i as i64 + 1,
            })
            .collect()
    }

    /// Stable priority key: CRITICAL -> HIGH -> MODERATE -> LOW, then
    /// risk score descending. school_id keeps full ties reproducible.
    fn sort_by_priority(&self, rows: &mut [ShortfallRow]) {
        rows.sort_by(|a, b| {
            a.risk_level
                .allocation_tier()
                .cmp(&b.risk_level.allocation_tier())
                .then_with(|| b.risk_score.total_cmp(&a.risk_score))
                .then_with(|| a.school_id.cmp(&b.school_id))
        });
    }
}

impl Default for BudgetAllocationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Prefix-sum scan
// ==========================================

/// Greedy allocation along a fixed order: full shortfall while the
/// running total stays under the cap, the remaining headroom for the
/// single row that straddles it, zero afterwards.
fn prefix_sum_allocate(gaps: &[i64], cap: i64) -> Vec<i64> {
    let cap = cap.max(0);
    let mut allocations = Vec::with_capacity(gaps.len());
    let mut running = 0i64;

    for &gap in gaps {
        running += gap;
        let allocated = if running <= cap {
            gap
        } else if running - gap < cap {
            cap - (running - gap)
        } else {
            0
        };
        allocations.push(allocated);
    }

    allocations
}
