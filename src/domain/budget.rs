// ==========================================
// School Infrastructure Compliance DSS - Budget Simulation Entities
// ==========================================

use crate::domain::types::RiskLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// BudgetConfig - allocation run parameters
// ==========================================
// The classroom side is a money budget converted to a unit cap; the
// teacher side is a direct post quota. The two caps are independent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetConfig {
    // total classroom construction budget (rupees)
    pub classroom_budget: i64,
    // construction cost per classroom (rupees)
    pub cost_per_classroom: i64,
    // sanctioned teacher posts
    pub teacher_posts: i64,
}

impl BudgetConfig {
    /// Maximum classrooms fundable under the budget (integer division).
    pub fn max_classrooms(&self) -> i64 {
        if self.cost_per_classroom <= 0 {
            return 0;
        }
        self.classroom_budget / self.cost_per_classroom
    }
}

impl Default for BudgetConfig {
    // Rs 50 crore at Rs 5 lakh per classroom, 10k teacher posts
    fn default() -> Self {
        Self {
            classroom_budget: 500_000_000,
            cost_per_classroom: 500_000,
            teacher_posts: 10_000,
        }
    }
}

// ==========================================
// BudgetSimulation - per school-year allocation result
// ==========================================
// Snapshot of the shortfall at allocation time plus what one allocation
// run granted. Overwritten when the allocator re-runs with different
// parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSimulation {
    pub school_id: String,
    pub academic_year: String,
    pub risk_level: RiskLevel,
    pub classroom_gap: i64,
    pub teacher_gap: i64,
    pub classrooms_allocated: i64,
    pub teachers_allocated: i64,
    pub classroom_resolved: bool,
    pub teacher_resolved: bool,
    // position in the walk order: risk-level tier, then risk score
    // descending, then school_id
    pub allocation_priority: i64,
}
