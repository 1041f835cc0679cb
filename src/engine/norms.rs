// ==========================================
// School Infrastructure Compliance DSS - Capacity Norm Tables
// ==========================================
// Samagra Shiksha category-based capacity norms. Fixed constants of the
// pipeline version: changing them requires a full recompute of every
// downstream stage for the affected years.
//
// The classroom table and the PTR table look alike but differ for
// categories 5 and 7 (35 vs 30). Both are preserved exactly as the
// policy source documents them (RTE vs RMSA norms); do not unify.
// ==========================================

/// Students per classroom by school category.
///
/// Categories 1/2/3/6 span primary grades and use the blended norm 30;
/// 4/5/7 are upper-primary spans at 35; 8/10/11 are secondary spans
/// at 40. An unmapped category falls back to the most conservative
/// (smallest) norm.
pub fn classroom_norm(school_category: i64) -> i64 {
    match school_category {
        1 | 2 | 3 | 6 => 30,
        4 | 5 | 7 => 35,
        8 | 10 | 11 => 40,
        _ => 30,
    }
}

/// Maximum pupils per teacher (PTR) by school category.
///
/// Only pure upper-primary schools (category 4) use the RTE 35:1 ratio;
/// every other mapped category uses the stricter blended norm 30.
/// Unmapped categories fall back to 30.
pub fn ptr_norm(school_category: i64) -> i64 {
    match school_category {
        4 => 35,
        1 | 2 | 3 | 5 | 6 | 7 | 8 | 10 | 11 => 30,
        _ => 30,
    }
}

/// `ceil(enrolment / norm)` in integer arithmetic.
pub fn required_capacity(enrolment: i64, norm: i64) -> i64 {
    if enrolment <= 0 || norm <= 0 {
        return 0;
    }
    (enrolment + norm - 1) / norm
}

/// `max(required - current, 0)` — a shortfall is never negative.
pub fn capacity_gap(required: i64, current: i64) -> i64 {
    (required - current).max(0)
}
