// ==========================================
// School Infrastructure Compliance DSS - Proposal Validation Engine
// ==========================================
// Stage 9: validates a requested resource quantity against the actual
// computed shortfall. Invoked per submission at write time — verdicts
// are stamped once and never recomputed when gaps change later.
//
// Decision tree, first match wins; each resource is evaluated
// independently and the worse outcome governs (classroom checked
// first at equal severity).
// ==========================================

use crate::domain::types::{DecisionStatus, ReasonCode};

// ===== ratio bands =====
pub const OVER_REQUEST_RATIO: f64 = 1.5;
pub const MODERATE_OVER_RATIO: f64 = 1.2; // inclusive lower bound
pub const UNDER_REQUEST_RATIO: f64 = 0.5; // exclusive upper bound

// ==========================================
// ValidationVerdict
// ==========================================
#[derive(Debug, Clone)]
pub struct ValidationVerdict {
    pub decision: DecisionStatus,
    pub reason: ReasonCode,
    // None encodes the +infinity sentinel (request against a zero gap)
    pub classroom_ratio: Option<f64>,
    pub teacher_ratio: Option<f64>,
    pub confidence: f64,
}

// ==========================================
// ProposalValidationEngine
// ==========================================
pub struct ProposalValidationEngine {
    // stateless
}

impl ProposalValidationEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Validate one proposal against the school-year's actual gaps.
    pub fn validate(
        &self,
        requested_classrooms: i64,
        requested_teachers: i64,
        classroom_gap: i64,
        teacher_gap: i64,
    ) -> ValidationVerdict {
        let cr_gap = classroom_gap.max(0);
        let tr_gap = teacher_gap.max(0);

        let cr_ratio = request_ratio(requested_classrooms, cr_gap);
        let tr_ratio = request_ratio(requested_teachers, tr_gap);

        let verdict = |decision, reason, confidence| ValidationVerdict {
            decision,
            reason,
            classroom_ratio: finite_or_none(cr_ratio),
            teacher_ratio: finite_or_none(tr_ratio),
            confidence,
        };

        // 1. No deficit on either dimension but something was requested.
        if cr_gap == 0 && tr_gap == 0 && (requested_classrooms > 0 || requested_teachers > 0) {
            return verdict(DecisionStatus::Rejected, ReasonCode::NoDeficit, 0.1);
        }

        // 2/3. Severe over-request (infinity lands here and forces
        // rejection).
        if cr_ratio > OVER_REQUEST_RATIO {
            return verdict(DecisionStatus::Rejected, ReasonCode::ClassroomOverRequest, 0.2);
        }
        if tr_ratio > OVER_REQUEST_RATIO {
            return verdict(DecisionStatus::Rejected, ReasonCode::TeacherOverRequest, 0.2);
        }

        // 4/5. Moderate over-request, boundary inclusive on both ends.
        if cr_ratio >= MODERATE_OVER_RATIO && cr_ratio <= OVER_REQUEST_RATIO {
            return verdict(DecisionStatus::Flagged, ReasonCode::ClassroomModerateOver, 0.5);
        }
        if tr_ratio >= MODERATE_OVER_RATIO && tr_ratio <= OVER_REQUEST_RATIO {
            return verdict(DecisionStatus::Flagged, ReasonCode::TeacherModerateOver, 0.5);
        }

        // 6/7. Under-request against a real deficit.
        if cr_ratio < UNDER_REQUEST_RATIO && cr_gap > 0 {
            return verdict(DecisionStatus::Flagged, ReasonCode::ClassroomUnderRequest, 0.6);
        }
        if tr_ratio < UNDER_REQUEST_RATIO && tr_gap > 0 {
            return verdict(DecisionStatus::Flagged, ReasonCode::TeacherUnderRequest, 0.6);
        }

        // 8. Nothing requested, nothing owed.
        if requested_classrooms == 0 && requested_teachers == 0 && cr_gap == 0 && tr_gap == 0 {
            return ValidationVerdict {
                decision: DecisionStatus::Accepted,
                reason: ReasonCode::NoRequest,
                classroom_ratio: Some(0.0),
                teacher_ratio: Some(0.0),
                confidence: 1.0,
            };
        }

        // 9. Within tolerance: confidence degrades with distance from a
        // perfect 1:1 request on both dimensions.
        let confidence =
            (1.0 - (cr_ratio - 1.0).abs() * 0.5 - (tr_ratio - 1.0).abs() * 0.5).clamp(0.0, 1.0);
        verdict(
            DecisionStatus::Accepted,
            ReasonCode::WithinTolerance,
            round3(confidence),
        )
    }
}

impl Default for ProposalValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Ratio helpers
// ==========================================

/// requested / max(gap, 1) when a deficit exists; +infinity when there
/// is no deficit but a non-zero request (forces the rejecting branch);
/// 0 otherwise.
fn request_ratio(requested: i64, gap: i64) -> f64 {
    if gap > 0 {
        requested as f64 / gap.max(1) as f64
    } else if requested > 0 {
        f64::INFINITY
    } else {
        0.0
    }
}

fn finite_or_none(ratio: f64) -> Option<f64> {
    ratio.is_finite().then_some(ratio)
}

fn round3(x: f64) -> f64 {
    (x * 1_000.0).round() / 1_000.0
}
