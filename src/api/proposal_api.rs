// ==========================================
// School Infrastructure Compliance DSS - Proposal API
// ==========================================
// Accepts demand proposals and validates them instantly against the
// gaps computed for the school-year. The verdict is stamped onto the
// stored row at write time and never revised when gaps change later.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::proposal::{DemandProposal, ProposalRequest};
use crate::domain::types::{DecisionStatus, ReasonCode};
use crate::engine::proposal::ProposalValidationEngine;
use crate::engine::repositories::PipelineRepositories;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ==========================================
// Response DTO
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct SubmitProposalResponse {
    pub proposal_id: String,
    pub decision_status: DecisionStatus,
    pub reason_code: ReasonCode,
    pub confidence_score: f64,
    pub classroom_ratio: Option<f64>,
    pub teacher_ratio: Option<f64>,
    pub actual_classroom_gap: i64,
    pub actual_teacher_gap: i64,
    pub message: String,
}

// ==========================================
// ProposalApi
// ==========================================
pub struct ProposalApi {
    repos: Arc<PipelineRepositories>,
    engine: ProposalValidationEngine,
}

impl ProposalApi {
    pub fn new(repos: Arc<PipelineRepositories>) -> Self {
        Self {
            repos,
            engine: ProposalValidationEngine::new(),
        }
    }

    /// Submit a proposal and get the instant validation verdict.
    pub fn submit(&self, request: &ProposalRequest) -> ApiResult<SubmitProposalResponse> {
        if request.school_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("school_id must not be empty".to_string()));
        }
        if request.classrooms_requested < 0 || request.teachers_requested < 0 {
            return Err(ApiError::InvalidInput(
                "requested quantities must not be negative".to_string(),
            ));
        }

        // Gaps as computed for the school-year right now. An unknown
        // school-year rejects outright instead of guessing.
        let infra = self
            .repos
            .infrastructure
            .find_by_key(&request.school_id, &request.academic_year)?;

        let (verdict_decision, verdict_reason, cr_ratio, tr_ratio, confidence, cr_gap, tr_gap) =
            match infra {
                None => (
                    DecisionStatus::Rejected,
                    ReasonCode::SchoolNotFound,
                    None,
                    None,
                    0.0,
                    0,
                    0,
                ),
                Some(record) => {
                    let cr_gap = record.classroom_gap.unwrap_or(0);
                    let tr_gap = self
                        .repos
                        .teachers
                        .find_by_key(&request.school_id, &request.academic_year)?
                        .and_then(|t| t.teacher_gap)
                        .unwrap_or(0);

                    let verdict = self.engine.validate(
                        request.classrooms_requested,
                        request.teachers_requested,
                        cr_gap,
                        tr_gap,
                    );
                    (
                        verdict.decision,
                        verdict.reason,
                        verdict.classroom_ratio,
                        verdict.teacher_ratio,
                        verdict.confidence,
                        cr_gap,
                        tr_gap,
                    )
                }
            };

        let now = Utc::now().naive_utc();
        let proposal = DemandProposal {
            proposal_id: Uuid::new_v4().to_string(),
            school_id: request.school_id.clone(),
            academic_year: request.academic_year.clone(),
            classrooms_requested: request.classrooms_requested,
            teachers_requested: request.teachers_requested,
            justification: request.justification.clone(),
            submitted_by: request.submitted_by.clone(),
            submitted_at: now,
            actual_classroom_gap: cr_gap,
            actual_teacher_gap: tr_gap,
            classroom_ratio: cr_ratio,
            teacher_ratio: tr_ratio,
            decision_status: verdict_decision,
            reason_code: verdict_reason,
            confidence_score: confidence,
            validated_at: now,
        };
        self.repos.proposals.insert(&proposal)?;

        info!(
            school_id = %proposal.school_id,
            year = %proposal.academic_year,
            decision = %proposal.decision_status,
            reason = %proposal.reason_code,
            "proposal validated"
        );

        Ok(SubmitProposalResponse {
            proposal_id: proposal.proposal_id,
            decision_status: verdict_decision,
            reason_code: verdict_reason,
            confidence_score: confidence,
            classroom_ratio: cr_ratio,
            teacher_ratio: tr_ratio,
            actual_classroom_gap: cr_gap,
            actual_teacher_gap: tr_gap,
            message: decision_message(verdict_decision, verdict_reason),
        })
    }

    /// A school's proposals, newest first.
    pub fn list_for_school(&self, school_id: &str) -> ApiResult<Vec<DemandProposal>> {
        Ok(self.repos.proposals.find_by_school(school_id)?)
    }

    pub fn list_for_year(&self, academic_year: &str) -> ApiResult<Vec<DemandProposal>> {
        Ok(self.repos.proposals.find_by_year(academic_year)?)
    }
}

fn decision_message(decision: DecisionStatus, reason: ReasonCode) -> String {
    let reason_text = reason.to_db_str().replace('_', " ").to_lowercase();
    match decision {
        DecisionStatus::Accepted => {
            "Proposal accepted — within tolerance of actual gaps.".to_string()
        }
        DecisionStatus::Flagged => {
            format!("Proposal flagged for manual review — {}.", reason_text)
        }
        DecisionStatus::Rejected => format!("Proposal rejected — {}.", reason_text),
    }
}
