// ==========================================
// School Infrastructure Compliance DSS - Demand Proposal Repository
// ==========================================
// school_proposals rows are immutable once written: the validation
// verdict is stamped at submission time and never recomputed.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::proposal::DemandProposal;
use crate::domain::types::{DecisionStatus, ReasonCode};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct ProposalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProposalRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, proposal: &DemandProposal) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO school_proposals (
                proposal_id, school_id, academic_year, classrooms_requested,
                teachers_requested, justification, submitted_by, submitted_at,
                actual_classroom_gap, actual_teacher_gap, classroom_ratio,
                teacher_ratio, decision_status, reason_code, confidence_score,
                validated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                proposal.proposal_id,
                proposal.school_id,
                proposal.academic_year,
                proposal.classrooms_requested,
                proposal.teachers_requested,
                proposal.justification,
                proposal.submitted_by,
                proposal.submitted_at.format(TS_FORMAT).to_string(),
                proposal.actual_classroom_gap,
                proposal.actual_teacher_gap,
                proposal.classroom_ratio,
                proposal.teacher_ratio,
                proposal.decision_status.to_db_str(),
                proposal.reason_code.to_db_str(),
                proposal.confidence_score,
                proposal.validated_at.format(TS_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// A school's proposals, newest first.
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<DemandProposal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1",
            "ORDER BY submitted_at DESC",
        ))?;

        let rows = stmt
            .query_map(params![school_id], row_to_proposal)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn find_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<DemandProposal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1",
            "ORDER BY submitted_at DESC",
        ))?;

        let rows = stmt
            .query_map(params![academic_year], row_to_proposal)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_by_status(
        &self,
        academic_year: &str,
        status: DecisionStatus,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM school_proposals
             WHERE academic_year = ?1 AND decision_status = ?2",
            params![academic_year, status.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

const COLUMNS: &str = "proposal_id, school_id, academic_year, classrooms_requested, \
    teachers_requested, justification, submitted_by, submitted_at, \
    actual_classroom_gap, actual_teacher_gap, classroom_ratio, teacher_ratio, \
    decision_status, reason_code, confidence_score, validated_at";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM school_proposals {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn parse_ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT).unwrap_or_default()
}

fn row_to_proposal(row: &Row<'_>) -> SqliteResult<DemandProposal> {
    let submitted_at: String = row.get(7)?;
    let decision: String = row.get(12)?;
    let reason: String = row.get(13)?;
    let validated_at: String = row.get(15)?;
    Ok(DemandProposal {
        proposal_id: row.get(0)?,
        school_id: row.get(1)?,
        academic_year: row.get(2)?,
        classrooms_requested: row.get(3)?,
        teachers_requested: row.get(4)?,
        justification: row.get(5)?,
        submitted_by: row.get(6)?,
        submitted_at: parse_ts(&submitted_at),
        actual_classroom_gap: row.get(8)?,
        actual_teacher_gap: row.get(9)?,
        classroom_ratio: row.get(10)?,
        teacher_ratio: row.get(11)?,
        decision_status: DecisionStatus::from_db_str(&decision),
        reason_code: ReasonCode::from_db_str(&reason).unwrap_or(ReasonCode::WithinTolerance),
        confidence_score: row.get(14)?,
        validated_at: parse_ts(&validated_at),
    })
}
