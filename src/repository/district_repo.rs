// ==========================================
// School Infrastructure Compliance DSS - District Scorecard Repository
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::district::DistrictScorecard;
use crate::domain::types::ComplianceGrade;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct DistrictScorecardRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DistrictScorecardRepository {
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

    /// Atomic replace of the whole scorecard table. The aggregation
    /// stage writes every district-year at once because rank and YoY
    /// need the complete set anyway.
    pub fn replace_all(&self, scorecards: &[DistrictScorecard]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM district_compliance_index", [])?;

        let mut count = 0;
        for d in scorecards {
            tx.execute(
                r#"
                INSERT INTO district_compliance_index (
                    district, academic_year, total_schools, avg_risk_score,
                    pct_high_critical, total_classroom_deficit, total_teacher_deficit,
                    total_enrolment, avg_classroom_condition, yoy_risk_improvement,
                    district_rank, compliance_grade
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    d.district,
                    d.academic_year,
                    d.total_schools,
                    d.avg_risk_score,
                    d.pct_high_critical,
                    d.total_classroom_deficit,
                    d.total_teacher_deficit,
                    d.total_enrolment,
                    d.avg_classroom_condition,
                    d.yoy_risk_improvement,
                    d.district_rank,
                    d.compliance_grade.to_db_str(),
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    pub fn find_by_key(
        &self,
        district: &str,
        academic_year: &str,
    ) -> RepositoryResult<Option<DistrictScorecard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE district = ?1 AND academic_year = ?2",
            "",
        ))?;

        match stmt.query_row(params![district, academic_year], row_to_scorecard) {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One year across districts, riskiest first.
    pub fn find_by_year_ranked(
        &self,
        academic_year: &str,
    ) -> RepositoryResult<Vec<DistrictScorecard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1",
            "ORDER BY avg_risk_score DESC, district ASC",
        ))?;

        let rows = stmt
            .query_map(params![academic_year], row_to_scorecard)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// A district's scorecard series in chronological order.
    pub fn find_by_district(&self, district: &str) -> RepositoryResult<Vec<DistrictScorecard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE district = ?1",
            "ORDER BY academic_year",
        ))?;

        let rows = stmt
            .query_map(params![district], row_to_scorecard)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn latest_year(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let year: Option<String> = conn.query_row(
            "SELECT MAX(academic_year) FROM district_compliance_index",
            [],
            |row| row.get(0),
        )?;
        Ok(year)
    }
}

const COLUMNS: &str = "district, academic_year, total_schools, avg_risk_score, \
    pct_high_critical, total_classroom_deficit, total_teacher_deficit, \
    total_enrolment, avg_classroom_condition, yoy_risk_improvement, \
    district_rank, compliance_grade";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM district_compliance_index {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn row_to_scorecard(row: &Row<'_>) -> SqliteResult<DistrictScorecard> {
    let grade: String = row.get(11)?;
    Ok(DistrictScorecard {
        district: row.get(0)?,
        academic_year: row.get(1)?,
        total_schools: row.get(2)?,
        avg_risk_score: row.get(3)?,
        pct_high_critical: row.get(4)?,
        total_classroom_deficit: row.get(5)?,
        total_teacher_deficit: row.get(6)?,
        total_enrolment: row.get(7)?,
        avg_classroom_condition: row.get(8)?,
        yoy_risk_improvement: row.get(9)?,
        district_rank: row.get(10)?,
        compliance_grade: ComplianceGrade::from_db_str(&grade),
    })
}
