// ==========================================
// School Infrastructure Compliance DSS - Risk Trend Repository
// ==========================================
// risk_trend is fully derived; the trend stage rebuilds the whole table
// in one transaction (delete + insert = atomic replace).
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::trend::RiskTrend;
use crate::domain::types::TrendDirection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct RiskTrendRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RiskTrendRepository {
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

    /// Atomic replace of the full trend table.
    pub fn replace_all(&self, trends: &[RiskTrend]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM risk_trend", [])?;

        let mut count = 0;
        for t in trends {
            tx.execute(
                r#"
                INSERT INTO risk_trend (
                    school_id, academic_year, risk_score, prev_risk_score,
                    risk_delta, trend_direction, year_over_year_count,
                    chronic_risk_flag, volatile_flag, cumulative_avg_risk
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    t.school_id,
                    t.academic_year,
                    t.risk_score,
                    t.prev_risk_score,
                    t.risk_delta,
                    t.trend_direction.to_db_str(),
                    t.year_over_year_count,
                    t.chronic_risk_flag,
                    t.volatile_flag,
                    t.cumulative_avg_risk,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    pub fn find_by_key(
        &self,
        school_id: &str,
        academic_year: &str,
    ) -> RepositoryResult<Option<RiskTrend>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1 AND academic_year = ?2",
            "",
        ))?;

        match stmt.query_row(params![school_id, academic_year], row_to_trend) {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A school's trend series in chronological order.
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<RiskTrend>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1",
            "ORDER BY academic_year",
        ))?;

        let trends = stmt
            .query_map(params![school_id], row_to_trend)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(trends)
    }

    pub fn find_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<RiskTrend>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1",
            "ORDER BY school_id",
        ))?;

        let trends = stmt
            .query_map(params![academic_year], row_to_trend)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(trends)
    }

    /// Chronic schools for a year, worst first (block dashboard panel).
    pub fn find_chronic_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<RiskTrend>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1 AND chronic_risk_flag = 1",
            "ORDER BY risk_score DESC",
        ))?;

        let trends = stmt
            .query_map(params![academic_year], row_to_trend)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(trends)
    }

    /// Volatile schools for a year, biggest swing first.
    pub fn find_volatile_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<RiskTrend>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1 AND volatile_flag = 1",
            "ORDER BY ABS(IFNULL(risk_delta, 0)) DESC",
        ))?;

        let trends = stmt
            .query_map(params![academic_year], row_to_trend)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(trends)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM risk_trend", [], |row| row.get(0))?;
        Ok(n)
    }
}

const COLUMNS: &str = "school_id, academic_year, risk_score, prev_risk_score, \
    risk_delta, trend_direction, year_over_year_count, chronic_risk_flag, \
    volatile_flag, cumulative_avg_risk";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM risk_trend {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn row_to_trend(row: &Row<'_>) -> SqliteResult<RiskTrend> {
    let direction: String = row.get(5)?;
    Ok(RiskTrend {
        school_id: row.get(0)?,
        academic_year: row.get(1)?,
        risk_score: row.get(2)?,
        prev_risk_score: row.get(3)?,
        risk_delta: row.get(4)?,
        trend_direction: TrendDirection::from_db_str(&direction),
        year_over_year_count: row.get(6)?,
        chronic_risk_flag: row.get(7)?,
        volatile_flag: row.get(8)?,
        cumulative_avg_risk: row.get(9)?,
    })
}
