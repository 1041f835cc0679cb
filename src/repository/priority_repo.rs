// ==========================================
// School Infrastructure Compliance DSS - Priority Index Repository
// ==========================================
// school_priority_index is derived per year; re-ranking a year deletes
// and reinserts that year's rows in one transaction.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::priority::PriorityIndex;
use crate::domain::types::PriorityBucket;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct PriorityIndexRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PriorityIndexRepository {
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

    /// Atomic replace of one year's ranking.
    pub fn replace_year(
        &self,
        academic_year: &str,
        rows: &[PriorityIndex],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM school_priority_index WHERE academic_year = ?1",
            params![academic_year],
        )?;

        let mut count = 0;
        for p in rows {
            tx.execute(
                r#"
                INSERT INTO school_priority_index (
                    school_id, academic_year, risk_score, state_rank,
                    district_rank, priority_bucket, persistent_high_risk_flag
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    p.school_id,
                    p.academic_year,
                    p.risk_score,
                    p.state_rank,
                    p.district_rank,
                    p.priority_bucket.to_db_str(),
                    p.persistent_high_risk_flag,
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
    ) -> RepositoryResult<Option<PriorityIndex>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1 AND academic_year = ?2",
            "",
        ))?;

        match stmt.query_row(params![school_id, academic_year], row_to_index) {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One year's ranking, best (rank 1 = highest risk) first. The
    /// budget dry-run walks this order.
    pub fn find_by_year_ranked(&self, academic_year: &str) -> RepositoryResult<Vec<PriorityIndex>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1",
            "ORDER BY state_rank ASC, school_id ASC",
        ))?;

        let rows = stmt
            .query_map(params![academic_year], row_to_index)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn find_persistent_by_year(
        &self,
        academic_year: &str,
    ) -> RepositoryResult<Vec<PriorityIndex>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1 AND persistent_high_risk_flag = 1",
            "ORDER BY state_rank ASC",
        ))?;

        let rows = stmt
            .query_map(params![academic_year], row_to_index)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_by_bucket(
        &self,
        academic_year: &str,
        bucket: PriorityBucket,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM school_priority_index
             WHERE academic_year = ?1 AND priority_bucket = ?2",
            params![academic_year, bucket.to_db_str()],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

const COLUMNS: &str = "school_id, academic_year, risk_score, state_rank, \
    district_rank, priority_bucket, persistent_high_risk_flag";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM school_priority_index {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn row_to_index(row: &Row<'_>) -> SqliteResult<PriorityIndex> {
    let bucket: String = row.get(5)?;
    Ok(PriorityIndex {
        school_id: row.get(0)?,
        academic_year: row.get(1)?,
        risk_score: row.get(2)?,
        state_rank: row.get(3)?,
        district_rank: row.get(4)?,
        priority_bucket: PriorityBucket::from_db_str(&bucket),
        persistent_high_risk_flag: row.get(6)?,
    })
}
