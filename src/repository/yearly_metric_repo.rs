// ==========================================
// School Infrastructure Compliance DSS - Yearly Metric Repository
// ==========================================
// yearly_metrics is append-only fact data: enrolment per school-year.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::metrics::YearlyMetric;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct YearlyMetricRepository {
    conn: Arc<Mutex<Connection>>,
}

impl YearlyMetricRepository {
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

    pub fn batch_upsert(&self, metrics: &[YearlyMetric]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for m in metrics {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO yearly_metrics (
                    school_id, academic_year, total_enrolment
                ) VALUES (?1, ?2, ?3)
                "#,
                params![m.school_id, m.academic_year, m.total_enrolment],
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
    ) -> RepositoryResult<Option<YearlyMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_enrolment
             FROM yearly_metrics WHERE school_id = ?1 AND academic_year = ?2",
        )?;

        match stmt.query_row(params![school_id, academic_year], row_to_metric) {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One year's rows across all schools.
    pub fn find_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<YearlyMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_enrolment
             FROM yearly_metrics WHERE academic_year = ?1 ORDER BY school_id",
        )?;

        let metrics = stmt
            .query_map(params![academic_year], row_to_metric)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(metrics)
    }

    /// A school's full enrolment series in chronological order
    /// (academic_year strings sort chronologically).
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<YearlyMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_enrolment
             FROM yearly_metrics WHERE school_id = ?1 ORDER BY academic_year",
        )?;

        let metrics = stmt
            .query_map(params![school_id], row_to_metric)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(metrics)
    }

    /// The full fact table ordered (school_id, academic_year) — the lag
    /// and forecast engines consume it grouped per school.
    pub fn find_all_ordered(&self) -> RepositoryResult<Vec<YearlyMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_enrolment
             FROM yearly_metrics ORDER BY school_id, academic_year",
        )?;

        let metrics = stmt
            .query_map([], row_to_metric)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(metrics)
    }

    pub fn distinct_years(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT academic_year FROM yearly_metrics ORDER BY academic_year")?;
        let years = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(years)
    }

    pub fn latest_year(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let year: Option<String> =
            conn.query_row("SELECT MAX(academic_year) FROM yearly_metrics", [], |row| {
                row.get(0)
            })?;
        Ok(year)
    }
}

fn row_to_metric(row: &Row<'_>) -> SqliteResult<YearlyMetric> {
    Ok(YearlyMetric {
        school_id: row.get(0)?,
        academic_year: row.get(1)?,
        total_enrolment: row.get(2)?,
    })
}
