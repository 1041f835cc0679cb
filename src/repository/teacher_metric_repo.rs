// ==========================================
// School Infrastructure Compliance DSS - Teacher Metric Repository
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::metrics::TeacherMetric;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Stage 2 output for one school-year.
#[derive(Debug, Clone)]
pub struct TeacherGapUpdate {
    pub school_id: String,
    pub required_teachers: i64,
    pub teacher_gap: i64,
}

pub struct TeacherMetricRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherMetricRepository {
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

    /// Batch upsert fact rows. Computed columns reset along with the
    /// row; the adequacy stage re-fills them.
    pub fn batch_upsert_facts(&self, metrics: &[TeacherMetric]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for m in metrics {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO teacher_metrics (
                    school_id, academic_year, total_teachers
                ) VALUES (?1, ?2, ?3)
                "#,
                params![m.school_id, m.academic_year, m.total_teachers],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// Overwrite stage-2 columns for one year in a single transaction.
    pub fn update_gap_fields(
        &self,
        academic_year: &str,
        updates: &[TeacherGapUpdate],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for u in updates {
            count += tx.execute(
                r#"
                UPDATE teacher_metrics
                SET required_teachers = ?1, teacher_gap = ?2
                WHERE school_id = ?3 AND academic_year = ?4
                "#,
                params![u.required_teachers, u.teacher_gap, u.school_id, academic_year],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    pub fn find_by_key(
        &self,
        school_id: &str,
        academic_year: &str,
    ) -> RepositoryResult<Option<TeacherMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_teachers, required_teachers, teacher_gap
             FROM teacher_metrics WHERE school_id = ?1 AND academic_year = ?2",
        )?;

        match stmt.query_row(params![school_id, academic_year], row_to_metric) {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<TeacherMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_teachers, required_teachers, teacher_gap
             FROM teacher_metrics WHERE academic_year = ?1 ORDER BY school_id",
        )?;

        let metrics = stmt
            .query_map(params![academic_year], row_to_metric)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(metrics)
    }

    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<TeacherMetric>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, academic_year, total_teachers, required_teachers, teacher_gap
             FROM teacher_metrics WHERE school_id = ?1 ORDER BY academic_year",
        )?;

        let metrics = stmt
            .query_map(params![school_id], row_to_metric)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(metrics)
    }

    pub fn distinct_years(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT academic_year FROM teacher_metrics ORDER BY academic_year")?;
        let years = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(years)
    }
}

fn row_to_metric(row: &Row<'_>) -> SqliteResult<TeacherMetric> {
    Ok(TeacherMetric {
        school_id: row.get(0)?,
        academic_year: row.get(1)?,
        total_teachers: row.get(2)?,
        required_teachers: row.get(3)?,
        teacher_gap: row.get(4)?,
    })
}
