// ==========================================
// School Infrastructure Compliance DSS - Enrolment Forecast Repository
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::forecast::EnrolmentForecast;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct EnrolmentForecastRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EnrolmentForecastRepository {
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

    /// Atomic replace of the forecast table. Forecasts always project
    /// from the latest base year, so the whole table is rebuilt.
    pub fn replace_all(&self, forecasts: &[EnrolmentForecast]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM enrolment_forecast", [])?;

        let mut count = 0;
        for f in forecasts {
            tx.execute(
                r#"
                INSERT INTO enrolment_forecast (
                    school_id, base_year, forecast_year, years_ahead,
                    base_enrolment, avg_growth_rate, projected_enrolment,
                    projected_classrooms_req, projected_teachers_req,
                    current_classrooms, current_teachers,
                    projected_classroom_gap, projected_teacher_gap, school_category
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    f.school_id,
                    f.base_year,
                    f.forecast_year,
                    f.years_ahead,
                    f.base_enrolment,
                    f.avg_growth_rate,
                    f.projected_enrolment,
                    f.projected_classrooms_req,
                    f.projected_teachers_req,
                    f.current_classrooms,
                    f.current_teachers,
                    f.projected_classroom_gap,
                    f.projected_teacher_gap,
                    f.school_category,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// A school's forecast rows ordered by horizon.
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<EnrolmentForecast>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1",
            "ORDER BY years_ahead",
        ))?;

        let rows = stmt
            .query_map(params![school_id], row_to_forecast)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn find_by_horizon(&self, years_ahead: i64) -> RepositoryResult<Vec<EnrolmentForecast>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE years_ahead = ?1",
            "ORDER BY school_id",
        ))?;

        let rows = stmt
            .query_map(params![years_ahead], row_to_forecast)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 =
            conn.query_row("SELECT COUNT(*) FROM enrolment_forecast", [], |row| row.get(0))?;
        Ok(n)
    }
}

const COLUMNS: &str = "school_id, base_year, forecast_year, years_ahead, \
    base_enrolment, avg_growth_rate, projected_enrolment, \
    projected_classrooms_req, projected_teachers_req, current_classrooms, \
    current_teachers, projected_classroom_gap, projected_teacher_gap, \
    school_category";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM enrolment_forecast {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn row_to_forecast(row: &Row<'_>) -> SqliteResult<EnrolmentForecast> {
    Ok(EnrolmentForecast {
        school_id: row.get(0)?,
        base_year: row.get(1)?,
        forecast_year: row.get(2)?,
        years_ahead: row.get(3)?,
        base_enrolment: row.get(4)?,
        avg_growth_rate: row.get(5)?,
        projected_enrolment: row.get(6)?,
        projected_classrooms_req: row.get(7)?,
        projected_teachers_req: row.get(8)?,
        current_classrooms: row.get(9)?,
        current_teachers: row.get(10)?,
        projected_classroom_gap: row.get(11)?,
        projected_teacher_gap: row.get(12)?,
        school_category: row.get(13)?,
    })
}
