// ==========================================
// School Infrastructure Compliance DSS - Budget Simulation Repository
// ==========================================
// budget_simulation holds one committed allocation run. A re-run with
// different parameters replaces the affected years wholesale.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::budget::BudgetSimulation;
use crate::domain::types::RiskLevel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct BudgetSimulationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BudgetSimulationRepository {
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

    /// Atomic replace of one year's allocation rows.
    pub fn replace_year(
        &self,
        academic_year: &str,
        rows: &[BudgetSimulation],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM budget_simulation WHERE academic_year = ?1",
            params![academic_year],
        )?;

        let mut count = 0;
        for b in rows {
            tx.execute(
                r#"
                INSERT INTO budget_simulation (
                    school_id, academic_year, risk_level, classroom_gap,
                    teacher_gap, classrooms_allocated, teachers_allocated,
                    classroom_resolved, teacher_resolved, allocation_priority
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    b.school_id,
                    b.academic_year,
                    b.risk_level.to_db_str(),
                    b.classroom_gap,
                    b.teacher_gap,
                    b.classrooms_allocated,
                    b.teachers_allocated,
                    b.classroom_resolved,
                    b.teacher_resolved,
                    b.allocation_priority,
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
    ) -> RepositoryResult<Option<BudgetSimulation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1 AND academic_year = ?2",
            "",
        ))?;

        match stmt.query_row(params![school_id, academic_year], row_to_simulation) {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// One year's rows in allocation walk order.
    pub fn find_by_year_in_priority_order(
        &self,
        academic_year: &str,
    ) -> RepositoryResult<Vec<BudgetSimulation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1",
            "ORDER BY allocation_priority ASC",
        ))?;

        let rows = stmt
            .query_map(params![academic_year], row_to_simulation)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// (classrooms allocated, teachers allocated) for a year — used to
    /// assert the caps were respected.
    pub fn allocation_totals(&self, academic_year: &str) -> RepositoryResult<(i64, i64)> {
        let conn = self.get_conn()?;
        let totals = conn.query_row(
            "SELECT IFNULL(SUM(classrooms_allocated), 0), IFNULL(SUM(teachers_allocated), 0)
             FROM budget_simulation WHERE academic_year = ?1",
            params![academic_year],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(totals)
    }
}

const COLUMNS: &str = "school_id, academic_year, risk_level, classroom_gap, \
    teacher_gap, classrooms_allocated, teachers_allocated, classroom_resolved, \
    teacher_resolved, allocation_priority";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM budget_simulation {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn row_to_simulation(row: &Row<'_>) -> SqliteResult<BudgetSimulation> {
    let level: String = row.get(2)?;
    Ok(BudgetSimulation {
        school_id: row.get(0)?,
        academic_year: row.get(1)?,
        risk_level: RiskLevel::from_db_str(&level),
        classroom_gap: row.get(3)?,
        teacher_gap: row.get(4)?,
        classrooms_allocated: row.get(5)?,
        teachers_allocated: row.get(6)?,
        classroom_resolved: row.get(7)?,
        teacher_resolved: row.get(8)?,
        allocation_priority: row.get(9)?,
    })
}
