// ==========================================
// School Infrastructure Compliance DSS - Infrastructure Repository
// ==========================================
// infrastructure_details carries classroom facts plus the computed
// gap/risk columns. Computed columns are only ever written through the
// update_* methods, each of which replaces one year atomically.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::metrics::InfrastructureRecord;
use crate::domain::types::RiskLevel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// Computed-column update payloads
// ==========================================

/// Stage 1 output for one school-year.
#[derive(Debug, Clone)]
pub struct ClassroomGapUpdate {
    pub school_id: String,
    pub required_class_rooms: i64,
    pub classroom_gap: i64,
}

/// Stage 3 output for one school-year.
#[derive(Debug, Clone)]
pub struct RiskFieldUpdate {
    pub school_id: String,
    pub classroom_deficit_ratio: f64,
    pub teacher_deficit_ratio: f64,
    pub enrolment_growth_rate: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

// ==========================================
// InfrastructureRepository
// ==========================================
pub struct InfrastructureRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InfrastructureRepository {
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

    /// Batch upsert fact rows (ingestion). Replacing a row clears its
    /// computed columns, which is correct: facts changed, so every
    /// downstream stage must re-run for that year.
    pub fn batch_upsert_facts(&self, records: &[InfrastructureRecord]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for r in records {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO infrastructure_details (
                    school_id, academic_year,
                    total_class_rooms, usable_class_rooms, classroom_condition_score,
                    drinking_water_available, electricity_available, internet_available,
                    separate_girls_toilet, ramp_available, building_condition
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
                params![
                    r.school_id,
                    r.academic_year,
                    r.total_class_rooms,
                    r.usable_class_rooms,
                    r.classroom_condition_score,
                    r.drinking_water_available,
                    r.electricity_available,
                    r.internet_available,
                    r.separate_girls_toilet,
                    r.ramp_available,
                    r.building_condition,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// Overwrite stage-1 columns for one year in a single transaction.
    /// Other years' values are untouched.
    pub fn update_gap_fields(
        &self,
        academic_year: &str,
        updates: &[ClassroomGapUpdate],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for u in updates {
            count += tx.execute(
                r#"
                UPDATE infrastructure_details
                SET required_class_rooms = ?1, classroom_gap = ?2
                WHERE school_id = ?3 AND academic_year = ?4
                "#,
                params![u.required_class_rooms, u.classroom_gap, u.school_id, academic_year],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    /// Overwrite stage-3 columns for one year in a single transaction.
    pub fn update_risk_fields(
        &self,
        academic_year: &str,
        updates: &[RiskFieldUpdate],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for u in updates {
            count += tx.execute(
                r#"
                UPDATE infrastructure_details
                SET classroom_deficit_ratio = ?1,
                    teacher_deficit_ratio = ?2,
                    enrolment_growth_rate = ?3,
                    risk_score = ?4,
                    risk_level = ?5
                WHERE school_id = ?6 AND academic_year = ?7
                "#,
                params![
                    u.classroom_deficit_ratio,
                    u.teacher_deficit_ratio,
                    u.enrolment_growth_rate,
                    u.risk_score,
                    u.risk_level.to_db_str(),
                    u.school_id,
                    academic_year,
                ],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    pub fn find_by_key(
        &self,
        school_id: &str,
        academic_year: &str,
    ) -> RepositoryResult<Option<InfrastructureRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1 AND academic_year = ?2",
            "",
        ))?;

        match stmt.query_row(params![school_id, academic_year], row_to_record) {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_year(&self, academic_year: &str) -> RepositoryResult<Vec<InfrastructureRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE academic_year = ?1",
            "ORDER BY school_id",
        ))?;

        let records = stmt
            .query_map(params![academic_year], row_to_record)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// A school's rows in chronological order.
    pub fn find_by_school(&self, school_id: &str) -> RepositoryResult<Vec<InfrastructureRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql(
            "WHERE school_id = ?1",
            "ORDER BY academic_year",
        ))?;

        let records = stmt
            .query_map(params![school_id], row_to_record)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// Every row ordered (school_id, academic_year). The trend and
    /// prioritisation engines walk this grouped per school.
    pub fn find_all_ordered(&self) -> RepositoryResult<Vec<InfrastructureRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql("", "ORDER BY school_id, academic_year"))?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    pub fn distinct_years(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT academic_year FROM infrastructure_details ORDER BY academic_year",
        )?;
        let years = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(years)
    }

    /// Years that already carry a risk score — the population the
    /// downstream stages operate on.
    pub fn years_with_risk(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT academic_year FROM infrastructure_details
             WHERE risk_score IS NOT NULL ORDER BY academic_year",
        )?;
        let years = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(years)
    }

    pub fn latest_year(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let year: Option<String> = conn.query_row(
            "SELECT MAX(academic_year) FROM infrastructure_details",
            [],
            |row| row.get(0),
        )?;
        Ok(year)
    }
}

// ==========================================
// SQL + row mapping helpers
// ==========================================

const COLUMNS: &str = "school_id, academic_year, \
    total_class_rooms, usable_class_rooms, classroom_condition_score, \
    drinking_water_available, electricity_available, internet_available, \
    separate_girls_toilet, ramp_available, building_condition, \
    required_class_rooms, classroom_gap, \
    classroom_deficit_ratio, teacher_deficit_ratio, enrolment_growth_rate, \
    risk_score, risk_level";

fn select_sql(where_clause: &str, order_clause: &str) -> String {
    format!(
        "SELECT {} FROM infrastructure_details {} {}",
        COLUMNS, where_clause, order_clause
    )
}

fn row_to_record(row: &Row<'_>) -> SqliteResult<InfrastructureRecord> {
    let risk_level: Option<String> = row.get(17)?;
    Ok(InfrastructureRecord {
        school_id: row.get(0)?,
        academic_year: row.get(1)?,
        total_class_rooms: row.get(2)?,
        usable_class_rooms: row.get(3)?,
        classroom_condition_score: row.get(4)?,
        drinking_water_available: row.get(5)?,
        electricity_available: row.get(6)?,
        internet_available: row.get(7)?,
        separate_girls_toilet: row.get(8)?,
        ramp_available: row.get(9)?,
        building_condition: row.get(10)?,
        required_class_rooms: row.get(11)?,
        classroom_gap: row.get(12)?,
        classroom_deficit_ratio: row.get(13)?,
        teacher_deficit_ratio: row.get(14)?,
        enrolment_growth_rate: row.get(15)?,
        risk_score: row.get(16)?,
        risk_level: risk_level.map(|s| RiskLevel::from_db_str(&s)),
    })
}
