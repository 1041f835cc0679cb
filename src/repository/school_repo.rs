// ==========================================
// School Infrastructure Compliance DSS - School Repository
// ==========================================
// Rule: no business logic, data access only
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::school::School;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SchoolRepository - schools table access
// ==========================================
pub struct SchoolRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SchoolRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build on top of an already-opened shared connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Batch upsert reference rows (INSERT OR REPLACE, one transaction).
    pub fn batch_upsert(&self, schools: &[School]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for school in schools {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO schools (
                    school_id, school_name, district, block,
                    school_category, management_type
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    school.school_id,
                    school.school_name,
                    school.district,
                    school.block,
                    school.school_category,
                    school.management_type,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    pub fn find_by_id(&self, school_id: &str) -> RepositoryResult<Option<School>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, school_name, district, block, school_category, management_type
             FROM schools WHERE school_id = ?1",
        )?;

        let result = stmt.query_row(params![school_id], row_to_school);
        match result {
            Ok(school) => Ok(Some(school)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All schools, keyed order (used by engines that need the full
    /// reference set in one pass).
    pub fn find_all(&self) -> RepositoryResult<Vec<School>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, school_name, district, block, school_category, management_type
             FROM schools ORDER BY school_id",
        )?;

        let schools = stmt
            .query_map([], row_to_school)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(schools)
    }

    pub fn find_by_district(&self, district: &str) -> RepositoryResult<Vec<School>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT school_id, school_name, district, block, school_category, management_type
             FROM schools WHERE district = ?1 ORDER BY school_id",
        )?;

        let schools = stmt
            .query_map(params![district], row_to_school)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(schools)
    }

    /// Search by id or name fragment (dashboard school lookup).
    pub fn search(&self, needle: &str, limit: i64) -> RepositoryResult<Vec<School>> {
        let conn = self.get_conn()?;
        let pattern = format!("%{}%", needle);
        let mut stmt = conn.prepare(
            "SELECT school_id, school_name, district, block, school_category, management_type
             FROM schools
             WHERE school_id LIKE ?1 OR school_name LIKE ?1
             ORDER BY school_id
             LIMIT ?2",
        )?;

        let schools = stmt
            .query_map(params![pattern, limit], row_to_school)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(schools)
    }

    pub fn list_districts(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT district FROM schools ORDER BY district")?;
        let districts = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(districts)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM schools", [], |row| row.get(0))?;
        Ok(n)
    }
}

// ==========================================
// Row mapping
// ==========================================

fn row_to_school(row: &Row<'_>) -> SqliteResult<School> {
    Ok(School {
        school_id: row.get(0)?,
        school_name: row.get(1)?,
        district: row.get(2)?,
        block: row.get(3)?,
        school_category: row.get(4)?,
        management_type: row.get(5)?,
    })
}
