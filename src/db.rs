// ==========================================
// School Infrastructure Compliance DSS - SQLite Connection Init
// ==========================================
// Goals:
// - One place for Connection::open PRAGMA behavior, so no module runs
//   with foreign keys off while another runs with them on
// - Unified busy_timeout to absorb occasional write contention
// - Idempotent schema bootstrap (CREATE TABLE IF NOT EXISTS)
// ==========================================

use rusqlite::{Connection, OptionalExtension};
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version written by `bootstrap_schema`.
///
/// Used for warning only (no automatic migration) so the pipeline never
/// silently runs against an older database layout.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// re-applied on every open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create all fact and derived tables plus indexes.
///
/// Safe to run repeatedly. Fact tables are keyed by
/// (school_id, academic_year); derived tables are fully rebuilt by the
/// pipeline, so their rows carry no cross-run state.
pub fn bootstrap_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER NOT NULL,
            applied_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS schools (
            school_id        TEXT PRIMARY KEY,
            school_name      TEXT NOT NULL,
            district         TEXT NOT NULL,
            block            TEXT,
            school_category  INTEGER NOT NULL,
            management_type  TEXT
        );

        CREATE TABLE IF NOT EXISTS yearly_metrics (
            school_id        TEXT NOT NULL,
            academic_year    TEXT NOT NULL,
            total_enrolment  INTEGER NOT NULL,
            PRIMARY KEY (school_id, academic_year)
        );

        CREATE TABLE IF NOT EXISTS infrastructure_details (
            school_id                 TEXT NOT NULL,
            academic_year             TEXT NOT NULL,
            -- facts
            total_class_rooms         INTEGER,
            usable_class_rooms        INTEGER,
            classroom_condition_score REAL,
            drinking_water_available  INTEGER,
            electricity_available     INTEGER,
            internet_available        INTEGER,
            separate_girls_toilet     INTEGER,
            ramp_available            INTEGER,
            building_condition        TEXT,
            -- computed (overwritten on every pipeline run)
            required_class_rooms      INTEGER,
            classroom_gap             INTEGER,
            classroom_deficit_ratio   REAL,
            teacher_deficit_ratio     REAL,
            enrolment_growth_rate     REAL,
            risk_score                REAL,
            risk_level                TEXT,
            PRIMARY KEY (school_id, academic_year)
        );

        CREATE TABLE IF NOT EXISTS teacher_metrics (
            school_id         TEXT NOT NULL,
            academic_year     TEXT NOT NULL,
            total_teachers    INTEGER,
            required_teachers INTEGER,
            teacher_gap       INTEGER,
            PRIMARY KEY (school_id, academic_year)
        );

        CREATE TABLE IF NOT EXISTS risk_trend (
            school_id            TEXT NOT NULL,
            academic_year        TEXT NOT NULL,
            risk_score           REAL NOT NULL,
            prev_risk_score      REAL,
            risk_delta           REAL,
            trend_direction      TEXT NOT NULL,
            year_over_year_count INTEGER NOT NULL,
            chronic_risk_flag    INTEGER NOT NULL DEFAULT 0,
            volatile_flag        INTEGER NOT NULL DEFAULT 0,
            cumulative_avg_risk  REAL NOT NULL,
            PRIMARY KEY (school_id, academic_year)
        );

        CREATE TABLE IF NOT EXISTS school_priority_index (
            school_id                 TEXT NOT NULL,
            academic_year             TEXT NOT NULL,
            risk_score                REAL NOT NULL,
            state_rank                INTEGER NOT NULL,
            district_rank             INTEGER NOT NULL,
            priority_bucket           TEXT NOT NULL,
            persistent_high_risk_flag INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (school_id, academic_year)
        );

        CREATE TABLE IF NOT EXISTS district_compliance_index (
            district                TEXT NOT NULL,
            academic_year           TEXT NOT NULL,
            total_schools           INTEGER NOT NULL,
            avg_risk_score          REAL NOT NULL,
            pct_high_critical       REAL NOT NULL,
            total_classroom_deficit INTEGER NOT NULL,
            total_teacher_deficit   INTEGER NOT NULL,
            total_enrolment         INTEGER NOT NULL,
            avg_classroom_condition REAL,
            yoy_risk_improvement    REAL,
            district_rank           INTEGER,
            compliance_grade        TEXT NOT NULL,
            PRIMARY KEY (district, academic_year)
        );

        CREATE TABLE IF NOT EXISTS budget_simulation (
            school_id            TEXT NOT NULL,
            academic_year        TEXT NOT NULL,
            risk_level           TEXT NOT NULL,
            classroom_gap        INTEGER NOT NULL DEFAULT 0,
            teacher_gap          INTEGER NOT NULL DEFAULT 0,
            classrooms_allocated INTEGER NOT NULL DEFAULT 0,
            teachers_allocated   INTEGER NOT NULL DEFAULT 0,
            classroom_resolved   INTEGER NOT NULL DEFAULT 0,
            teacher_resolved     INTEGER NOT NULL DEFAULT 0,
            allocation_priority  INTEGER NOT NULL,
            PRIMARY KEY (school_id, academic_year)
        );

        CREATE TABLE IF NOT EXISTS enrolment_forecast (
            school_id                TEXT NOT NULL,
            base_year                TEXT NOT NULL,
            forecast_year            TEXT NOT NULL,
            years_ahead              INTEGER NOT NULL,
            base_enrolment           INTEGER NOT NULL,
            avg_growth_rate          REAL NOT NULL,
            projected_enrolment      INTEGER NOT NULL,
            projected_classrooms_req INTEGER NOT NULL,
            projected_teachers_req   INTEGER NOT NULL,
            current_classrooms       INTEGER NOT NULL,
            current_teachers         INTEGER NOT NULL,
            projected_classroom_gap  INTEGER NOT NULL,
            projected_teacher_gap    INTEGER NOT NULL,
            school_category          INTEGER NOT NULL,
            PRIMARY KEY (school_id, base_year, years_ahead)
        );

        CREATE TABLE IF NOT EXISTS school_proposals (
            proposal_id          TEXT PRIMARY KEY,
            school_id            TEXT NOT NULL,
            academic_year        TEXT NOT NULL,
            classrooms_requested INTEGER NOT NULL DEFAULT 0,
            teachers_requested   INTEGER NOT NULL DEFAULT 0,
            justification        TEXT,
            submitted_by         TEXT,
            submitted_at         TEXT NOT NULL,
            actual_classroom_gap INTEGER NOT NULL DEFAULT 0,
            actual_teacher_gap   INTEGER NOT NULL DEFAULT 0,
            classroom_ratio      REAL,
            teacher_ratio        REAL,
            decision_status      TEXT NOT NULL,
            reason_code          TEXT NOT NULL,
            confidence_score     REAL NOT NULL,
            validated_at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_yearly_school_year
            ON yearly_metrics (school_id, academic_year);
        CREATE INDEX IF NOT EXISTS idx_infra_year
            ON infrastructure_details (academic_year);
        CREATE INDEX IF NOT EXISTS idx_teacher_year
            ON teacher_metrics (academic_year);
        CREATE INDEX IF NOT EXISTS idx_trend_direction
            ON risk_trend (academic_year, trend_direction);
        CREATE INDEX IF NOT EXISTS idx_priority_year
            ON school_priority_index (academic_year, state_rank);
        CREATE INDEX IF NOT EXISTS idx_dci_rank
            ON district_compliance_index (academic_year, district_rank);
        CREATE INDEX IF NOT EXISTS idx_budget_priority
            ON budget_simulation (academic_year, allocation_priority);
        CREATE INDEX IF NOT EXISTS idx_forecast_year
            ON enrolment_forecast (forecast_year, years_ahead);
        CREATE INDEX IF NOT EXISTS idx_proposals_school_year
            ON school_proposals (school_id, academic_year);
        "#,
    )?;

    let current = read_schema_version(conn)?;
    if current.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        bootstrap_schema(&conn).unwrap();
        bootstrap_schema(&conn).unwrap();

        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
