// ==========================================
// School Infrastructure Compliance DSS - Fact Table Importer
// ==========================================
// Loads column-normalised CSV extracts into the four fact tables.
// Headers are normalised (lowercase, separators to underscores) and the
// legacy school-id aliases ("pseudocode"/"psuedocode") are accepted.
// Rows missing a school id or an unparseable key field are skipped and
// counted, never fatal. Derived columns are never written here.
// ==========================================

use crate::domain::metrics::{InfrastructureRecord, TeacherMetric, YearlyMetric};
use crate::domain::school::School;
use crate::engine::repositories::PipelineRepositories;
use crate::importer::error::{ImporterError, ImporterResult};
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

// ==========================================
// ImportReport - per-file outcome
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub batch_id: String,
    pub file: String,
    pub rows_imported: usize,
    pub rows_skipped: usize,
}

// ==========================================
// FactImporter
// ==========================================
pub struct FactImporter<'a> {
    repos: &'a PipelineRepositories,
}

impl<'a> FactImporter<'a> {
    pub fn new(repos: &'a PipelineRepositories) -> Self {
        Self { repos }
    }

    /// schools.csv: school_id, school_name, district, block,
    /// school_category, management_type
    pub fn import_schools(&self, path: &Path) -> ImporterResult<ImportReport> {
        let (headers, records) = read_csv(path)?;
        let file = path.display().to_string();

        let id_col = school_id_column(&headers).ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "school_id",
        })?;
        let name_col = column(&headers, "school_name");
        let district_col = column(&headers, "district").ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "district",
        })?;
        let block_col = column(&headers, "block");
        let category_col =
            column(&headers, "school_category").ok_or(ImporterError::MissingColumn {
                file: file.clone(),
                column: "school_category",
            })?;
        let mgmt_col = column(&headers, "management_type");

        let mut schools = Vec::new();
        let mut skipped = 0;
        for record in &records {
            let school_id = field(record, Some(id_col));
            if school_id.is_empty() {
                skipped += 1;
                continue;
            }
            let category = match field(record, Some(category_col)).parse::<i64>() {
                Ok(c) => c,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            schools.push(School {
                school_id: school_id.to_string(),
                school_name: field(record, name_col).to_string(),
                district: field(record, Some(district_col)).to_string(),
                block: optional(field(record, block_col)),
                school_category: category,
                management_type: optional(field(record, mgmt_col)),
            });
        }

        let imported = self.repos.schools.batch_upsert(&schools)?;
        Ok(self.report(file, imported, skipped))
    }

    /// yearly_metrics.csv: school_id, academic_year, total_enrolment
    pub fn import_yearly_metrics(&self, path: &Path) -> ImporterResult<ImportReport> {
        let (headers, records) = read_csv(path)?;
        let file = path.display().to_string();

        let id_col = school_id_column(&headers).ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "school_id",
        })?;
        let year_col = column(&headers, "academic_year").ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "academic_year",
        })?;
        let enrolment_col =
            column(&headers, "total_enrolment").ok_or(ImporterError::MissingColumn {
                file: file.clone(),
                column: "total_enrolment",
            })?;

        let mut metrics = Vec::new();
        let mut skipped = 0;
        for record in &records {
            let school_id = field(record, Some(id_col));
            let year = field(record, Some(year_col));
            let enrolment = field(record, Some(enrolment_col)).parse::<i64>();
            match (school_id.is_empty() || year.is_empty(), enrolment) {
                (false, Ok(total_enrolment)) => metrics.push(YearlyMetric {
                    school_id: school_id.to_string(),
                    academic_year: year.to_string(),
                    total_enrolment,
                }),
                _ => skipped += 1,
            }
        }

        let imported = self.repos.yearly.batch_upsert(&metrics)?;
        Ok(self.report(file, imported, skipped))
    }

    /// infrastructure.csv: school_id, academic_year, total_class_rooms,
    /// usable_class_rooms, plus optional facility columns
    pub fn import_infrastructure(&self, path: &Path) -> ImporterResult<ImportReport> {
        let (headers, records) = read_csv(path)?;
        let file = path.display().to_string();

        let id_col = school_id_column(&headers).ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "school_id",
        })?;
        let year_col = column(&headers, "academic_year").ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "academic_year",
        })?;
        let total_col = column(&headers, "total_class_rooms");
        let usable_col = column(&headers, "usable_class_rooms");
        let condition_col = column(&headers, "classroom_condition_score");
        let water_col = column(&headers, "drinking_water_available");
        let electricity_col = column(&headers, "electricity_available");
        let internet_col = column(&headers, "internet_available");
        let girls_toilet_col = column(&headers, "separate_girls_toilet");
        let ramp_col = column(&headers, "ramp_available");
        let building_col = column(&headers, "building_condition");

        let mut rows = Vec::new();
        let mut skipped = 0;
        for record in &records {
            let school_id = field(record, Some(id_col));
            let year = field(record, Some(year_col));
            if school_id.is_empty() || year.is_empty() {
                skipped += 1;
                continue;
            }
            let mut row = InfrastructureRecord::from_facts(
                school_id,
                year,
                parse_int(field(record, total_col)),
                parse_int(field(record, usable_col)),
            );
            row.classroom_condition_score = parse_float(field(record, condition_col));
            row.drinking_water_available = parse_bool(field(record, water_col));
            row.electricity_available = parse_bool(field(record, electricity_col));
            row.internet_available = parse_bool(field(record, internet_col));
            row.separate_girls_toilet = parse_bool(field(record, girls_toilet_col));
            row.ramp_available = parse_bool(field(record, ramp_col));
            row.building_condition = optional(field(record, building_col));
            rows.push(row);
        }

        let imported = self.repos.infrastructure.batch_upsert_facts(&rows)?;
        Ok(self.report(file, imported, skipped))
    }

    /// teacher_metrics.csv: school_id, academic_year, total_teachers
    pub fn import_teacher_metrics(&self, path: &Path) -> ImporterResult<ImportReport> {
        let (headers, records) = read_csv(path)?;
        let file = path.display().to_string();

        let id_col = school_id_column(&headers).ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "school_id",
        })?;
        let year_col = column(&headers, "academic_year").ok_or(ImporterError::MissingColumn {
            file: file.clone(),
            column: "academic_year",
        })?;
        let teachers_col = column(&headers, "total_teachers");

        let mut rows = Vec::new();
        let mut skipped = 0;
        for record in &records {
            let school_id = field(record, Some(id_col));
            let year = field(record, Some(year_col));
            if school_id.is_empty() || year.is_empty() {
                skipped += 1;
                continue;
            }
            rows.push(TeacherMetric::from_facts(
                school_id,
                year,
                parse_int(field(record, teachers_col)),
            ));
        }

        let imported = self.repos.teachers.batch_upsert_facts(&rows)?;
        Ok(self.report(file, imported, skipped))
    }

    fn report(&self, file: String, rows_imported: usize, rows_skipped: usize) -> ImportReport {
        let report = ImportReport {
            batch_id: Uuid::new_v4().to_string(),
            file,
            rows_imported,
            rows_skipped,
        };
        if report.rows_skipped > 0 {
            warn!(
                file = %report.file,
                skipped = report.rows_skipped,
                "import skipped malformed rows"
            );
        }
        info!(
            file = %report.file,
            batch_id = %report.batch_id,
            rows = report.rows_imported,
            "fact file imported"
        );
        report
    }
}

// ==========================================
// CSV helpers
// ==========================================

/// Normalise a header the way the extracts are produced: trim,
/// lowercase, separators to underscores.
fn normalise_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace([' ', '-', '/'], "_")
}

fn read_csv(path: &Path) -> ImporterResult<(HashMap<String, usize>, Vec<StringRecord>)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (normalise_header(h), i))
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }
    Ok((headers, records))
}

fn column(headers: &HashMap<String, usize>, name: &str) -> Option<usize> {
    headers.get(name).copied()
}

/// The school-id column under its current name or a legacy alias.
fn school_id_column(headers: &HashMap<String, usize>) -> Option<usize> {
    column(headers, "school_id")
        .or_else(|| column(headers, "pseudocode"))
        .or_else(|| column(headers, "psuedocode"))
}

fn field<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.parse().ok()
}

fn parse_float(value: &str) -> Option<f64> {
    value.parse().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
