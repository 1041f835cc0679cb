// ==========================================
// Fact Importer integration tests
// ==========================================
// Target: CSV ingestion into the four fact tables
// Coverage: header normalisation, legacy id alias, malformed-row
//           skipping, end-to-end into the pipeline
// ==========================================

mod common;

use common::*;
use school_infra_dss::importer::FactImporter;
use std::fs;
use std::path::PathBuf;

fn write_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write csv fixture");
    path
}

#[test]
fn test_import_schools_with_legacy_id_header() {
    let (dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    // legacy extract header: "pseudocode" instead of school_id, mixed
    // casing and spaces
    let path = write_file(
        dir.path(),
        "schools.csv",
        "Pseudocode,School Name,District,Block,School Category,Management Type\n\
         AP001,ZPHS Main,GUNTUR,BLOCK-1,1,Local Body\n\
         AP002,MPPS Branch,GUNTUR,BLOCK-2,4,Local Body\n",
    );

    let importer = FactImporter::new(&repos);
    let report = importer.import_schools(&path).unwrap();

    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_skipped, 0);

    let school = repos.schools.find_by_id("AP001").unwrap().unwrap();
    assert_eq!(school.school_name, "ZPHS Main");
    assert_eq!(school.school_category, 1);
    assert_eq!(school.block.as_deref(), Some("BLOCK-1"));
}

#[test]
fn test_malformed_rows_are_skipped_not_fatal() {
    let (dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    let path = write_file(
        dir.path(),
        "yearly.csv",
        "school_id,academic_year,total_enrolment\n\
         AP001,2023-24,450\n\
         ,2023-24,100\n\
         AP003,2023-24,not_a_number\n\
         AP004,2023-24,320\n",
    );

    let importer = FactImporter::new(&repos);
    let report = importer.import_yearly_metrics(&path).unwrap();

    assert_eq!(report.rows_imported, 2);
    assert_eq!(report.rows_skipped, 2);
}

#[test]
fn test_missing_required_column_is_an_error() {
    let (dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    let path = write_file(
        dir.path(),
        "yearly_bad.csv",
        "school_id,total_enrolment\nAP001,450\n",
    );

    let importer = FactImporter::new(&repos);
    assert!(importer.import_yearly_metrics(&path).is_err());
}

#[test]
fn test_imported_facts_feed_the_pipeline() {
    let (dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    let schools = write_file(
        dir.path(),
        "schools.csv",
        "school_id,school_name,district,block,school_category,management_type\n\
         AP001,ZPHS Main,GUNTUR,BLOCK-1,1,Local Body\n",
    );
    let yearly = write_file(
        dir.path(),
        "yearly.csv",
        "school_id,academic_year,total_enrolment\nAP001,2023-24,900\n",
    );
    let infra = write_file(
        dir.path(),
        "infra.csv",
        "school_id,academic_year,total_class_rooms,usable_class_rooms,\
         classroom_condition_score,drinking_water_available,electricity_available\n\
         AP001,2023-24,27,25,3.5,1,yes\n",
    );
    let teachers = write_file(
        dir.path(),
        "teachers.csv",
        "school_id,academic_year,total_teachers\nAP001,2023-24,20\n",
    );

    let importer = FactImporter::new(&repos);
    importer.import_schools(&schools).unwrap();
    importer.import_yearly_metrics(&yearly).unwrap();
    importer.import_infrastructure(&infra).unwrap();
    importer.import_teacher_metrics(&teachers).unwrap();

    // facility flags survive ingestion
    let record = repos
        .infrastructure
        .find_by_key("AP001", "2023-24")
        .unwrap()
        .unwrap();
    assert_eq!(record.usable_class_rooms, Some(25));
    assert_eq!(record.drinking_water_available, Some(true));
    assert_eq!(record.electricity_available, Some(true));
    assert_eq!(record.classroom_condition_score, Some(3.5));

    // and the pipeline runs end to end on imported facts
    let orch = orchestrator(&db_path);
    orch.run_full().unwrap();

    let computed = repos
        .infrastructure
        .find_by_key("AP001", "2023-24")
        .unwrap()
        .unwrap();
    assert_eq!(computed.required_class_rooms, Some(30));
    assert_eq!(computed.classroom_gap, Some(5));
    assert_eq!(computed.risk_score, Some(0.2083));
}
