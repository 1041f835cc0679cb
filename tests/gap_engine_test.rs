// ==========================================
// Classroom Gap / Teacher Adequacy integration tests
// ==========================================
// Target: stage 1 and stage 2 against a real database
// Coverage: norm tables, ceiling division, left-join semantics,
//           targeted-year idempotent overwrite
// ==========================================

mod common;

use common::*;

#[test]
fn test_gap_stages_store_required_and_gap() {
    let (_dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    // the worked example: category 1, enrolment 900, 25 usable rooms,
    // 20 teachers
    seed_school(&repos, "S1", "GUNTUR", 1);
    seed_facts(&repos, "S1", "2023-24", 900, 25, 20);

    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    orch.run_teacher_adequacy("2023-24").unwrap();

    let infra = repos
        .infrastructure
        .find_by_key("S1", "2023-24")
        .unwrap()
        .unwrap();
    assert_eq!(infra.required_class_rooms, Some(30));
    assert_eq!(infra.classroom_gap, Some(5));

    let teacher = repos.teachers.find_by_key("S1", "2023-24").unwrap().unwrap();
    assert_eq!(teacher.required_teachers, Some(30));
    assert_eq!(teacher.teacher_gap, Some(10));
}

#[test]
fn test_norm_tables_diverge_for_category_5() {
    let (_dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    seed_school(&repos, "S5", "GUNTUR", 5);
    seed_facts(&repos, "S5", "2023-24", 700, 0, 0);

    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    orch.run_teacher_adequacy("2023-24").unwrap();

    let infra = repos
        .infrastructure
        .find_by_key("S5", "2023-24")
        .unwrap()
        .unwrap();
    // classroom norm 35 for category 5
    assert_eq!(infra.required_class_rooms, Some(20));

    let teacher = repos.teachers.find_by_key("S5", "2023-24").unwrap().unwrap();
    // PTR norm 30 for category 5
    assert_eq!(teacher.required_teachers, Some(24));
}

#[test]
fn test_gap_is_zero_for_surplus_capacity() {
    let (_dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    seed_school(&repos, "S1", "GUNTUR", 8);
    seed_facts(&repos, "S1", "2023-24", 80, 50, 50);

    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    orch.run_teacher_adequacy("2023-24").unwrap();

    let infra = repos
        .infrastructure
        .find_by_key("S1", "2023-24")
        .unwrap()
        .unwrap();
    assert_eq!(infra.classroom_gap, Some(0));
    let teacher = repos.teachers.find_by_key("S1", "2023-24").unwrap().unwrap();
    assert_eq!(teacher.teacher_gap, Some(0));
}

#[test]
fn test_rerun_targets_one_year_only() {
    let (_dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    seed_school(&repos, "S1", "GUNTUR", 1);
    seed_facts(&repos, "S1", "2022-23", 600, 10, 10);
    seed_facts(&repos, "S1", "2023-24", 900, 25, 20);

    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2022-23").unwrap();
    orch.run_classroom_gap("2023-24").unwrap();

    // replace the 2023-24 facts, re-run only that year
    seed_facts(&repos, "S1", "2023-24", 1200, 25, 20);
    orch.run_classroom_gap("2023-24").unwrap();

    let old = repos
        .infrastructure
        .find_by_key("S1", "2022-23")
        .unwrap()
        .unwrap();
    // untouched year keeps its values
    assert_eq!(old.required_class_rooms, Some(20));

    let new = repos
        .infrastructure
        .find_by_key("S1", "2023-24")
        .unwrap()
        .unwrap();
    assert_eq!(new.required_class_rooms, Some(40));
    assert_eq!(new.classroom_gap, Some(15));
}

#[test]
fn test_rerun_is_idempotent() {
    let (_dir, db_path) = setup_db();
    let repos = repositories(&db_path);

    seed_school(&repos, "S1", "GUNTUR", 1);
    seed_facts(&repos, "S1", "2023-24", 900, 25, 20);

    let orch = orchestrator(&db_path);
    orch.run_classroom_gap("2023-24").unwrap();
    let first = repos
        .infrastructure
        .find_by_key("S1", "2023-24")
        .unwrap()
        .unwrap();

    orch.run_classroom_gap("2023-24").unwrap();
    let second = repos
        .infrastructure
        .find_by_key("S1", "2023-24")
        .unwrap()
        .unwrap();

    assert_eq!(first.required_class_rooms, second.required_class_rooms);
    assert_eq!(first.classroom_gap, second.classroom_gap);
}
