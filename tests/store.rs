use registrar::database::{
    Course, Grade, NewStudent, ReportOrder, SchoolDatabase, StoreCounts, StoreError,
    StoreOptions, Student, StudentGradeRow, Upserted, SCHEMA_VERSION,
};
use tempfile::TempDir;

// Helper function to create a temporary directory and a database path inside it
fn temp_db_path() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir
        .path()
        .join("school_performance.db")
        .to_str()
        .unwrap()
        .to_string();
    (dir, path)
}

fn seed_ralph(db: &SchoolDatabase) {
    db.transaction(|s| {
        s.students()
            .upsert(&Student::new(4, "Ralph Bunche", "ralph.bunche@moringa.com"))?;
        s.courses()
            .upsert(&Course::new(4, "Python Programming", "Mr. White"))?;
        s.grades().upsert(&Grade::new(4, 4, "A"))
    })
    .unwrap();
}

#[test]
fn test_ralph_bunche_scenario() {
    let (_dir, path) = temp_db_path();
    let db = SchoolDatabase::open(&path).unwrap();
    seed_ralph(&db);

    let rows = db.reports().student_grades(ReportOrder::Unordered).unwrap();
    assert!(rows.contains(&StudentGradeRow {
        student_name: "Ralph Bunche".to_string(),
        course_name: "Python Programming".to_string(),
        grade: "A".to_string(),
    }));

    let courses = db.reports().student_courses(ReportOrder::Unordered).unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(
        courses[0].to_string(),
        "Student Name: Ralph Bunche, Course: Python Programming"
    );
}

#[test]
fn test_reopen_preserves_data() {
    let (_dir, path) = temp_db_path();
    {
        let db = SchoolDatabase::open(&path).unwrap();
        seed_ralph(&db);
    }

    let db = SchoolDatabase::open(&path).unwrap();
    assert!(db.is_current());
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    assert_eq!(
        db.counts().unwrap(),
        StoreCounts {
            students: 1,
            courses: 1,
            grades: 1
        }
    );
    assert_eq!(
        db.students().get(4).unwrap(),
        Some(Student::new(4, "Ralph Bunche", "ralph.bunche@moringa.com"))
    );
}

#[test]
fn test_newer_schema_is_rejected() {
    let (_dir, path) = temp_db_path();
    {
        let db = SchoolDatabase::open(&path).unwrap();
        db.connection()
            .execute(
                "UPDATE registrar_meta SET value = ?1 WHERE key = 'schema_version'",
                [(SCHEMA_VERSION + 1).to_string()],
            )
            .unwrap();
    }

    match SchoolDatabase::open(&path) {
        Err(StoreError::IncompatibleSchema { found, required }) => {
            assert_eq!(found, SCHEMA_VERSION + 1);
            assert_eq!(required, SCHEMA_VERSION);
        }
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("newer schema was accepted"),
    }
}

#[test]
fn test_missing_table_is_recreated() {
    let (_dir, path) = temp_db_path();
    {
        let db = SchoolDatabase::open(&path).unwrap();
        seed_ralph(&db);
        db.connection().execute("DROP TABLE grades", []).unwrap();
    }

    let db = SchoolDatabase::open(&path).unwrap();
    assert!(db.is_current());
    assert_eq!(db.students().count().unwrap(), 1);
    assert!(db.grades().is_empty());
}

#[test]
fn test_not_a_database_is_unavailable() {
    let (_dir, path) = temp_db_path();
    std::fs::write(&path, "not a sqlite file\n".repeat(256)).unwrap();

    let result = SchoolDatabase::open(&path);
    assert!(matches!(result, Err(StoreError::StoreUnavailable { .. })));
}

#[test]
fn test_grade_join_counts() {
    let (_dir, path) = temp_db_path();
    let db = SchoolDatabase::open(&path).unwrap();

    db.transaction(|s| {
        for (id, name) in [(1, "Alice Wanja"), (2, "Paul Victor"), (3, "Charlie Green")] {
            let email = format!("{}@moringa.com", name.to_lowercase().replace(' ', "."));
            s.students().upsert(&Student::new(id, name, &email))?;
        }
        s.courses()
            .upsert(&Course::new(101, "Mathematics", "Jane Smith"))?;
        s.courses().upsert(&Course::new(102, "Biology", "Mr. White"))?;
        for (sid, cid, g) in [(1, 101, "A"), (1, 102, "B"), (2, 101, "C"), (3, 101, "B")] {
            s.grades().upsert(&Grade::new(sid, cid, g))?;
        }
        Ok(())
    })
    .unwrap();

    assert_eq!(
        db.reports()
            .student_grades(ReportOrder::Unordered)
            .unwrap()
            .len(),
        4
    );
    assert_eq!(
        db.reports()
            .courses_for_student(1, ReportOrder::Sorted)
            .unwrap()
            .iter()
            .map(|r| r.course_name.as_str())
            .collect::<Vec<_>>(),
        vec!["Biology", "Mathematics"]
    );

    // replacing a grade keeps one row per pair
    db.grades().upsert(&Grade::new(2, 101, "B")).unwrap();
    assert_eq!(db.grades().count().unwrap(), 4);
    assert_eq!(db.grades().get(2, 101).unwrap().unwrap().grade, "B");
}

#[test]
fn test_dangling_grade_with_lenient_store() {
    let (_dir, path) = temp_db_path();
    let db = SchoolDatabase::open_with(&path, StoreOptions::lenient()).unwrap();
    seed_ralph(&db);

    // course 2 does not exist
    db.grades().upsert(&Grade::new(4, 2, "C")).unwrap();
    assert_eq!(db.grades().count().unwrap(), 2);
    assert_eq!(
        db.reports()
            .student_grades(ReportOrder::Unordered)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_dangling_grade_rejected_by_default() {
    let (_dir, path) = temp_db_path();
    let db = SchoolDatabase::open(&path).unwrap();
    seed_ralph(&db);

    let err = db.grades().upsert(&Grade::new(4, 2, "C")).unwrap_err();
    assert!(err.is_constraint_violation());
    assert_eq!(db.grades().count().unwrap(), 1);
}

#[test]
fn test_insert_if_absent_across_connections() {
    let (_dir, path) = temp_db_path();
    let first = SchoolDatabase::open(&path).unwrap();
    let second = SchoolDatabase::open(&path).unwrap();

    let john = NewStudent::new("John Doe", "john.doe@example.com");
    assert!(first.students().insert_if_absent(&john).unwrap().is_inserted());

    match second.students().insert_if_absent(&john).unwrap() {
        Upserted::Existing(s) => assert_eq!(s.student_name, "John Doe"),
        Upserted::Inserted(_) => panic!("duplicate student inserted"),
    }
    assert_eq!(first.students().count().unwrap(), 1);
}

#[test]
fn test_failed_transaction_leaves_no_rows_on_disk() {
    let (_dir, path) = temp_db_path();
    {
        let db = SchoolDatabase::open(&path).unwrap();
        let result = db.transaction(|s| {
            s.students()
                .upsert(&Student::new(1, "Alice Wanja", "alice.wanja@moringa.com"))?;
            s.students()
                .upsert(&Student::new(2, "Alice Again", "alice.wanja@moringa.com"))
        });
        assert!(result.unwrap_err().is_constraint_violation());
    }

    let db = SchoolDatabase::open(&path).unwrap();
    assert!(db.students().is_empty());
}
