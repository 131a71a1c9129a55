//! Integration tests for the persistence gateway through a pooled connection
//!
//! Run with: cargo test -p daybookcore --test storage_test

use chrono::NaiveDate;
use daybookcore::config::grades::DEFAULT_TYPE;
use daybookcore::storage::{
    average_grade, create_grade, create_memory_pool, create_subject, create_term, ensure_user, get_connection,
    list_grades, list_subjects, list_terms, NewGrade,
};
use pretty_assertions::assert_eq;

const ALICE: i64 = 1001;
const BOB: i64 = 2002;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn users_never_see_each_others_rows() {
    let pool = create_memory_pool().unwrap();
    let conn = get_connection(&pool).unwrap();

    ensure_user(&conn, ALICE, Some("Alice")).unwrap();
    ensure_user(&conn, BOB, Some("Bob")).unwrap();

    let math = create_subject(&conn, ALICE, "Math").unwrap();
    create_subject(&conn, BOB, "Biology").unwrap();
    create_term(&conn, ALICE, "Fall", day(2023, 9, 1), day(2023, 12, 31)).unwrap();
    create_grade(
        &conn,
        ALICE,
        &NewGrade {
            subject_id: math.id,
            term_id: None,
            value: 11,
            grade_type: DEFAULT_TYPE,
            date: day(2023, 9, 15),
        },
    )
    .unwrap();

    let bob_subjects: Vec<String> = list_subjects(&conn, BOB).unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(bob_subjects, vec!["Biology".to_string()]);
    assert!(list_terms(&conn, BOB).unwrap().is_empty());
    assert!(list_grades(&conn, BOB, None).unwrap().is_empty());
    assert_eq!(average_grade(&conn, BOB, math.id, None).unwrap(), None);

    let alice_avg = average_grade(&conn, ALICE, math.id, None).unwrap().unwrap();
    assert_eq!(alice_avg.count, 1);
    assert_eq!(alice_avg.mean, 11.0);
}

#[test]
fn math_four_and_five_average_four_and_a_half() {
    let pool = create_memory_pool().unwrap();
    let conn = get_connection(&pool).unwrap();

    let math = create_subject(&conn, ALICE, "Math").unwrap();
    for value in [4, 5] {
        create_grade(
            &conn,
            ALICE,
            &NewGrade {
                subject_id: math.id,
                term_id: None,
                value,
                grade_type: DEFAULT_TYPE,
                date: day(2024, 4, 1),
            },
        )
        .unwrap();
    }

    let avg = average_grade(&conn, ALICE, math.id, None).unwrap().unwrap();
    assert_eq!(avg.mean, 4.5);
    assert_eq!(avg.count, 2);
}
