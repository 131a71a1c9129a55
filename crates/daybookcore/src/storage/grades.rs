//! Grades and per-subject aggregates.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::core::error::{AppError, AppResult};

/// A grade row joined with its subject name for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub id: i64,
    pub user_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub term_id: Option<i64>,
    pub value: i64,
    pub grade_type: String,
    pub date: NaiveDate,
    /// Grades entered through the bot start unconfirmed
    pub confirmed: bool,
}

/// Fields needed to record a grade.
#[derive(Debug, Clone)]
pub struct NewGrade<'a> {
    pub subject_id: i64,
    pub term_id: Option<i64>,
    pub value: i64,
    pub grade_type: &'a str,
    pub date: NaiveDate,
}

/// Mean of a set of grades together with its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Average {
    pub mean: f64,
    pub count: i64,
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Grade> {
    Ok(Grade {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject_id: row.get(2)?,
        subject_name: row.get(3)?,
        term_id: row.get(4)?,
        value: row.get(5)?,
        grade_type: row.get(6)?,
        date: row.get(7)?,
        confirmed: row.get(8)?,
    })
}

/// Records a grade for `user_id` and returns the new row ID.
///
/// The insert selects from the user's own subjects (and terms), so a subject
/// or term that belongs to someone else writes nothing and yields
/// `AppError::NotFound`.
pub fn create_grade(conn: &Connection, user_id: i64, grade: &NewGrade<'_>) -> AppResult<i64> {
    let inserted = conn.execute(
        "INSERT INTO grades (user_id, subject_id, term_id, value, grade_type, date)
         SELECT ?1, s.id, ?3, ?4, ?5, ?6 FROM subjects s
         WHERE s.id = ?2 AND s.user_id = ?1
           AND (?3 IS NULL OR EXISTS (SELECT 1 FROM terms t WHERE t.id = ?3 AND t.user_id = ?1))",
        params![
            user_id,
            grade.subject_id,
            grade.term_id,
            grade.value,
            grade.grade_type,
            grade.date
        ],
    )?;
    if inserted == 0 {
        return Err(AppError::NotFound(format!(
            "subject {} or term {:?} for user {}",
            grade.subject_id, grade.term_id, user_id
        )));
    }
    Ok(conn.last_insert_rowid())
}

/// Lists the user's grades, newest first, optionally for a single subject.
pub fn list_grades(conn: &Connection, user_id: i64, subject_id: Option<i64>) -> AppResult<Vec<Grade>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.user_id, g.subject_id, s.name, g.term_id, g.value, g.grade_type, g.date, g.confirmed
         FROM grades g
         JOIN subjects s ON s.id = g.subject_id AND s.user_id = g.user_id
         WHERE g.user_id = ?1 AND (?2 IS NULL OR g.subject_id = ?2)
         ORDER BY g.date DESC, g.id DESC",
    )?;
    let grades = stmt
        .query_map(params![user_id, subject_id], parse_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(grades)
}

/// Counts the user's grades for a subject.
pub fn count_grades(conn: &Connection, user_id: i64, subject_id: i64) -> AppResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM grades WHERE user_id = ?1 AND subject_id = ?2",
        params![user_id, subject_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Arithmetic mean of the user's grades for a subject, optionally within one term.
///
/// Returns `None` when there is nothing to average.
pub fn average_grade(
    conn: &Connection,
    user_id: i64,
    subject_id: i64,
    term_id: Option<i64>,
) -> AppResult<Option<Average>> {
    let (mean, count): (Option<f64>, i64) = conn.query_row(
        "SELECT AVG(value), COUNT(*) FROM grades
         WHERE user_id = ?1 AND subject_id = ?2 AND (?3 IS NULL OR term_id = ?3)",
        params![user_id, subject_id, term_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(mean.map(|mean| Average { mean, count }))
}
