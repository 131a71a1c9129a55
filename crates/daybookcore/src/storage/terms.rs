//! Academic terms used to group grades.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::AppResult;

/// A term row. Always scoped to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Term {
    /// Whether `day` falls inside the term (both ends inclusive).
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Term> {
    Ok(Term {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
    })
}

/// Inserts a term for `user_id` and returns it with its new ID.
pub fn create_term(
    conn: &Connection,
    user_id: i64,
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> AppResult<Term> {
    conn.execute(
        "INSERT INTO terms (user_id, name, start_date, end_date) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, start_date, end_date],
    )?;
    Ok(Term {
        id: conn.last_insert_rowid(),
        user_id,
        name: name.to_string(),
        start_date,
        end_date,
    })
}

/// Lists the user's terms, most recent start date first.
pub fn list_terms(conn: &Connection, user_id: i64) -> AppResult<Vec<Term>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, start_date, end_date FROM terms
         WHERE user_id = ?1 ORDER BY start_date DESC, id DESC",
    )?;
    let terms = stmt
        .query_map(params![user_id], parse_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(terms)
}

/// Returns the user's term covering `today`, if any.
///
/// Overlapping terms are allowed; the one that started last wins.
pub fn current_term(conn: &Connection, user_id: i64, today: NaiveDate) -> AppResult<Option<Term>> {
    let term = conn
        .query_row(
            "SELECT id, user_id, name, start_date, end_date FROM terms
             WHERE user_id = ?1 AND start_date <= ?2 AND end_date >= ?2
             ORDER BY start_date DESC, id DESC LIMIT 1",
            params![user_id, today],
            parse_row,
        )
        .optional()?;
    Ok(term)
}
