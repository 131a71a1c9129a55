//! Subjects a user tracks grades for.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::AppResult;

/// A subject row. Always scoped to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
    })
}

/// Inserts a subject for `user_id` and returns it with its new ID.
pub fn create_subject(conn: &Connection, user_id: i64, name: &str) -> AppResult<Subject> {
    conn.execute(
        "INSERT INTO subjects (user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )?;
    Ok(Subject {
        id: conn.last_insert_rowid(),
        user_id,
        name: name.to_string(),
    })
}

/// Lists the user's subjects in creation order.
pub fn list_subjects(conn: &Connection, user_id: i64) -> AppResult<Vec<Subject>> {
    let mut stmt = conn.prepare("SELECT id, user_id, name FROM subjects WHERE user_id = ?1 ORDER BY id")?;
    let subjects = stmt
        .query_map(params![user_id], parse_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(subjects)
}

/// Fetches one subject, only if it belongs to `user_id`.
pub fn get_subject(conn: &Connection, user_id: i64, subject_id: i64) -> AppResult<Option<Subject>> {
    let subject = conn
        .query_row(
            "SELECT id, user_id, name FROM subjects WHERE id = ?1 AND user_id = ?2",
            params![subject_id, user_id],
            parse_row,
        )
        .optional()?;
    Ok(subject)
}

/// Finds the user's subject by name, ignoring ASCII case and surrounding whitespace.
///
/// Names are not unique; the oldest match wins.
pub fn find_subject_by_name(conn: &Connection, user_id: i64, name: &str) -> AppResult<Option<Subject>> {
    let subject = conn
        .query_row(
            "SELECT id, user_id, name FROM subjects
             WHERE user_id = ?1 AND lower(name) = lower(?2)
             ORDER BY id LIMIT 1",
            params![user_id, name.trim()],
            parse_row,
        )
        .optional()?;
    Ok(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;
    use pretty_assertions::assert_eq;

    fn make_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn create_and_list_in_order() {
        let conn = make_conn();
        create_subject(&conn, 1, "Math").unwrap();
        create_subject(&conn, 1, "Physics").unwrap();

        let names: Vec<String> = list_subjects(&conn, 1).unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Math".to_string(), "Physics".to_string()]);
    }

    #[test]
    fn subjects_are_private_to_their_owner() {
        let conn = make_conn();
        let math = create_subject(&conn, 1, "Math").unwrap();

        assert!(list_subjects(&conn, 2).unwrap().is_empty());
        assert!(get_subject(&conn, 2, math.id).unwrap().is_none());
        assert!(find_subject_by_name(&conn, 2, "Math").unwrap().is_none());
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let conn = make_conn();
        let math = create_subject(&conn, 1, "Math").unwrap();

        let found = find_subject_by_name(&conn, 1, "  math ").unwrap();
        assert_eq!(found, Some(math));
    }

    #[test]
    fn names_are_stored_verbatim() {
        let conn = make_conn();
        let tricky = "Robert'); DROP TABLE subjects;--";
        create_subject(&conn, 1, tricky).unwrap();

        let subjects = list_subjects(&conn, 1).unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].name, tricky);
    }
}
