//! Users: the Telegram identity every other row is scoped by.

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::AppResult;

/// A registered bot user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Telegram chat ID of the user
    pub telegram_id: i64,
    /// Display name captured on first contact
    pub name: Option<String>,
    pub created_at: String,
}

/// Registers the user if they are not known yet.
///
/// Returns `true` when a new row was inserted. An existing user's name is
/// left untouched.
pub fn ensure_user(conn: &Connection, telegram_id: i64, name: Option<&str>) -> AppResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (telegram_id, name) VALUES (?1, ?2)",
        params![telegram_id, name],
    )?;
    if inserted > 0 {
        log::info!("Registered new user {}", telegram_id);
    }
    Ok(inserted > 0)
}

/// Fetches a user by Telegram ID.
pub fn get_user(conn: &Connection, telegram_id: i64) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT telegram_id, name, created_at FROM users WHERE telegram_id = ?1",
            params![telegram_id],
            |row| {
                Ok(User {
                    telegram_id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::run_migrations;

    fn make_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    #[test]
    fn ensure_user_inserts_once() {
        let conn = make_conn();
        assert!(ensure_user(&conn, 42, Some("Anna")).unwrap());
        assert!(!ensure_user(&conn, 42, Some("Other")).unwrap());

        let user = get_user(&conn, 42).unwrap().expect("user must exist");
        assert_eq!(user.name.as_deref(), Some("Anna"));
    }

    #[test]
    fn get_user_returns_none_for_unknown() {
        let conn = make_conn();
        assert!(get_user(&conn, 1).unwrap().is_none());
    }
}
