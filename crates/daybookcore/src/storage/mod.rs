//! SQLite persistence: connection pool, migrations and per-entity queries
//!
//! Every query takes the owning user's Telegram ID explicitly and binds all
//! values as parameters.

pub mod db;
pub mod grades;
pub mod migrations;
pub mod subjects;
pub mod terms;
pub mod users;

// Re-exports for convenience
pub use db::{create_memory_pool, create_pool, get_connection, DbConnection, DbPool};
pub use grades::{average_grade, count_grades, create_grade, list_grades, Average, Grade, NewGrade};
pub use subjects::{create_subject, find_subject_by_name, get_subject, list_subjects, Subject};
pub use terms::{create_term, current_term, list_terms, Term};
pub use users::{ensure_user, get_user, User};
