//! User-facing texts and list formatting

use indoc::indoc;

use daybookcore::config::grades;
use daybookcore::storage::{Average, Grade, Term};

pub const HELP: &str = indoc! {"
    📚 Marks E-Daybook Commands:

    📝 Subject Management:
    /add_subject - Add a new subject
    /list_subjects - List all your subjects

    📊 Grade Management:
    /add_grade - Add a new grade
    /view_grades - View your grades
    /average - Calculate average grades

    📅 Terms:
    /add_term - Add a new academic term
    /list_terms - List all terms

    ❓ Other:
    /help - Show this help message
    /cancel - Cancel current operation
"};

pub const IDLE_HINT: &str = "I don't understand that. Use /help to see available commands.";
pub const CANCELLED: &str = "Operation cancelled.";
pub const STORAGE_FAILURE: &str = "⚠️ Something went wrong while saving or loading your data. Please try again later.";

pub const ASK_SUBJECT_NAME: &str = "Please enter the name of the subject:";
pub const ASK_TERM_NAME: &str = "Please enter the name of the term (e.g., 'Fall 2023'):";
pub const ASK_TERM_START: &str = "Enter start date (YYYY-MM-DD):";
pub const ASK_TERM_END: &str = "Enter end date (YYYY-MM-DD):";
pub const ASK_GRADE_SUBJECT: &str = "Select a subject for the grade:";
pub const ASK_GRADE_TERM: &str = "Select the term for this grade, or Skip to use the current term:";
pub const ASK_VIEW_SUBJECT: &str = "Select a subject to view grades:";
pub const UNKNOWN_CHOICE: &str = "Please pick one of the options below.";

pub const NO_SUBJECTS: &str = "You don't have any subjects yet. Use /add_subject to add one.";
pub const NO_SUBJECTS_FOR_GRADE: &str = "You need to add subjects first. Use /add_subject.";
pub const NO_TERMS: &str = "You don't have any terms yet. Use /add_term to add one.";

/// Choice label for "no particular subject" in /view_grades
pub const ALL_SUBJECTS: &str = "All subjects";
/// Choice label for "use the current term" in /add_grade
pub const SKIP: &str = "Skip";

pub fn ask_grade_value() -> String {
    format!(
        "Enter the grade value ({}-{}):",
        grades::MIN_VALUE,
        grades::MAX_VALUE
    )
}

pub fn welcome(name: &str, is_new: bool) -> String {
    if is_new {
        format!("Welcome to Marks E-Daybook, {}!\n\nUse /help to see available commands.", name)
    } else {
        format!("Welcome back, {}!\n\nUse /help to see available commands.", name)
    }
}

pub fn subject_not_found(name: &str) -> String {
    format!("Subject '{}' not found. Use /list_subjects to see your subjects.", name)
}

/// Formats a mean with at most two decimals and no trailing zeros: 4.5, 5, 4.33.
pub fn format_mean(mean: f64) -> String {
    let fixed = format!("{:.2}", mean);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn subject_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut text = String::from("📚 Your Subjects:\n\n");
    for (i, name) in names.into_iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, name));
    }
    text
}

pub fn term_list(terms: &[Term]) -> String {
    let mut text = String::from("📅 Your Terms:\n\n");
    for term in terms {
        text.push_str(&format!("• {}: {} - {}\n", term.name, term.start_date, term.end_date));
    }
    text
}

/// Lists at most `grades::VIEW_LIMIT` grades, newest first as given.
pub fn grade_list(title: &str, grades: &[Grade]) -> String {
    if grades.is_empty() {
        return format!("No grades found for {}.", title);
    }

    let mut text = format!("📊 Grades for {}:\n\n", title);
    for grade in grades.iter().take(grades::VIEW_LIMIT) {
        text.push_str(&format!(
            "• {}: {} ({}) - {}\n",
            grade.subject_name, grade.value, grade.grade_type, grade.date
        ));
    }
    if grades.len() > grades::VIEW_LIMIT {
        text.push_str(&format!("\n... and {} more grades", grades.len() - grades::VIEW_LIMIT));
    }
    text
}

fn average_line(name: &str, average: Option<Average>) -> String {
    match average {
        Some(avg) => format!("• {}: {} (from {} grades)\n", name, format_mean(avg.mean), avg.count),
        None => format!("• {}: No grades yet\n", name),
    }
}

pub fn average_overview(rows: &[(String, Option<Average>)]) -> String {
    let mut text = String::from("📈 Average Grades:\n\n");
    for (name, average) in rows {
        text.push_str(&average_line(name, *average));
    }
    text
}

pub fn single_average(name: &str, average: Option<Average>) -> String {
    format!("📈 Average Grade:\n\n{}", average_line(name, average))
}
