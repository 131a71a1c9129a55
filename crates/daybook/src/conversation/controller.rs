//! Conversation controller: routes commands and answers through the per-user state machine

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use dashmap::DashMap;

use daybookcore::config::grades;
use daybookcore::core::validation::{parse_date, parse_end_date, parse_grade_value, validate_name, InputError};
use daybookcore::storage::{self, get_connection, DbPool, NewGrade, Subject, Term};
use daybookcore::AppResult;

use super::messages;
use super::reply::{Reply, ReplyKeyboard};
use super::state::{ConversationState, SubjectRef, TermRef};
use crate::telegram::bot::Command;

/// Sender of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    /// Telegram chat ID; every stored row is keyed by it
    pub id: i64,
    pub first_name: Option<String>,
}

impl ChatUser {
    pub fn new(id: i64, first_name: Option<String>) -> Self {
        Self { id, first_name }
    }

    fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or("Unknown")
    }
}

/// Reply to send plus the state to move into.
struct Outcome {
    reply: Reply,
    next: ConversationState,
}

impl Outcome {
    fn idle(reply: Reply) -> Self {
        Self {
            reply,
            next: ConversationState::Idle,
        }
    }

    fn then(reply: Reply, next: ConversationState) -> Self {
        Self { reply, next }
    }
}

/// Owns every user's conversation state and talks to storage on their behalf.
///
/// Updates from one chat must be handled one at a time; teloxide's dispatcher
/// already guarantees that. Different users proceed independently.
pub struct ConversationController {
    db_pool: Arc<DbPool>,
    states: DashMap<i64, ConversationState>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl ConversationController {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self::with_clock(db_pool, local_today)
    }

    /// Same as [`ConversationController::new`] with a fixed source for "today".
    pub fn with_clock(db_pool: Arc<DbPool>, today: fn() -> NaiveDate) -> Self {
        Self {
            db_pool,
            states: DashMap::new(),
            today,
        }
    }

    /// Current state for `user_id`; `Idle` when nothing is pending.
    pub fn state(&self, user_id: i64) -> ConversationState {
        self.states
            .get(&user_id)
            .map(|state| state.value().clone())
            .unwrap_or_default()
    }

    /// Handles a recognised command. Any pending flow is abandoned first.
    pub fn handle_command(&self, user: &ChatUser, command: Command) -> Reply {
        log::info!("Command {:?} from chat {}", command, user.id);
        let previous = self.take_state(user.id);

        let is_new = self.register(user);
        let result = self.dispatch_command(user, command, is_new);
        self.finish(user.id, &previous, result)
    }

    /// Handles a `/command` the bot does not know: help text, state untouched.
    pub fn handle_unknown_command(&self, user: &ChatUser) -> Reply {
        self.register(user);
        Reply::text(messages::HELP)
    }

    /// Handles plain text as the answer to the pending step, if any.
    pub fn handle_text(&self, user: &ChatUser, text: &str) -> Reply {
        let previous = self.take_state(user.id);

        self.register(user);
        let result = self.advance(user, previous.clone(), text);
        self.finish(user.id, &previous, result)
    }

    /// Drops the pending step and everything collected so far.
    pub fn cancel(&self, user: &ChatUser) -> Reply {
        let previous = self.take_state(user.id);
        if !previous.is_idle() {
            log::info!("Chat {} cancelled {:?}", user.id, previous);
        }
        Reply::text(messages::CANCELLED).remove_keyboard()
    }

    fn take_state(&self, user_id: i64) -> ConversationState {
        self.states
            .remove(&user_id)
            .map(|(_, state)| state)
            .unwrap_or_default()
    }

    /// Records the user on first contact and reports whether they are new.
    ///
    /// Failures are logged only: a missing user row never blocks a reply.
    fn register(&self, user: &ChatUser) -> bool {
        let result = get_connection(&self.db_pool)
            .and_then(|conn| storage::ensure_user(&conn, user.id, user.first_name.as_deref()));
        match result {
            Ok(is_new) => is_new,
            Err(e) => {
                log::error!("Failed to register user {}: {}", user.id, e);
                false
            }
        }
    }

    /// Stores the next state and tidies the keyboard. Storage errors reset the user to `Idle`.
    fn finish(&self, user_id: i64, previous: &ConversationState, result: AppResult<Outcome>) -> Reply {
        match result {
            Ok(Outcome { mut reply, next }) => {
                if reply.keyboard == ReplyKeyboard::Unchanged && previous.offers_choices() && !next.offers_choices() {
                    reply.keyboard = ReplyKeyboard::Remove;
                }
                if !next.is_idle() {
                    self.states.insert(user_id, next);
                }
                reply
            }
            Err(e) => {
                log::error!("Storage failure for chat {}: {}", user_id, e);
                Reply::text(messages::STORAGE_FAILURE).remove_keyboard()
            }
        }
    }

    fn dispatch_command(&self, user: &ChatUser, command: Command, is_new: bool) -> AppResult<Outcome> {
        match command {
            Command::Start => self.start(user, is_new),
            Command::Help => Ok(Outcome::idle(Reply::text(messages::HELP))),
            Command::Cancel => Ok(Outcome::idle(self.cancel(user))),
            Command::AddSubject => Ok(Outcome::then(
                Reply::text(messages::ASK_SUBJECT_NAME),
                ConversationState::AwaitingSubjectName,
            )),
            Command::ListSubjects => self.list_subjects(user),
            Command::AddTerm => Ok(Outcome::then(
                Reply::text(messages::ASK_TERM_NAME),
                ConversationState::AwaitingTermName,
            )),
            Command::ListTerms => self.list_terms(user),
            Command::AddGrade => self.start_add_grade(user),
            Command::ViewGrades(subject) => self.start_view_grades(user, subject.trim()),
            Command::Average(subject) => self.average(user, subject.trim()),
        }
    }

    fn advance(&self, user: &ChatUser, state: ConversationState, text: &str) -> AppResult<Outcome> {
        match state {
            ConversationState::Idle => Ok(Outcome::idle(Reply::text(messages::IDLE_HINT))),
            ConversationState::AwaitingSubjectName => match validate_name(text) {
                Ok(name) => {
                    let conn = get_connection(&self.db_pool)?;
                    let subject = storage::create_subject(&conn, user.id, &name)?;
                    log::info!("Chat {} added subject {} ({})", user.id, subject.name, subject.id);
                    Ok(Outcome::idle(Reply::text(format!(
                        "Subject '{}' added successfully!",
                        subject.name
                    ))))
                }
                Err(e) => Ok(reprompt(&e, messages::ASK_SUBJECT_NAME, ConversationState::AwaitingSubjectName)),
            },
            ConversationState::AwaitingTermName => match validate_name(text) {
                Ok(name) => Ok(Outcome::then(
                    Reply::text(messages::ASK_TERM_START),
                    ConversationState::AwaitingTermStart { name },
                )),
                Err(e) => Ok(reprompt(&e, messages::ASK_TERM_NAME, ConversationState::AwaitingTermName)),
            },
            ConversationState::AwaitingTermStart { name } => match parse_date(text) {
                Ok(start) => Ok(Outcome::then(
                    Reply::text(messages::ASK_TERM_END),
                    ConversationState::AwaitingTermEnd { name, start },
                )),
                Err(e) => Ok(reprompt(
                    &e,
                    messages::ASK_TERM_START,
                    ConversationState::AwaitingTermStart { name },
                )),
            },
            ConversationState::AwaitingTermEnd { name, start } => match parse_end_date(text, start) {
                Ok(end) => {
                    let conn = get_connection(&self.db_pool)?;
                    let term = storage::create_term(&conn, user.id, &name, start, end)?;
                    log::info!("Chat {} added term {} ({})", user.id, term.name, term.id);
                    Ok(Outcome::idle(Reply::text(format!("Term '{}' added successfully!", term.name))))
                }
                Err(e) => Ok(reprompt(
                    &e,
                    messages::ASK_TERM_END,
                    ConversationState::AwaitingTermEnd { name, start },
                )),
            },
            ConversationState::AwaitingGradeSubject => self.choose_grade_subject(user, text),
            ConversationState::AwaitingGradeTerm { subject } => self.choose_grade_term(user, subject, text),
            ConversationState::AwaitingGradeValue { subject, term } => self.record_grade(user, subject, term, text),
            ConversationState::AwaitingViewSubject => self.choose_view_subject(user, text),
        }
    }

    /// Greets returning users by the name stored on their first visit.
    fn start(&self, user: &ChatUser, is_new: bool) -> AppResult<Outcome> {
        if is_new {
            return Ok(Outcome::idle(Reply::text(messages::welcome(user.display_name(), true))));
        }

        let conn = get_connection(&self.db_pool)?;
        let stored = storage::get_user(&conn, user.id)?.and_then(|u| u.name);
        let name = stored.as_deref().unwrap_or_else(|| user.display_name());
        Ok(Outcome::idle(Reply::text(messages::welcome(name, false))))
    }

    fn list_subjects(&self, user: &ChatUser) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        let subjects = storage::list_subjects(&conn, user.id)?;
        if subjects.is_empty() {
            return Ok(Outcome::idle(Reply::text(messages::NO_SUBJECTS)));
        }
        let text = messages::subject_list(subjects.iter().map(|s| s.name.as_str()));
        Ok(Outcome::idle(Reply::text(text)))
    }

    fn list_terms(&self, user: &ChatUser) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        let terms = storage::list_terms(&conn, user.id)?;
        if terms.is_empty() {
            return Ok(Outcome::idle(Reply::text(messages::NO_TERMS)));
        }
        Ok(Outcome::idle(Reply::text(messages::term_list(&terms))))
    }

    fn start_add_grade(&self, user: &ChatUser) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        let subjects = storage::list_subjects(&conn, user.id)?;
        if subjects.is_empty() {
            return Ok(Outcome::idle(Reply::text(messages::NO_SUBJECTS_FOR_GRADE)));
        }
        Ok(Outcome::then(
            Reply::with_choices(messages::ASK_GRADE_SUBJECT, subject_names(&subjects)),
            ConversationState::AwaitingGradeSubject,
        ))
    }

    fn choose_grade_subject(&self, user: &ChatUser, text: &str) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        let subjects = storage::list_subjects(&conn, user.id)?;
        if subjects.is_empty() {
            return Ok(Outcome::idle(Reply::text(messages::NO_SUBJECTS_FOR_GRADE)));
        }

        let Some(subject) = resolve_choice(&subjects, text, |s| s.name.as_str()) else {
            return Ok(Outcome::then(
                Reply::with_choices(
                    format!("{}\n{}", messages::UNKNOWN_CHOICE, messages::ASK_GRADE_SUBJECT),
                    subject_names(&subjects),
                ),
                ConversationState::AwaitingGradeSubject,
            ));
        };
        let subject = SubjectRef {
            id: subject.id,
            name: subject.name.clone(),
        };

        let terms = storage::list_terms(&conn, user.id)?;
        if terms.is_empty() {
            return Ok(Outcome::then(
                Reply::text(messages::ask_grade_value()).remove_keyboard(),
                ConversationState::AwaitingGradeValue { subject, term: None },
            ));
        }
        Ok(Outcome::then(
            Reply::with_choices(messages::ASK_GRADE_TERM, term_choices(&terms)),
            ConversationState::AwaitingGradeTerm { subject },
        ))
    }

    fn choose_grade_term(&self, user: &ChatUser, subject: SubjectRef, text: &str) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        let terms = storage::list_terms(&conn, user.id)?;

        let term = if is_skip(text) {
            storage::current_term(&conn, user.id, (self.today)())?
        } else {
            match resolve_choice(&terms, text, |t| t.name.as_str()) {
                Some(term) => Some(term.clone()),
                None => {
                    return Ok(Outcome::then(
                        Reply::with_choices(
                            format!("{}\n{}", messages::UNKNOWN_CHOICE, messages::ASK_GRADE_TERM),
                            term_choices(&terms),
                        ),
                        ConversationState::AwaitingGradeTerm { subject },
                    ));
                }
            }
        };

        let term = term.map(|t| TermRef { id: t.id, name: t.name });
        Ok(Outcome::then(
            Reply::text(messages::ask_grade_value()).remove_keyboard(),
            ConversationState::AwaitingGradeValue { subject, term },
        ))
    }

    fn record_grade(
        &self,
        user: &ChatUser,
        subject: SubjectRef,
        term: Option<TermRef>,
        text: &str,
    ) -> AppResult<Outcome> {
        let value = match parse_grade_value(text) {
            Ok(value) => value,
            Err(e) => {
                return Ok(reprompt(
                    &e,
                    &messages::ask_grade_value(),
                    ConversationState::AwaitingGradeValue { subject, term },
                ))
            }
        };

        let conn = get_connection(&self.db_pool)?;
        let grade_id = storage::create_grade(
            &conn,
            user.id,
            &NewGrade {
                subject_id: subject.id,
                term_id: term.as_ref().map(|t| t.id),
                value,
                grade_type: grades::DEFAULT_TYPE,
                date: (self.today)(),
            },
        )?;
        log::info!("Chat {} added grade {} ({}) for subject {}", user.id, value, grade_id, subject.id);

        let text = match term {
            Some(term) => format!("Grade {} added for {} ({})!", value, subject.name, term.name),
            None => format!("Grade {} added for {}!", value, subject.name),
        };
        Ok(Outcome::idle(Reply::text(text)))
    }

    fn start_view_grades(&self, user: &ChatUser, subject_name: &str) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        if !subject_name.is_empty() {
            return match storage::find_subject_by_name(&conn, user.id, subject_name)? {
                Some(subject) => {
                    let grades = storage::list_grades(&conn, user.id, Some(subject.id))?;
                    Ok(Outcome::idle(Reply::text(messages::grade_list(&subject.name, &grades))))
                }
                None => Ok(Outcome::idle(Reply::text(messages::subject_not_found(subject_name)))),
            };
        }

        let subjects = storage::list_subjects(&conn, user.id)?;
        if subjects.is_empty() {
            return Ok(Outcome::idle(Reply::text(messages::NO_SUBJECTS)));
        }
        Ok(Outcome::then(
            Reply::with_choices(messages::ASK_VIEW_SUBJECT, view_choices(&subjects)),
            ConversationState::AwaitingViewSubject,
        ))
    }

    fn choose_view_subject(&self, user: &ChatUser, text: &str) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        if text.trim().eq_ignore_ascii_case(messages::ALL_SUBJECTS) {
            let grades = storage::list_grades(&conn, user.id, None)?;
            return Ok(Outcome::idle(Reply::text(messages::grade_list(
                messages::ALL_SUBJECTS,
                &grades,
            ))));
        }

        let subjects = storage::list_subjects(&conn, user.id)?;
        match resolve_choice(&subjects, text, |s| s.name.as_str()) {
            Some(subject) => {
                let grades = storage::list_grades(&conn, user.id, Some(subject.id))?;
                Ok(Outcome::idle(Reply::text(messages::grade_list(&subject.name, &grades))))
            }
            None => Ok(Outcome::then(
                Reply::with_choices(
                    format!("{}\n{}", messages::UNKNOWN_CHOICE, messages::ASK_VIEW_SUBJECT),
                    view_choices(&subjects),
                ),
                ConversationState::AwaitingViewSubject,
            )),
        }
    }

    fn average(&self, user: &ChatUser, subject_name: &str) -> AppResult<Outcome> {
        let conn = get_connection(&self.db_pool)?;
        if !subject_name.is_empty() {
            let text = match storage::find_subject_by_name(&conn, user.id, subject_name)? {
                Some(subject) => {
                    let average = storage::average_grade(&conn, user.id, subject.id, None)?;
                    messages::single_average(&subject.name, average)
                }
                None => messages::subject_not_found(subject_name),
            };
            return Ok(Outcome::idle(Reply::text(text)));
        }

        let subjects = storage::list_subjects(&conn, user.id)?;
        if subjects.is_empty() {
            return Ok(Outcome::idle(Reply::text(messages::NO_SUBJECTS)));
        }
        let rows = subjects
            .into_iter()
            .map(|subject| {
                let average = storage::average_grade(&conn, user.id, subject.id, None)?;
                Ok((subject.name, average))
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Outcome::idle(Reply::text(messages::average_overview(&rows))))
    }
}

fn reprompt(error: &InputError, prompt: &str, state: ConversationState) -> Outcome {
    Outcome::then(Reply::text(format!("{}\n{}", error, prompt)), state)
}

fn is_skip(text: &str) -> bool {
    let text = text.trim();
    text == "-" || text.eq_ignore_ascii_case(messages::SKIP)
}

/// Matches `text` against a 1-based list number or an item name (case-insensitive).
fn resolve_choice<'a, T>(items: &'a [T], text: &str, name: impl Fn(&T) -> &str) -> Option<&'a T> {
    let text = text.trim();
    if let Ok(index) = text.parse::<usize>() {
        if let Some(item) = index.checked_sub(1).and_then(|i| items.get(i)) {
            return Some(item);
        }
    }
    let wanted = text.to_lowercase();
    items.iter().find(|item| name(item).to_lowercase() == wanted)
}

fn subject_names(subjects: &[Subject]) -> Vec<String> {
    subjects.iter().map(|s| s.name.clone()).collect()
}

fn view_choices(subjects: &[Subject]) -> Vec<String> {
    let mut choices = subject_names(subjects);
    choices.push(messages::ALL_SUBJECTS.to_string());
    choices
}

fn term_choices(terms: &[Term]) -> Vec<String> {
    let mut choices: Vec<String> = terms.iter().map(|t| t.name.clone()).collect();
    choices.push(messages::SKIP.to_string());
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Named(&'static str);

    #[test]
    fn test_resolve_choice_by_number_and_name() {
        let items = [Named("Math"), Named("Physics")];

        assert_eq!(resolve_choice(&items, "2", |n| n.0).map(|n| n.0), Some("Physics"));
        assert_eq!(resolve_choice(&items, " math ", |n| n.0).map(|n| n.0), Some("Math"));
        assert!(resolve_choice(&items, "0", |n| n.0).is_none());
        assert!(resolve_choice(&items, "3", |n| n.0).is_none());
        assert!(resolve_choice(&items, "Chemistry", |n| n.0).is_none());
    }

    #[test]
    fn test_resolve_choice_prefers_number_over_numeric_name() {
        let items = [Named("10"), Named("Algebra")];
        assert_eq!(resolve_choice(&items, "2", |n| n.0).map(|n| n.0), Some("Algebra"));
        assert_eq!(resolve_choice(&items, "10", |n| n.0).map(|n| n.0), Some("10"));
    }

    #[test]
    fn test_is_skip() {
        assert!(is_skip("skip"));
        assert!(is_skip(" Skip "));
        assert!(is_skip("-"));
        assert!(!is_skip("Fall 2023"));
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(ChatUser::new(1, None).display_name(), "Unknown");
        assert_eq!(ChatUser::new(1, Some("Anna".to_string())).display_name(), "Anna");
    }
}
