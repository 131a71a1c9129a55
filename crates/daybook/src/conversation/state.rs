//! Per-user conversation state

use chrono::NaiveDate;

/// Subject picked earlier in a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRef {
    pub id: i64,
    pub name: String,
}

/// Term picked earlier in a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRef {
    pub id: i64,
    pub name: String,
}

/// The step a user's conversation is waiting on.
///
/// Each variant carries the data collected by the steps before it, so a
/// flow's partial input lives and dies with its state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// No pending action
    #[default]
    Idle,
    AwaitingSubjectName,
    AwaitingTermName,
    AwaitingTermStart {
        name: String,
    },
    AwaitingTermEnd {
        name: String,
        start: NaiveDate,
    },
    AwaitingGradeSubject,
    AwaitingGradeTerm {
        subject: SubjectRef,
    },
    AwaitingGradeValue {
        subject: SubjectRef,
        term: Option<TermRef>,
    },
    AwaitingViewSubject,
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }

    /// Whether the prompt for this step shows a choice keyboard.
    pub fn offers_choices(&self) -> bool {
        matches!(
            self,
            ConversationState::AwaitingGradeSubject
                | ConversationState::AwaitingGradeTerm { .. }
                | ConversationState::AwaitingViewSubject
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert!(ConversationState::default().is_idle());
        assert!(!ConversationState::AwaitingSubjectName.is_idle());
    }

    #[test]
    fn test_choice_steps() {
        let math = SubjectRef {
            id: 1,
            name: "Math".to_string(),
        };
        assert!(ConversationState::AwaitingGradeSubject.offers_choices());
        assert!(ConversationState::AwaitingGradeTerm { subject: math.clone() }.offers_choices());
        assert!(!ConversationState::AwaitingGradeValue {
            subject: math,
            term: None
        }
        .offers_choices());
        assert!(!ConversationState::AwaitingTermName.offers_choices());
    }
}
