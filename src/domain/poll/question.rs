use super::choice::Choice;
use super::value_objects::QuestionText;
use chrono::{DateTime, SubsecRound, Utc};

/// Question aggregate root
///
/// A poll item together with the choices that answer it.
///
/// # Invariants
/// - Question text is non-blank and bounded (see [`QuestionText`])
/// - `date_created` is set once when the question is built and never changes
/// - Every choice refers back to this question
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: i64,
    question_text: QuestionText,
    pub_date: DateTime<Utc>,
    date_created: DateTime<Utc>,
    choices: Vec<Choice>,
}

impl Question {
    // ===== Getters =====

    /// Returns the question's ID
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the question text
    pub fn question_text(&self) -> &str {
        self.question_text.as_str()
    }

    /// Returns the publication timestamp
    pub fn pub_date(&self) -> DateTime<Utc> {
        self.pub_date
    }

    /// Returns the creation timestamp
    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// Returns the question's choices, ordered by ID
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Reconstructs a Question from persistence layer data
    ///
    /// Only to be used by repository implementations for data reconstruction.
    pub fn from_persistence(
        id: i64,
        question_text: QuestionText,
        pub_date: DateTime<Utc>,
        date_created: DateTime<Utc>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            id,
            question_text,
            pub_date,
            date_created,
            choices,
        }
    }
}

/// A question that has not been stored yet
///
/// The creation timestamp is stamped here, at microsecond precision, so it
/// reflects the moment the caller asked for the question to exist.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use polls_api::domain::poll::{NewQuestion, QuestionText};
///
/// let draft = NewQuestion::new(QuestionText::new("What's new?").unwrap(), Utc::now());
/// assert!(draft.date_created() <= Utc::now());
/// ```
#[derive(Debug, Clone)]
pub struct NewQuestion {
    question_text: QuestionText,
    pub_date: DateTime<Utc>,
    date_created: DateTime<Utc>,
}

impl NewQuestion {
    pub fn new(question_text: QuestionText, pub_date: DateTime<Utc>) -> Self {
        Self {
            question_text,
            pub_date,
            date_created: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn question_text(&self) -> &QuestionText {
        &self.question_text
    }

    pub fn pub_date(&self) -> DateTime<Utc> {
        self.pub_date
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }
}

/// Fields to overwrite on an existing question; `None` leaves a field as is
///
/// There is deliberately no way to express a change to `date_created`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionChanges {
    pub question_text: Option<QuestionText>,
    pub pub_date: Option<DateTime<Utc>>,
}

impl QuestionChanges {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none() && self.pub_date.is_none()
    }
}

/// One entry of a bulk partial update: a target question and its changes
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPatch {
    pub id: i64,
    pub changes: QuestionChanges,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn text(s: &str) -> QuestionText {
        QuestionText::new(s).unwrap()
    }

    #[test]
    fn new_question_stamps_creation_time() {
        let before = Utc::now();
        let draft = NewQuestion::new(text("What's new?"), before - Duration::days(3));
        let after = Utc::now();

        assert!(draft.date_created() >= before.trunc_subsecs(6));
        assert!(draft.date_created() <= after);
        assert_eq!(draft.pub_date(), before - Duration::days(3));
        assert_eq!(draft.question_text().as_str(), "What's new?");
    }

    #[test]
    fn empty_changes() {
        assert!(QuestionChanges::default().is_empty());

        let changes = QuestionChanges {
            question_text: Some(text("Changed")),
            pub_date: None,
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn question_getters() {
        let now = Utc::now();
        let choice = Choice {
            id: 4,
            question_id: 9,
            choice_text: crate::domain::poll::ChoiceText::new("Yes").unwrap(),
            votes: 2,
        };
        let question = Question::from_persistence(9, text("Ready?"), now, now, vec![choice]);

        assert_eq!(question.id(), 9);
        assert_eq!(question.question_text(), "Ready?");
        assert_eq!(question.pub_date(), now);
        assert_eq!(question.date_created(), now);
        assert_eq!(question.choices().len(), 1);
        assert_eq!(question.choices()[0].question_id, 9);
    }
}
