use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::validation::bounded_text;

/// Maximum length of question and choice text, in characters
pub const MAX_TEXT_CHARS: usize = 200;

/// Text of a poll question
///
/// # Invariants
/// - Surrounding whitespace is trimmed
/// - Not blank
/// - At most 200 characters
///
/// # Example
/// ```
/// use polls_api::domain::poll::QuestionText;
///
/// let text = QuestionText::new("  What's new? ").expect("valid text");
/// assert_eq!(text.as_str(), "What's new?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionText(String);

impl QuestionText {
    pub fn new(text: impl AsRef<str>) -> Result<Self, String> {
        bounded_text(text.as_ref(), MAX_TEXT_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text of a single answer to a question
///
/// Same rules as [`QuestionText`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceText(String);

impl ChoiceText {
    pub fn new(text: impl AsRef<str>) -> Result<Self, String> {
        bounded_text(text.as_ref(), MAX_TEXT_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChoiceText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_question_text() {
        assert!(QuestionText::new("What's up?").is_ok());
    }

    #[test]
    fn question_text_is_trimmed() {
        let text = QuestionText::new("\tWhat's up?  ").unwrap();
        assert_eq!(text.as_str(), "What's up?");
    }

    #[test]
    fn blank_question_text_rejected() {
        assert!(QuestionText::new("").is_err());
        assert!(QuestionText::new("    ").is_err());
    }

    #[test]
    fn question_text_at_limit() {
        let text = "q".repeat(MAX_TEXT_CHARS);
        assert!(QuestionText::new(&text).is_ok());
        assert!(QuestionText::new(format!("{}q", text)).is_err());
    }

    #[test]
    fn choice_text_rules() {
        assert!(ChoiceText::new("Not much").is_ok());
        assert!(ChoiceText::new(" ").is_err());
        assert!(ChoiceText::new("c".repeat(MAX_TEXT_CHARS + 1)).is_err());
    }

    #[test]
    fn text_display() {
        let text = ChoiceText::new("The sky").unwrap();
        assert_eq!(format!("{}", text), "The sky");
    }
}
