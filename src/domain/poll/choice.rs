use super::value_objects::ChoiceText;

/// A selectable answer to a question, with its vote tally
///
/// Votes are expected to stay non-negative but nothing enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: ChoiceText,
    pub votes: i32,
}

/// Data for a choice that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewChoice {
    pub question_id: i64,
    pub choice_text: ChoiceText,
    pub votes: i32,
}

/// Fields to overwrite on an existing choice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceChanges {
    pub question_id: Option<i64>,
    pub choice_text: Option<ChoiceText>,
    pub votes: Option<i32>,
}
