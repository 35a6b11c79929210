// Poll domain module
// Questions, their choices, and the text value objects both share

pub mod choice;
pub mod question;
pub mod value_objects;

// Re-export main types for convenience
pub use choice::{Choice, ChoiceChanges, NewChoice};
pub use question::{NewQuestion, Question, QuestionChanges, QuestionPatch};
pub use value_objects::{ChoiceText, QuestionText};
