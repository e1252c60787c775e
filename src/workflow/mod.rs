pub mod answer_check;
pub mod question_state;

pub use answer_check::evaluate;
pub use question_state::{QuestionState, SubmitOutcome};
