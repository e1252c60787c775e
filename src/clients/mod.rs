pub mod quiz_client;

pub use quiz_client::{QuizApiClient, STATE_DOCUMENT_PATH, STATE_SAVE_PATH};
