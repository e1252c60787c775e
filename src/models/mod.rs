pub mod catalog;
pub mod filter;
pub mod progress;
pub mod question;

pub use catalog::{CatalogStructure, CatalogSummary, ChapterInfo, HealthStatus};
pub use filter::{normalize_chapter, Filter, CHAPTER_SUFFIX};
pub use progress::{AttemptRecord, Progress, ProgressState};
pub use question::{Question, QuestionOption, QuestionSource};
