pub mod data_gateway;
pub mod filter_controller;
pub mod progress_store;
pub mod save_queue;

pub use data_gateway::{QuestionList, RemoteDataGateway};
pub use filter_controller::{Choice, FilterCallback, FilterController};
pub use progress_store::ProgressStore;
pub use save_queue::{SaveQueue, SaveStats};
