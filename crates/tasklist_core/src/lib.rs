pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod storage;
pub mod task_store;
pub mod validation;
pub mod view;

pub use error::AppError;
pub use model::{Task, Theme};
pub use session::Session;
pub use task_store::TaskStore;
