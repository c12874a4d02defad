pub mod catalog;
pub mod config;
pub mod dedup_store;
pub mod logging;
pub mod models;
pub mod plugins;
pub mod scanner;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use scanner::{RunSummary, Scanner};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
