pub mod traits;
pub mod manager;
pub mod notifiers;

pub use manager::NotificationDispatcher;
pub use traits::{NotificationEvent, NotificationResult, NotifierPlugin};
