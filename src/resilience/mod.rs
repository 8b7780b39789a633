pub mod retry;
pub mod timeout;

pub use retry::{retry_if, Attempted, RetryConfig};
pub use timeout::TimeoutExt;
