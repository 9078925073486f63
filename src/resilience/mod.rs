//! # Resilience Module
//!
//! Bounded retry with a fixed delay between attempts. The same utility backs the three
//! retried operations of the gateway, each with its own policy:
//!
//! - **Store writes**: work description status updates after a version conflict
//! - **Transport calls**: outbound HTTP requests failing with a network-class error
//! - **Queue sends**: inbound messages handed to the downstream processing queue
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mhs_workflow::resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::new(3, Duration::from_millis(100));
//!
//! let result = policy
//!     .run("ping", |_: &std::io::Error| true, || async {
//!         Ok::<_, std::io::Error>("pong")
//!     })
//!     .await;
//! assert!(result.is_ok());
//! # }
//! ```

pub mod retry;

pub use retry::{RetryError, RetryPolicy, RetryState};
