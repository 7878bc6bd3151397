//! todocheck Test Kit
//!
//! Test infrastructure for the todo conformance suite.
//!
//! This crate provides:
//! - An in-process mock todo backend with switchable contract violations
//! - Seeded random titles for reproducible tests
//!
//! # Example
//!
//! ```rust,no_run
//! use todocheck_testkit::{MockBackend, PseudoGenerator};
//!
//! # async fn example() -> std::io::Result<()> {
//! let backend = MockBackend::start().await?;
//! let mut rng = PseudoGenerator::new(12345);
//!
//! println!("POST {:?} to {}", rng.random_title(), backend.url());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod random;

// Re-exports for convenience
pub use mock::{MockBackend, MockBehavior, MockTodo};
pub use random::PseudoGenerator;
