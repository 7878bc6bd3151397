//! todocheck - Todo Backend Conformance Suite
//!
//! Black-box checks for HTTP todo-list backends. Point the suite at a
//! running server's collection URL and it verifies creation, retrieval,
//! full and partial updates, deletion and CORS support, reporting a verdict
//! per contract clause.
//!
//! ## Modules
//!
//! - [`client`] - HTTP adapter returning deferred response handles
//! - [`assert`] - Assertion engine over resolved responses
//! - [`scenarios`] - Contract scenarios and the runner
//! - [`config`] - Configuration parsing
//! - [`report`] - Text and JSON reports

pub mod assert;
pub mod client;
pub mod config;
pub mod report;
pub mod scenarios;
