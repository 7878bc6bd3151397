//! Todo API Client
//!
//! HTTP adapter used by every scenario. Each call returns a [`ResponseHandle`]
//! that resolves to the exchange's outcome, so setup hooks and assertions can
//! share one in-flight request.

mod handle;
mod todo;
mod types;

pub use handle::{Exchange, ResponseHandle};
pub use todo::{ClientError, ClientResult, TodoClient};
pub use types::*;
