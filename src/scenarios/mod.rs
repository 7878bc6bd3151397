//! Contract scenarios
//!
//! Each scenario covers one clause of the todo backend contract. Scenarios
//! are independent: each creates the items it needs and cleans up after
//! itself.
//!
//! ## Scenarios
//!
//! - `cors`: Cross Origin Requests
//! - `create`: Create Todo Item
//! - `update`: Update Todo Item
//! - `delete`: Delete Todo Item
//!
//! ## Adding New Scenarios
//!
//! 1. Create a new file in `src/scenarios/`
//! 2. Implement the `Scenario` trait
//! 3. Register in `registry.rs`

mod cors;
mod create;
mod delete;
pub mod registry;
pub mod runner;
mod traits;
mod update;

pub use cors::{CORS_HEADERS, CorsScenario};
pub use create::CreateScenario;
pub use delete::{DeleteScenario, NOT_FOUND};
pub use registry::SCENARIOS;
pub use runner::{Runner, run_scenario};
pub use traits::*;
pub use update::UpdateScenario;
